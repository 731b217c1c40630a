pub mod customer;
pub mod import;
pub mod interaction;
pub mod inventory_log;
pub mod invoice;
pub mod medicine;
pub mod supplier;
pub mod user;
