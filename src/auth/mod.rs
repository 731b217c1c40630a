pub mod actor;
pub mod jwt;
