//! Workflows over an open [`LedgerTx`](crate::ledger::LedgerTx).
//!
//! Services never begin or commit; the caller owns the unit of work and
//! passes the acting user explicitly.
pub mod adjustment;
pub mod catalog;
pub mod codes;
pub mod history;
pub mod import;
pub mod interaction;
pub mod invoice;
pub mod lookup;
pub mod stock;
