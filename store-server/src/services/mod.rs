//! Domain services
//!
//! Operations that span several repositories or need a transaction.
//! Each takes the pool and the calling user and checks store access itself.

pub mod daily_reports;
pub mod sales;
pub mod stock;

#[cfg(test)]
pub(crate) mod testing;
