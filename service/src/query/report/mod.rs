//! Reporting [`Query`] definitions.
//!
//! [`Query`]: crate::Query

pub mod top_buyers;

pub use self::top_buyers::TopBuyers;
