//! Report definitions.

pub mod top_buyers;

pub use self::top_buyers::TopBuyer;
