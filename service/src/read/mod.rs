//! Read entities definitions.

pub mod circle;
pub mod item;
pub mod report;
