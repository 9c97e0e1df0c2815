//! Domain definitions.

pub mod circle;
pub mod item;
pub mod user;

pub use self::{circle::Circle, item::Item, user::User};
