//! [`Command`] definition.

pub mod add_buyer;
pub mod authorize_user_session;
pub mod remove_buyer;
pub mod update_priority;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_buyer::AddBuyer, authorize_user_session::AuthorizeUserSession,
    remove_buyer::RemoveBuyer, update_priority::UpdatePriority,
};
