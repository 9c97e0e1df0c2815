//! GraphQL API definitions.

pub mod circle;
pub mod item;
mod mutation;
mod query;
pub mod report;
pub mod user;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    circle::Circle, item::Item, mutation::Mutation, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
