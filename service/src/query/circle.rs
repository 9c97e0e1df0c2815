//! [`Query`] collection related to a single [`Circle`].

use common::operations::By;

use crate::domain::{circle, Circle};
#[cfg(doc)]
use crate::Query;

use super::Lookup;

/// Queries a [`Circle`] by its [`circle::Id`].
pub type ById = Lookup<By<Option<Circle>, circle::Id>>;
