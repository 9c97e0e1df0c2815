//! [`Query`] collection related to the multiple [`User`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::{user, User};

use super::Lookup;

/// Queries multiple [`User`]s by their [`user::Id`]s.
pub type ByIds = Lookup<By<HashMap<user::Id, User>, Vec<user::Id>>>;

/// Queries all the registered [`User`]s.
pub type List = Lookup<By<Vec<User>, ()>>;
