//! [`Session`] definitions.

use derive_more::{AsRef, Display, From, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authenticated session of a [`User`].
///
/// Represents the claims of a [JWT] issued by the external authentication
/// flow.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// Unix timestamp (in seconds) when this [`Session`] expires.
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, From, FromStr)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Token(String);
