//! [`Context`] of a single GraphQL request.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, error::AuthError, AsError, Error, JuniperResponse, Service};

/// Per-request state shared by all the GraphQL resolvers.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] resolving the request.
    service: Service,

    /// HTTP status of the response, if any resolver fails.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request carrying the bearer token.
    parts: http::request::Parts,

    /// Outcome of authenticating the caller, once it's done.
    session: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Creates a new [`Context`] of the HTTP request with the provided
    /// `parts`.
    fn new(service: Service, parts: http::request::Parts) -> Self {
        Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts,
            session: OnceCell::new(),
        }
    }

    /// Returns the [`Service`] resolving the request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the HTTP status of the response to a failed request.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        let code = self.error_status_code.load(atomic::Ordering::Relaxed);
        http::StatusCode::from_u16(code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Makes the response to the request fail with the provided HTTP status.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Returns a [`Result::map_err()`] closure applying the HTTP status of a
    /// resolver [`Error`] to the response.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns the [`Session`] of the caller.
    ///
    /// The caller is authenticated once per request, so the same [`Session`]
    /// or [`Error`] is returned on every call.
    ///
    /// # Errors
    ///
    /// With `AUTHORIZATION_REQUIRED` if the request carries no valid token.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.session
            .get_or_init(|| self.authenticate())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Verifies the bearer token the request is authorized with.
    async fn authenticate(&self) -> Result<Session, Error> {
        let token = match self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => {
                session::Token::from(bearer.token())
            }
            Err(e) if e.is_missing() => {
                return Err(AuthError::AuthorizationRequired.into());
            }
            Err(e) => return Err(e.into_error()),
        };

        let verified = self
            .service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Session {
            user_id: verified.user_id.into(),
            token,
            expires_at: verified.expires_at,
        })
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            return Err(JuniperResponse::error(Error::internal(
                &"missing `Service` extension",
            )));
        };
        Ok(Self::new(service, parts.clone()))
    }
}

/// Verified session of the caller.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated [`User`].
    pub user_id: api::user::Id,

    /// Bearer token the request is authorized with.
    pub token: session::Token,

    /// Unix timestamp (in seconds) when the `token` expires.
    pub expires_at: u64,
}
