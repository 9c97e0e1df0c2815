//! API [`Error`]s and their mapping from the [`service`] failures.

use std::{fmt, num::TryFromIntError};

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{command, infra::database, query};
use tracerr::{Trace, Traced};

/// Defines an enum of client-facing failures convertible into an [`Error`].
///
/// Every variant is annotated with its `code` reported in the GraphQL error
/// extensions, the HTTP `status` of the response and the human-readable
/// `message`.
#[macro_export]
macro_rules! define_error {
    (
        $(#[doc = $doc:literal])*
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self::new(
                            $code,
                            ::http::StatusCode::$status_code,
                            $message,
                        ),
                    )*
                }
            }
        }
    };
}

/// Failure reported to a GraphQL client.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Machine-readable [`Code`] of this [`Error`].
    pub code: Code,

    /// HTTP status of the response carrying this [`Error`].
    pub status_code: http::StatusCode,

    /// [`Trace`] of the [`service`] failure caused this [`Error`], if any.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// Human-readable description of this [`Error`].
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] without a [`Trace`].
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message: message.into(),
        }
    }

    /// Creates a new `INTERNAL_SERVER_ERROR` [`Error`] described with the
    /// provided `msg`.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }

    /// Returns the frames of the [`Trace`] of this [`Error`].
    fn frames(&self) -> impl Iterator<Item = String> + '_ {
        self.backtrace
            .iter()
            .flat_map(|trace| trace.iter())
            .map(ToString::to_string)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        if self.backtrace.is_some() {
            write!(f, "\n{}", self.frames().format("\n"))?;
        }
        Ok(())
    }
}

/// Puts the [`Code`] and the [`Trace`] frames into the error extensions.
impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let frames = self.frames().map(juniper::Value::scalar).collect();

        let mut ext = juniper::Object::with_capacity(2);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        drop(ext.add_field("backtrace", juniper::Value::list(frames)));

        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// Machine-readable code of an [`Error`], like `ITEM_NOT_EXISTS`.
pub type Code = &'static str;

/// Conversion of a failure into an [`Error`].
pub trait AsError {
    /// Returns the client-facing [`Error`] of this failure.
    ///
    /// [`None`] means the failure is internal and should not be described to
    /// the client.
    fn try_as_error(&self) -> Option<Error>;

    /// Returns the client-facing [`Error`] of this failure, falling back to
    /// an [`Error::internal()`] one.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Same as [`AsError::as_error()`], but consumes the failure.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(
            "BAD_REQUEST",
            http::StatusCode::BAD_REQUEST,
            self.to_string(),
        ))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for TryFromIntError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for query::item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ItemNotExists(_) => Some(ItemError::NotExists.into()),
        }
    }
}

impl AsError for query::user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::PriceOverflow(_) | Self::TotalOverflow(_) => {
                Some(PriceError::Overflow.into())
            }
        }
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

impl AsError for command::update_priority::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ItemNotExists(_) => Some(ItemError::NotExists.into()),
            Self::BuyerNotExists { .. } => Some(BuyerError::NotExists.into()),
        }
    }
}

impl AsError for command::remove_buyer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ItemNotExists(_) => Some(ItemError::NotExists.into()),
        }
    }
}

impl AsError for command::add_buyer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ItemNotExists(_) => Some(ItemError::NotExists.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::BuyerAlreadyExists { .. } => {
                Some(BuyerError::AlreadyExists.into())
            }
        }
    }
}

define_error! {
    /// Failures of authenticating the caller.
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}

define_error! {
    /// Failures of looking up a `Circle`.
    enum CircleError {
        #[code = "CIRCLE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Circle` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    /// Failures of looking up an `Item`.
    enum ItemError {
        #[code = "ITEM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Item` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    /// Failures of looking up a `User`.
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    /// Failures of editing the requests of an `Item`.
    enum BuyerError {
        #[code = "BUYER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` doesn't request the `Item`"]
        NotExists,

        #[code = "BUYER_ALREADY_EXISTS"]
        #[status = CONFLICT]
        #[message = "`User` already requests the `Item`"]
        AlreadyExists,
    }
}

define_error! {
    /// Failures of validating the provided input.
    enum InputError {
        #[code = "INVALID_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Requested count must be positive"]
        InvalidCount,
    }
}

define_error! {
    /// Failures of computing prices.
    enum PriceError {
        #[code = "PRICE_OVERFLOW"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "Price is too large to be computed"]
        Overflow,
    }
}

#[cfg(test)]
mod spec {
    use service::{domain::item, query};
    use tracerr::Traced;

    use super::{AsError as _, BuyerError, Error};

    #[test]
    fn maps_declared_failures() {
        let err = Error::from(BuyerError::AlreadyExists);

        assert_eq!(err.code, "BUYER_ALREADY_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(err.message, "`User` already requests the `Item`");
        assert!(err.backtrace.is_none());
    }

    #[test]
    fn attaches_trace_of_service_failure() {
        let failure: Traced<_> = tracerr::new!(
            query::item::ExecutionError::ItemNotExists(item::Id::new())
        );

        let err = failure.into_error();

        assert_eq!(err.code, "ITEM_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
        assert!(err.backtrace.is_some());
        assert!(err.to_string().starts_with(
            "[ITEM_NOT_EXISTS]: `Item` with the specified ID does not exist\n",
        ));
    }

    #[test]
    fn hides_internal_failures() {
        let err = i32::try_from(u64::MAX).unwrap_err().into_error();

        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(
            err.status_code,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
