//! Application provides GraphQL API for interacting with the [`Service`] of
//! delegated purchases.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Extension, Json, Router,
};
use derive_more::Debug;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    DefaultScalarValue, EmptySubscription, IntoFieldError as _, ScalarValue,
};
use juniper_axum::extract::JuniperRequest;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`service::Service`] backed by [`service::infra::Postgres`].
pub type Service = service::Service<service::infra::Postgres>;

/// Response to a GraphQL request.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// HTTP status of the response, applied only if the request failed.
    pub status_code: http::StatusCode,

    /// Executed GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl JuniperResponse {
    /// Creates a new [`JuniperResponse`] failed with the provided [`Error`]
    /// before any resolver has run.
    #[must_use]
    pub fn error(err: Error) -> Self {
        Self {
            status_code: err.status_code,
            response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                err.into_field_error(),
            )),
        }
    }
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let status_code = if self.response.is_ok() {
            http::StatusCode::OK
        } else {
            self.status_code
        };
        (status_code, Json(self.response)).into_response()
    }
}

/// Executes a GraphQL request against the [`api::Schema`].
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    let response = gql_request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Creates a new [`Router`] serving the [`api::Schema`] on `/graphql` with
/// the provided [`Service`].
pub fn router(service: Service) -> Router {
    let schema =
        api::Schema::new(api::Query, api::Mutation, EmptySubscription::new());

    Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
}
