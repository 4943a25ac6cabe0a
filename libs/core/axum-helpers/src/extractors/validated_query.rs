//! Query string extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query string extractor with automatic validation.
///
/// Deserializes the query string, then runs the `validator` crate's
/// `Validate` on it. Both failure modes reject through [`AppError`], so an
/// unparseable query string produces the same error shape as every other
/// failure instead of axum's plain-text rejection.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::ValidatedQuery;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct ListParams {
///     status: Option<String>,
/// }
///
/// async fn list_tasks(ValidatedQuery(params): ValidatedQuery<ListParams>) -> String {
///     format!("status filter: {:?}", params.status)
/// }
///
/// let app = Router::new().route("/tasks", get(list_tasks));
/// ```
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        params
            .validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedQuery(params))
    }
}
