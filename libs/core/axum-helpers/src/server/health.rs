use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::{future::Future, pin::Pin};
use utoipa::ToSchema;

/// Response payload for the liveness endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status, always "ok" when the process is serving requests.
    pub status: &'static str,
    /// Service name from the crate manifest.
    pub name: &'static str,
    /// Service version from the crate manifest.
    pub version: &'static str,
}

/// A named readiness probe. The future resolves to `Ok(())` when the
/// dependency is reachable, or `Err(reason)` otherwise.
pub type HealthCheckFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs the given readiness checks concurrently and renders an aggregate
/// response: 200 when every check passes, 503 with per-check details when
/// any of them fails.
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> Response {
    let (names, futures): (Vec<_>, Vec<_>) = checks.into_iter().unzip();
    let results = join_all(futures).await;

    let mut all_healthy = true;
    let mut details = serde_json::Map::new();
    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(()) => {
                details.insert(name.to_string(), json!({ "status": "ok" }));
            }
            Err(reason) => {
                all_healthy = false;
                details.insert(
                    name.to_string(),
                    json!({ "status": "unavailable", "reason": reason }),
                );
            }
        }
    }

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if all_healthy { "ok" } else { "unavailable" },
        "checks": details,
    });

    (status, Json(body)).into_response()
}

async fn health_handler(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: app.name,
        version: app.version,
    })
}

/// Router exposing `GET /health` for liveness probes.
pub fn health_router(app: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint_reports_app_info() {
        let app = health_router(core_config::app_info!());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["name"], "axum-helpers");
    }

    #[tokio::test]
    async fn test_run_health_checks_all_passing() {
        let checks: Vec<(&str, HealthCheckFuture)> =
            vec![("store", Box::pin(async { Ok(()) }))];

        let response = run_health_checks(checks).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["checks"]["store"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_run_health_checks_reports_failure() {
        let checks: Vec<(&str, HealthCheckFuture)> = vec![
            ("store", Box::pin(async { Ok(()) })),
            (
                "queue",
                Box::pin(async { Err("connection refused".to_string()) }),
            ),
        ];

        let response = run_health_checks(checks).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["checks"]["store"]["status"], "ok");
        assert_eq!(json["checks"]["queue"]["reason"], "connection refused");
    }
}
