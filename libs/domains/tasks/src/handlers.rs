use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskFilter, TaskPage, UpdateTask};
use crate::repository::TaskRepository;
use crate::service::TaskService;

/// OpenAPI documentation for Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        create_task,
        get_task,
        replace_task,
        update_task,
        delete_task,
    ),
    components(
        schemas(Task, CreateTask, UpdateTask, TaskFilter, TaskPage),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Tasks", description = "Task management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the tasks router with all HTTP endpoints
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{id}",
            get(get_task)
                .put(replace_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(shared_service)
}

/// List tasks with optional filters and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "One page of tasks plus the filtered total", body = TaskPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    ValidatedQuery(filter): ValidatedQuery<TaskFilter>,
) -> TaskResult<Json<TaskPage>> {
    let page = service.list_tasks(filter).await?;
    Ok(Json(page))
}

/// Create a new task
#[utoipa::path(
    post,
    path = "",
    tag = "Tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<impl IntoResponse> {
    let task = service.create_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    UuidPath(id): UuidPath,
) -> TaskResult<Json<Task>> {
    let task = service.get_task(id).await?;
    Ok(Json(task))
}

/// Replace a task (full substitution, no upsert)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = CreateTask,
    responses(
        (status = 200, description = "Task replaced successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn replace_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<Json<Task>> {
    let task = service.replace_task(id, input).await?;
    Ok(Json(task))
}

/// Update a task (merge of the fields present in the body)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> TaskResult<Json<Task>> {
    let task = service.update_task(id, input).await?;
    Ok(Json(task))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    UuidPath(id): UuidPath,
) -> TaskResult<impl IntoResponse> {
    service.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTaskRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        router(TaskService::new(InMemoryTaskRepository::new()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_create_returns_201_with_assigned_id() {
        let app = app();
        let created = create(
            &app,
            json!({"title": "write the report", "importance": "high"}),
        )
        .await;

        assert!(!created["_id"].as_str().unwrap().is_empty());
        assert_eq!(created["title"], "write the report");
        assert_eq!(created["importance"], "high");
        assert_eq!(created["status"], "pending");
    }

    #[tokio::test]
    async fn test_create_empty_title_is_400_with_error_body() {
        let response = app()
            .oneshot(json_request("POST", "/", json!({"title": ""})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Request validation failed");
        assert!(body["errors"]["title"].is_array());
    }

    #[tokio::test]
    async fn test_create_out_of_enum_status_is_400() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/",
                json!({"title": "bad status", "status": "paused"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_round_trip_create_then_get() {
        let app = app();
        let created = create(&app, json!({"title": "round trip"})).await;
        let id = created["_id"].as_str().unwrap();

        let response = app
            .oneshot(empty_request("GET", &format!("/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, created);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404_with_task_id_metadata() {
        let id = uuid::Uuid::now_v7();
        let response = app()
            .oneshot(empty_request("GET", &format!("/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Task not found");
        assert_eq!(body["taskId"], id.to_string());
    }

    #[tokio::test]
    async fn test_malformed_id_is_400_before_service_runs() {
        let response = app()
            .oneshot(empty_request("GET", "/not-a-uuid"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_returns_page_envelope() {
        let app = app();
        for i in 0..3 {
            create(&app, json!({"title": format!("task {i}")})).await;
        }

        let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(body["total"], 3);
        assert_eq!(body["limit"], 20);
        assert_eq!(body["skip"], 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_status_with_independent_total() {
        let app = app();
        for _ in 0..3 {
            create(&app, json!({"title": "done", "status": "done"})).await;
        }
        create(&app, json!({"title": "pending"})).await;

        let response = app
            .oneshot(empty_request("GET", "/?status=done&limit=2"))
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
        assert_eq!(body["total"], 3);
        for task in body["tasks"].as_array().unwrap() {
            assert_eq!(task["status"], "done");
        }
    }

    #[tokio::test]
    async fn test_list_clamps_limit_to_max() {
        let response = app()
            .oneshot(empty_request("GET", "/?limit=500"))
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["limit"], 100);
    }

    #[tokio::test]
    async fn test_list_coerces_unparseable_paging_params() {
        let response = app()
            .oneshot(empty_request("GET", "/?limit=abc&skip=-1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["limit"], 20);
        assert_eq!(body["skip"], 0);
    }

    #[tokio::test]
    async fn test_list_out_of_enum_filter_is_json_400() {
        let response = app()
            .oneshot(empty_request("GET", "/?status=bogus"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_replace_overwrites_omitted_fields() {
        let app = app();
        let created = create(
            &app,
            json!({"title": "original", "description": "keep me?", "importance": "high"}),
        )
        .await;
        let id = created["_id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/{id}"),
                json!({"title": "replaced"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "replaced");
        assert_eq!(body["description"], Value::Null);
        assert_eq!(body["importance"], "medium");
    }

    #[tokio::test]
    async fn test_replace_unknown_id_is_404_not_upsert() {
        let app = app();
        let id = uuid::Uuid::now_v7();
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/{id}"),
                json!({"title": "ghost"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Nothing was created by the failed replace
        let list = body_json(app.oneshot(empty_request("GET", "/")).await.unwrap()).await;
        assert_eq!(list["total"], 0);
    }

    #[tokio::test]
    async fn test_update_merges_only_present_fields() {
        let app = app();
        let created = create(
            &app,
            json!({"title": "stable", "description": "still here", "importance": "high"}),
        )
        .await;
        let id = created["_id"].as_str().unwrap();

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/{id}"),
                json!({"status": "done"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "done");
        assert_eq!(body["title"], "stable");
        assert_eq!(body["description"], "still here");
        assert_eq!(body["importance"], "high");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let id = uuid::Uuid::now_v7();
        let response = app()
            .oneshot(json_request(
                "PATCH",
                &format!("/{id}"),
                json!({"status": "done"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let app = app();
        let created = create(&app, json!({"title": "doomed"})).await;
        let id = created["_id"].as_str().unwrap();

        let first = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/{id}")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::NO_CONTENT);

        let second = app
            .oneshot(empty_request("DELETE", &format!("/{id}")))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }
}
