//! HTTP REST API routes

mod asset_routes;
mod creature_routes;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::application::services::CreatureError;
use crate::domain::value_objects::CreatureId;
use crate::infrastructure::state::AppState;

/// Error body returned by every route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Map a service error to its status code and public body
pub fn api_error(err: CreatureError) -> ApiError {
    use crate::application::services::ErrorKind;

    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PathEscape => StatusCode::BAD_REQUEST,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::GenerationFailure | ErrorKind::ShapeMismatch => StatusCode::BAD_GATEWAY,
        ErrorKind::Serialization | ErrorKind::Storage | ErrorKind::Io => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }

    (
        status,
        Json(ErrorBody {
            error: err.public_message(),
            kind: err.kind().as_str(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
            kind: "bad_request",
        }),
    )
}

fn parse_creature_id(id: &str) -> Result<CreatureId, ApiError> {
    id.parse::<i64>()
        .map(CreatureId::from_i64)
        .map_err(|_| bad_request("Invalid creature ID"))
}

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Creature routes
        .route(
            "/api/creatures",
            get(creature_routes::list_creatures).post(creature_routes::create_creature),
        )
        .route(
            "/api/creatures/complete",
            post(creature_routes::create_complete),
        )
        .route(
            "/api/creatures/{id}",
            get(creature_routes::get_creature).delete(creature_routes::delete_creature),
        )
        // Asset tree routes
        .route(
            "/api/creatures/{id}/directory",
            get(asset_routes::get_directory).post(asset_routes::set_directory),
        )
        .route(
            "/api/creatures/{id}/directories/required",
            post(asset_routes::add_required_folders),
        )
        .route("/api/creatures/{id}/data", post(asset_routes::write_base_data))
        .route(
            "/api/creatures/{id}/files/{folder}/{filename}",
            get(asset_routes::read_file),
        )
        .route(
            "/api/creatures/{id}/images/{folder}",
            get(asset_routes::list_images).post(asset_routes::upload_image),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{
        InMemoryCreatureRepository, MockGenerator, PNG_BYTES,
    };
    use crate::domain::value_objects::PipelineSettings;
    use crate::infrastructure::asset_manager::AssetManager;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn app() -> (Router, TempDir) {
        let root = tempdir().unwrap();
        let settings = PipelineSettings {
            max_attempts: 1,
            retry_base_delay_ms: 0,
            retry_max_delay_ms: 0,
            ..PipelineSettings::default()
        };
        let state = AppState::with_adapters(
            Arc::new(MockGenerator::new()),
            Arc::new(InMemoryCreatureRepository::new()),
            AssetManager::new(root.path()),
            settings,
        );
        (create_routes().with_state(Arc::new(state)), root)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_unknown_creature_is_404() {
        let (app, _root) = app();
        let (status, body) = send(&app, "GET", "/api/creatures/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _) = send(&app, "DELETE", "/api/creatures/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/api/creatures/999/directory", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_400() {
        let (app, _root) = app();
        let (status, body) = send(&app, "GET", "/api/creatures/pikachu", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid creature ID");
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let (app, _root) = app();
        let (status, created) =
            send(&app, "POST", "/api/creatures", Some(json!({ "name": "Eevee" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, "GET", &format!("/api/creatures/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Eevee");
        assert_eq!(fetched["asset_directory"], Value::Null);

        let (status, listed) = send(&app, "GET", "/api/creatures", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, deleted) = send(&app, "DELETE", &format!("/api/creatures/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_complete_creation() {
        let (app, root) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/creatures/complete",
            Some(json!({
                "name": "Pikachu",
                "description": "electric mouse",
                "physical_att": "yellow",
                "pytpe": "Electric"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "complete");
        assert_eq!(body["sprites"]["persisted"], 5);

        let id = body["creature"]["id"].as_i64().unwrap();
        assert!(root.path().join(format!("pikachu_{}/base/base.png", id)).is_file());

        let (status, file) = send(
            &app,
            "GET",
            &format!("/api/creatures/{}/files/data/data_user.json", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let stored: Value = serde_json::from_str(file["content"].as_str().unwrap()).unwrap();
        assert_eq!(stored["physical_attr"], "yellow");

        let (status, images) =
            send(&app, "GET", &format!("/api/creatures/{}/images/base", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(images, json!(["base.png"]));
    }

    #[tokio::test]
    async fn test_complete_creation_validation() {
        let (app, _root) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/creatures/complete",
            Some(json!({ "name": "Pikachu" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "validation");
        assert!(body["error"].as_str().unwrap().contains("physical_attr"));
    }

    #[tokio::test]
    async fn test_file_outside_folder_is_rejected() {
        let (app, root) = app();
        let (_, created) =
            send(&app, "POST", "/api/creatures", Some(json!({ "name": "Eevee" }))).await;
        let id = created["id"].as_i64().unwrap();
        let (status, _) =
            send(&app, "POST", &format!("/api/creatures/{}/directory", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/creatures/{}/files/data/..%2F..%2Fsecret", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body["error"].as_str().unwrap().contains(root.path().to_str().unwrap()));

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/creatures/{}/files/secrets/x.json", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let (app, root) = app();
        let (_, created) =
            send(&app, "POST", "/api/creatures", Some(json!({ "name": "Eevee" }))).await;
        let id = created["id"].as_i64().unwrap();

        let boundary = "XBOUNDARY";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"idle.png\"\r\nContent-Type: image/png\r\n\r\n",
            b = boundary
        )
        .into_bytes();
        body.extend_from_slice(&PNG_BYTES);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/creatures/{}/images/animations", id))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let stored = root
            .path()
            .join(format!("eevee_{}/animations/idle.png", id));
        assert_eq!(std::fs::read(stored).unwrap(), PNG_BYTES.to_vec());

        let (status, images) = send(
            &app,
            "GET",
            &format!("/api/creatures/{}/images/animations", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(images, json!(["idle.png"]));

        let (status, _) =
            send(&app, "GET", &format!("/api/creatures/{}/images/data", id), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
