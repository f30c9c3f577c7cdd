//! Run API Handler
//!
//! HTTP endpoint that accepts a provisioning request, validates it, and
//! dispatches the runner script without awaiting its completion.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::TerraformRun;

/// Request body for POST /run-terraform
#[derive(Debug, Deserialize)]
pub struct RunTerraformRequest {
    /// Project to provision; required and must be non-empty
    pub project_name: Option<String>,
    /// Terraform command verb; defaults to "plan"
    pub command: Option<String>,
}

/// Acknowledgement body returned with 202
#[derive(Debug, Serialize)]
pub struct RunAccepted {
    pub status: &'static str,
    pub message: String,
    pub run_id: String,
    /// Where the runner script is expected to write its log.
    /// Constructed, never verified to exist.
    pub log_file: String,
}

/// POST /run-terraform
/// Validate the request, acknowledge it, and dispatch the run
pub async fn run_terraform(
    State(state): State<AppState>,
    body: Result<Json<RunTerraformRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RunAccepted>)> {
    let Json(req) = body
        .map_err(|_| ApiError::BadRequest("Invalid JSON in request body".to_string()))?;

    let project_name = match req.project_name {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(ApiError::BadRequest(
                "Missing project_name parameter".to_string(),
            ));
        }
    };

    let command = req.command.unwrap_or_else(|| "plan".to_string());

    // Seconds resolution; matches the log file naming used by the runner
    // script, not unique across runs accepted within the same second
    let run_id = chrono::Utc::now().timestamp().to_string();

    let log_file = state
        .log_dir
        .join(format!("terraform-{}-{}.log", project_name, run_id))
        .display()
        .to_string();

    tracing::info!(
        "Accepted terraform {} for project {} (run {})",
        command,
        project_name,
        run_id
    );

    state
        .launcher
        .launch(TerraformRun {
            project_name: project_name.clone(),
            command: command.clone(),
            run_id: run_id.clone(),
        })
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(RunAccepted {
            status: "accepted",
            message: format!("Terraform {} for {} started", command, project_name),
            run_id,
            log_file,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AppState, create_router};
    use crate::service::RunLauncher;
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, Response, header};
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Records launched runs instead of executing anything
    #[derive(Default)]
    struct RecordingLauncher {
        launched: Mutex<Vec<TerraformRun>>,
    }

    #[async_trait]
    impl RunLauncher for RecordingLauncher {
        async fn launch(&self, run: TerraformRun) {
            self.launched.lock().unwrap().push(run);
        }
    }

    fn test_app() -> (Router, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::default());
        let state = AppState {
            launcher: launcher.clone(),
            log_dir: PathBuf::from("/home/terraform/logs"),
        };
        (create_router(state), launcher)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
        app.oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn accepts_run_with_default_command() {
        let (app, launcher) = test_app();

        let response = post_json(app, "/run-terraform", r#"{"project_name": "site-a"}"#).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let json = body_json(response).await;
        assert_eq!(json["status"], "accepted");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("plan for site-a")
        );
        assert!(json["run_id"].is_string());
        assert!(
            json["log_file"]
                .as_str()
                .unwrap()
                .starts_with("/home/terraform/logs/terraform-site-a-")
        );

        let launched = launcher.launched.lock().unwrap();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].project_name, "site-a");
        assert_eq!(launched[0].command, "plan");
    }

    #[tokio::test]
    async fn accepts_run_with_explicit_command() {
        let (app, launcher) = test_app();

        let response = post_json(
            app,
            "/run-terraform",
            r#"{"project_name": "site-a", "command": "apply"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let json = body_json(response).await;
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("apply for site-a")
        );

        let launched = launcher.launched.lock().unwrap();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].project_name, "site-a");
        assert_eq!(launched[0].command, "apply");
    }

    #[tokio::test]
    async fn rejects_missing_project_name() {
        let (app, launcher) = test_app();

        let response = post_json(app, "/run-terraform", "{}").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_project_name() {
        let (app, launcher) = test_app();

        let response = post_json(app, "/run-terraform", r#"{"project_name": ""}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_json_body() {
        let (app, launcher) = test_app();

        let response = post_json(app, "/run-terraform", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_path_returns_404() {
        let (app, _launcher) = test_app();

        let response = post_json(app, "/run-ansible", r#"{"project_name": "site-a"}"#).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_returns_404() {
        let (app, launcher) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/run-terraform")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let (app, _launcher) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
