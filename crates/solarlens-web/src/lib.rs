// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Upload form and dashboard for the SolarLens analysis pipeline.
//!
//! An upload is analyzed once, the rendered dashboard view is parked in a
//! [`ResultStore`] and the browser is redirected to `/dashboard?run=<id>`.
//! The view is handed out exactly once.

mod chart;
mod config;
mod routes;
mod store;

pub use chart::{ChartError, ChartKind, ChartSpec, RenderedChart, dashboard_charts, render_chart};
pub use config::ServerSettings;
pub use routes::{AnomalyRow, DashboardView, PLACEHOLDER};
pub use store::ResultStore;
use routes::{DashboardTemplate, UploadTemplate};

use askama::Template;
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use solarlens_core::Analyzer;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Multipart field carrying the uploaded file
const UPLOAD_FIELD: &str = "csv_file";

/// Application state for web handlers
#[derive(Clone, Debug)]
pub struct WebState {
    analyzer: Arc<Analyzer>,
    store: Arc<ResultStore<DashboardView>>,
}

impl WebState {
    #[must_use]
    pub fn new(analyzer: Analyzer, settings: &ServerSettings) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            store: Arc::new(ResultStore::new(settings.max_pending_runs)),
        }
    }
}

#[derive(Debug, Error)]
enum UploadError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Only .csv files are accepted, got {0}")]
    NotCsv(String),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Multipart(err) => err.status(),
            Self::MissingFile | Self::EmptyFilename | Self::NotCsv(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Build the application router
pub fn router(state: WebState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/upload", get(upload_form_handler).post(upload_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server
///
/// # Errors
/// Returns error if server fails to bind or serve
pub async fn start_web_server(analyzer: Analyzer, settings: ServerSettings) -> std::io::Result<()> {
    let state = WebState::new(analyzer, &settings);
    let app = router(state, &settings);

    let addr = settings.socket_addr();
    info!("🌐 Starting web server on {addr}");
    info!("📤 Upload: http://localhost:{}/upload", settings.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

fn render_page(template: &impl Template) -> Html<String> {
    match template.render() {
        Ok(html) => Html(html),
        Err(e) => {
            error!("Template render error: {}", e);
            Html(format!(
                "<html><body><h1>Error</h1><p>Failed to render template: {e}</p></body></html>"
            ))
        }
    }
}

fn upload_failure(status: StatusCode, message: String) -> Response {
    let page = render_page(&UploadTemplate {
        error: Some(message),
    });
    (status, page).into_response()
}

async fn index_handler() -> Redirect {
    Redirect::to("/dashboard")
}

async fn upload_form_handler() -> Html<String> {
    render_page(&UploadTemplate::default())
}

fn has_csv_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

async fn read_csv_upload(multipart: &mut Multipart) -> Result<Bytes, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        if file_name.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !has_csv_extension(&file_name) {
            return Err(UploadError::NotCsv(file_name));
        }

        debug!(file = %file_name, "Reading uploaded CSV");
        return field.bytes().await.map_err(UploadError::from);
    }
    Err(UploadError::MissingFile)
}

/// Analyze an uploaded CSV and redirect to its dashboard
async fn upload_handler(State(state): State<WebState>, mut multipart: Multipart) -> Response {
    let upload = match read_csv_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return upload_failure(e.status(), e.to_string());
        }
    };

    let analyzer = Arc::clone(&state.analyzer);
    let outcome = tokio::task::spawn_blocking(move || {
        analyzer
            .run_csv(&upload[..])
            .map(|result| DashboardView::from_result(&result))
    })
    .await;

    match outcome {
        Ok(Ok(view)) => {
            let anomalies = view.anomalies.len();
            let id = state.store.insert(view);
            info!(run = %id, anomalies, "Upload analyzed");
            Redirect::to(&format!("/dashboard?run={id}")).into_response()
        }
        Ok(Err(err)) => {
            if let Some(validation) = err.as_validation() {
                warn!("Upload failed validation: {}", validation);
                upload_failure(StatusCode::BAD_REQUEST, validation.to_string())
            } else {
                error!("Failed to analyze upload: {}", err);
                upload_failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to analyze upload: {err}"),
                )
            }
        }
        Err(e) => {
            error!("Analysis task failed: {}", e);
            upload_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Analysis task failed".to_owned(),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    run: Option<String>,
}

/// Dashboard page, consuming the stored run when one is given
async fn dashboard_handler(
    State(state): State<WebState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let view = query
        .run
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .and_then(|id| state.store.take(&id));

    let template = match view {
        Some(view) => DashboardTemplate::with_view(view),
        None => {
            debug!("Dashboard requested without a pending run");
            DashboardTemplate::empty()
        }
    };
    render_page(&template)
}

/// Health check endpoint
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use solarlens_core::AnalysisConfig;
    use std::fmt::Write as _;
    use tower::ServiceExt;

    const BOUNDARY: &str = "solarlens-test-boundary";

    fn app() -> Router {
        let settings = ServerSettings::default();
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        router(WebState::new(analyzer, &settings), &settings)
    }

    fn spike_csv() -> String {
        let mut csv = "Timestamp,SolarGeneration,AirTemperature\n".to_owned();
        for hour in 0..24 {
            for minute in [0, 15, 30, 45] {
                writeln!(csv, "2023-01-06 {hour:02}:{minute:02}:00,150.0,12.5").unwrap();
            }
        }
        csv.push_str("2023-01-06 14:07:00,900.0,12.5\n");
        csv
    }

    fn upload_request(file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"csv_file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_csv_extension_check() {
        assert!(has_csv_extension("data.csv"));
        assert!(has_csv_extension("DATA.CSV"));
        assert!(!has_csv_extension("data.txt"));
        assert!(!has_csv_extension("csv"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_index_redirects_to_dashboard() {
        let response = app().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn test_dashboard_without_run_shows_placeholder() {
        let response = app().oneshot(get("/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(PLACEHOLDER));

        let response = app().oneshot(get("/dashboard?run=not-a-uuid")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_upload_form_renders() {
        let response = app().oneshot(get("/upload")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("name=\"csv_file\""));
    }

    #[tokio::test]
    async fn test_upload_then_view_once() {
        let app = app();
        let response = app
            .clone()
            .oneshot(upload_request("week.csv", &spike_csv()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_owned();
        assert!(location.starts_with("/dashboard?run="));

        let page = body_text(app.clone().oneshot(get(&location)).await.unwrap()).await;
        assert!(page.contains("<svg"));
        assert!(page.contains("2023-01-06 14:00:00"));
        assert!(page.contains("Solar Generation vs Air Temperature"));
        assert!(!page.contains(PLACEHOLDER));

        // consumed on first view
        let page = body_text(app.oneshot(get(&location)).await.unwrap()).await;
        assert!(page.contains(PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv() {
        let response = app()
            .oneshot(upload_request("week.txt", &spike_csv()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Only .csv files are accepted"));
    }

    #[tokio::test]
    async fn test_upload_missing_columns_is_bad_request() {
        let response = app()
            .oneshot(upload_request("week.csv", "Timestamp,Power\n2023-01-01 00:00:00,1\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            body_text(response)
                .await
                .contains("missing required columns in CSV: SolarGeneration")
        );
    }

    #[tokio::test]
    async fn test_upload_without_valid_rows_is_bad_request() {
        let response = app()
            .oneshot(upload_request(
                "week.csv",
                "Timestamp,SolarGeneration\nnot a date,1\n2023-01-01 00:00:00,\n",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("No file part"));
    }
}
