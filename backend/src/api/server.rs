//! HTTP server for the validation dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/headers`    | Header pre-check of an uploaded CSV      |
//! | POST   | `/api/validate`   | Full validation run (`file`, `companyId`)|
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |
//!
//! Runs for the same company identifier are serialized: a second upload
//! waits until the first has finished with the output directory.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, HeaderCheckResponse, ValidateResponse};
use crate::config::Settings;
use crate::error::{RunError, ServerError};
use crate::headers::precheck_headers;
use crate::parser::parse_bytes_auto;
use crate::pipeline::{run_validation_bytes, RunOptions};

type ApiError = (StatusCode, Json<Value>);

/// One async lock per company identifier.
#[derive(Default)]
pub struct CompanyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CompanyLocks {
    /// Wait for exclusive use of a company's output directory.
    pub async fn acquire(&self, company_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(company_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Give the directory back. The entry is dropped once no other upload
    /// is waiting on it, so the map only holds companies with runs in flight.
    pub async fn release(&self, company_id: &str, guard: OwnedMutexGuard<()>) {
        let mut locks = self.locks.lock().await;
        drop(guard);
        if locks
            .get(company_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(company_id);
        }
    }

    /// Number of company identifiers currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
    locks: Arc<CompanyLocks>,
}

/// Build the API router.
pub fn router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let body_limit = DefaultBodyLimit::max(settings.max_upload_bytes);
    let state = AppState {
        settings: Arc::new(settings),
        locks: Arc::new(CompanyLocks::default()),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/headers", post(check_headers))
        .route("/api/validate", post(validate_upload))
        .route("/api/logs", get(sse_logs))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let port = settings.port;
    let output_root = settings.output_root.display().to_string();
    let app = router(settings);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Subscriber validation server running on http://localhost:{}", port);
    println!("   POST /api/headers  - Header pre-check");
    println!("   POST /api/validate - Validate CSV (file, companyId)");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");
    println!();
    println!("📁 Output root: {}", output_root);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "subval",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "headers": "POST /api/headers",
            "validate": "POST /api/validate",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the missed entries
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Uploads
// =============================================================================

#[derive(Debug, Default)]
struct Upload {
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    company_id: Option<String>,
}

impl Upload {
    /// The uploaded CSV, rejecting missing files and non-CSV names.
    fn csv(&mut self) -> Result<(String, Vec<u8>), ServerError> {
        let bytes = self
            .bytes
            .take()
            .ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
        let name = self.file_name.take().unwrap_or_default();
        ensure_csv_name(&name)?;
        Ok((name, bytes))
    }
}

fn ensure_csv_name(name: &str) -> Result<(), ServerError> {
    let is_csv = std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(ServerError::BadRequest("File must be a CSV".to_string()))
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ServerError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                upload.bytes = Some(bytes.to_vec());
            }
            "companyId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                upload.company_id = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    Ok(upload)
}

/// HTTP status for a failed request.
fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Run(run) => match run {
            RunError::InvalidCompanyId(_) | RunError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
            RunError::Csv(_) | RunError::Header(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RunError::InputNotFound(_) | RunError::OutputDir { .. } | RunError::Report(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

fn reject(err: ServerError) -> ApiError {
    let message = match &err {
        ServerError::Run(run) => run.to_string(),
        ServerError::BadRequest(msg) | ServerError::Internal(msg) => msg.clone(),
    };
    log_error(&message);
    (status_for(&err), Json(error_response(&message)))
}

/// Header pre-check endpoint
async fn check_headers(multipart: Multipart) -> Result<Json<HeaderCheckResponse>, ApiError> {
    let mut upload = read_upload(multipart).await.map_err(reject)?;
    let (name, bytes) = upload.csv().map_err(reject)?;

    log_info(format!("🔎 Header check: {} ({} bytes)", name, bytes.len()));
    let parsed = parse_bytes_auto(&bytes)
        .map_err(|e| reject(ServerError::Run(RunError::Csv(e))))?;
    let issues = precheck_headers(&parsed.headers);

    Ok(Json(HeaderCheckResponse::new(Some(name), parsed.headers, issues)))
}

/// Full validation endpoint
async fn validate_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ValidateResponse>, ApiError> {
    let mut upload = read_upload(multipart).await.map_err(reject)?;
    let (name, bytes) = upload.csv().map_err(reject)?;
    let company_id = upload
        .company_id
        .take()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| reject(ServerError::BadRequest("No companyId provided".to_string())))?;

    println!("\n{}", "=".repeat(70));
    log_info(format!("📄 NEW UPLOAD: {} ({} bytes) for {}", name, bytes.len(), company_id));
    println!("{}\n", "=".repeat(70));

    let guard = state.locks.acquire(&company_id).await;
    let options = RunOptions::from(state.settings.as_ref());

    let run_id = company_id.clone();
    let joined = tokio::task::spawn_blocking(move || {
        run_validation_bytes(&name, &bytes, &run_id, &options)
    })
    .await;
    state.locks.release(&company_id, guard).await;

    let outcome = joined
        .map_err(|e| reject(ServerError::Internal(e.to_string())))?
        .map_err(|e| reject(ServerError::Run(e)))?;

    Ok(Json(ValidateResponse::from(&outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, HeaderError};

    #[test]
    fn test_csv_name_check() {
        assert!(ensure_csv_name("subs.csv").is_ok());
        assert!(ensure_csv_name("SUBS.CSV").is_ok());
        let err = ensure_csv_name("subs.xlsx").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: File must be a CSV");
        assert!(ensure_csv_name("").is_err());
    }

    #[test]
    fn test_upload_without_file() {
        let mut upload = Upload::default();
        assert!(matches!(upload.csv(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_status_mapping() {
        let header = ServerError::Run(RunError::Header(HeaderError::MissingColumns(vec!["zip".into()])));
        assert_eq!(status_for(&header), StatusCode::UNPROCESSABLE_ENTITY);

        let csv = ServerError::Run(RunError::Csv(CsvError::EmptyFile));
        assert_eq!(status_for(&csv), StatusCode::UNPROCESSABLE_ENTITY);

        let id = ServerError::Run(RunError::InvalidCompanyId("..".into()));
        assert_eq!(status_for(&id), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_company_locks_are_per_identifier() {
        let locks = CompanyLocks::default();
        let acme = locks.acquire("ACME").await;

        // Another company is not blocked
        let _other = locks.acquire("GLOBEX").await;

        // The same company is
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ACME")).await;
        assert!(blocked.is_err());

        drop(acme);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ACME")).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_released_company_is_forgotten() {
        let locks = CompanyLocks::default();
        let acme = locks.acquire("ACME").await;
        assert_eq!(locks.tracked().await, 1);

        locks.release("ACME", acme).await;
        assert_eq!(locks.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_release_keeps_lock_while_another_upload_waits() {
        let locks = Arc::new(CompanyLocks::default());
        let first = locks.acquire("ACME").await;

        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        let waiter = tokio::spawn({
            let locks = Arc::clone(&locks);
            async move {
                let guard = locks.acquire("ACME").await;
                let _ = done_rx.await;
                locks.release("ACME", guard).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The waiter now owns the directory; a third upload must queue behind it
        locks.release("ACME", first).await;
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire("ACME")).await;
        assert!(third.is_err());

        done_tx.send(()).unwrap();
        waiter.await.unwrap();
        assert_eq!(locks.tracked().await, 0);
    }
}
