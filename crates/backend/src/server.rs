//! # HTTP Classification Server
//!
//! hyper server exposing the prediction page and the operational endpoints.
//!
//! ## Endpoints
//!
//! - `GET /`, `/index.html`: landing page
//! - `GET /prediction.html`, `/result`: upload form
//! - `POST /result`: classify the multipart field `image`; always 200
//! - `GET /logout.html`: logout page
//! - `GET /health`: `{"status","model_loaded","model_type"}` JSON
//! - `GET /metrics`: metrics snapshot JSON (when enabled)

use crate::config::BackendConfig;
use crate::health::HealthResponse;
use crate::page;
use harvest_inference::{InferenceError, InferenceService};
use harvest_shared::{HarvestError, MetricsCollector, Result};
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{Method, StatusCode};
use hyper::body::Bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const NO_FILE_MESSAGE: &str = "⚠️ No image file uploaded!";
const NO_SELECTION_MESSAGE: &str = "⚠️ No image selected!";

/// State shared by every connection
struct AppState {
    service: Arc<InferenceService>,
    metrics: Arc<MetricsCollector>,
    max_upload_bytes: u64,
    enable_metrics: bool,
}

/// HTTP server in front of an [`InferenceService`]
pub struct ClassifierServer {
    state: Arc<AppState>,
    listen_addr: SocketAddr,
}

impl ClassifierServer {
    /// Creates a server for `service` using the listener and upload settings
    /// in `config`
    pub fn new(service: Arc<InferenceService>, config: &BackendConfig) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                metrics: Arc::new(MetricsCollector::new()),
                max_upload_bytes: config.max_upload_bytes,
                enable_metrics: config.enable_metrics,
            }),
            listen_addr: config.listen_addr,
        }
    }

    /// Shared metrics collector updated by `POST /result`
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.state.metrics)
    }

    /// Configured listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Serves until Ctrl-C
    pub async fn start(self) -> Result<()> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received, stopping backend server");
        })
        .await
    }

    /// Serves until `signal` completes, then drains open connections
    #[instrument(skip_all, fields(listen_addr = %self.listen_addr))]
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let state = Arc::clone(&self.state);
        let make_svc = make_service_fn(move |_conn| {
            let state = Arc::clone(&state);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    handle_request(req, Arc::clone(&state))
                }))
            }
        });

        let server = match Server::try_bind(&self.listen_addr) {
            Ok(builder) => builder.serve(make_svc).with_graceful_shutdown(signal),
            Err(e) => {
                error!(error = %e, listen_addr = %self.listen_addr, "Failed to bind to address");
                return Err(HarvestError::network(
                    self.listen_addr.to_string(),
                    "Failed to bind to address",
                    Some(Box::new(e)),
                ));
            }
        };

        let health = self.state.service.health();
        info!(
            listen_addr = %self.listen_addr,
            model_loaded = health.ready,
            model_type = health.backend_name(),
            "Harvest backend listening"
        );

        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
            return Err(HarvestError::network(
                self.listen_addr.to_string(),
                "HTTP server error",
                Some(Box::new(e)),
            ));
        }

        info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for ClassifierServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierServer")
            .field("listen_addr", &self.listen_addr)
            .field("max_upload_bytes", &self.state.max_upload_bytes)
            .field("enable_metrics", &self.state.enable_metrics)
            .finish_non_exhaustive()
    }
}

#[instrument(skip_all, fields(method = ?req.method(), path = req.uri().path()))]
async fn handle_request(
    req: Request<Body>,
    state: Arc<AppState>,
) -> std::result::Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!(method = %method, path = %path, "Processing request");

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/" | "/index.html") => html_response(page::render_index()),
        (&Method::GET, "/prediction.html" | "/result") => {
            html_response(page::render_prediction(None))
        }
        (&Method::GET, "/logout.html") => html_response(page::render_logout()),
        (&Method::POST, "/result") => {
            let message = handle_prediction(req, &state).await;
            html_response(page::render_prediction(Some(&message)))
        }
        (&Method::GET, "/health") => {
            json_response(&HealthResponse::from(state.service.health()))
        }
        (&Method::GET, "/metrics") if state.enable_metrics => {
            json_response(&state.metrics.snapshot())
        }
        _ => {
            warn!(method = %method, path = %path, "Request to unknown endpoint");
            text_response(StatusCode::NOT_FOUND, "Not Found")
        }
    };

    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Request completed"
    );

    Ok(response)
}

/// What the multipart body held under the `image` field
#[derive(Debug)]
enum Upload {
    /// A file part with a non-empty file name
    File { file_name: String, data: Bytes },
    /// A file part submitted without choosing a file
    Unselected,
    /// No usable `image` file part
    Missing,
    /// The body exceeded the configured size limit
    TooLarge,
}

/// Runs the upload checks and the prediction, returning the text to render
async fn handle_prediction(req: Request<Body>, state: &AppState) -> String {
    let _active = state.metrics.record_request();

    if !state.service.health().ready {
        state.metrics.record_error();
        return InferenceError::ModelUnavailable.user_message();
    }

    let (file_name, data) = match read_upload(req, state.max_upload_bytes).await {
        Upload::File { file_name, data } => (file_name, data),
        Upload::Unselected => {
            state.metrics.record_error();
            return NO_SELECTION_MESSAGE.to_string();
        }
        Upload::Missing => {
            state.metrics.record_error();
            return NO_FILE_MESSAGE.to_string();
        }
        Upload::TooLarge => {
            state.metrics.record_error();
            return format!(
                "❌ Error: Image exceeds the {} byte upload limit",
                state.max_upload_bytes
            );
        }
    };

    debug!(file_name = %file_name, bytes = data.len(), "Received upload");

    let service = Arc::clone(&state.service);
    let outcome = tokio::task::spawn_blocking(move || service.predict(&data)).await;

    match outcome {
        Ok(Ok(prediction)) => {
            info!(
                file_name = %file_name,
                label = %prediction.label,
                model_type = %prediction.backend_kind,
                elapsed_ms = prediction.elapsed.as_secs_f64() * 1000.0,
                "Prediction served"
            );
            state.metrics.record_prediction(prediction.elapsed);
            prediction.label
        }
        Ok(Err(e)) => {
            if e.is_request_error() {
                warn!(file_name = %file_name, error = %e, "Prediction failed");
            } else {
                error!(file_name = %file_name, error = %e, "Prediction failed");
            }
            state.metrics.record_error();
            e.user_message()
        }
        Err(e) => {
            error!(error = %e, "Prediction task panicked");
            state.metrics.record_error();
            InferenceError::inference_failure(e).user_message()
        }
    }
}

/// Extracts the `image` file part from a multipart request
async fn read_upload(req: Request<Body>, max_upload_bytes: u64) -> Upload {
    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok());

    let Some(boundary) = boundary else {
        debug!("Upload is not multipart/form-data");
        return Upload::Missing;
    };

    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().whole_stream(max_upload_bytes));
    let mut multipart = multer::Multipart::with_constraints(req.into_body(), boundary, constraints);

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Upload::Missing,
            Err(e) => return upload_error(&e),
        };

        if field.name() != Some("image") {
            continue;
        }

        // A part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            debug!("Skipping non-file image part");
            continue;
        };
        if file_name.is_empty() {
            return Upload::Unselected;
        }

        return match field.bytes().await {
            Ok(data) => Upload::File { file_name, data },
            Err(e) => upload_error(&e),
        };
    }
}

fn upload_error(e: &multer::Error) -> Upload {
    if exceeds_size_limit(e) {
        warn!(error = %e, "Upload rejected by size limit");
        Upload::TooLarge
    } else {
        warn!(error = %e, "Malformed multipart upload");
        Upload::Missing
    }
}

/// multer reports a limit hit while reading as `StreamReadFailed` wrapping
/// the size error
fn exceeds_size_limit(e: &multer::Error) -> bool {
    match e {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => true,
        multer::Error::StreamReadFailed(inner) => inner
            .downcast_ref::<multer::Error>()
            .is_some_and(exceeds_size_limit),
        _ => false,
    }
}

fn html_response(body: String) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to build page response");
            Response::new(Body::empty())
        })
}

fn json_response<T: Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_string(value) {
        Ok(json) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .body(Body::from(json))
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build JSON response");
                Response::new(Body::empty())
            }),
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
