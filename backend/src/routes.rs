use std::sync::Arc;

use actix_web::{error::JsonPayloadError, get, post, web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::Value;

use crate::dataset::ReferenceDataset;
use crate::error::ApiError;
use crate::inference::{predict_application, Classifier};
use crate::models::ErrorResponse;
use crate::validation::validate_application;

pub const API_PREFIX: &str = "/api/loan/v1";
pub const PREVIEW_ROWS: usize = 5;

/// Process-wide read-only state, built once before the server binds.
pub struct AppState {
    pub model: Arc<dyn Classifier>,
    pub dataset: Arc<ReferenceDataset>,
}

impl AppState {
    pub fn new(model: Arc<dyn Classifier>, dataset: Arc<ReferenceDataset>) -> Self {
        AppState { model, dataset }
    }
}

#[get("/")]
pub async fn preview(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.dataset.head(PREVIEW_ROWS))
}

#[get("/model-info")]
pub async fn model_info(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.model.info())
}

#[post("/predict")]
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let application = validate_application(&body).map_err(|err| {
        warn!("rejected application: {:?}", err.fields());
        err
    })?;

    let model = Arc::clone(&state.model);
    let result = web::block(move || predict_application(&*model, &application))
        .await
        .map_err(|e| {
            error!("blocking inference task failed: {e}");
            ApiError::Blocking(e.to_string())
        })?
        .map_err(|e| {
            error!("inference failed: {e}");
            ApiError::from(e)
        })?;

    info!(
        "prediction: approved={} probability={:.3}",
        result.approved, result.probability
    );
    Ok(HttpResponse::Ok().json(result))
}

/// Unparseable bodies get the same 422 envelope as field violations.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("unreadable request body: {err}");
    ApiError::MalformedBody(err.to_string()).into()
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new("endpoint not found"))
}

/// Registers every route with its extractor configuration. Shared by the
/// binary and the HTTP tests; the 404 fallback is set on the `App` itself.
pub fn configure(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(json_limit)
                .content_type_required(false)
                .error_handler(json_error_handler),
        )
        .service(preview)
        .service(web::scope(API_PREFIX).service(predict).service(model_info));
    }
}
