use std::time::Instant;

use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::dev::{ServiceRequest, ServiceResponse, fn_service};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde_json::json;
use shared::intake::{MAX_UPLOAD_BYTES, validate_asset};
use shared::{
    AnalyzeRequest, AnalyzeResponse, CareSuggestionsRequest, DiseaseSummaryRequest, ErrorResponse, ImageAsset,
    ImageSource, IntakeError, NarrativeError, SessionError,
};
use thiserror::Error;
use uuid::Uuid;

use crate::detection::{LeafClassifier, analyze};
use crate::narrative::NarrativeGenerator;

/// Base64 inflates a payload by 4/3; leave headroom for the JSON envelope.
const JSON_BODY_LIMIT: usize = (MAX_UPLOAD_BYTES as usize) * 3 / 2;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Narrative(#[from] NarrativeError),
    #[error("{0}")]
    BadRequest(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Intake(IntakeError::FileTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Intake(IntakeError::InvalidType { .. }) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Intake(_) | ApiError::Session(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Narrative(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Intake(e) => ErrorResponse::from_error(e),
            ApiError::Session(e) => ErrorResponse::from_error(e),
            ApiError::Narrative(e) => ErrorResponse::from_error(e),
            ApiError::BadRequest(message) => ErrorResponse {
                error: message.clone(),
                code: "BadRequest".into(),
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    configure_api(cfg);

    let index_path = format!("{}/index.html", frontend_dir);
    cfg.service(
        Files::new("/", frontend_dir)
            .index_file("index.html")
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index_path = index_path.clone();
                async move {
                    let (req, _) = req.into_parts();
                    let file = NamedFile::open_async(&index_path).await?;
                    let res = file.into_response(&req);
                    Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
                }
            })),
    );
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/api/analyze").route(web::post().to(handle_analyze)))
        .service(web::resource("/api/analyze/upload").route(web::post().to(handle_analyze_upload)))
        .service(web::resource("/api/narrative/disease-summary").route(web::post().to(handle_disease_summary)))
        .service(
            web::resource("/api/narrative/preventative-measures").route(web::post().to(handle_preventative_measures)),
        )
        .service(web::resource("/api/health").route(web::get().to(health)));
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            warn!("Rejected JSON body: {}", err);
            let response = match &err {
                JsonPayloadError::Overflow { limit } | JsonPayloadError::OverflowKnownLength { limit, .. } => {
                    ApiError::Intake(IntakeError::FileTooLarge { size: *limit as u64 }).error_response()
                }
                other => ApiError::BadRequest(other.to_string()).error_response(),
            };
            InternalError::from_response(err, response).into()
        })
}

async fn handle_analyze(
    classifier: web::Data<dyn LeafClassifier>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let image = if request.image_data.trim().is_empty() {
        None
    } else {
        let asset = ImageAsset::from_encoded(&request.mime_type, &request.image_data, request.source)?;
        check_image(&asset)?;
        Some(asset)
    };

    run_analysis(classifier.get_ref(), image.as_ref()).await
}

async fn handle_analyze_upload(
    classifier: web::Data<dyn LeafClassifier>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut image = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if (image_data.len() + data.len()) as u64 > MAX_UPLOAD_BYTES {
                return Err(IntakeError::FileTooLarge {
                    size: (image_data.len() + data.len()) as u64,
                }
                .into());
            }
            image_data.extend_from_slice(&data);
        }

        if !image_data.is_empty() {
            let asset = ImageAsset::from_bytes(&mime_type, &image_data, ImageSource::Uploaded)?;
            check_image(&asset)?;
            image = Some(asset);
        }
    }

    run_analysis(classifier.get_ref(), image.as_ref()).await
}

async fn run_analysis(classifier: &dyn LeafClassifier, image: Option<&ImageAsset>) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let classification = analyze(classifier, image).await?;

    let response = AnalyzeResponse {
        request_id: Uuid::new_v4().to_string(),
        classification,
        analyzed_at: chrono::Utc::now().to_rfc3339(),
        latency_ms: started.elapsed().as_millis() as u64,
    };
    info!("Analysis {} finished in {} ms", response.request_id, response.latency_ms);
    Ok(HttpResponse::Ok().json(response))
}

/// Checks declared limits and sniffs the bytes, so a renamed non-image is refused.
fn check_image(asset: &ImageAsset) -> Result<(), IntakeError> {
    validate_asset(asset)?;
    let bytes = asset.decode()?;
    image::guess_format(&bytes).map_err(|_| IntakeError::InvalidType {
        mime_type: asset.mime_type.clone(),
    })?;
    Ok(())
}

async fn handle_disease_summary(
    generator: web::Data<dyn NarrativeGenerator>,
    body: web::Json<DiseaseSummaryRequest>,
) -> Result<HttpResponse, ApiError> {
    let disease = body.into_inner().disease_name;
    info!("Generating summary for {}", disease);

    match generator.describe_disease(disease).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e) => {
            error!("Summary generation failed: {}", e);
            Err(e.into())
        }
    }
}

async fn handle_preventative_measures(
    generator: web::Data<dyn NarrativeGenerator>,
    body: web::Json<CareSuggestionsRequest>,
) -> Result<HttpResponse, ApiError> {
    let plant_type = body.into_inner().plant_type;
    let plant_type = plant_type.trim();
    if plant_type.is_empty() {
        return Err(ApiError::BadRequest("plantType must not be empty".into()));
    }
    info!("Generating preventative measures for {}", plant_type);

    match generator.suggest_care(plant_type).await {
        Ok(suggestions) => Ok(HttpResponse::Ok().json(suggestions)),
        Err(e) => {
            error!("Preventative measures generation failed: {}", e);
            Err(e.into())
        }
    }
}

async fn health(generator: web::Data<dyn NarrativeGenerator>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "narrativeConfigured": generator.is_configured(),
    }))
}
