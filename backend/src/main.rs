mod config;
mod detection;
mod narrative;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use detection::{LeafClassifier, SimulatedClassifier};
use narrative::{GeminiNarrativeGenerator, NarrativeGenerator, PromptTemplates, UnconfiguredNarrativeGenerator};
use routes::configure_routes;
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let prompts = PromptTemplates::load(config.prompts_path.as_deref()).map_err(|e| {
        log::error!("Failed to load prompt templates: {}", e);
        std::io::Error::other(format!("Prompt loading failed: {}", e))
    })?;

    let classifier: Arc<dyn LeafClassifier> = Arc::new(SimulatedClassifier::new(config.detection_latency));
    log::info!(
        "Using {} leaf classifier ({} ms latency)",
        classifier.name(),
        config.detection_latency.as_millis()
    );

    let generator: Arc<dyn NarrativeGenerator> = match &config.gemini {
        Some(gemini) => match GeminiNarrativeGenerator::new(gemini, prompts, config.bilingual) {
            Ok(generator) => Arc::new(generator),
            Err(e) => {
                log::error!("Failed to initialise Gemini client: {}", e);
                return Err(std::io::Error::other(format!("Gemini setup failed: {}", e)));
            }
        },
        None => {
            log::warn!("GEMINI_API_KEY is not set. Disease summaries and care suggestions will be unavailable.");
            Arc::new(UnconfiguredNarrativeGenerator)
        }
    };

    let frontend_dir = config.frontend_dir.display().to_string();
    let bind_address = config.bind_address();

    log::info!("Serving frontend from {}", frontend_dir);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::from(classifier.clone()))
            .app_data(web::Data::from(generator.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
