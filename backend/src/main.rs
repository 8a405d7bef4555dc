use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use log::info;

use loan_api::routes::{not_found, API_PREFIX};
use loan_api::{configure, AppState, Classifier, ForestPipeline, ReferenceDataset, ServiceConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting loan approval prediction API");

    let config = ServiceConfig::from_env().context("reading service configuration")?;

    let model = ForestPipeline::load(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    let model_info = model.info();
    info!(
        "Model {} v{} loaded: {} trees, classes {:?}",
        model_info.name, model_info.version, model_info.n_trees, model_info.classes
    );

    let dataset = ReferenceDataset::load(&config.data_path)
        .with_context(|| format!("loading dataset from {}", config.data_path.display()))?;
    info!(
        "Reference dataset loaded: {} rows from {}",
        dataset.len(),
        config.data_path.display()
    );

    let state = web::Data::new(AppState::new(Arc::new(model), Arc::new(dataset)));
    let bind_address = config.bind_address();

    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    info!("   GET  /                        - dataset preview");
    info!("   GET  {API_PREFIX}/model-info - model information");
    info!("   POST {API_PREFIX}/predict    - loan approval prediction");

    let cors_origins = config.cors_origins.clone();
    let json_limit = config.json_limit;

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure(json_limit))
            .default_service(web::route().to(not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("binding {bind_address}"))?
    .run()
    .await
    .context("server terminated")
}
