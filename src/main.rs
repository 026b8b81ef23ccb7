use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use maplem_viewer::config::CONFIG;
use maplem_viewer::routes;
use maplem_viewer::services::{CharacterFetcher, NexonService, SnapshotCodec, ViewerController};
use maplem_viewer::utils::icon::IconResolver;
use maplem_viewer::ApiDoc;

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env 로드
    dotenv().ok();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // API 키가 없으면 시작하지 않는다
    let nexon = NexonService::new(&CONFIG).map_err(|e| {
        log::error!("{e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let codec = SnapshotCodec::new(IconResolver::new(CONFIG.icon_prefix.clone()));
    let fetcher: Arc<dyn CharacterFetcher> = Arc::new(nexon);
    let fetcher_data: web::Data<dyn CharacterFetcher> = web::Data::from(fetcher.clone());
    let codec_data = web::Data::new(codec.clone());
    let viewer_data = web::Data::new(ViewerController::new(fetcher, codec));

    let host = CONFIG.host.clone();
    let port = CONFIG.port;
    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("API 문서: http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(fetcher_data.clone())
            .app_data(codec_data.clone())
            .app_data(viewer_data.clone())
            .wrap(middleware::Logger::default())
            .wrap(build_cors(&CONFIG.cors_allowed_origins))
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
