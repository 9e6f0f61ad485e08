/// HLS Service - HTTP Server
///
/// Uploads files to S3, transcodes uploaded videos into HLS with ffmpeg
/// and serves playlists, segments and a small web UI.
use actix_web::{web, App, HttpServer};
use hls_service::db::{DocumentStore, MongoStore};
use hls_service::handlers::{self, UploadHandler, VideoHandler};
use hls_service::services::FfmpegTranscoder;
use hls_service::Config;
use s3_utils::S3Client;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    tracing::error!("{context}: {err}");
    io::Error::other(format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    tracing::info!("Starting hls-service v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.video.output_dir)
        .await
        .map_err(|e| {
            startup_error(
                &format!(
                    "Failed to create output directory {}",
                    config.video.output_dir.display()
                ),
                e,
            )
        })?;

    let objects = S3Client::connect(config.s3.clone())
        .await
        .map_err(|e| startup_error("Failed to initialize S3 client", e))?;

    let documents: Arc<dyn DocumentStore> = Arc::new(
        MongoStore::connect(
            &config.mongo.uri,
            &config.mongo.database,
            &config.mongo.default_collection,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to MongoDB", e))?,
    );

    let transcoder = FfmpegTranscoder::new(
        config.video.ffmpeg_path.clone(),
        config.video.max_concurrent_transcodes,
    );

    let upload_handler = web::Data::new(UploadHandler::new(
        Arc::new(objects),
        documents.clone(),
        config.video.max_upload_bytes,
    ));
    let video_handler = web::Data::new(VideoHandler::new(
        Arc::new(transcoder),
        documents.clone(),
        config.video.output_dir.clone(),
        config.video.max_upload_bytes,
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("HTTP server listening on {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(handlers::configure_routes(
                upload_handler.clone(),
                video_handler.clone(),
            ))
            .default_service(web::to(handlers::not_found))
    })
    .bind(&bind_address);

    let result = match server {
        Ok(server) => server.run().await,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", bind_address, e);
            Err(e)
        }
    };

    tracing::info!("hls-service shutting down");
    documents.close().await;

    result
}
