/// HTTP handlers for hls-service
///
/// - Uploads: generic files into the object store, presigned downloads
/// - Videos: upload with HLS transcoding, playlist/segment serving, pages
pub mod multipart;
pub mod uploads;
pub mod videos;

use actix_files::Files;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::AppError;
use crate::pages;

pub use uploads::{presign_file, upload_file, UploadHandler};
pub use videos::{load_video, serve_hls, upload_video, video_list, video_player, VideoHandler};

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed(format!(
        "{} is not supported on {}",
        req.method(),
        req.path()
    )))
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("no route for {}", req.path())))
}

/// Register every route. The handlers are shared across workers.
pub fn configure_routes(
    upload: web::Data<UploadHandler>,
    video: web::Data<VideoHandler>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let output_dir = video.output_dir().to_path_buf();

        cfg.app_data(upload)
            .app_data(video)
            .route("/health", web::get().to(health))
            .service(
                web::resource("/")
                    .route(web::get().to(pages::home))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/upload")
                    .route(web::post().to(upload_file))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/upload-video")
                    .route(web::post().to(upload_video))
                    .default_service(web::to(method_not_allowed)),
            )
            .route("/hls/{path:.*}", web::get().to(serve_hls))
            .route("/video-player", web::get().to(video_player))
            .route("/video-list", web::get().to(video_list))
            .route("/load-video", web::get().to(load_video))
            .route("/files/presign", web::get().to(presign_file))
            .service(Files::new("/segments", output_dir));
    }
}
