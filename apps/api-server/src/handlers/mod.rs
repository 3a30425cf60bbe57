//! HTTP handlers and route configuration.

mod completion;
mod health;

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use chatgate_core::DomainError;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // AI routes
                .service(web::scope("/ai").route(
                    "/create-chat-completion",
                    web::post().to(completion::create_chat_completion),
                )),
        );
}

/// A body that carries no JSON at all has no messages; only broken JSON is
/// reported as such.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    let rejection: AppError = match &err {
        JsonPayloadError::ContentType => DomainError::EmptyTranscript.into(),
        JsonPayloadError::Deserialize(e) if e.is_eof() && e.line() == 1 && e.column() == 0 => {
            DomainError::EmptyTranscript.into()
        }
        _ => AppError::BadRequest("Invalid request body".to_string()),
    };
    rejection.into()
}
