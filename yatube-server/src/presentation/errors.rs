use crate::domain::DomainError;
use crate::presentation::identity::viewer_of;
use crate::presentation::views::not_found_response;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, ResponseError};

// Преобразование DomainError в HttpResponse
impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.to_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match status.as_u16() {
            // Страницу рисует not_found_pages, ей нужен запрос
            404 => HttpResponse::NotFound().finish(),
            400 | 401 | 403 | 409 => HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(self.to_string()),
            _ => {
                tracing::error!("Request failed: {}", self);
                HttpResponse::InternalServerError()
                    .content_type(ContentType::plaintext())
                    .body("Internal server error")
            }
        }
    }
}

/// Renders every 404 leaving the app as `core/404.html` for the requested path.
///
/// Covers missing objects, unmatched routes and unparsable path segments alike.
pub fn not_found_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::NOT_FOUND, render_not_found)
}

fn render_not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let viewer = viewer_of(res.request());
    let path = res.request().path().to_string();

    tracing::debug!("Rendering not found page for {}", path);

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, not_found_response(viewer, Some(path)));
    Ok(ErrorHandlerResponse::Response(res.map_into_right_body()))
}
