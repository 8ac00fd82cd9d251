use crate::presentation::{auth_handlers, http_handlers};
use actix_web::{error, web};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Нечисловой {post_id} - это 404, страницу рисует errors::not_found_pages
        .app_data(web::PathConfig::default().error_handler(|err, req| {
            tracing::debug!("Unparsable path {}: {}", req.path(), err);
            error::ErrorNotFound(err)
        }))
        // Public routes - listings and detail
        .route("/", web::get().to(http_handlers::index))
        .route("/group/{slug}/", web::get().to(http_handlers::group_posts))
        .route("/profile/{username}/", web::get().to(http_handlers::profile))
        .route("/posts/{post_id}/", web::get().to(http_handlers::post_detail))
        // Login required - create and edit
        .service(
            web::resource("/create/")
                .route(web::get().to(http_handlers::post_create_form))
                .route(web::post().to(http_handlers::post_create)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(http_handlers::post_edit_form))
                .route(web::post().to(http_handlers::post_edit)),
        )
        // Authentication
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth_handlers::signup_form))
                        .route(web::post().to(auth_handlers::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth_handlers::login_form))
                        .route(web::post().to(auth_handlers::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth_handlers::logout))
                        .route(web::post().to(auth_handlers::logout)),
                ),
        )
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(http_handlers::about_author))
                .route("/tech/", web::get().to(http_handlers::about_tech)),
        )
        .default_service(web::to(http_handlers::not_found));
}
