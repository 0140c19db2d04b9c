//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(web::scope("/auth").route("/login", web::post().to(auth::login)))
            // Blog routes; fixed segments before `{slug}`
            .service(
                web::scope("/blog")
                    .route("", web::get().to(blog::list_posts))
                    .route("", web::post().to(blog::create_post))
                    .route("/categories", web::get().to(blog::list_categories))
                    .route("/tags", web::get().to(blog::list_tags))
                    .route("/preview", web::post().to(blog::preview))
                    .route("/{slug}", web::get().to(blog::get_post))
                    .route("/{slug}", web::put().to(blog::update_post))
                    .route("/{slug}", web::delete().to(blog::delete_post))
                    .route("/{slug}/publish", web::post().to(blog::publish_post)),
            ),
    );
}
