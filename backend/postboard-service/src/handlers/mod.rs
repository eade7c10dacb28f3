/// HTTP handlers
///
/// Thin adapters: extract identity and input, call one service operation,
/// serialize the result. Errors map to responses through `ServiceError`.
pub mod comments;
pub mod health;
pub mod likes;
pub mod multipart;
pub mod posts;
pub mod profiles;

use actix_web::web;

/// Register every route on an actix `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/ready", web::get().to(health::ready))
        .route("/metrics", web::get().to(health::metrics))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/posts")
                        .service(
                            web::resource("")
                                .route(web::get().to(posts::list_posts))
                                .route(web::post().to(posts::create_post)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(posts::get_post))
                                .route(web::put().to(posts::update_post))
                                .route(web::delete().to(posts::delete_post)),
                        )
                        .route("/{id}/like", web::post().to(likes::toggle_like))
                        .service(
                            web::resource("/{id}/comments")
                                .route(web::get().to(comments::get_thread))
                                .route(web::post().to(comments::create_comment)),
                        ),
                )
                .service(
                    web::resource("/comments/{id}")
                        .route(web::put().to(comments::update_comment))
                        .route(web::delete().to(comments::delete_comment)),
                )
                .route("/profile", web::put().to(profiles::update_profile))
                .route("/profile/{user_id}", web::get().to(profiles::get_profile)),
        );
}
