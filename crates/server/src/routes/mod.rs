use actix_web::web;

pub mod summarize;
pub mod system;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(summarize::index)
        .service(summarize::summarize_page)
        .service(summarize::summarize_api)
        .service(system::health);
}
