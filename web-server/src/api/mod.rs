// web-server/src/api/mod.rs
pub mod account;
pub mod error;
pub mod levels;

use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Level Uploader API",
        "version": env!("CARGO_PKG_VERSION"),
        "key_format": "username-levelname",
    }))
}

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api")
            .service(api_index)
            .service(account::session_summary)
            .service(account::create_account)
            .service(account::sign_in)
            .service(account::sign_out)
            .service(account::change_username)
            .service(account::change_password)
            .service(levels::upload_level)
            .service(levels::list_levels)
    );
}
