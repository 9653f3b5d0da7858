// web-server/src/main.rs
mod api;

use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use common::services::Services;
use common::{setup_tracing, Config};

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Level Uploader Web Server")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    setup_tracing();

    let config = Config::from_env();
    let server_addr = config.web_server_addr.clone();

    let services = Services::from_config(&config);

    // Load the descriptor and persist the merged session before serving
    if let Err(e) = services.accounts.initialize().await {
        tracing::error!("Could not initialize session: {}", e);
    }
    let summary = services.accounts.summary();
    tracing::info!("Session owner: {}, token: {}", summary.username, summary.token);

    tracing::info!("Starting Web Server on {}", server_addr);

    let services_data = web::Data::new(services);

    HttpServer::new(move || {
        App::new()
            .app_data(services_data.clone())
            .service(index)
            .configure(api::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use common::config::SessionConfig;
    use common::descriptor::{DescriptorCache, ServiceDescriptor};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn services(dir: &tempfile::TempDir, level_server_url: &str) -> Services {
        let config = Config {
            identity_base_url: "http://127.0.0.1:1".to_string(),
            session: SessionConfig {
                path: dir.path().join("session.json").display().to_string(),
            },
            ..Config::default()
        };
        let descriptors = Arc::new(DescriptorCache::ready(ServiceDescriptor {
            api_key: "k1".to_string(),
            level_server_url: level_server_url.to_string(),
        }));
        Services::with_descriptors(&config, common::HttpClient::new(), descriptors)
    }

    #[actix_web::test]
    async fn test_session_summary_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(services(&dir, "https://levels.example.com")))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/session").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["session"]["username"], "<none>");
        assert_eq!(body["session"]["server"], "https://levels.example.com");
        assert_eq!(body["session"]["api_key"], "configured");
    }

    #[actix_web::test]
    async fn test_sign_in_validation_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(services(&dir, "")))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/account/sign-in")
            .set_json(json!({ "email": "a@x.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Sign in requires email + password.");
    }

    #[actix_web::test]
    async fn test_upload_without_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(services(&dir, "")))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/levels")
            .set_json(json!({ "author": "carol", "data": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Base URL is required.");
    }

    #[actix_web::test]
    async fn test_sign_out_keeps_username() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("session.json"),
            r#"{"email":"a@x.com","idToken":"tok","ownerUsername":"Alice"}"#,
        )
        .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(services(&dir, "")))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/account/sign-out").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["message"], "Signed out locally.");
        assert_eq!(body["session"]["username"], "Alice");
        assert_eq!(body["session"]["token"], "<none>");
        assert_eq!(body["session"]["email"], "<none>");
    }
}
