// web-server/src/api/levels.rs
use actix_web::{get, post, web, HttpResponse};
use common::levels::{ListRequest, UploadRequest};
use common::services::Services;
use serde_json::json;

use super::error::{ApiError, Context};

#[post("/levels")]
pub async fn upload_level(
    services: web::Data<Services>,
    form: web::Json<UploadRequest>,
) -> Result<HttpResponse, ApiError> {
    let receipt = services.levels.upload(&form).await.context("Upload failed")?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Upload succeeded. Response: {}", receipt.response),
        "level_id": receipt.level_id,
        "owner": receipt.owner,
        "uploaded_at": receipt.uploaded_at,
    })))
}

#[get("/levels")]
pub async fn list_levels(
    services: web::Data<Services>,
    query: web::Query<ListRequest>,
) -> Result<HttpResponse, ApiError> {
    let listing = services.levels.list(&query).await.context("List failed")?;

    let ids = if listing.ids.is_empty() {
        "<none>".to_string()
    } else {
        listing.ids.join(", ")
    };
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Level count: {}. IDs: {}", listing.count, ids),
        "count": listing.count,
        "ids": listing.ids,
        "owner_filter": listing.owner_filter,
    })))
}
