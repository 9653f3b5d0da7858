// web-server/src/api/account.rs
use actix_web::{get, post, web, HttpResponse, Responder};
use common::models::session::{SessionRecord, SessionSummary};
use common::services::Services;
use serde::Deserialize;
use serde_json::json;

use super::error::{ApiError, Context};

#[derive(Debug, Deserialize)]
pub struct CreateAccountForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameForm {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub password: String,
}

fn success(message: &str, session: &SessionRecord) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": message,
        "session": SessionSummary::from(session),
    }))
}

#[get("/session")]
pub async fn session_summary(services: web::Data<Services>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Ready.",
        "session": services.accounts.summary(),
    }))
}

#[post("/account")]
pub async fn create_account(
    services: web::Data<Services>,
    form: web::Json<CreateAccountForm>,
) -> Result<HttpResponse, ApiError> {
    let session = services
        .accounts
        .create_account(&form.email, &form.password, &form.username)
        .await
        .context("Create account failed")?;

    tracing::info!("Account created for {}", session.owner_username);
    Ok(success("Account created and username set.", &session))
}

#[post("/account/sign-in")]
pub async fn sign_in(
    services: web::Data<Services>,
    form: web::Json<SignInForm>,
) -> Result<HttpResponse, ApiError> {
    let session = services
        .accounts
        .sign_in(&form.email, &form.password)
        .await
        .context("Sign in failed")?;

    Ok(success("Signed in.", &session))
}

#[post("/account/sign-out")]
pub async fn sign_out(services: web::Data<Services>) -> Result<HttpResponse, ApiError> {
    let session = services.accounts.sign_out().await.context("Sign out failed")?;
    Ok(success("Signed out locally.", &session))
}

#[post("/account/username")]
pub async fn change_username(
    services: web::Data<Services>,
    form: web::Json<UsernameForm>,
) -> Result<HttpResponse, ApiError> {
    let session = services
        .accounts
        .change_username(&form.username)
        .await
        .context("Username change failed")?;

    Ok(success("Username changed.", &session))
}

#[post("/account/password")]
pub async fn change_password(
    services: web::Data<Services>,
    form: web::Json<PasswordForm>,
) -> Result<HttpResponse, ApiError> {
    let session = services
        .accounts
        .change_password(&form.password)
        .await
        .context("Password change failed")?;

    Ok(success("Password changed.", &session))
}
