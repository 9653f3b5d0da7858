// common/src/identity.rs
//! Typed client for the identity service's REST account endpoints.
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{UploaderError, UploaderResult};
use crate::models::session::AuthResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

/// Profile returned by token introspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Profile changes accepted by `accounts:update`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileUpdate<'a> {
    pub display_name: Option<&'a str>,
    pub password: Option<&'a str>,
}

pub struct IdentityGateway {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn sign_up(&self, api_key: &str, email: &str, password: &str) -> UploaderResult<AuthResponse> {
        let body = CredentialsRequest { email, password, return_secure_token: true };
        self.post("accounts:signUp", api_key, &body).await
    }

    pub async fn sign_in(&self, api_key: &str, email: &str, password: &str) -> UploaderResult<AuthResponse> {
        let body = CredentialsRequest { email, password, return_secure_token: true };
        self.post("accounts:signInWithPassword", api_key, &body).await
    }

    pub async fn update_profile(
        &self,
        api_key: &str,
        id_token: &str,
        update: ProfileUpdate<'_>,
    ) -> UploaderResult<AuthResponse> {
        let body = UpdateRequest {
            id_token,
            display_name: update.display_name,
            password: update.password,
            return_secure_token: true,
        };
        self.post("accounts:update", api_key, &body).await
    }

    /// Introspect a bearer token. `None` when the service knows no user for it.
    pub async fn lookup(&self, api_key: &str, id_token: &str) -> UploaderResult<Option<LookupUser>> {
        let res: LookupResponse = self.post("accounts:lookup", api_key, &LookupRequest { id_token }).await?;
        Ok(res.users.into_iter().next())
    }

    async fn post<B, T>(&self, method: &str, api_key: &str, body: &B) -> UploaderResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        if api_key.is_empty() {
            return Err(UploaderError::Config("Missing API key".to_string()));
        }

        let url = format!("{}/{}", self.base_url, method);
        tracing::info!("Identity request {}", method);

        let res = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!("Identity request {} failed: {}", method, message);
            return Err(UploaderError::Service { status: status.as_u16(), message });
        }

        if text.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| UploaderError::Parse(format!("Unexpected {} response: {}", method, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_up_sends_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::UrlEncoded("key".into(), "k1".into()))
            .match_body(Matcher::Json(json!({
                "email": "a@x.com",
                "password": "secret1",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(r#"{"email":"a@x.com","localId":"uid","idToken":"tok","refreshToken":"ref"}"#)
            .create_async()
            .await;

        let gateway = IdentityGateway::new(reqwest::Client::new(), server.url());
        let auth = gateway.sign_up("k1", "a@x.com", "secret1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(auth.id_token.as_deref(), Some("tok"));
        assert_eq!(auth.local_id.as_deref(), Some("uid"));
    }

    #[tokio::test]
    async fn test_service_error_message_surfaces() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#)
            .create_async()
            .await;

        let gateway = IdentityGateway::new(reqwest::Client::new(), server.url());
        let err = gateway.sign_in("k1", "a@x.com", "nope").await.unwrap_err();

        assert_eq!(err.to_string(), "INVALID_PASSWORD");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_error_without_message_uses_status_line() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let gateway = IdentityGateway::new(reqwest::Client::new(), server.url());
        let err = gateway.lookup("k1", "tok").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_update_omits_unset_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:update")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "idToken": "tok",
                "displayName": "Alice",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(r#"{"idToken":"tok2","displayName":"Alice"}"#)
            .create_async()
            .await;

        let gateway = IdentityGateway::new(reqwest::Client::new(), server.url());
        let update = ProfileUpdate { display_name: Some("Alice"), password: None };
        let auth = gateway.update_profile("k1", "tok", update).await.unwrap();

        mock.assert_async().await;
        assert_eq!(auth.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_lookup_returns_first_user() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"users":[{"displayName":"alice","email":"alice@x.com"}]}"#)
            .create_async()
            .await;

        let gateway = IdentityGateway::new(reqwest::Client::new(), server.url());
        let user = gateway.lookup("k1", "tok").await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_missing_key_never_hits_network() {
        let gateway = IdentityGateway::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let err = gateway.lookup("", "tok").await.unwrap_err();
        assert!(matches!(err, UploaderError::Config(_)));
    }
}
