// common/src/models/session.rs
use serde::{Deserialize, Serialize};

use crate::descriptor::ServiceDescriptor;

const API_KEY_PLACEHOLDER: &str = "REPLACE_WITH_FIREBASE_WEB_API_KEY";

/// The locally persisted account session.
///
/// Unknown fields in a stored document are ignored and missing ones default
/// to empty, so documents written by older releases still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub email: String,
    pub local_id: String,
    /// Bearer token for identity and level-store calls
    pub id_token: String,
    pub refresh_token: String,
    /// Sanitized owner namespace for level keys
    #[serde(alias = "level_server_account_username")]
    pub owner_username: String,
    #[serde(alias = "level_server_url")]
    pub server_url: String,
    #[serde(alias = "api_key")]
    pub api_key: String,
}

impl SessionRecord {
    pub fn is_signed_in(&self) -> bool {
        !self.id_token.is_empty()
    }

    /// Copy of this record with the environment fields taken from the descriptor
    pub fn with_environment(mut self, descriptor: &ServiceDescriptor) -> Self {
        self.server_url = descriptor.level_server_url.clone();
        self.api_key = descriptor.api_key.clone();
        self
    }

    /// Merge an identity-service response; empty response values keep the old ones
    pub fn apply_auth(mut self, auth: &AuthResponse) -> Self {
        fn take(current: &mut String, incoming: &Option<String>) {
            if let Some(value) = incoming.as_deref().filter(|v| !v.is_empty()) {
                *current = value.to_string();
            }
        }
        take(&mut self.email, &auth.email);
        take(&mut self.local_id, &auth.local_id);
        take(&mut self.id_token, &auth.id_token);
        take(&mut self.refresh_token, &auth.refresh_token);
        self
    }

    /// Forget the identity-service credentials, keeping the chosen owner
    pub fn signed_out(self) -> Self {
        Self {
            owner_username: self.owner_username,
            server_url: self.server_url,
            api_key: self.api_key,
            ..Self::default()
        }
    }
}

/// Account fields returned by sign-up, sign-in and profile updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Printable view of the session, without secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub email: String,
    pub local_id: String,
    pub username: String,
    pub server: String,
    pub token: String,
    pub api_key: String,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(session: &SessionRecord) -> Self {
        let or_none = |v: &str| if v.is_empty() { "<none>".to_string() } else { v.to_string() };
        let key_configured = !session.api_key.is_empty() && session.api_key != API_KEY_PLACEHOLDER;
        Self {
            email: or_none(&session.email),
            local_id: or_none(&session.local_id),
            username: or_none(&session.owner_username),
            server: session.server_url.clone(),
            token: if session.is_signed_in() { "configured" } else { "<none>" }.to_string(),
            api_key: if key_configured { "configured" } else { "<placeholder>" }.to_string(),
        }
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "email: {}", self.email)?;
        writeln!(f, "localId: {}", self.local_id)?;
        writeln!(f, "username: {}", self.username)?;
        writeln!(f, "server: {}", self.server)?;
        writeln!(f, "token: {}", self.token)?;
        write!(f, "api_key: {}", self.api_key)
    }
}
