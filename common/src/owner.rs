// common/src/owner.rs
//! Resolution of the level owner from the sources available to a request.
use std::sync::Arc;

use crate::descriptor::DescriptorCache;
use crate::identity::{IdentityGateway, LookupUser};
use crate::level_key::{sanitize_part, sanitize_username};

/// Where a resolved owner came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerSource {
    Token,
    StoredUsername,
    TypedAuthor,
}

/// Candidate sources, highest priority first
pub const RESOLUTION_ORDER: [OwnerSource; 3] = [
    OwnerSource::Token,
    OwnerSource::StoredUsername,
    OwnerSource::TypedAuthor,
];

/// Inputs a caller has for deciding who owns a level
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerHints<'a> {
    pub token: Option<&'a str>,
    pub typed_username: Option<&'a str>,
    pub typed_author: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOwner {
    pub owner: String,
    pub source: OwnerSource,
}

pub struct OwnerResolver {
    gateway: Arc<IdentityGateway>,
    descriptors: Arc<DescriptorCache>,
}

impl OwnerResolver {
    pub fn new(gateway: Arc<IdentityGateway>, descriptors: Arc<DescriptorCache>) -> Self {
        Self { gateway, descriptors }
    }

    /// First source in [`RESOLUTION_ORDER`] that yields a non-empty owner.
    ///
    /// `None` means no owner could be established.
    pub async fn resolve(&self, hints: OwnerHints<'_>) -> Option<ResolvedOwner> {
        for source in RESOLUTION_ORDER {
            let candidate = match source {
                OwnerSource::Token => self.from_token(hints.token).await,
                OwnerSource::StoredUsername => hints.typed_username.map(str::to_string),
                OwnerSource::TypedAuthor => hints.typed_author.map(str::to_string),
            };

            let owner = candidate
                .map(|c| sanitize_part(&c, ""))
                .filter(|o| !o.is_empty());
            if let Some(owner) = owner {
                tracing::debug!("Owner resolved from {:?}", source);
                return Some(ResolvedOwner { owner, source });
            }
        }
        None
    }

    /// Owner string only; empty when nothing resolved
    pub async fn resolve_owner(&self, token: &str, typed_username: &str, typed_author: &str) -> String {
        let hints = OwnerHints {
            token: Some(token),
            typed_username: Some(typed_username),
            typed_author: Some(typed_author),
        };
        self.resolve(hints).await.map(|r| r.owner).unwrap_or_default()
    }

    async fn from_token(&self, token: Option<&str>) -> Option<String> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        let descriptor = self.descriptors.get().await;
        if descriptor.api_key.is_empty() {
            tracing::warn!("Skipping token lookup: no API key configured");
            return None;
        }

        match self.gateway.lookup(&descriptor.api_key, token).await {
            Ok(Some(user)) => owner_from_profile(&user),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Token lookup failed, using local names: {}", e);
                None
            }
        }
    }
}

/// Display name if set, else the local part of the email
pub fn owner_from_profile(user: &LookupUser) -> Option<String> {
    let display = user.display_name.as_deref().map(sanitize_username);
    let from_email = || {
        user.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .map(sanitize_username)
    };
    display
        .filter(|d| !d.is_empty())
        .or_else(from_email)
        .filter(|o| !o.is_empty())
}
