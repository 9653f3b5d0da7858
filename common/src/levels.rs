// common/src/levels.rs
//! Level upload and listing behind the uploader page.
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::descriptor::DescriptorCache;
use crate::error::{UploaderError, UploaderResult};
use crate::level_index::{filter_by_owner, LevelIndex};
use crate::level_key::{build_key, sanitize_part, LEVEL_FALLBACK};
use crate::models::level::{LevelListing, LevelRecord, UploadReceipt};
use crate::models::session::SessionRecord;
use crate::owner::{OwnerHints, OwnerResolver, OwnerSource};
use crate::session_store::SessionStore;
use crate::utils::{non_blank, normalize_base_url, now_epoch_secs};

/// Fields of the upload form. Blank fields fall back to the stored session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadRequest {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub account_username: Option<String>,
    pub author: Option<String>,
    pub level_id: Option<String>,
    pub level_name: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub account_username: Option<String>,
    pub author: Option<String>,
}

pub struct LevelService {
    client: reqwest::Client,
    resolver: OwnerResolver,
    index: LevelIndex,
    store: Arc<SessionStore>,
    descriptors: Arc<DescriptorCache>,
    source_tag: String,
}

impl LevelService {
    pub fn new(
        client: reqwest::Client,
        resolver: OwnerResolver,
        store: Arc<SessionStore>,
        descriptors: Arc<DescriptorCache>,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            index: LevelIndex::new(client.clone()),
            client,
            resolver,
            store,
            descriptors,
            source_tag: source_tag.into(),
        }
    }

    pub async fn upload(&self, req: &UploadRequest) -> UploaderResult<UploadReceipt> {
        let session = self.store.load();
        let base = self.base_url(req.base_url.as_deref()).await?;

        if req.data.trim().is_empty() {
            return Err(UploaderError::validation("Level data is empty."));
        }

        let token = non_blank(req.token.as_deref()).or_else(|| non_blank(Some(session.id_token.as_str())));
        let hints = OwnerHints {
            token,
            typed_username: non_blank(req.account_username.as_deref())
                .or_else(|| non_blank(Some(session.owner_username.as_str()))),
            typed_author: non_blank(req.author.as_deref()),
        };
        let resolved = self.resolver.resolve(hints).await;
        let Some(resolved) = resolved else {
            return Err(UploaderError::validation("Account username is required."));
        };

        let name_raw = non_blank(req.level_name.as_deref()).or_else(|| non_blank(req.level_id.as_deref()));
        let level_id = build_key(&resolved.owner, name_raw.unwrap_or_default());

        let uploaded_at = now_epoch_secs();
        let record = LevelRecord {
            name: sanitize_part(name_raw.unwrap_or_default(), LEVEL_FALLBACK),
            owner: resolved.owner.clone(),
            level_id: level_id.clone(),
            data: req.data.clone(),
            uploaded_at,
            source: self.source_tag.clone(),
        };

        let url = format!("{}/levels/{}.json", base, level_id);
        tracing::info!("Uploading level '{}' to {}", level_id, url);

        let mut request = self.client.put(&url).json(&record);
        if let Some(token) = token {
            request = request.query(&[("auth", token)]);
        }
        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            tracing::warn!("Upload of '{}' failed with HTTP {}", level_id, status.as_u16());
            return Err(UploaderError::Service {
                status: status.as_u16(),
                message: format!("HTTP {} {}", status.as_u16(), body),
            });
        }

        if resolved.source == OwnerSource::Token && session.owner_username != resolved.owner {
            let descriptor = self.descriptors.get().await;
            let owner = resolved.owner.clone();
            self.store.update(&descriptor, |s| SessionRecord {
                owner_username: owner,
                ..s
            })?;
            tracing::info!("Stored owner '{}' from token lookup", resolved.owner);
        }

        Ok(UploadReceipt {
            level_id,
            owner: resolved.owner,
            url,
            uploaded_at,
            response: body,
        })
    }

    /// List level ids, narrowed to the typed owner when one is given, else
    /// to the stored session owner. The owner here is never looked up remotely.
    pub async fn list(&self, req: &ListRequest) -> UploaderResult<LevelListing> {
        let session = self.store.load();
        let base = self.base_url(req.base_url.as_deref()).await?;
        let token = non_blank(req.token.as_deref()).or_else(|| non_blank(Some(session.id_token.as_str())));

        let typed = non_blank(req.account_username.as_deref())
            .or_else(|| non_blank(Some(session.owner_username.as_str())))
            .or_else(|| non_blank(req.author.as_deref()))
            .unwrap_or_default();
        let owner = sanitize_part(typed, "");

        let ids = self.index.list(&base, token).await?;
        let ids = filter_by_owner(ids, &owner);
        let listing = LevelListing::new(ids, Some(owner).filter(|o| !o.is_empty()));
        tracing::info!("Level count: {}", listing.count);
        Ok(listing)
    }

    async fn base_url(&self, requested: Option<&str>) -> UploaderResult<String> {
        let base = match requested.map(normalize_base_url).filter(|b| !b.is_empty()) {
            Some(base) => base,
            None => self.descriptors.get().await.level_server_url.clone(),
        };
        if base.is_empty() {
            return Err(UploaderError::validation("Base URL is required."));
        }
        url::Url::parse(&base)
            .map_err(|e| UploaderError::validation(format!("Base URL is invalid: {}", e)))?;
        Ok(base)
    }
}
