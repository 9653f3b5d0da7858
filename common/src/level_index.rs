// common/src/level_index.rs
use serde_json::Value;

use crate::error::{UploaderError, UploaderResult};
use crate::utils::non_blank;

/// Shallow listing of the remote `levels` namespace
pub struct LevelIndex {
    client: reqwest::Client,
}

impl LevelIndex {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// All level ids in the store, sorted. No retry on failure.
    pub async fn list(&self, base_url: &str, token: Option<&str>) -> UploaderResult<Vec<String>> {
        let url = format!("{}/levels.json", base_url);
        let mut query = vec![("shallow", "true")];
        if let Some(token) = non_blank(token) {
            query.push(("auth", token));
        }

        tracing::info!("Fetching level ids from {}", url);
        let res = self.client.get(&url).query(&query).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UploaderError::Service {
                status: status.as_u16(),
                message: format!("HTTP {} {}", status.as_u16(), text),
            });
        }

        parse_listing(&text)
    }
}

/// Keys of a shallow listing body. `null` and empty bodies list nothing.
pub fn parse_listing(text: &str) -> UploaderResult<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let json: Value = serde_json::from_str(text)
        .map_err(|e| UploaderError::Parse(format!("List parse error: {}", e)))?;

    let mut ids: Vec<String> = match json {
        Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(UploaderError::Parse(format!(
                "List parse error: expected an object, got {}",
                other
            )))
        }
    };
    ids.sort();
    Ok(ids)
}

/// Ids owned by `owner`. An empty owner filters nothing.
pub fn filter_by_owner(ids: Vec<String>, owner: &str) -> Vec<String> {
    if owner.is_empty() {
        return ids;
    }
    let prefix = format!("{}-", owner);
    ids.into_iter().filter(|id| id.starts_with(&prefix)).collect()
}
