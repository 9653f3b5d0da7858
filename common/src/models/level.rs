// common/src/models/level.rs
use serde::{Deserialize, Serialize};

/// One uploaded level as stored under `levels/{level_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub name: String,
    pub owner: String,
    pub level_id: String,
    /// Opaque level payload
    pub data: String,
    /// Upload time in seconds since the Unix epoch
    pub uploaded_at: i64,
    pub source: String,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub level_id: String,
    pub owner: String,
    pub url: String,
    /// Same `uploaded_at` that was written into the record
    pub uploaded_at: i64,
    /// Body the level store returned for the PUT
    pub response: String,
}

/// Outcome of a listing, after the owner filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelListing {
    pub ids: Vec<String>,
    pub count: usize,
    pub owner_filter: Option<String>,
}

impl LevelListing {
    pub fn new(ids: Vec<String>, owner_filter: Option<String>) -> Self {
        Self {
            count: ids.len(),
            ids,
            owner_filter,
        }
    }
}
