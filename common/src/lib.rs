pub mod account;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod level_index;
pub mod level_key;
pub mod levels;
pub mod models;
pub mod owner;
pub mod services;
pub mod session_store;
pub mod utils;

pub use crate::config::{Config, SessionConfig};
pub use error::{UploaderError, UploaderResult};
pub use utils::*;

pub use reqwest::Client as HttpClient;
