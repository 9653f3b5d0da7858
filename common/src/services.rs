// common/src/services.rs
use std::sync::Arc;

use crate::account::AccountService;
use crate::config::Config;
use crate::descriptor::{source_for, DescriptorCache};
use crate::identity::IdentityGateway;
use crate::levels::LevelService;
use crate::owner::OwnerResolver;
use crate::session_store::SessionStore;

/// Account and level services sharing one session store, one descriptor
/// cache and one HTTP client.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub levels: Arc<LevelService>,
    pub descriptors: Arc<DescriptorCache>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let descriptors = Arc::new(DescriptorCache::new(source_for(&config.descriptor, client.clone())));
        Self::with_descriptors(config, client, descriptors)
    }

    pub fn with_descriptors(config: &Config, client: reqwest::Client, descriptors: Arc<DescriptorCache>) -> Self {
        let store = Arc::new(SessionStore::new(&config.session.path));
        let gateway = Arc::new(IdentityGateway::new(client.clone(), config.identity_base_url.clone()));

        let accounts = AccountService::new(gateway.clone(), store.clone(), descriptors.clone());
        let resolver = OwnerResolver::new(gateway, descriptors.clone());
        let levels = LevelService::new(client, resolver, store, descriptors.clone(), config.upload_source.clone());

        Self {
            accounts: Arc::new(accounts),
            levels: Arc::new(levels),
            descriptors,
        }
    }
}
