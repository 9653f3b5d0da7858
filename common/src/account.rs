// common/src/account.rs
//! Account operations behind the account page.
//!
//! Each operation starts from the stored session, runs its remote calls in
//! order, and writes the new record only once all of them succeeded.
use std::sync::Arc;

use crate::descriptor::{DescriptorCache, ServiceDescriptor};
use crate::error::{UploaderError, UploaderResult};
use crate::identity::{IdentityGateway, ProfileUpdate};
use crate::level_key::sanitize_username;
use crate::models::session::{SessionRecord, SessionSummary};
use crate::session_store::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct AccountService {
    gateway: Arc<IdentityGateway>,
    store: Arc<SessionStore>,
    descriptors: Arc<DescriptorCache>,
}

impl AccountService {
    pub fn new(gateway: Arc<IdentityGateway>, store: Arc<SessionStore>, descriptors: Arc<DescriptorCache>) -> Self {
        Self { gateway, store, descriptors }
    }

    /// Merge the stored record with the current environment and persist it
    pub async fn initialize(&self) -> UploaderResult<SessionRecord> {
        let descriptor = self.descriptors.get().await;
        let session = self.store.save(self.store.load(), &descriptor)?;
        tracing::info!("Session ready (signed in: {})", session.is_signed_in());
        Ok(session)
    }

    pub fn summary(&self) -> SessionSummary {
        let mut session = self.store.load();
        if let Some(descriptor) = self.descriptors.peek() {
            session = session.with_environment(&descriptor);
        }
        SessionSummary::from(&session)
    }

    pub fn session(&self) -> SessionRecord {
        self.store.load()
    }

    pub async fn create_account(&self, email: &str, password: &str, username: &str) -> UploaderResult<SessionRecord> {
        let email = email.trim();
        let username = sanitize_username(username);
        if email.is_empty() || password.is_empty() {
            return Err(UploaderError::validation("Create account requires email + password."));
        }
        if username.is_empty() {
            return Err(UploaderError::validation("Username is required."));
        }

        let descriptor = self.descriptors.get().await;
        let api_key = descriptor.require_api_key()?;

        tracing::info!("Creating account for username {}", username);
        let signed_up = self.gateway.sign_up(api_key, email, password).await?;
        let session = self.store.load().apply_auth(&signed_up);

        let update = ProfileUpdate { display_name: Some(username.as_str()), password: None };
        let updated = self.gateway.update_profile(api_key, &session.id_token, update).await?;
        let session = SessionRecord {
            owner_username: username,
            ..session.apply_auth(&updated)
        };

        self.store.save(session, &descriptor)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> UploaderResult<SessionRecord> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(UploaderError::validation("Sign in requires email + password."));
        }

        let descriptor = self.descriptors.get().await;
        let api_key = descriptor.require_api_key()?;

        let auth = self.gateway.sign_in(api_key, email, password).await?;
        let mut session = self.store.load().apply_auth(&auth);
        if session.owner_username.is_empty() {
            if let Some(display_name) = auth.display_name.as_deref() {
                session.owner_username = sanitize_username(display_name);
            }
        }

        tracing::info!("Signed in as {}", session.email);
        self.store.save(session, &descriptor)
    }

    /// Local only; the identity service is not told
    pub async fn sign_out(&self) -> UploaderResult<SessionRecord> {
        let descriptor = self.descriptors.get().await;
        let session = self.store.save(self.store.load().signed_out(), &descriptor)?;
        tracing::info!("Signed out locally");
        Ok(session)
    }

    pub async fn change_username(&self, new_username: &str) -> UploaderResult<SessionRecord> {
        let next = sanitize_username(new_username);
        let (session, descriptor) = self.signed_in_session().await?;
        if next.is_empty() {
            return Err(UploaderError::validation("New username is empty."));
        }
        let api_key = descriptor.require_api_key()?;

        let update = ProfileUpdate { display_name: Some(next.as_str()), password: None };
        let auth = self.gateway.update_profile(api_key, &session.id_token, update).await?;
        let session = SessionRecord {
            owner_username: next,
            ..self.store.load().apply_auth(&auth)
        };

        self.store.save(session, &descriptor)
    }

    pub async fn change_password(&self, new_password: &str) -> UploaderResult<SessionRecord> {
        let (session, descriptor) = self.signed_in_session().await?;
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UploaderError::validation("New password must be at least 6 characters."));
        }
        let api_key = descriptor.require_api_key()?;

        let update = ProfileUpdate { display_name: None, password: Some(new_password) };
        let auth = self.gateway.update_profile(api_key, &session.id_token, update).await?;

        self.store.save(self.store.load().apply_auth(&auth), &descriptor)
    }

    async fn signed_in_session(&self) -> UploaderResult<(SessionRecord, Arc<ServiceDescriptor>)> {
        let session = self.store.load();
        if !session.is_signed_in() {
            return Err(UploaderError::validation("Sign in first."));
        }
        Ok((session, self.descriptors.get().await))
    }
}
