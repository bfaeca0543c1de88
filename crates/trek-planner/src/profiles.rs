//! Creating and renaming user profiles.

use std::sync::Arc;

use serde_json::json;
use trek_core::{
  audit::{ActionKind, EntityKind, NewAuditRecord},
  store::TripStore,
  user::{NewUser, User, validate_name},
};
use uuid::Uuid;

use crate::{Error, Result, audit::AuditLogger, identity::IdentityContext, snapshot};

pub struct Profiles<S> {
  store:    Arc<S>,
  identity: IdentityContext,
  audit:    AuditLogger,
}

impl<S: TripStore> Profiles<S> {
  pub fn new(store: Arc<S>, identity: IdentityContext, audit: AuditLogger) -> Self {
    Self { store, identity, audit }
  }

  /// Create a profile and make it the active identity.
  pub async fn create(&self, name: &str) -> Result<User> {
    let input = NewUser::new(name).validate()?;
    let user = self.store.add_user(input).await.map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Create, EntityKind::User, user.user_id)
        .after(snapshot(&user)),
    );
    if let Err(e) = self.identity.refresh_users(self.store.as_ref()).await {
      tracing::warn!(error = %e, "user refetch failed");
    }
    self.identity.select(user.clone())?;
    tracing::info!(user = %user.name, "created profile");
    Ok(user)
  }

  pub async fn rename(&self, user_id: Uuid, name: &str) -> Result<User> {
    let name = validate_name(name)?;
    let before = self.identity.user(user_id).map(|u| u.name);

    let user = self
      .store
      .rename_user(user_id, name)
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Update, EntityKind::User, user_id)
        .before(before.map(|name| json!({ "name": name })))
        .after(Some(json!({ "name": user.name }))),
    );
    if let Err(e) = self.identity.refresh_users(self.store.as_ref()).await {
      tracing::warn!(error = %e, "user refetch failed");
    }
    Ok(user)
  }
}
