//! The active profile: which user stamps mutations on this device.
//!
//! [`IdentityContext`] is passed explicitly to everything that needs it. Its
//! lifecycle is `Loading → Ready`: [`IdentityContext::init`] loads the user
//! list, then tries to resolve the id remembered in local storage. A stale or
//! garbled id leaves the identity unset without surfacing an error.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use trek_core::{store::TripStore, user::User};
use uuid::Uuid;

use crate::{Error, Result, storage::LocalStorage};

/// Storage key holding the active user id as a plain string.
pub const ACTIVE_USER_KEY: &str = "trek_active_user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Loading,
  Ready,
}

struct State {
  phase:  Phase,
  users:  Vec<User>,
  active: Option<User>,
}

/// Shared, cloneable handle to the active identity.
#[derive(Clone)]
pub struct IdentityContext {
  state:   Arc<RwLock<State>>,
  storage: Arc<dyn LocalStorage>,
}

impl IdentityContext {
  pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
    Self {
      state: Arc::new(RwLock::new(State { phase: Phase::Loading, users: Vec::new(), active: None })),
      storage,
    }
  }

  fn read(&self) -> RwLockReadGuard<'_, State> {
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, State> {
    self.state.write().unwrap_or_else(PoisonError::into_inner)
  }

  /// Load users, resolve the remembered identity, and mark the context ready.
  /// Never fails; problems are logged.
  pub async fn init<S: TripStore>(&self, store: &S) {
    if let Err(e) = self.refresh_users(store).await {
      tracing::warn!(error = %e, "failed to load users");
    }

    if let Some(user) = self.resolve_saved(store).await {
      tracing::info!(user = %user.name, "restored active profile");
      self.write().active = Some(user);
    }

    self.write().phase = Phase::Ready;
  }

  async fn resolve_saved<S: TripStore>(&self, store: &S) -> Option<User> {
    let saved = self.storage.get(ACTIVE_USER_KEY)?;
    let id = match Uuid::parse_str(saved.trim()) {
      Ok(id) => id,
      Err(e) => {
        tracing::debug!(saved = %saved, error = %e, "remembered profile id is not a uuid");
        return None;
      }
    };
    match store.get_user(id).await {
      Ok(Some(user)) => Some(user),
      Ok(None) => {
        tracing::debug!(%id, "remembered profile no longer exists");
        None
      }
      Err(e) => {
        tracing::debug!(%id, error = %e, "could not resolve remembered profile");
        None
      }
    }
  }

  /// Reload the user list (ordered by name). The active user's copy is
  /// refreshed too, so a rename shows up everywhere.
  pub async fn refresh_users<S: TripStore>(&self, store: &S) -> Result<Vec<User>> {
    let users = store.list_users().await.map_err(Error::backend)?;
    let mut state = self.write();
    if let Some(active) = &state.active
      && let Some(fresh) = users.iter().find(|u| u.user_id == active.user_id)
    {
      state.active = Some(fresh.clone());
    }
    state.users = users.clone();
    Ok(users)
  }

  /// Make `user` the active identity and remember it.
  pub fn select(&self, user: User) -> Result<()> {
    let id = user.user_id.hyphenated().to_string();
    self.write().active = Some(user);
    self.storage.set(ACTIVE_USER_KEY, &id)?;
    Ok(())
  }

  pub fn clear(&self) -> Result<()> {
    self.write().active = None;
    self.storage.remove(ACTIVE_USER_KEY)?;
    Ok(())
  }

  pub fn phase(&self) -> Phase { self.read().phase }

  pub fn is_ready(&self) -> bool { self.phase() == Phase::Ready }

  pub fn active(&self) -> Option<User> { self.read().active.clone() }

  pub fn active_id(&self) -> Option<Uuid> { self.read().active.as_ref().map(|u| u.user_id) }

  /// The active user, or [`Error::NoActiveIdentity`].
  pub fn require_active(&self) -> Result<User> { self.active().ok_or(Error::NoActiveIdentity) }

  pub fn users(&self) -> Vec<User> { self.read().users.clone() }

  pub fn user(&self, id: Uuid) -> Option<User> {
    self.read().users.iter().find(|u| u.user_id == id).cloned()
  }

  /// Case-insensitive exact name match.
  pub fn find_by_name(&self, name: &str) -> Option<User> {
    let name = name.trim();
    self
      .read()
      .users
      .iter()
      .find(|u| u.name.eq_ignore_ascii_case(name))
      .cloned()
  }
}
