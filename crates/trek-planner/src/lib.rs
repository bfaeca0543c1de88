//! Application layer of the trek trip planner.
//!
//! Everything here is generic over a [`TripStore`]. A [`Session`] owns the
//! shared pieces (store, active identity, audit writer, locale) and hands out
//! views. Each view keeps its own fetched copy of what it shows and refetches
//! after every write it makes; views never share cached state.

pub mod audit;
pub mod error;
pub mod export;
pub mod identity;
pub mod labels;
pub mod log;
pub mod profiles;
pub mod route;
pub mod storage;
pub mod suggestions;
pub mod sync;
pub mod todos;

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use trek_core::store::TripStore;

pub use error::{Error, Result};

use crate::{
  audit::AuditLogger,
  export::{Document, TripSnapshot},
  identity::IdentityContext,
  labels::Locale,
  log::LogView,
  profiles::Profiles,
  route::RouteView,
  storage::LocalStorage,
  suggestions::SuggestionsView,
  todos::TodosView,
};

/// Serialise an audit snapshot. Serialising our own types does not fail in
/// practice; if it does the snapshot is omitted and a warning logged.
pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
  trek_core::audit::snapshot(value)
    .inspect_err(|e| tracing::warn!(error = %e, "could not snapshot audit payload"))
    .ok()
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct Session<S> {
  store:    Arc<S>,
  identity: IdentityContext,
  audit:    AuditLogger,
  locale:   Locale,
  worker:   JoinHandle<()>,
}

impl<S: TripStore + 'static> Session<S> {
  /// Resolve the remembered identity and start the audit writer.
  pub async fn start(store: Arc<S>, storage: Arc<dyn LocalStorage>, locale: Locale) -> Self {
    let identity = IdentityContext::new(storage);
    identity.init(store.as_ref()).await;
    let (audit, worker) = AuditLogger::spawn(store.clone(), identity.clone());
    Self { store, identity, audit, locale, worker }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn identity(&self) -> &IdentityContext { &self.identity }

  pub fn audit(&self) -> &AuditLogger { &self.audit }

  pub fn locale(&self) -> Locale { self.locale }

  pub fn route(&self) -> RouteView<S> { RouteView::new(self.store.clone(), self.audit.clone()) }

  pub fn suggestions(&self) -> SuggestionsView<S> {
    SuggestionsView::new(self.store.clone(), self.identity.clone(), self.audit.clone())
  }

  pub fn todos(&self) -> TodosView<S> {
    TodosView::new(self.store.clone(), self.identity.clone(), self.audit.clone())
  }

  pub fn log(&self) -> LogView<S> { LogView::new(self.store.clone(), self.locale) }

  pub fn profiles(&self) -> Profiles<S> {
    Profiles::new(self.store.clone(), self.identity.clone(), self.audit.clone())
  }

  pub async fn export(&self) -> Result<Document> {
    let snapshot = TripSnapshot::fetch(self.store.as_ref()).await?;
    Ok(snapshot.render(self.locale))
  }

  /// Write out queued audit records and stop the writer.
  pub async fn shutdown(self) {
    self.audit.flush().await;
    self.audit.close();
    if let Err(e) = self.worker.await {
      tracing::warn!(error = %e, "audit writer did not shut down cleanly");
    }
  }
}

#[cfg(test)]
mod tests;
