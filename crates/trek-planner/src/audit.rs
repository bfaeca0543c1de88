//! Best-effort audit trail writer.
//!
//! [`AuditLogger::record`] stamps the active actor and enqueues the record
//! without waiting. One background task drains the queue in order and appends
//! each record to the store. A failed append is reported as a `tracing`
//! warning and otherwise dropped; it never reaches the caller and never
//! undoes the mutation it describes.

use std::sync::Arc;

use tokio::{
  sync::{mpsc, oneshot},
  task::JoinHandle,
};
use trek_core::{audit::NewAuditRecord, store::TripStore};

use crate::identity::IdentityContext;

enum Command {
  Record(NewAuditRecord),
  Flush(oneshot::Sender<()>),
  Close,
}

#[derive(Clone)]
pub struct AuditLogger {
  tx:       mpsc::UnboundedSender<Command>,
  identity: IdentityContext,
}

impl AuditLogger {
  /// Start the writer task. The task ends after [`AuditLogger::close`] or
  /// once every logger handle is dropped.
  pub fn spawn<S>(store: Arc<S>, identity: IdentityContext) -> (Self, JoinHandle<()>)
  where
    S: TripStore + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run(store, rx));
    (Self { tx, identity }, handle)
  }

  /// Queue `record`, stamped with whichever identity is active right now.
  pub fn record(&self, record: NewAuditRecord) {
    let record = record.actor(self.identity.active_id());
    if self.tx.send(Command::Record(record)).is_err() {
      tracing::warn!("audit writer has stopped; record dropped");
    }
  }

  /// Wait until every record queued before this call has been attempted.
  pub async fn flush(&self) {
    let (done, wait) = oneshot::channel();
    if self.tx.send(Command::Flush(done)).is_ok() {
      let _ = wait.await;
    }
  }

  /// Ask the writer to stop once the records queued so far are written.
  pub fn close(&self) { let _ = self.tx.send(Command::Close); }
}

async fn run<S: TripStore>(store: Arc<S>, mut rx: mpsc::UnboundedReceiver<Command>) {
  while let Some(command) = rx.recv().await {
    match command {
      Command::Record(record) => {
        let (action, kind, entity) = (record.action, record.entity_kind, record.entity_id);
        match store.append_audit(record).await {
          Ok(written) => {
            tracing::debug!(audit_id = %written.audit_id, %action, %kind, %entity, "audit recorded");
          }
          Err(e) => {
            tracing::warn!(error = %e, %action, %kind, %entity, "audit write failed");
          }
        }
      }
      Command::Flush(done) => {
        let _ = done.send(());
      }
      Command::Close => break,
    }
  }
}
