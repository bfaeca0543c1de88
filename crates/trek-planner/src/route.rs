//! The route: an ordered list of stops.
//!
//! Both reorder gestures work the same way. The new permutation is applied
//! locally first, then every stop's `order_index` is rewritten to its 1-based
//! position with one sequential store call per stop. There is no transaction
//! and no rollback: a failed write is logged and the loop carries on. One
//! `reorder` audit record covers the whole gesture, and a refetch reconciles
//! the local copy with whatever the store ended up holding.

use std::sync::Arc;

use trek_core::{
  audit::{ActionKind, EntityKind, EntityRef, NewAuditRecord},
  ordering::{self, OrderSnapshot},
  route::{NewRouteItem, RouteItem, RouteItemUpdate, RouteStop},
  store::TripStore,
};
use uuid::Uuid;

use crate::{Error, Result, audit::AuditLogger, snapshot, sync::Synced};

/// A per-stop `order_index` write that failed during a reorder.
#[derive(Debug, Clone)]
pub struct FailedWrite {
  pub item_id: Uuid,
  pub error:   String,
}

/// What a reorder gesture did.
#[derive(Debug, Clone, Default)]
pub struct ReorderReport {
  /// Writes that went through.
  pub written:    usize,
  pub failed:     Vec<FailedWrite>,
  /// Whether the follow-up refetch succeeded.
  pub reconciled: bool,
}

impl ReorderReport {
  pub fn is_clean(&self) -> bool { self.failed.is_empty() }
}

pub struct RouteView<S> {
  store: Arc<S>,
  audit: AuditLogger,
  stops: Synced<Vec<RouteStop>>,
}

impl<S: TripStore> RouteView<S> {
  pub fn new(store: Arc<S>, audit: AuditLogger) -> Self {
    Self { store, audit, stops: Synced::default() }
  }

  pub fn stops(&self) -> &[RouteStop] { self.stops.value() }

  pub fn is_pending(&self) -> bool { self.stops.is_pending() }

  pub fn stop(&self, item_id: Uuid) -> Option<&RouteStop> {
    self.stops().iter().find(|s| s.id() == item_id)
  }

  /// Fetch the route from the store, replacing the local copy.
  pub async fn load(&mut self) -> Result<&[RouteStop]> {
    let stops = self.store.list_route().await.map_err(Error::backend)?;
    self.stops.reconcile(stops);
    Ok(self.stops())
  }

  async fn refetch(&mut self) -> bool {
    match self.store.list_route().await {
      Ok(stops) => {
        self.stops.reconcile(stops);
        true
      }
      Err(e) => {
        tracing::warn!(error = %e, "route refetch failed");
        false
      }
    }
  }

  /// Drop `source` onto `target`'s position. `None` when the gesture does
  /// nothing: `source == target` or either id is not on the route.
  pub async fn reorder(&mut self, source: Uuid, target: Uuid) -> Option<ReorderReport> {
    let moved = ordering::move_item(self.stops(), source, target, RouteStop::id)?;
    tracing::info!(%source, %target, "reordering route");
    Some(self.apply_order(moved, EntityRef::Row(source)).await)
  }

  /// Sort the route North to South by latitude. `None` on an empty route.
  pub async fn auto_route(&mut self) -> Option<ReorderReport> {
    if self.stops().is_empty() {
      return None;
    }
    let sorted = ordering::stops_by_latitude(self.stops());
    tracing::info!(stops = sorted.len(), "auto-routing north to south");
    Some(self.apply_order(sorted, EntityRef::AutoRoute).await)
  }

  async fn apply_order(&mut self, mut order: Vec<RouteStop>, subject: EntityRef) -> ReorderReport {
    let before = OrderSnapshot::current(self.stops());
    let after = OrderSnapshot::dense(order.iter().map(RouteStop::id));

    for (stop, index) in order.iter_mut().zip(1u32..) {
      stop.item.order_index = index;
    }
    self.stops.apply_optimistic(order);

    let mut report = ReorderReport::default();
    for entry in &after.order {
      match self.store.set_order_index(entry.id, entry.order).await {
        Ok(()) => report.written += 1,
        Err(e) => {
          tracing::warn!(item_id = %entry.id, order = entry.order, error = %e, "order write failed");
          report.failed.push(FailedWrite { item_id: entry.id, error: e.to_string() });
        }
      }
    }

    // Nothing landed: the gesture failed as a whole and is not audited.
    if report.written > 0 {
      self.audit.record(
        NewAuditRecord::new(ActionKind::Reorder, EntityKind::RouteItem, subject)
          .before(Some(before.to_value()))
          .after(Some(after.to_value())),
      );
    }

    report.reconciled = self.refetch().await;
    if report.reconciled && !OrderSnapshot::current(self.stops()).is_dense() {
      tracing::warn!(failed = report.failed.len(), "route order has gaps or duplicates after reorder");
    }
    report
  }

  /// Replace a stop's editable fields.
  pub async fn edit(&mut self, item_id: Uuid, update: RouteItemUpdate) -> Result<RouteItem> {
    let before = self
      .stop(item_id)
      .map(|s| s.item.editable())
      .ok_or_else(|| Error::not_found("route item", item_id))?;
    let update = update.normalized();

    let item = self
      .store
      .update_route_item(item_id, update.clone())
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Update, EntityKind::RouteItem, item_id)
        .before(snapshot(&before))
        .after(snapshot(&update)),
    );
    self.refetch().await;
    Ok(item)
  }

  /// Add `place_id` at the end of the route.
  pub async fn append(&mut self, place_id: Uuid) -> Result<RouteItem> {
    self
      .store
      .get_place(place_id)
      .await
      .map_err(Error::backend)?
      .ok_or_else(|| Error::not_found("place", place_id))?;

    let item = self
      .store
      .add_route_item(NewRouteItem::new(place_id))
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Create, EntityKind::RouteItem, item.item_id)
        .after(snapshot(&item)),
    );
    self.refetch().await;
    Ok(item)
  }
}
