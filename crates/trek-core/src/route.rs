//! Route items: the ordered stops of the trip.
//!
//! Every item carries a 1-based `order_index`. After a completed reorder the
//! indices are exactly `1..=N`; see [`crate::ordering`] for the algorithms
//! that produce new orderings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::place::Place;

/// Progress of a single stop.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RouteStatus {
  #[default]
  Planned,
  InProgress,
  Completed,
  Skipped,
}

/// One scheduled stop in the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteItem {
  pub item_id:     Uuid,
  pub place_id:    Uuid,
  pub order_index: u32,
  pub status:      RouteStatus,
  pub start_date:  Option<NaiveDate>,
  pub end_date:    Option<NaiveDate>,
  pub notes:       Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl RouteItem {
  /// The user-editable fields, in the shape accepted by
  /// [`TripStore::update_route_item`](crate::store::TripStore::update_route_item).
  pub fn editable(&self) -> RouteItemUpdate {
    RouteItemUpdate {
      status:     self.status,
      start_date: self.start_date,
      end_date:   self.end_date,
      notes:      self.notes.clone(),
    }
  }
}

/// A route item joined with the place it visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
  pub item:  RouteItem,
  pub place: Place,
}

impl RouteStop {
  pub fn id(&self) -> Uuid { self.item.item_id }
}

/// Input for appending a place to the route. The store assigns the next free
/// `order_index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRouteItem {
  pub place_id:   Uuid,
  pub status:     RouteStatus,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub notes:      Option<String>,
}

impl NewRouteItem {
  pub fn new(place_id: Uuid) -> Self {
    Self { place_id, ..Self::default() }
  }

  /// Notes are trimmed; blank notes are stored as absent.
  pub fn normalized(self) -> Self {
    let notes = self.notes.as_deref().and_then(crate::trimmed);
    Self { notes, ..self }
  }
}

/// Replacement values for the editable fields of a route item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteItemUpdate {
  pub status:     RouteStatus,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub notes:      Option<String>,
}

impl RouteItemUpdate {
  /// Blank notes are stored as absent.
  pub fn normalized(self) -> Self {
    let notes = self.notes.as_deref().and_then(crate::trimmed);
    Self { notes, ..self }
  }
}
