//! Route ordering algorithms.
//!
//! Both reordering gestures produce a full permutation of the current
//! sequence. Persisting it means rewriting every item's `order_index` to its
//! 1-based position, which is what [`OrderSnapshot::dense`] describes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::route::RouteStop;

// ─── Snapshots ───────────────────────────────────────────────────────────────

/// One `id → order_index` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
  pub id:    Uuid,
  pub order: u32,
}

/// A full ordering, serialised as `{"order": [{"id": …, "order": n}, …]}`.
/// Used as the before/after payload of `reorder` audit records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
  pub order: Vec<OrderEntry>,
}

impl OrderSnapshot {
  /// Capture the order indices the stops currently carry.
  pub fn current(stops: &[RouteStop]) -> Self {
    Self {
      order: stops
        .iter()
        .map(|s| OrderEntry { id: s.item.item_id, order: s.item.order_index })
        .collect(),
    }
  }

  /// Assign 1-based positions to `ids` in sequence.
  pub fn dense(ids: impl IntoIterator<Item = Uuid>) -> Self {
    Self {
      order: ids
        .into_iter()
        .zip(1u32..)
        .map(|(id, order)| OrderEntry { id, order })
        .collect(),
    }
  }

  /// `true` if the indices are exactly `1..=N`, each used once.
  pub fn is_dense(&self) -> bool {
    let mut seen: Vec<u32> = self.order.iter().map(|e| e.order).collect();
    seen.sort_unstable();
    seen.iter().zip(1u32..).all(|(&got, want)| got == want)
  }

  pub fn to_value(&self) -> serde_json::Value {
    serde_json::json!({ "order": self.order })
  }
}

// ─── Algorithms ──────────────────────────────────────────────────────────────

/// Move the element identified by `source` to the position currently held by
/// `target`, shifting everything in between by one.
///
/// This is a single-element move, not a swap. Returns `None` when there is
/// nothing to do: `source == target`, or either id is not in `items`.
pub fn move_item<T: Clone>(
  items: &[T],
  source: Uuid,
  target: Uuid,
  id_of: impl Fn(&T) -> Uuid,
) -> Option<Vec<T>> {
  if source == target {
    return None;
  }
  let from = items.iter().position(|i| id_of(i) == source)?;
  let to = items.iter().position(|i| id_of(i) == target)?;

  let mut moved = items.to_vec();
  let element = moved.remove(from);
  moved.insert(to, element);
  Some(moved)
}

/// Sort North to South: latitude descending, stable for equal latitudes.
pub fn by_latitude<T: Clone>(items: &[T], latitude_of: impl Fn(&T) -> f64) -> Vec<T> {
  let mut sorted = items.to_vec();
  sorted.sort_by(|a, b| {
    latitude_of(b)
      .partial_cmp(&latitude_of(a))
      .unwrap_or(Ordering::Equal)
  });
  sorted
}

/// [`by_latitude`] for route stops; a place without latitude sorts as `0.0`.
pub fn stops_by_latitude(stops: &[RouteStop]) -> Vec<RouteStop> {
  by_latitude(stops, |s| s.place.sort_latitude())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(n: usize) -> Vec<Uuid> { (0..n).map(|_| Uuid::new_v4()).collect() }

  #[test]
  fn drag_last_onto_first() {
    let v = ids(3);
    let (a, b, c) = (v[0], v[1], v[2]);
    let moved = move_item(&v, c, a, |id| *id).unwrap();
    assert_eq!(moved, vec![c, a, b]);
  }

  #[test]
  fn drag_first_onto_last() {
    let v = ids(4);
    let moved = move_item(&v, v[0], v[3], |id| *id).unwrap();
    assert_eq!(moved, vec![v[1], v[2], v[3], v[0]]);
  }

  #[test]
  fn drag_onto_neighbour_is_a_move_not_a_swap() {
    let v = ids(5);
    let moved = move_item(&v, v[1], v[3], |id| *id).unwrap();
    assert_eq!(moved, vec![v[0], v[2], v[3], v[1], v[4]]);
  }

  #[test]
  fn no_op_cases() {
    let v = ids(3);
    assert!(move_item(&v, v[1], v[1], |id| *id).is_none());
    assert!(move_item(&v, v[1], Uuid::new_v4(), |id| *id).is_none());
    assert!(move_item(&v, Uuid::new_v4(), v[0], |id| *id).is_none());
  }

  #[test]
  fn every_move_yields_a_dense_permutation() {
    let v = ids(6);
    for &source in &v {
      for &target in &v {
        let Some(moved) = move_item(&v, source, target, |id| *id) else {
          assert_eq!(source, target);
          continue;
        };
        let snapshot = OrderSnapshot::dense(moved.iter().copied());
        assert!(snapshot.is_dense());
        assert_eq!(snapshot.order.len(), v.len());

        let to = v.iter().position(|&id| id == target).unwrap();
        assert_eq!(moved[to], source);
        let rest: Vec<_> = moved.iter().copied().filter(|&id| id != source).collect();
        let expected: Vec<_> = v.iter().copied().filter(|&id| id != source).collect();
        assert_eq!(rest, expected);
      }
    }
  }

  #[test]
  fn latitude_descending_and_stable() {
    let rows = vec![
      ("hanoi", Some(21.0)),
      ("nowhere-1", None),
      ("saigon", Some(10.8)),
      ("hue", Some(16.4)),
      ("nowhere-2", None),
      ("equator", Some(0.0)),
    ];
    let sorted = by_latitude(&rows, |r| r.1.unwrap_or(0.0));
    let names: Vec<_> = sorted.iter().map(|r| r.0).collect();
    assert_eq!(
      names,
      ["hanoi", "hue", "saigon", "nowhere-1", "nowhere-2", "equator"]
    );
  }

  #[test]
  fn snapshot_json_shape() {
    let id = Uuid::nil();
    let value = OrderSnapshot::dense([id]).to_value();
    assert_eq!(value["order"][0]["order"], 1);
    assert_eq!(value["order"][0]["id"], id.to_string());
  }

  #[test]
  fn gap_is_not_dense() {
    let snapshot = OrderSnapshot {
      order: vec![
        OrderEntry { id: Uuid::new_v4(), order: 1 },
        OrderEntry { id: Uuid::new_v4(), order: 3 },
      ],
    };
    assert!(!snapshot.is_dense());
  }
}
