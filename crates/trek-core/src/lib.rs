//! Domain model of the trek trip planner: users, places, the route, voted
//! suggestions, shared to-dos and the audit trail, plus the pure ordering and
//! ranking rules and the [`store::TripStore`] trait every backend implements.
//!
//! Nothing here touches a database, a terminal or an async runtime.

pub mod audit;
pub mod error;
pub mod ordering;
pub mod place;
pub mod route;
pub mod store;
pub mod suggestion;
pub mod todo;
pub mod user;

pub use error::{Error, Result};

/// Trim `value` and return it if anything is left.
pub(crate) fn trimmed(value: &str) -> Option<String> {
  let t = value.trim();
  (!t.is_empty()).then(|| t.to_owned())
}
