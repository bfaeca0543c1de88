//! Places: the destinations a route can visit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A named destination with optional coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
  pub place_id:   Uuid,
  pub name:       String,
  pub region:     Option<String>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub created_at: DateTime<Utc>,
  pub created_by: Option<Uuid>,
}

impl Place {
  /// Latitude used for North→South ordering; a missing value counts as the
  /// equator.
  pub fn sort_latitude(&self) -> f64 { self.latitude.unwrap_or(0.0) }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlace {
  pub name:       String,
  pub region:     Option<String>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub created_by: Option<Uuid>,
}

impl NewPlace {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn validate(self) -> Result<Self> {
    let name = crate::trimmed(&self.name).ok_or(Error::EmptyName)?;
    let region = self.region.as_deref().and_then(crate::trimmed);
    Ok(Self { name, region, ..self })
  }
}
