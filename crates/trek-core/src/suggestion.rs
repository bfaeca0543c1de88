//! Suggestions and votes.
//!
//! A suggestion is a proposed option (activity, food, …) attached to a place.
//! Each user may hold at most one vote per suggestion; the score is always
//! recomputed from the current vote set, never maintained incrementally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, audit::ActionKind, user::User};

// ─── Suggestions ─────────────────────────────────────────────────────────────

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
pub enum Category {
  #[default]
  Activity,
  Food,
  Hotel,
  Transport,
  Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
  pub suggestion_id: Uuid,
  pub place_id:      Uuid,
  pub title:         String,
  pub description:   Option<String>,
  pub category:      Category,
  pub link:          Option<String>,
  /// Free text, e.g. "200k VND".
  pub cost_estimate: Option<String>,
  pub created_at:    DateTime<Utc>,
  pub created_by:    Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSuggestion {
  pub place_id:      Uuid,
  pub title:         String,
  pub description:   Option<String>,
  pub category:      Category,
  pub link:          Option<String>,
  pub cost_estimate: Option<String>,
  pub created_by:    Option<Uuid>,
}

impl NewSuggestion {
  pub fn new(place_id: Uuid, title: impl Into<String>) -> Self {
    Self { place_id, title: title.into(), ..Self::default() }
  }

  /// Trim text fields, drop blank optionals, and check the title and link.
  pub fn validate(self) -> Result<Self> {
    let title = crate::trimmed(&self.title).ok_or(Error::EmptyTitle)?;
    let link = self.link.as_deref().and_then(crate::trimmed);
    if let Some(link) = &link
      && !is_http_url(link)
    {
      return Err(Error::InvalidLink(link.clone()));
    }
    Ok(Self {
      title,
      link,
      description: self.description.as_deref().and_then(crate::trimmed),
      cost_estimate: self.cost_estimate.as_deref().and_then(crate::trimmed),
      ..self
    })
  }
}

/// `^https?://.+`
pub fn is_http_url(link: &str) -> bool {
  link
    .strip_prefix("https://")
    .or_else(|| link.strip_prefix("http://"))
    .is_some_and(|rest| !rest.is_empty())
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// Direction of a vote. Only ±1 exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum VoteValue {
  Up,
  Down,
}

impl VoteValue {
  pub fn as_i64(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }
}

impl From<VoteValue> for i64 {
  fn from(v: VoteValue) -> Self { v.as_i64() }
}

impl TryFrom<i64> for VoteValue {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      1 => Ok(Self::Up),
      -1 => Ok(Self::Down),
      other => Err(Error::InvalidVoteValue(other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
  pub vote_id:       Uuid,
  pub suggestion_id: Uuid,
  pub user_id:       Uuid,
  pub value:         VoteValue,
  pub created_at:    DateTime<Utc>,
}

/// What casting a vote does to the voter's existing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
  /// No previous vote: a new row is inserted.
  Cast { value: VoteValue },
  /// Same direction cast twice: the vote is withdrawn.
  Retract { previous: VoteValue },
  /// Opposite direction: the existing row is updated in place.
  Change { previous: VoteValue, value: VoteValue },
}

impl VoteTransition {
  pub fn decide(existing: Option<VoteValue>, cast: VoteValue) -> Self {
    match existing {
      None => Self::Cast { value: cast },
      Some(previous) if previous == cast => Self::Retract { previous },
      Some(previous) => Self::Change { previous, value: cast },
    }
  }

  pub fn action(&self) -> ActionKind {
    match self {
      Self::Cast { .. } => ActionKind::Create,
      Self::Retract { .. } => ActionKind::Delete,
      Self::Change { .. } => ActionKind::Update,
    }
  }

  /// The voter's vote after the transition.
  pub fn resulting(&self) -> Option<VoteValue> {
    match *self {
      Self::Cast { value } | Self::Change { value, .. } => Some(value),
      Self::Retract { .. } => None,
    }
  }

  /// Audit payload before the transition: `{"value": n}` or nothing.
  pub fn before(&self) -> Option<Value> {
    match *self {
      Self::Cast { .. } => None,
      Self::Retract { previous } | Self::Change { previous, .. } => {
        Some(json!({ "value": previous.as_i64() }))
      }
    }
  }

  pub fn after(&self) -> Option<Value> {
    self.resulting().map(|v| json!({ "value": v.as_i64() }))
  }
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Net sum of vote values.
pub fn score(votes: &[Vote]) -> i64 { votes.iter().map(|v| v.value.as_i64()).sum() }

/// A suggestion joined with its creator and votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSuggestion {
  pub suggestion: Suggestion,
  pub creator:    Option<User>,
  pub votes:      Vec<Vote>,
  pub score:      i64,
}

impl ScoredSuggestion {
  pub fn new(suggestion: Suggestion, creator: Option<User>, votes: Vec<Vote>) -> Self {
    let score = score(&votes);
    Self { suggestion, creator, votes, score }
  }

  pub fn id(&self) -> Uuid { self.suggestion.suggestion_id }

  /// The vote `user_id` currently holds on this suggestion, if any.
  pub fn vote_of(&self, user_id: Uuid) -> Option<VoteValue> {
    self
      .votes
      .iter()
      .find(|v| v.user_id == user_id)
      .map(|v| v.value)
  }
}

/// Highest score first; equal scores keep their input order.
pub fn rank_by_score(suggestions: &[ScoredSuggestion]) -> Vec<&ScoredSuggestion> {
  let mut ranked: Vec<_> = suggestions.iter().collect();
  ranked.sort_by(|a, b| b.score.cmp(&a.score));
  ranked
}

/// Newest first, regardless of score.
pub fn rank_by_recency(suggestions: &[ScoredSuggestion]) -> Vec<&ScoredSuggestion> {
  let mut ranked: Vec<_> = suggestions.iter().collect();
  ranked.sort_by(|a, b| b.suggestion.created_at.cmp(&a.suggestion.created_at));
  ranked
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn suggestion(title: &str, age_minutes: i64) -> Suggestion {
    Suggestion {
      suggestion_id: Uuid::new_v4(),
      place_id:      Uuid::nil(),
      title:         title.into(),
      description:   None,
      category:      Category::Food,
      link:          None,
      cost_estimate: None,
      created_at:    Utc::now() - Duration::minutes(age_minutes),
      created_by:    None,
    }
  }

  fn votes(suggestion_id: Uuid, values: &[i64]) -> Vec<Vote> {
    values
      .iter()
      .map(|&v| Vote {
        vote_id: Uuid::new_v4(),
        suggestion_id,
        user_id: Uuid::new_v4(),
        value: VoteValue::try_from(v).unwrap(),
        created_at: Utc::now(),
      })
      .collect()
  }

  #[test]
  fn score_is_net_sum() {
    let s = suggestion("Street food tour", 0);
    let scored = ScoredSuggestion::new(s.clone(), None, votes(s.suggestion_id, &[1, 1, -1]));
    assert_eq!(scored.score, 1);
    assert_eq!(score(&[]), 0);
  }

  #[test]
  fn only_unit_votes_exist() {
    assert!(matches!(VoteValue::try_from(2), Err(Error::InvalidVoteValue(2))));
    assert!(matches!(VoteValue::try_from(0), Err(Error::InvalidVoteValue(0))));
    assert!(serde_json::from_str::<VoteValue>("5").is_err());
    assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "-1");
  }

  #[test]
  fn transitions() {
    use VoteValue::*;
    assert_eq!(VoteTransition::decide(None, Up), VoteTransition::Cast { value: Up });
    assert_eq!(
      VoteTransition::decide(Some(Up), Up),
      VoteTransition::Retract { previous: Up }
    );
    assert_eq!(
      VoteTransition::decide(Some(Up), Down),
      VoteTransition::Change { previous: Up, value: Down }
    );
  }

  #[test]
  fn transition_audit_payloads() {
    let cast = VoteTransition::Cast { value: VoteValue::Up };
    assert_eq!(cast.action(), ActionKind::Create);
    assert_eq!(cast.before(), None);
    assert_eq!(cast.after(), Some(json!({ "value": 1 })));

    let retract = VoteTransition::Retract { previous: VoteValue::Down };
    assert_eq!(retract.action(), ActionKind::Delete);
    assert_eq!(retract.before(), Some(json!({ "value": -1 })));
    assert_eq!(retract.after(), None);

    let change = VoteTransition::Change { previous: VoteValue::Up, value: VoteValue::Down };
    assert_eq!(change.action(), ActionKind::Update);
    assert_eq!(change.resulting(), Some(VoteValue::Down));
  }

  #[test]
  fn top_and_new_orderings() {
    let tour = suggestion("Street food tour", 30);
    let museum = suggestion("War museum", 10);
    let market = suggestion("Ben Thanh market", 20);
    let list = vec![
      ScoredSuggestion::new(museum.clone(), None, vec![]),
      ScoredSuggestion::new(tour.clone(), None, votes(tour.suggestion_id, &[1, 1, -1])),
      ScoredSuggestion::new(market.clone(), None, vec![]),
    ];

    let top: Vec<_> = rank_by_score(&list).iter().map(|s| s.suggestion.title.as_str()).collect();
    assert_eq!(top, ["Street food tour", "War museum", "Ben Thanh market"]);

    let new: Vec<_> = rank_by_recency(&list).iter().map(|s| s.suggestion.title.as_str()).collect();
    assert_eq!(new, ["War museum", "Ben Thanh market", "Street food tour"]);
  }

  #[test]
  fn link_validation() {
    let place = Uuid::new_v4();
    let mut input = NewSuggestion::new(place, "Cooking class");
    input.link = Some("ftp://example.com".into());
    assert!(matches!(input.clone().validate(), Err(Error::InvalidLink(_))));

    input.link = Some("https://".into());
    assert!(input.clone().validate().is_err());

    input.link = Some("  ".into());
    assert_eq!(input.clone().validate().unwrap().link, None);

    input.link = Some("http://example.com/class".into());
    assert!(input.validate().is_ok());
  }

  #[test]
  fn blank_title_is_rejected() {
    let input = NewSuggestion::new(Uuid::new_v4(), "  ");
    assert!(matches!(input.validate(), Err(Error::EmptyTitle)));
  }
}
