//! Places and the suggestions proposed for them.
//!
//! One place is selected at a time; its suggestions are fetched fresh after
//! every write and scores are recomputed from the returned votes.

use std::sync::Arc;

use trek_core::{
  audit::{ActionKind, EntityKind, NewAuditRecord},
  place::{NewPlace, Place},
  store::TripStore,
  suggestion::{self, NewSuggestion, ScoredSuggestion, Suggestion, VoteTransition, VoteValue},
};
use uuid::Uuid;

use crate::{Error, Result, audit::AuditLogger, identity::IdentityContext, snapshot, sync::Synced};

/// Which ranking of the selected place's suggestions to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranking {
  #[default]
  Top,
  New,
}

impl Ranking {
  pub fn toggled(self) -> Self {
    match self {
      Self::Top => Self::New,
      Self::New => Self::Top,
    }
  }
}

pub struct SuggestionsView<S> {
  store:       Arc<S>,
  identity:    IdentityContext,
  audit:       AuditLogger,
  places:      Vec<Place>,
  selected:    Option<Uuid>,
  suggestions: Synced<Vec<ScoredSuggestion>>,
}

impl<S: TripStore> SuggestionsView<S> {
  pub fn new(store: Arc<S>, identity: IdentityContext, audit: AuditLogger) -> Self {
    Self {
      store,
      identity,
      audit,
      places: Vec::new(),
      selected: None,
      suggestions: Synced::default(),
    }
  }

  pub fn places(&self) -> &[Place] { &self.places }

  pub fn selected_place(&self) -> Option<&Place> {
    let id = self.selected?;
    self.places.iter().find(|p| p.place_id == id)
  }

  /// Suggestions for the selected place, newest first as fetched.
  pub fn suggestions(&self) -> &[ScoredSuggestion] { self.suggestions.value() }

  /// Highest score first, ties in fetch order.
  pub fn top(&self) -> Vec<&ScoredSuggestion> { suggestion::rank_by_score(self.suggestions()) }

  /// Newest first, regardless of score.
  pub fn newest(&self) -> Vec<&ScoredSuggestion> { suggestion::rank_by_recency(self.suggestions()) }

  pub fn ranked(&self, ranking: Ranking) -> Vec<&ScoredSuggestion> {
    match ranking {
      Ranking::Top => self.top(),
      Ranking::New => self.newest(),
    }
  }

  /// Fetch places, keep the selection if it still exists (else pick the first
  /// place), then fetch its suggestions.
  pub async fn load(&mut self) -> Result<()> {
    self.places = self.store.list_places().await.map_err(Error::backend)?;
    let still_there = self
      .selected
      .is_some_and(|id| self.places.iter().any(|p| p.place_id == id));
    if !still_there {
      self.selected = self.places.first().map(|p| p.place_id);
    }
    self.fetch_suggestions().await
  }

  pub async fn select_place(&mut self, place_id: Uuid) -> Result<()> {
    if !self.places.iter().any(|p| p.place_id == place_id) {
      return Err(Error::not_found("place", place_id));
    }
    self.selected = Some(place_id);
    self.fetch_suggestions().await
  }

  async fn fetch_suggestions(&mut self) -> Result<()> {
    let fetched = match self.selected {
      Some(place) => self
        .store
        .list_suggestions(Some(place))
        .await
        .map_err(Error::backend)?,
      None => Vec::new(),
    };
    self.suggestions.reconcile(fetched);
    Ok(())
  }

  async fn refetch(&mut self) {
    if let Err(e) = self.fetch_suggestions().await {
      tracing::warn!(error = %e, "suggestion refetch failed");
    }
  }

  pub async fn add_place(&mut self, input: NewPlace) -> Result<Place> {
    let mut input = input.validate()?;
    input.created_by = self.identity.active_id();

    let place = self.store.add_place(input).await.map_err(Error::backend)?;
    self.audit.record(
      NewAuditRecord::new(ActionKind::Create, EntityKind::Place, place.place_id)
        .after(snapshot(&place)),
    );

    match self.store.list_places().await {
      Ok(places) => self.places = places,
      Err(e) => tracing::warn!(error = %e, "place refetch failed"),
    }
    if self.selected.is_none() {
      self.selected = Some(place.place_id);
      self.refetch().await;
    }
    Ok(place)
  }

  /// Propose a suggestion for the selected place; `input.place_id` is
  /// overwritten.
  pub async fn add_suggestion(&mut self, mut input: NewSuggestion) -> Result<Suggestion> {
    input.place_id = self.selected.ok_or(Error::NoPlaceSelected)?;
    let mut input = input.validate()?;
    input.created_by = self.identity.active_id();

    let created = self.store.add_suggestion(input).await.map_err(Error::backend)?;
    self.audit.record(
      NewAuditRecord::new(ActionKind::Create, EntityKind::Suggestion, created.suggestion_id)
        .after(snapshot(&created)),
    );
    self.refetch().await;
    Ok(created)
  }

  /// Cast `value` as the active user. Casting the same value twice retracts
  /// the vote; casting the other value flips it.
  pub async fn vote(&mut self, suggestion_id: Uuid, value: VoteValue) -> Result<VoteTransition> {
    let voter = self.identity.require_active()?;

    let transition = self
      .store
      .cast_vote(suggestion_id, voter.user_id, value)
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(transition.action(), EntityKind::Vote, suggestion_id)
        .before(transition.before())
        .after(transition.after()),
    );
    self.refetch().await;
    Ok(transition)
  }
}
