//! Optimistic local state with explicit reconciliation.
//!
//! A view applies the outcome it expects immediately ([`Phase::Pending`]) and
//! replaces it with what the store reports after the next refetch
//! ([`Phase::Reconciled`]). The store's copy always wins, even when it
//! contradicts the optimistic guess.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Pending,
  Reconciled,
}

#[derive(Debug, Clone)]
pub struct Synced<T> {
  value: T,
  phase: Phase,
}

impl<T: Default> Default for Synced<T> {
  fn default() -> Self { Self::reconciled(T::default()) }
}

impl<T> Synced<T> {
  pub fn reconciled(value: T) -> Self { Self { value, phase: Phase::Reconciled } }

  pub fn apply_optimistic(&mut self, value: T) {
    self.value = value;
    self.phase = Phase::Pending;
  }

  pub fn reconcile(&mut self, authoritative: T) {
    self.value = authoritative;
    self.phase = Phase::Reconciled;
  }

  /// Edit the value in place and mark it pending.
  pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
    f(&mut self.value);
    self.phase = Phase::Pending;
  }

  pub fn value(&self) -> &T { &self.value }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn is_pending(&self) -> bool { self.phase == Phase::Pending }
}
