//! Recovery from corrupt units.
//!
//! Every record lives in its own unit, so recovering from any damage is
//! the same move: throw away what is left of the current unit and start
//! over at the next one. [`FailureBudget`] stops that from looping over a
//! file that is garbage end to end.

use std::io;

use crate::source::UnitSource;

/// Result of [`skip_to_next_unit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resynced {
  /// Bytes of the abandoned unit that were never parsed.
  pub skipped: u64,
  /// Source position where the next unit starts.
  pub next_start: u64,
  /// Whether another unit follows.
  pub has_next: bool,
}

/// Drain the current unit and enter the next one.
///
/// A unit that has been entered but not yet read from is already a
/// boundary: the call leaves it in place and reports `skipped: 0`, so
/// calling twice in a row never loses a unit.
///
/// # Errors
///
/// Propagates source failures.
pub fn skip_to_next_unit<S: UnitSource + ?Sized>(source: &mut S) -> io::Result<Resynced> {
  if source.at_unit_start() {
    return Ok(Resynced {
      skipped: 0,
      next_start: source.bytes_consumed(),
      has_next: true,
    });
  }
  let skipped = source.skip_unit()?;
  let next_start = source.bytes_consumed();
  let has_next = source.next_unit()?;
  Ok(Resynced {
    skipped,
    next_start,
    has_next,
  })
}

/// Counts consecutive invalid records against a fixed bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureBudget {
  consecutive: u32,
  limit: u32,
}

impl FailureBudget {
  /// A limit of `0` behaves like `1`: the first failure exhausts it.
  #[must_use]
  pub fn new(limit: u32) -> Self {
    Self {
      consecutive: 0,
      limit: limit.max(1),
    }
  }

  /// Count one failure. Returns `true` once the count reaches the limit.
  pub fn record_failure(&mut self) -> bool {
    self.consecutive = self.consecutive.saturating_add(1);
    self.consecutive >= self.limit
  }

  pub fn reset(&mut self) {
    self.consecutive = 0;
  }

  pub fn consecutive(&self) -> u32 {
    self.consecutive
  }

  pub fn limit(&self) -> u32 {
    self.limit
  }
}
