use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Read-only view of a decoder's position, shareable across threads.
///
/// The decoder publishes after every operation; any clone may be polled
/// from another thread while decoding runs.
#[derive(Clone, Debug)]
pub struct ProgressHandle {
  consumed: Arc<AtomicU64>,
  finished: Arc<AtomicBool>,
  total: u64,
}

impl ProgressHandle {
  #[must_use]
  pub fn new(total: u64) -> Self {
    Self {
      consumed: Arc::new(AtomicU64::new(0)),
      finished: Arc::new(AtomicBool::new(false)),
      total,
    }
  }

  /// Record a new position. Positions never move backwards.
  pub fn publish(&self, position: u64) {
    self.consumed.fetch_max(position, Ordering::Relaxed);
  }

  pub fn position(&self) -> u64 {
    self.consumed.load(Ordering::Relaxed)
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  /// Mark every unit as consumed.
  pub fn finish(&self) {
    self.finished.store(true, Ordering::Relaxed);
  }

  pub fn is_finished(&self) -> bool {
    self.finished.load(Ordering::Relaxed)
  }

  /// `position / total`, clamped to `[0.0, 1.0]`, and `1.0` once
  /// finished. With an unknown total (`0`) it stays at `0.0` until then.
  #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
  pub fn fraction(&self) -> f32 {
    if self.is_finished() {
      return 1.0;
    }
    if self.total == 0 {
      return 0.0;
    }
    (self.position() as f64 / self.total as f64).min(1.0) as f32
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_at_zero_and_clamps() {
    let handle = ProgressHandle::new(200);
    assert!(handle.fraction().abs() < f32::EPSILON);
    handle.publish(100);
    assert!((handle.fraction() - 0.5).abs() < f32::EPSILON);
    handle.publish(500);
    assert!((handle.fraction() - 1.0).abs() < f32::EPSILON);
  }

  #[test]
  fn never_moves_backwards() {
    let handle = ProgressHandle::new(10);
    handle.publish(7);
    handle.publish(3);
    assert_eq!(handle.position(), 7);
  }

  #[test]
  fn unknown_length_waits_for_finish() {
    let handle = ProgressHandle::new(0);
    handle.publish(4096);
    assert!(handle.fraction().abs() < f32::EPSILON);
    handle.clone().finish();
    assert!(handle.is_finished());
    assert!((handle.fraction() - 1.0).abs() < f32::EPSILON);
  }

  #[test]
  fn clones_share_state_across_threads() {
    let handle = ProgressHandle::new(10);
    let watcher = handle.clone();
    std::thread::spawn(move || handle.publish(10)).join().unwrap();
    assert_eq!(watcher.position(), 10);
  }
}
