//! One-shot completion gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Set-once gate that any number of threads can poll or wait on.
///
/// There is no reset; once set it stays set.
#[derive(Debug, Default)]
pub struct CompletionSignal {
  set: AtomicBool,
  lock: Mutex<()>,
  cvar: Condvar,
}

impl CompletionSignal {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the gate and wake all waiters.
  ///
  /// Returns true only for the call that performed the transition; setting an
  /// already set gate is a no-op.
  pub fn set(&self) -> bool {
    let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    if self.set.swap(true, Ordering::AcqRel) {
      return false;
    }
    self.cvar.notify_all();
    true
  }

  #[inline]
  pub fn is_set(&self) -> bool {
    self.set.load(Ordering::Acquire)
  }

  /// Block until set.
  pub fn wait(&self) {
    let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    while !self.is_set() {
      guard = self.cvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
    }
  }

  /// Block until set or until `timeout` elapses. Returns whether the gate is set.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    let (_guard, _) = self
      .cvar
      .wait_timeout_while(guard, timeout, |_| !self.is_set())
      .unwrap_or_else(PoisonError::into_inner);
    self.is_set()
  }
}
