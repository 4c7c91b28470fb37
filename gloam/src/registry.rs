//! Current context registry.
//!
//! Graphics APIs have a notion of _current context_: the one every command issued by a thread goes to. A
//! [`ContextRegistry`] tracks which [`Context`](crate::context::Context) is current on which thread. It is shared by
//! all the contexts of an application and can be freely sent across threads; contexts themselves cannot.
//!
//! A context can be current on at most one thread at a time, and a thread has at most one current context.

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Unique identifier of a context within a registry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContextId(u64);

impl ContextId {
  pub(crate) fn from_raw(raw: u64) -> Self {
    ContextId(raw)
  }

  pub fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for ContextId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Error returned when making a context current while it is current on another thread.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrentElsewhere {
  pub context: ContextId,
  pub thread: ThreadId,
}

impl fmt::Display for CurrentElsewhere {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "context {} is already current on thread {:?}",
      self.context, self.thread
    )
  }
}

impl error::Error for CurrentElsewhere {}

#[derive(Debug, Default)]
struct Registry {
  next_id: u64,
  current: HashMap<ThreadId, ContextId>,
}

/// Registry of current contexts, keyed by thread.
#[derive(Clone, Debug, Default)]
pub struct ContextRegistry {
  inner: Arc<Mutex<Registry>>,
}

impl ContextRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  // A panic while holding the lock cannot leave the map half-updated.
  fn lock(&self) -> MutexGuard<Registry> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn allocate_id(&self) -> ContextId {
    let mut registry = self.lock();
    registry.next_id += 1;
    ContextId(registry.next_id)
  }

  /// Context current on the calling thread.
  pub fn current(&self) -> Option<ContextId> {
    self.current_on(thread::current().id())
  }

  /// Context current on a given thread.
  pub fn current_on(&self, thread: ThreadId) -> Option<ContextId> {
    self.lock().current.get(&thread).copied()
  }

  /// Whether a context is current on the calling thread.
  pub fn is_current(&self, context: ContextId) -> bool {
    self.current() == Some(context)
  }

  /// Make a context current on the calling thread, replacing the previous one.
  pub fn make_current(&self, context: ContextId) -> Result<(), CurrentElsewhere> {
    let this_thread = thread::current().id();
    let mut registry = self.lock();

    let elsewhere = registry
      .current
      .iter()
      .find(|&(thread, id)| *id == context && *thread != this_thread)
      .map(|(thread, _)| *thread);

    if let Some(thread) = elsewhere {
      return Err(CurrentElsewhere { context, thread });
    }

    registry.current.insert(this_thread, context);
    Ok(())
  }

  /// Leave the calling thread without a current context.
  pub fn clear_current(&self) {
    self.lock().current.remove(&thread::current().id());
  }

  /// Forget a context on every thread.
  pub(crate) fn release(&self, context: ContextId) {
    self.lock().current.retain(|_, id| *id != context);
  }
}
