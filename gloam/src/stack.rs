//! State stacks.
//!
//! A [`StateStack`] is the building block of every cached piece of GPU state in a
//! [`Context`](crate::context::Context). Its top is the value the driver is believed to hold; pushing a new value
//! layers it on top of the previous one and popping restores it. Every operation reports whether the driver value
//! actually changes, so that the caller only issues a driver command when it has to.
//!
//! A stack always has a floor of depth 1 – the value the state had before any scope was entered. That floor can be
//! _unknown_ (never queried from the driver, or explicitly invalidated); an unknown top compares unequal to
//! everything, forcing the next write to reach the driver.

use std::error;
use std::fmt;

/// Error returned when popping a stack already at its floor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StackUnderflow;

impl fmt::Display for StackUnderflow {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("cannot pop a state stack below its floor")
  }
}

impl error::Error for StackUnderflow {}

/// A stack of cached state values.
#[derive(Clone, Debug)]
pub struct StateStack<T> {
  values: Vec<Option<T>>,
}

impl<T> StateStack<T>
where
  T: PartialEq,
{
  /// Create a stack which floor is a known value.
  pub fn new(initial: T) -> Self {
    StateStack {
      values: vec![Some(initial)],
    }
  }

  /// Create a stack which floor is unknown.
  pub fn unknown() -> Self {
    StateStack { values: vec![None] }
  }

  /// Push a value.
  ///
  /// Returns `true` if the new top differs from the previous one.
  pub fn push(&mut self, value: T) -> bool {
    let changed = self.differs(&value);
    self.values.push(Some(value));
    changed
  }

  /// Pop the top value.
  ///
  /// Returns `true` if the new top differs from the value just removed. Popping the floor is an error.
  pub fn pop(&mut self) -> Result<bool, StackUnderflow> {
    if self.values.len() <= 1 {
      log::error!("state stack underflow");
      return Err(StackUnderflow);
    }

    let removed = self.values.pop().flatten();

    let changed = match (self.values.last(), removed) {
      (Some(Some(top)), Some(ref removed)) => top != removed,
      _ => true,
    };

    Ok(changed)
  }

  /// Replace the top value in place.
  ///
  /// Returns `true` if the value changed.
  pub fn set(&mut self, value: T) -> bool {
    let changed = self.differs(&value);

    if let Some(top) = self.values.last_mut() {
      *top = Some(value);
    }

    changed
  }

  /// Current top, if known.
  pub fn get(&self) -> Option<&T> {
    self.values.last().and_then(Option::as_ref)
  }

  /// Fill an unknown top with a value without considering it a change.
  ///
  /// A known top is left untouched.
  pub fn seed(&mut self, value: T) {
    if let Some(top @ None) = self.values.last_mut() {
      *top = Some(value);
    }
  }

  /// Mark the top as unknown.
  ///
  /// The next [`StateStack::set`] or [`StateStack::push`] is reported as a change, whatever its value.
  pub fn invalidate(&mut self) {
    if let Some(top) = self.values.last_mut() {
      *top = None;
    }
  }

  /// Replace every occurrence of a value, at any depth.
  ///
  /// Returns `true` if the top was affected.
  pub fn replace(&mut self, old: &T, new: T) -> bool
  where
    T: Clone,
  {
    let mut top_affected = false;
    let last = self.values.len() - 1;

    for (i, value) in self.values.iter_mut().enumerate() {
      if value.as_ref() == Some(old) {
        *value = Some(new.clone());
        top_affected |= i == last;
      }
    }

    top_affected
  }

  /// Number of values in the stack, floor included.
  pub fn depth(&self) -> usize {
    self.values.len()
  }

  /// Whether every push has been matched by a pop.
  pub fn is_balanced(&self) -> bool {
    self.values.len() == 1
  }

  fn differs(&self, value: &T) -> bool {
    match self.get() {
      Some(top) => top != value,
      None => true,
    }
  }
}
