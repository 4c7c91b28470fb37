//! Binding caches.
//!
//! A [`BindingCache`] mirrors which object is bound to each target of a binding namespace (buffer targets, texture
//! targets per unit, framebuffer targets). Each target owns a [`StateStack`] of object ids, so that scoped overrides
//! can be restored.
//!
//! The cache is a best-effort mirror: anything that changes the driver bindings behind its back must be followed by
//! an invalidation, after which the next bind always reaches the driver.

use std::collections::BTreeMap;

use crate::driver::ObjectId;
use crate::stack::{StackUnderflow, StateStack};

/// Cached bindings of a namespace, keyed by target.
#[derive(Clone, Debug)]
pub struct BindingCache<K> {
  stacks: BTreeMap<K, StateStack<ObjectId>>,
}

impl<K> Default for BindingCache<K>
where
  K: Copy + Ord,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K> BindingCache<K>
where
  K: Copy + Ord,
{
  /// Cache with every binding unknown.
  pub fn new() -> Self {
    BindingCache {
      stacks: BTreeMap::new(),
    }
  }

  fn stack_mut(&mut self, target: K) -> &mut StateStack<ObjectId> {
    self.stacks.entry(target).or_insert_with(StateStack::unknown)
  }

  /// Bind an object in place.
  ///
  /// Returns `true` if the driver must be told.
  pub fn bind(&mut self, target: K, id: ObjectId) -> bool {
    self.stack_mut(target).set(id)
  }

  /// Bind an object, remembering the previous binding.
  ///
  /// Returns `true` if the driver must be told.
  pub fn push(&mut self, target: K, id: ObjectId) -> bool {
    self.stack_mut(target).push(id)
  }

  /// Restore the binding that was active before the last [`BindingCache::push`].
  ///
  /// Returns the object to bind if the driver must be told, `None` if the restored binding is already active or if it
  /// is unknown.
  pub fn pop(&mut self, target: K) -> Result<Option<ObjectId>, StackUnderflow> {
    let stack = self.stacks.get_mut(&target).ok_or(StackUnderflow)?;

    if !stack.pop()? {
      return Ok(None);
    }

    let restored = stack.get().copied();

    if restored.is_none() {
      log::warn!("restoring an unknown binding; the driver binding is left as is");
    }

    Ok(restored)
  }

  /// Currently bound object, if known.
  pub fn get(&self, target: K) -> Option<ObjectId> {
    self.stacks.get(&target).and_then(|stack| stack.get().copied())
  }

  /// Record a binding queried from the driver.
  ///
  /// Only fills an unknown binding; a known one is left untouched.
  pub fn seed(&mut self, target: K, id: ObjectId) {
    self.stack_mut(target).seed(id);
  }

  /// Record a binding the driver changed as a side effect of another command.
  pub fn assume(&mut self, target: K, id: ObjectId) {
    self.stack_mut(target).set(id);
  }

  /// Forget the binding of a target.
  pub fn invalidate(&mut self, target: K) {
    if let Some(stack) = self.stacks.get_mut(&target) {
      stack.invalidate();
    }
  }

  /// Forget the bindings of every target.
  pub fn invalidate_all(&mut self) {
    for stack in self.stacks.values_mut() {
      stack.invalidate();
    }
  }

  /// Account for the deletion of an object.
  ///
  /// Deleting an object reverts its bindings to `0`. Saved bindings referring to it are replaced as well, so that
  /// popping never rebinds a dead object.
  pub fn forget(&mut self, id: ObjectId) {
    if id == 0 {
      return;
    }

    for stack in self.stacks.values_mut() {
      stack.replace(&id, 0);
    }
  }

  /// Targets and their current binding, if known.
  pub fn iter(&self) -> impl Iterator<Item = (K, Option<ObjectId>)> + '_ {
    self
      .stacks
      .iter()
      .map(|(target, stack)| (*target, stack.get().copied()))
  }

  /// Targets with pushes not matched by a pop, along with their depth.
  pub fn unbalanced(&self) -> impl Iterator<Item = (K, usize)> + '_ {
    self
      .stacks
      .iter()
      .filter(|(_, stack)| !stack.is_balanced())
      .map(|(target, stack)| (*target, stack.depth()))
  }

  /// Whether every push was matched by a pop.
  pub fn is_balanced(&self) -> bool {
    self.stacks.values().all(StateStack::is_balanced)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::target::BufferTarget;

  #[test]
  fn first_bind_always_reaches_the_driver() {
    let mut cache = BindingCache::new();

    assert!(cache.bind(BufferTarget::Array, 0));
    assert!(!cache.bind(BufferTarget::Array, 0));
    assert!(cache.bind(BufferTarget::Array, 3));
    assert_eq!(cache.get(BufferTarget::Array), Some(3));
    assert_eq!(cache.get(BufferTarget::Uniform), None);
  }

  #[test]
  fn targets_are_independent() {
    let mut cache = BindingCache::new();
    cache.bind(BufferTarget::Array, 1);
    cache.bind(BufferTarget::Uniform, 2);

    assert_eq!(cache.get(BufferTarget::Array), Some(1));
    assert_eq!(cache.get(BufferTarget::Uniform), Some(2));
  }

  #[test]
  fn pop_returns_what_to_restore() {
    let mut cache = BindingCache::new();
    cache.seed(BufferTarget::Array, 1);

    assert!(cache.push(BufferTarget::Array, 2));
    assert!(!cache.push(BufferTarget::Array, 2));
    assert_eq!(cache.pop(BufferTarget::Array), Ok(None));
    assert_eq!(cache.pop(BufferTarget::Array), Ok(Some(1)));
    assert_eq!(cache.pop(BufferTarget::Array), Err(StackUnderflow));
    assert_eq!(cache.pop(BufferTarget::Uniform), Err(StackUnderflow));
    assert!(cache.is_balanced());
  }

  #[test]
  fn invalidate_forces_rebind() {
    let mut cache = BindingCache::new();
    cache.bind(BufferTarget::Array, 1);
    cache.invalidate(BufferTarget::Array);

    assert_eq!(cache.get(BufferTarget::Array), None);
    assert!(cache.bind(BufferTarget::Array, 1));

    cache.bind(BufferTarget::Uniform, 1);
    cache.invalidate_all();
    assert!(cache.bind(BufferTarget::Uniform, 1));
  }

  #[test]
  fn forget_unbinds_deleted_objects() {
    let mut cache = BindingCache::new();
    cache.bind(BufferTarget::Array, 5);
    cache.push(BufferTarget::Uniform, 5);
    cache.bind(BufferTarget::CopyRead, 6);

    cache.forget(5);

    assert_eq!(cache.get(BufferTarget::Array), Some(0));
    assert_eq!(cache.get(BufferTarget::Uniform), Some(0));
    assert_eq!(cache.get(BufferTarget::CopyRead), Some(6));
  }

  #[test]
  fn unbalanced_targets_are_reported() {
    let mut cache = BindingCache::new();
    cache.push(BufferTarget::Array, 1);
    cache.push(BufferTarget::Array, 2);

    let unbalanced: Vec<_> = cache.unbalanced().collect();
    assert_eq!(unbalanced, vec![(BufferTarget::Array, 3)]);
  }
}
