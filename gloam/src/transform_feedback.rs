//! Transform feedback objects.
//!
//! A [`TransformFeedbackObj`] gathers the buffers vertex shader outputs are captured into. Drivers exposing transform
//! feedback objects get a [`TransformFeedbackKind::Hardware`] one, which owns a driver object remembering its buffer
//! bindings; other drivers get a [`TransformFeedbackKind::Software`] one, which re-issues its buffer bindings every
//! time it is bound.
//!
//! A capture goes through [`CaptureState::Idle`] → [`CaptureState::Recording`] → ([`CaptureState::Paused`] ⇄
//! [`CaptureState::Recording`]) → [`CaptureState::Idle`]; any other transition is a usage error.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ptr;
use std::rc::Rc;

use crate::buffer::BufferRef;
use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};
use crate::target::BufferTarget;

/// Shared handle to a [`TransformFeedbackObj`].
pub type TransformFeedbackRef = Rc<TransformFeedbackObj>;

/// Transform feedback implementation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransformFeedbackKind {
  Hardware,
  Software,
}

/// Progress of a capture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CaptureState {
  Idle,
  Recording,
  Paused,
}

/// Capture commands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CaptureOp {
  Begin,
  Pause,
  Resume,
  End,
}

impl fmt::Display for CaptureOp {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      CaptureOp::Begin => f.write_str("begin"),
      CaptureOp::Pause => f.write_str("pause"),
      CaptureOp::Resume => f.write_str("resume"),
      CaptureOp::End => f.write_str("end"),
    }
  }
}

impl CaptureState {
  /// State after a command, or `None` if the command is invalid in this state.
  pub fn apply(self, op: CaptureOp) -> Option<CaptureState> {
    match (self, op) {
      (CaptureState::Idle, CaptureOp::Begin) => Some(CaptureState::Recording),
      (CaptureState::Recording, CaptureOp::Pause) => Some(CaptureState::Paused),
      (CaptureState::Paused, CaptureOp::Resume) => Some(CaptureState::Recording),
      (CaptureState::Recording, CaptureOp::End) | (CaptureState::Paused, CaptureOp::End) => {
        Some(CaptureState::Idle)
      }
      _ => None,
    }
  }
}

/// A transform feedback object.
#[derive(Debug)]
pub struct TransformFeedbackObj {
  id: ObjectId,
  kind: TransformFeedbackKind,
  owner: Owner,
  bases: RefCell<BTreeMap<u32, BufferRef>>,
  // (index, buffer) pairs bound since the last bind
  bound: RefCell<BTreeSet<(u32, ObjectId)>>,
  capture: Cell<CaptureState>,
}

impl TransformFeedbackObj {
  pub fn create<D>(ctx: &Context<D>) -> TransformFeedbackRef
  where
    D: Driver,
  {
    let (id, kind) = if ctx.capabilities().transform_feedback_objects {
      (
        ctx.state().driver.gen_transform_feedback(),
        TransformFeedbackKind::Hardware,
      )
    } else {
      (0, TransformFeedbackKind::Software)
    };

    log::debug!(
      "created {:?} transform feedback {} on context {}",
      kind,
      id,
      ctx.id()
    );

    Rc::new(TransformFeedbackObj {
      id,
      kind,
      owner: ctx.owner(),
      bases: RefCell::new(BTreeMap::new()),
      bound: RefCell::new(BTreeSet::new()),
      capture: Cell::new(CaptureState::Idle),
    })
  }

  /// Driver name; always `0` for software objects.
  pub fn id(&self) -> ObjectId {
    self.id
  }

  pub fn kind(&self) -> TransformFeedbackKind {
    self.kind
  }

  pub fn capture_state(&self) -> CaptureState {
    self.capture.get()
  }

  pub(crate) fn set_capture_state(&self, state: CaptureState) {
    self.capture.set(state);
  }

  /// Buffer captured into at a given index.
  pub fn buffer_base(&self, index: u32) -> Option<BufferRef> {
    self.bases.borrow().get(&index).cloned()
  }

  pub(crate) fn bind_impl<D>(&self, driver: &mut D)
  where
    D: Driver,
  {
    match self.kind {
      TransformFeedbackKind::Hardware => {
        driver.bind_transform_feedback(self.id);
        self.bound.borrow_mut().clear();
      }

      TransformFeedbackKind::Software => {
        for (&index, buffer) in self.bases.borrow().iter() {
          driver.bind_buffer_base(BufferTarget::TransformFeedback, index, buffer.id());
        }
      }
    }
  }

  /// Capture into a buffer at an index, while bound.
  ///
  /// Returns `true` if the driver was told.
  pub(crate) fn set_index<D>(&self, driver: &mut D, index: u32, buffer: &BufferRef) -> bool
  where
    D: Driver,
  {
    let changed = match self.bases.borrow_mut().insert(index, buffer.clone()) {
      Some(previous) => previous.id() != buffer.id(),
      None => true,
    };

    let issue = match self.kind {
      TransformFeedbackKind::Hardware => self.bound.borrow_mut().insert((index, buffer.id())),
      TransformFeedbackKind::Software => changed,
    };

    if issue {
      driver.bind_buffer_base(BufferTarget::TransformFeedback, index, buffer.id());
    }

    issue
  }
}

impl PartialEq for TransformFeedbackObj {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self, other)
  }
}

impl Drop for TransformFeedbackObj {
  fn drop(&mut self) {
    if self.kind == TransformFeedbackKind::Hardware {
      self.owner.bury(Deletion::TransformFeedback(self.id));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capture_transitions() {
    use CaptureOp::*;
    use CaptureState::*;

    assert_eq!(Idle.apply(Begin), Some(Recording));
    assert_eq!(Recording.apply(Pause), Some(Paused));
    assert_eq!(Paused.apply(Resume), Some(Recording));
    assert_eq!(Recording.apply(End), Some(Idle));
    assert_eq!(Paused.apply(End), Some(Idle));

    assert_eq!(Recording.apply(Begin), None);
    assert_eq!(Idle.apply(Pause), None);
    assert_eq!(Idle.apply(Resume), None);
    assert_eq!(Idle.apply(End), None);
    assert_eq!(Paused.apply(Pause), None);
    assert_eq!(Recording.apply(Resume), None);
  }
}
