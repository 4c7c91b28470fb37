//! Ownership of driver objects.
//!
//! Every GPU object wrapper holds an [`Owner`]: a non-owning handle to the deletion queue of the
//! [`Context`](crate::context::Context) that created it. Dropping a wrapper never touches the driver directly; it
//! queues a [`Deletion`] instead, which the context applies – cache maintenance first, driver deletion second – at
//! the start of its next operation.
//!
//! If the context is already gone, its native context took the objects with it and nothing is queued.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::driver::ObjectId;
use crate::registry::ContextId;

/// A driver object waiting to be deleted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Deletion {
  Buffer(ObjectId),
  Texture(ObjectId),
  Framebuffer(ObjectId),
  VertexArray(ObjectId),
  VertexArrayOes(ObjectId),
  TransformFeedback(ObjectId),
  Program(ObjectId),
}

/// Deletion queue of a context.
pub(crate) type Graveyard = Rc<RefCell<Vec<Deletion>>>;

/// Link between an object and the context that created it.
#[derive(Clone, Debug)]
pub(crate) struct Owner {
  graveyard: Weak<RefCell<Vec<Deletion>>>,
  context: ContextId,
}

impl Owner {
  pub(crate) fn new(graveyard: &Graveyard, context: ContextId) -> Self {
    Owner {
      graveyard: Rc::downgrade(graveyard),
      context,
    }
  }

  /// Context that created the object.
  pub(crate) fn context(&self) -> ContextId {
    self.context
  }

  /// Queue the deletion of the object.
  pub(crate) fn bury(&self, deletion: Deletion) {
    match self.graveyard.upgrade() {
      Some(graveyard) => graveyard.borrow_mut().push(deletion),
      None => log::debug!(
        "{:?} outlived context {}; nothing to delete",
        deletion,
        self.context
      ),
    }
  }
}
