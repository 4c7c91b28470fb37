//! GPU buffers.
//!
//! A [`Buffer`] owns a driver buffer object along with the target it is meant to be bound to. Storage operations bind
//! the buffer in a scoped way, leaving the previous binding of the target untouched.

use std::cell::Cell;
use std::rc::Rc;

use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};
use crate::target::BufferTarget;

/// Expected access pattern of a buffer storage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferUsage {
  StreamDraw,
  StreamRead,
  StreamCopy,
  StaticDraw,
  StaticRead,
  StaticCopy,
  DynamicDraw,
  DynamicRead,
  DynamicCopy,
}

/// Shared handle to a [`Buffer`].
pub type BufferRef = Rc<Buffer>;

/// A buffer object.
#[derive(Debug)]
pub struct Buffer {
  id: ObjectId,
  target: BufferTarget,
  usage: BufferUsage,
  size: Cell<usize>,
  owner: Owner,
}

impl Buffer {
  /// Create a buffer and allocate its storage, optionally filling it.
  ///
  /// When `data` is provided, its length wins over `size`.
  pub fn create<D>(
    ctx: &Context<D>,
    target: BufferTarget,
    size: usize,
    data: Option<&[u8]>,
    usage: BufferUsage,
  ) -> BufferRef
  where
    D: Driver,
  {
    let id = ctx.state().driver.gen_buffer();

    log::debug!("created buffer {} ({:?}) on context {}", id, target, ctx.id());

    let buffer = Rc::new(Buffer {
      id,
      target,
      usage,
      size: Cell::new(0),
      owner: ctx.owner(),
    });

    buffer.buffer_data(ctx, size, data);
    buffer
  }

  pub fn id(&self) -> ObjectId {
    self.id
  }

  pub fn target(&self) -> BufferTarget {
    self.target
  }

  pub fn usage(&self) -> BufferUsage {
    self.usage
  }

  /// Size of the storage, in bytes.
  pub fn size(&self) -> usize {
    self.size.get()
  }

  /// Bind the buffer to its target.
  pub fn bind<D>(&self, ctx: &Context<D>)
  where
    D: Driver,
  {
    ctx.bind_buffer(self.target, self.id);
  }

  /// Reallocate the storage, optionally filling it.
  pub fn buffer_data<D>(&self, ctx: &Context<D>, size: usize, data: Option<&[u8]>)
  where
    D: Driver,
  {
    let size = data.map_or(size, <[u8]>::len);

    ctx.push_buffer_binding(self.target, self.id);
    ctx.state().driver.buffer_data(self.target, size, data, self.usage);
    ctx.pop_buffer_binding(self.target);

    self.size.set(size);
  }

  /// Overwrite part of the storage.
  pub fn buffer_sub_data<D>(&self, ctx: &Context<D>, offset: usize, data: &[u8])
  where
    D: Driver,
  {
    if offset + data.len() > self.size() {
      log::warn!(
        "writing {} bytes at offset {} overflows buffer {} of {} bytes",
        data.len(),
        offset,
        self.id,
        self.size()
      );
    }

    ctx.push_buffer_binding(self.target, self.id);
    ctx.state().driver.buffer_sub_data(self.target, offset, data);
    ctx.pop_buffer_binding(self.target);
  }

  /// Grow the storage to at least `size` bytes. The content is lost when growing.
  pub fn ensure_minimum_size<D>(&self, ctx: &Context<D>, size: usize)
  where
    D: Driver,
  {
    if size > self.size() {
      self.buffer_data(ctx, size, None);
    }
  }
}

impl PartialEq for Buffer {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && self.owner.context() == other.owner.context()
  }
}

impl Drop for Buffer {
  fn drop(&mut self) {
    self.owner.bury(Deletion::Buffer(self.id));
  }
}
