//! Vertex array objects.
//!
//! A [`Vao`] captures the vertex layout of a draw: which attributes are enabled, where they are sourced from, and
//! which element array buffer holds the indices. Three implementations exist, picked once by capability detection:
//!
//! - [`VaoKind::Hardware`]: a native vertex array object;
//! - [`VaoKind::Es`]: a native vertex array object driven through `OES_vertex_array_object`;
//! - [`VaoKind::Software`]: an emulation that records the layout and replays it on every bind.
//!
//! Every kind records the buffers bound while it is bound, so that the context knows which element array buffer a
//! vertex array brings along when it gets bound. Vertex arrays are bound through the
//! [`Context`](crate::context::Context) only.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::ptr;
use std::rc::Rc;

use crate::binding::BindingCache;
use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};
use crate::target::BufferTarget;
use crate::vertex::AttribPointer;

/// Shared handle to a [`Vao`].
pub type VaoRef = Rc<Vao>;

/// Vertex array implementation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VaoKind {
  Hardware,
  Es,
  Software,
}

/// State of a single vertex attribute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VertexAttrib {
  pub enabled: bool,
  pub pointer: Option<AttribPointer>,
  /// Array buffer bound when the pointer was set.
  pub array_buffer: ObjectId,
}

/// Recorded vertex layout.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VaoLayout {
  array_buffer: Option<ObjectId>,
  element_buffer: Option<ObjectId>,
  attribs: BTreeMap<u32, VertexAttrib>,
}

impl VaoLayout {
  /// Array buffer last bound, if any.
  pub fn array_buffer(&self) -> Option<ObjectId> {
    self.array_buffer
  }

  /// Element array buffer last bound, if any.
  pub fn element_buffer(&self) -> Option<ObjectId> {
    self.element_buffer
  }

  pub fn attrib(&self, index: u32) -> Option<&VertexAttrib> {
    self.attribs.get(&index)
  }

  pub fn attribs(&self) -> impl Iterator<Item = (u32, &VertexAttrib)> {
    self.attribs.iter().map(|(index, attrib)| (*index, attrib))
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: ObjectId) {
    match target {
      BufferTarget::Array => self.array_buffer = Some(id),
      BufferTarget::ElementArray => self.element_buffer = Some(id),
      _ => (),
    }
  }

  fn forget_buffer(&mut self, id: ObjectId) {
    if self.array_buffer == Some(id) {
      self.array_buffer = Some(0);
    }

    if self.element_buffer == Some(id) {
      self.element_buffer = Some(0);
    }

    for attrib in self.attribs.values_mut().filter(|attrib| attrib.array_buffer == id) {
      attrib.array_buffer = 0;
    }
  }
}

/// A vertex array.
#[derive(Debug)]
pub struct Vao {
  id: ObjectId,
  kind: VaoKind,
  owner: Owner,
  layout: RefCell<VaoLayout>,
}

impl Vao {
  /// Create a vertex array of the best kind the context supports.
  pub fn create<D>(ctx: &Context<D>) -> VaoRef
  where
    D: Driver,
  {
    let kind = ctx.vao_kind();
    let mut state = ctx.state();

    let (id, element_buffer) = match kind {
      VaoKind::Hardware => (state.driver.gen_vertex_array(), Some(0)),
      VaoKind::Es => (state.driver.gen_vertex_array_oes(), Some(0)),
      VaoKind::Software => (0, None),
    };

    log::debug!("created {:?} vertex array {} on context {}", kind, id, ctx.id());

    let vao = Rc::new(Vao {
      id,
      kind,
      owner: ctx.owner(),
      layout: RefCell::new(VaoLayout {
        element_buffer,
        ..VaoLayout::default()
      }),
    });

    state.track_vao(&vao);
    vao
  }

  /// Driver name; always `0` for software vertex arrays.
  pub fn id(&self) -> ObjectId {
    self.id
  }

  pub fn kind(&self) -> VaoKind {
    self.kind
  }

  pub fn is_software(&self) -> bool {
    self.kind == VaoKind::Software
  }

  pub fn layout(&self) -> Ref<VaoLayout> {
    self.layout.borrow()
  }

  pub(crate) fn bind_impl<D>(&self, driver: &mut D, buffers: &mut BindingCache<BufferTarget>)
  where
    D: Driver,
  {
    let layout = self.layout.borrow();

    match self.kind {
      VaoKind::Hardware | VaoKind::Es => {
        if self.kind == VaoKind::Es {
          driver.bind_vertex_array_oes(self.id);
        } else {
          driver.bind_vertex_array(self.id);
        }

        match layout.element_buffer {
          Some(id) => buffers.assume(BufferTarget::ElementArray, id),
          None => buffers.invalidate(BufferTarget::ElementArray),
        }
      }

      VaoKind::Software => {
        for (&index, attrib) in layout.attribs.iter().filter(|(_, attrib)| attrib.enabled) {
          driver.enable_vertex_attrib_array(index);

          if let Some(pointer) = attrib.pointer {
            driver.bind_buffer(BufferTarget::Array, attrib.array_buffer);
            driver.vertex_attrib_pointer(pointer);
            buffers.assume(BufferTarget::Array, attrib.array_buffer);
          }
        }

        for &(target, binding) in &[
          (BufferTarget::Array, layout.array_buffer),
          (BufferTarget::ElementArray, layout.element_buffer),
        ] {
          if let Some(id) = binding {
            driver.bind_buffer(target, id);
            buffers.assume(target, id);
          }
        }
      }
    }
  }

  /// Leave the vertex array before binding another one.
  ///
  /// Only software vertex arrays have anything to undo.
  pub(crate) fn unbind_impl<D>(&self, driver: &mut D)
  where
    D: Driver,
  {
    if self.kind == VaoKind::Software {
      let layout = self.layout.borrow();

      for (&index, _) in layout.attribs.iter().filter(|(_, attrib)| attrib.enabled) {
        driver.disable_vertex_attrib_array(index);
      }
    }
  }

  /// Record and issue an array or element array buffer bind while bound.
  pub(crate) fn reflect_bind_buffer<D>(&self, driver: &mut D, target: BufferTarget, id: ObjectId)
  where
    D: Driver,
  {
    self.layout.borrow_mut().bind_buffer(target, id);
    driver.bind_buffer(target, id);
  }

  pub(crate) fn enable_vertex_attrib_array<D>(&self, driver: &mut D, index: u32)
  where
    D: Driver,
  {
    self
      .layout
      .borrow_mut()
      .attribs
      .entry(index)
      .or_default()
      .enabled = true;
    driver.enable_vertex_attrib_array(index);
  }

  pub(crate) fn disable_vertex_attrib_array<D>(&self, driver: &mut D, index: u32)
  where
    D: Driver,
  {
    self
      .layout
      .borrow_mut()
      .attribs
      .entry(index)
      .or_default()
      .enabled = false;
    driver.disable_vertex_attrib_array(index);
  }

  pub(crate) fn vertex_attrib_pointer<D>(
    &self,
    driver: &mut D,
    pointer: AttribPointer,
    array_buffer: Option<ObjectId>,
  ) where
    D: Driver,
  {
    let mut layout = self.layout.borrow_mut();
    let array_buffer = array_buffer.or(layout.array_buffer).unwrap_or(0);
    let attrib = layout.attribs.entry(pointer.index).or_default();

    attrib.pointer = Some(pointer);
    attrib.array_buffer = array_buffer;
    driver.vertex_attrib_pointer(pointer);
  }

  pub(crate) fn forget_buffer(&self, id: ObjectId) {
    self.layout.borrow_mut().forget_buffer(id);
  }
}

impl PartialEq for Vao {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self, other)
  }
}

impl Drop for Vao {
  fn drop(&mut self) {
    match self.kind {
      VaoKind::Hardware => self.owner.bury(Deletion::VertexArray(self.id)),
      VaoKind::Es => self.owner.bury(Deletion::VertexArrayOes(self.id)),
      VaoKind::Software => (),
    }
  }
}
