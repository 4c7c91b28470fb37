//! Graphics context.
//!
//! A [`Context`] is a software shadow of the mutable global state of a driver: bindings, capabilities, blending,
//! viewport and scissor, plus the matrices and color the stock shaders are fed with. Every piece of state is a
//! [`StateStack`] (or a [`BindingCache`] of them), so that application code can push a value, do its work and pop it
//! back without any manual bookkeeping. Driver commands are only issued when the cached value actually changes.
//!
//! Most of the time, pushes and pops are done through the scope guards of the [`scope`](crate::scope) module.
//!
//! A context is not [`Send`]: it must be created, used and dropped on the same thread, and must be current – see
//! [`Context::make_current`] – whenever it’s used.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::error;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::mem;
use std::rc::{Rc, Weak};
use std::thread;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::binding::BindingCache;
use crate::blending::{BlendFactors, Factor};
use crate::buffer::{Buffer, BufferRef, BufferUsage};
use crate::capability::Capability;
use crate::driver::{Driver, DriverCaps, DriverError, ObjectId};
use crate::environment::{Environment, Profile};
use crate::framebuffer::FramebufferRef;
use crate::object::{Deletion, Graveyard, Owner};
use crate::platform::{PlatformData, PlatformError};
use crate::program::{ProgramError, ProgramRef, UniformSemantic};
use crate::region::Region;
use crate::registry::{ContextId, ContextRegistry, CurrentElsewhere};
use crate::shader::ShaderDef;
use crate::stack::StateStack;
use crate::target::{BufferTarget, FramebufferTarget, TextureTarget};
use crate::transform_feedback::{
  CaptureOp, CaptureState, TransformFeedbackKind, TransformFeedbackRef,
};
use crate::vao::{Vao, VaoKind, VaoRef};
use crate::vertex::{AttribPointer, Face, IndexType, PolygonMode, PrimitiveMode};

/// Report a usage error and abort.
pub(crate) fn fatal(msg: fmt::Arguments) -> ! {
  log::error!("{}", msg);
  panic!("{}", msg)
}

/// Cached value.
///
/// Used for driver state that is never scoped, only set. A non-cached value (i.e. empty) is always invalid whatever
/// compared value.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

// Fill an unknown top with the driver value, if the driver can tell.
fn known<T>(stack: &mut StateStack<T>, query: impl FnOnce() -> Option<T>) -> Option<T>
where
  T: Clone + PartialEq,
{
  if stack.get().is_none() {
    if let Some(value) = query() {
      stack.seed(value);
    }
  }

  stack.get().cloned()
}

// Pop a stack, returning the value to send to the driver if it changed.
fn pop_restore<T>(stack: &mut StateStack<T>, what: &str) -> Option<T>
where
  T: Clone + PartialEq,
{
  match stack.pop() {
    Ok(true) => {
      let restored = stack.get().cloned();

      if restored.is_none() {
        log::warn!("restoring an unknown {}; the driver value is left as is", what);
      }

      restored
    }

    Ok(false) => None,
    Err(_) => fatal(format_args!("{} stack underflow", what)),
  }
}

fn program_id(program: &Option<ProgramRef>) -> ObjectId {
  program.as_ref().map_or(0, |p| p.id())
}

/// Error that might occur when creating a context or making it current.
#[non_exhaustive]
#[derive(Debug)]
pub enum ContextError {
  /// The native context failed.
  Platform(PlatformError),
  /// The driver failed.
  Driver(DriverError),
  /// The context is current on another thread.
  CurrentElsewhere(CurrentElsewhere),
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ContextError::Platform(ref e) => write!(f, "platform error: {}", e),
      ContextError::Driver(ref e) => write!(f, "driver error: {}", e),
      ContextError::CurrentElsewhere(ref e) => write!(f, "{}", e),
    }
  }
}

impl error::Error for ContextError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ContextError::Platform(e) => Some(e),
      ContextError::Driver(e) => Some(e),
      ContextError::CurrentElsewhere(e) => Some(e),
    }
  }
}

impl From<PlatformError> for ContextError {
  fn from(e: PlatformError) -> Self {
    ContextError::Platform(e)
  }
}

impl From<DriverError> for ContextError {
  fn from(e: DriverError) -> Self {
    ContextError::Driver(e)
  }
}

impl From<CurrentElsewhere> for ContextError {
  fn from(e: CurrentElsewhere) -> Self {
    ContextError::CurrentElsewhere(e)
  }
}

/// A mismatch found by [`Context::sanity_check`].
#[derive(Clone, Debug, PartialEq)]
pub enum Divergence {
  /// A state stack has pushes not matched by a pop.
  Unbalanced { stack: String, depth: usize },
  /// A cached binding differs from the driver one.
  Binding {
    binding: String,
    cached: ObjectId,
    actual: ObjectId,
  },
  /// A cached capability differs from the driver one.
  Capability {
    capability: Capability,
    cached: bool,
    actual: bool,
  },
  /// The cached viewport or scissor differs from the driver one.
  Region {
    region: &'static str,
    cached: Region,
    actual: Region,
  },
  /// The cached blend function differs from the driver one.
  BlendFactors {
    cached: BlendFactors,
    actual: Option<BlendFactors>,
  },
}

impl fmt::Display for Divergence {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Divergence::Unbalanced { ref stack, depth } => {
        write!(f, "unbalanced {} stack (depth {})", stack, depth)
      }
      Divergence::Binding {
        ref binding,
        cached,
        actual,
      } => write!(f, "{} binding: cached {}, driver {}", binding, cached, actual),
      Divergence::Capability {
        capability,
        cached,
        actual,
      } => write!(f, "{:?}: cached {}, driver {}", capability, cached, actual),
      Divergence::Region {
        region,
        cached,
        actual,
      } => write!(f, "{}: cached {:?}, driver {:?}", region, cached, actual),
      Divergence::BlendFactors { cached, actual } => {
        write!(f, "blend function: cached {:?}, driver {:?}", cached, actual)
      }
    }
  }
}

/// Error returned by [`Context::sanity_check`] and [`Context::check_balanced`].
#[derive(Clone, Debug, PartialEq)]
pub struct SanityError {
  pub divergences: Vec<Divergence>,
}

impl fmt::Display for SanityError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} state divergence(s)", self.divergences.len())?;

    for divergence in &self.divergences {
      write!(f, "; {}", divergence)?;
    }

    Ok(())
  }
}

impl error::Error for SanityError {}

/// Cached state of a context, along with its driver.
pub(crate) struct ContextState<D> {
  pub(crate) driver: D,
  caps: DriverCaps,
  framebuffer_split: bool,
  polygon_mode_support: bool,
  vao: StateStack<Option<VaoRef>>,
  viewport: StateStack<Region>,
  scissor: StateStack<Region>,
  buffers: BindingCache<BufferTarget>,
  textures: BindingCache<(u32, TextureTarget)>,
  active_texture: StateStack<u32>,
  framebuffers: BindingCache<FramebufferTarget>,
  program: StateStack<Option<ProgramRef>>,
  capabilities: BTreeMap<Capability, StateStack<bool>>,
  blend: StateStack<BlendFactors>,
  model_view: StateStack<Matrix4<f32>>,
  projection: StateStack<Matrix4<f32>>,
  color: StateStack<[f32; 4]>,
  polygon_modes: BTreeMap<Face, Cached<PolygonMode>>,
  transform_feedback: Option<TransformFeedbackRef>,
  // capture state when no transform feedback object is bound
  capture: CaptureState,
  // every vertex array created on the context, bound or not
  vaos: Vec<Weak<Vao>>,
}

impl<D> ContextState<D>
where
  D: Driver,
{
  fn new(driver: D, caps: DriverCaps, environment: &Environment) -> Self {
    let polygon_modes = [Face::Front, Face::Back]
      .into_iter()
      .map(|face| (face, Cached::new(PolygonMode::Fill)))
      .collect();

    ContextState {
      driver,
      caps,
      framebuffer_split: environment.supports_framebuffer_split(),
      polygon_mode_support: environment.supports_polygon_mode(),
      vao: StateStack::unknown(),
      viewport: StateStack::unknown(),
      scissor: StateStack::unknown(),
      buffers: BindingCache::new(),
      textures: BindingCache::new(),
      active_texture: StateStack::unknown(),
      framebuffers: BindingCache::new(),
      program: StateStack::unknown(),
      capabilities: BTreeMap::new(),
      blend: StateStack::unknown(),
      model_view: StateStack::new(Matrix4::identity()),
      projection: StateStack::new(Matrix4::identity()),
      color: StateStack::new([1., 1., 1., 1.]),
      polygon_modes,
      transform_feedback: None,
      capture: CaptureState::Idle,
      vaos: Vec::new(),
    }
  }

  pub(crate) fn track_vao(&mut self, vao: &VaoRef) {
    self.vaos.retain(|vao| vao.strong_count() > 0);
    self.vaos.push(Rc::downgrade(vao));
  }

  fn bound_vao(&self) -> Option<&VaoRef> {
    self.vao.get().and_then(Option::as_ref)
  }

  // vertex arrays

  fn seed_vao(&mut self) {
    if self.vao.get().is_none() && self.driver.query_vertex_array_binding() == 0 {
      self.vao.seed(None);
    }
  }

  fn switch_vao(&mut self, prev: Option<Option<VaoRef>>, next: Option<&VaoRef>) {
    let prev_native = match prev {
      Some(Some(ref vao)) => !vao.is_software(),
      Some(None) => false,
      None => self.caps.vertex_array_objects,
    };
    let next_native = next.map_or(false, |vao| !vao.is_software());

    if let Some(Some(ref vao)) = prev {
      vao.unbind_impl(&mut self.driver);
    }

    if prev_native && !next_native {
      if self.caps.es {
        self.driver.bind_vertex_array_oes(0);
      } else {
        self.driver.bind_vertex_array(0);
      }

      self.buffers.invalidate(BufferTarget::ElementArray);
    }

    if let Some(vao) = next {
      vao.bind_impl(&mut self.driver, &mut self.buffers);
    }
  }

  fn bind_vao(&mut self, vao: Option<&VaoRef>) {
    let prev = self.vao.get().cloned();

    if self.vao.set(vao.cloned()) {
      self.switch_vao(prev, vao);
    }
  }

  fn push_vao(&mut self, vao: Option<&VaoRef>) {
    self.seed_vao();
    let prev = self.vao.get().cloned();

    if self.vao.push(vao.cloned()) {
      self.switch_vao(prev, vao);
    }
  }

  fn pop_vao(&mut self) {
    let prev = self.vao.get().cloned();

    if let Some(next) = pop_restore(&mut self.vao, "vertex array") {
      self.switch_vao(prev, next.as_ref());
    }
  }

  // viewport and scissor

  fn current_viewport(&mut self) -> Option<Region> {
    known(&mut self.viewport, || Some(self.driver.query_viewport()))
  }

  fn current_scissor(&mut self) -> Option<Region> {
    known(&mut self.scissor, || Some(self.driver.query_scissor()))
  }

  // buffers

  fn apply_buffer_binding(&mut self, target: BufferTarget, id: ObjectId) {
    if let BufferTarget::Array | BufferTarget::ElementArray = target {
      if let Some(vao) = self.vao.get().and_then(Option::as_ref) {
        vao.reflect_bind_buffer(&mut self.driver, target, id);
        return;
      }
    }

    self.driver.bind_buffer(target, id);
  }

  fn current_buffer_binding(&mut self, target: BufferTarget) -> ObjectId {
    match self.buffers.get(target) {
      Some(id) => id,
      None => {
        let id = self.driver.query_buffer_binding(target);
        self.buffers.seed(target, id);
        id
      }
    }
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: ObjectId) {
    if self.buffers.bind(target, id) {
      self.apply_buffer_binding(target, id);
    }
  }

  fn push_buffer_binding(&mut self, target: BufferTarget, id: ObjectId) {
    self.current_buffer_binding(target);

    if self.buffers.push(target, id) {
      self.apply_buffer_binding(target, id);
    }
  }

  fn pop_buffer_binding(&mut self, target: BufferTarget) {
    match self.buffers.pop(target) {
      Ok(Some(id)) => self.apply_buffer_binding(target, id),
      Ok(None) => (),
      Err(_) => fatal(format_args!("{:?} buffer binding stack underflow", target)),
    }
  }

  // textures

  fn current_active_texture(&mut self) -> u32 {
    known(&mut self.active_texture, || Some(self.driver.query_active_texture())).unwrap_or(0)
  }

  fn set_active_texture(&mut self, unit: u32) {
    if unit >= self.caps.max_texture_units {
      log::warn!(
        "texture unit {} exceeds the {} units of the driver",
        unit,
        self.caps.max_texture_units
      );
    }

    if self.active_texture.set(unit) {
      self.driver.active_texture(unit);
    }
  }

  fn push_active_texture(&mut self, unit: u32) {
    self.current_active_texture();

    if self.active_texture.push(unit) {
      self.driver.active_texture(unit);
    }
  }

  fn pop_active_texture(&mut self) {
    if let Some(unit) = pop_restore(&mut self.active_texture, "active texture") {
      self.driver.active_texture(unit);
    }
  }

  fn current_texture_binding(&mut self, target: TextureTarget, unit: u32) -> ObjectId {
    match self.textures.get((unit, target)) {
      Some(id) => id,
      None => {
        let id = self.driver.query_texture_binding(target, unit);
        self.textures.seed((unit, target), id);
        id
      }
    }
  }

  fn bind_texture(&mut self, target: TextureTarget, id: ObjectId) {
    let unit = self.current_active_texture();

    if self.textures.bind((unit, target), id) {
      self.driver.bind_texture(target, id);
    }
  }

  fn push_texture_binding(&mut self, target: TextureTarget, id: ObjectId) {
    let unit = self.current_active_texture();
    self.current_texture_binding(target, unit);

    if self.textures.push((unit, target), id) {
      self.driver.bind_texture(target, id);
    }
  }

  fn pop_texture_binding(&mut self, target: TextureTarget) {
    let unit = self.current_active_texture();

    match self.textures.pop((unit, target)) {
      Ok(Some(id)) => self.driver.bind_texture(target, id),
      Ok(None) => (),
      Err(_) => fatal(format_args!(
        "{:?} texture binding stack underflow on unit {}",
        target, unit
      )),
    }
  }

  // framebuffers

  fn framebuffer_target(&self, target: FramebufferTarget) -> FramebufferTarget {
    if self.framebuffer_split {
      target
    } else {
      FramebufferTarget::Both
    }
  }

  fn current_framebuffer(&mut self, target: FramebufferTarget) -> ObjectId {
    let target = match target {
      FramebufferTarget::Both => FramebufferTarget::Draw,
      _ => target,
    };

    match self.framebuffers.get(target) {
      Some(id) => id,
      None => {
        let id = self.driver.query_framebuffer_binding(target);
        self.framebuffers.seed(target, id);
        id
      }
    }
  }

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: ObjectId) {
    let target = self.framebuffer_target(target);
    let mut changed = false;

    for &t in target.split() {
      changed |= self.framebuffers.bind(t, id);
    }

    if changed {
      self.driver.bind_framebuffer(target, id);
    }
  }

  fn push_framebuffer(&mut self, target: FramebufferTarget, id: ObjectId) {
    let target = self.framebuffer_target(target);
    let mut changed = false;

    for &t in target.split() {
      self.current_framebuffer(t);
      changed |= self.framebuffers.push(t, id);
    }

    if changed {
      self.driver.bind_framebuffer(target, id);
    }
  }

  fn pop_framebuffer(&mut self, target: FramebufferTarget) {
    let target = self.framebuffer_target(target);
    let mut restores = Vec::with_capacity(2);

    for &t in target.split() {
      match self.framebuffers.pop(t) {
        Ok(restore) => restores.push((t, restore)),
        Err(_) => fatal(format_args!("{:?} framebuffer stack underflow", t)),
      }
    }

    match restores.as_slice() {
      [(_, Some(read)), (_, Some(draw))] if read == draw => {
        self.driver.bind_framebuffer(target, *read);
      }

      _ if !self.framebuffer_split => {
        if let Some(&(_, Some(id))) = restores.iter().find(|(_, restore)| restore.is_some()) {
          self.driver.bind_framebuffer(FramebufferTarget::Both, id);
        }
      }

      _ => {
        for &(t, restore) in &restores {
          if let Some(id) = restore {
            self.driver.bind_framebuffer(t, id);
          }
        }
      }
    }
  }

  // programs

  fn seed_program(&mut self) {
    if self.program.get().is_none() && self.driver.query_program() == 0 {
      self.program.seed(None);
    }
  }

  fn bind_program(&mut self, program: Option<&ProgramRef>) {
    let program = program.cloned();
    let id = program_id(&program);

    if self.program.set(program) {
      self.driver.use_program(id);
    }
  }

  fn push_program(&mut self, program: Option<&ProgramRef>) {
    self.seed_program();
    let program = program.cloned();
    let id = program_id(&program);

    if self.program.push(program) {
      self.driver.use_program(id);
    }
  }

  fn pop_program(&mut self) {
    if let Some(program) = pop_restore(&mut self.program, "program") {
      self.driver.use_program(program_id(&program));
    }
  }

  // capabilities

  fn current_capability(&mut self, cap: Capability) -> bool {
    let driver = &mut self.driver;
    let stack = self
      .capabilities
      .entry(cap)
      .or_insert_with(StateStack::unknown);

    known(stack, || Some(driver.query_capability(cap))).unwrap_or(false)
  }

  fn enable(&mut self, cap: Capability, value: bool) {
    let stack = self
      .capabilities
      .entry(cap)
      .or_insert_with(StateStack::unknown);

    if stack.set(value) {
      self.driver.set_capability(cap, value);
    }
  }

  fn push_bool_state(&mut self, cap: Capability, value: bool) {
    self.current_capability(cap);

    if let Some(stack) = self.capabilities.get_mut(&cap) {
      if stack.push(value) {
        self.driver.set_capability(cap, value);
      }
    }
  }

  fn pop_bool_state(&mut self, cap: Capability) {
    let restored = match self.capabilities.get_mut(&cap) {
      Some(stack) => pop_restore(stack, "capability"),
      None => fatal(format_args!("{:?} stack underflow", cap)),
    };

    if let Some(value) = restored {
      self.driver.set_capability(cap, value);
    }
  }

  // blending

  fn current_blend(&mut self) -> Option<BlendFactors> {
    known(&mut self.blend, || self.driver.query_blend_factors())
  }

  // transform feedback

  fn capture_state(&self) -> CaptureState {
    self
      .transform_feedback
      .as_ref()
      .map_or(self.capture, |xfo| xfo.capture_state())
  }

  fn capture(&mut self, op: CaptureOp) {
    let current = self.capture_state();

    let next = match current.apply(op) {
      Some(next) => next,
      None => fatal(format_args!(
        "cannot {} transform feedback while {:?}",
        op, current
      )),
    };

    match self.transform_feedback {
      Some(ref xfo) => xfo.set_capture_state(next),
      None => self.capture = next,
    }
  }

  fn bind_transform_feedback(&mut self, xfo: Option<&TransformFeedbackRef>) {
    let same = match (&self.transform_feedback, xfo) {
      (Some(a), Some(b)) => Rc::ptr_eq(a, b),
      (None, None) => true,
      _ => false,
    };

    if same {
      return;
    }

    if self.capture_state() == CaptureState::Recording {
      fatal(format_args!(
        "cannot switch transform feedback objects while recording"
      ));
    }

    let is_hardware = |xfo: &TransformFeedbackRef| xfo.kind() == TransformFeedbackKind::Hardware;
    let prev_hardware = self.transform_feedback.as_ref().map_or(false, is_hardware);
    let next_hardware = xfo.map_or(false, is_hardware);

    if prev_hardware && !next_hardware {
      self.driver.bind_transform_feedback(0);
    }

    if let Some(xfo) = xfo {
      xfo.bind_impl(&mut self.driver);
    }

    self.transform_feedback = xfo.cloned();
  }

  // deletion

  fn delete(&mut self, deletion: Deletion) {
    log::debug!("deleting {:?}", deletion);

    match deletion {
      Deletion::Buffer(id) => {
        self.buffers.forget(id);

        self.vaos.retain(|vao| match vao.upgrade() {
          Some(vao) => {
            vao.forget_buffer(id);
            true
          }

          None => false,
        });

        self.driver.delete_buffer(id);
      }

      Deletion::Texture(id) => {
        self.textures.forget(id);
        self.driver.delete_texture(id);
      }

      Deletion::Framebuffer(id) => {
        self.framebuffers.forget(id);
        self.driver.delete_framebuffer(id);
      }

      Deletion::VertexArray(id) => self.driver.delete_vertex_array(id),
      Deletion::VertexArrayOes(id) => self.driver.delete_vertex_array_oes(id),
      Deletion::TransformFeedback(id) => self.driver.delete_transform_feedback(id),
      Deletion::Program(id) => self.driver.delete_program(id),
    }
  }

  // re-issue every known value
  fn reassert(&mut self) {
    if let Some(Some(vao)) = self.vao.get().cloned() {
      vao.bind_impl(&mut self.driver, &mut self.buffers);
    }

    if let Some(&region) = self.viewport.get() {
      self.driver.viewport(region);
    }

    if let Some(&region) = self.scissor.get() {
      self.driver.scissor(region);
    }

    for (&cap, stack) in &self.capabilities {
      if let Some(&value) = stack.get() {
        self.driver.set_capability(cap, value);
      }
    }

    if let Some(&factors) = self.blend.get() {
      self.driver.blend_func_separate(factors);
    }

    let bindings: Vec<_> = self.buffers.iter().collect();
    for (target, id) in bindings {
      match (target, id) {
        (BufferTarget::ElementArray, _) => (),
        (_, Some(id)) => self.driver.bind_buffer(target, id),
        _ => (),
      }
    }

    for ((unit, target), id) in self.textures.iter() {
      if let Some(id) = id {
        self.driver.active_texture(unit);
        self.driver.bind_texture(target, id);
      }
    }

    if let Some(&unit) = self.active_texture.get() {
      self.driver.active_texture(unit);
    }

    let split = self.framebuffer_split;
    for (target, id) in self.framebuffers.iter() {
      if let Some(id) = id {
        let target = if split { target } else { FramebufferTarget::Both };
        self.driver.bind_framebuffer(target, id);
      }
    }

    if let Some(program) = self.program.get() {
      self.driver.use_program(program_id(program));
    }

    if self.polygon_mode_support {
      for (&face, mode) in &self.polygon_modes {
        if let Some(&mode) = mode.get() {
          self.driver.polygon_mode(face, mode);
        }
      }
    }

    if let Some(ref xfo) = self.transform_feedback {
      xfo.bind_impl(&mut self.driver);
    }
  }

  fn unbalanced(&self) -> Vec<Divergence> {
    let mut divergences = Vec::new();
    let mut check = |stack: String, depth: usize| {
      if depth > 1 {
        divergences.push(Divergence::Unbalanced { stack, depth });
      }
    };

    check("vertex array".to_owned(), self.vao.depth());
    check("viewport".to_owned(), self.viewport.depth());
    check("scissor".to_owned(), self.scissor.depth());
    check("active texture".to_owned(), self.active_texture.depth());
    check("program".to_owned(), self.program.depth());
    check("blend function".to_owned(), self.blend.depth());
    check("model-view matrix".to_owned(), self.model_view.depth());
    check("projection matrix".to_owned(), self.projection.depth());
    check("color".to_owned(), self.color.depth());

    for (cap, stack) in &self.capabilities {
      check(format!("{:?}", cap), stack.depth());
    }

    for (target, depth) in self.buffers.unbalanced() {
      check(format!("{:?} buffer", target), depth);
    }

    for ((unit, target), depth) in self.textures.unbalanced() {
      check(format!("{:?} texture (unit {})", target, unit), depth);
    }

    for (target, depth) in self.framebuffers.unbalanced() {
      check(format!("{:?} framebuffer", target), depth);
    }

    divergences
  }

  fn diverging(&mut self) -> Vec<Divergence> {
    let mut divergences = self.unbalanced();

    let mut binding = |binding: String, cached: ObjectId, actual: ObjectId| {
      if cached != actual {
        divergences.push(Divergence::Binding {
          binding,
          cached,
          actual,
        });
      }
    };

    let vao = match self.vao.get() {
      Some(Some(vao)) if vao.is_software() => None,
      Some(Some(vao)) => Some(vao.id()),
      Some(None) => Some(0),
      None => None,
    };

    if let Some(cached) = vao {
      binding(
        "vertex array".to_owned(),
        cached,
        self.driver.query_vertex_array_binding(),
      );
    }

    if let Some(program) = self.program.get() {
      binding(
        "program".to_owned(),
        program_id(program),
        self.driver.query_program(),
      );
    }

    if let Some(&unit) = self.active_texture.get() {
      binding(
        "active texture".to_owned(),
        unit,
        self.driver.query_active_texture(),
      );
    }

    for (target, cached) in self.buffers.iter() {
      if let Some(cached) = cached {
        binding(
          format!("{:?} buffer", target),
          cached,
          self.driver.query_buffer_binding(target),
        );
      }
    }

    for ((unit, target), cached) in self.textures.iter() {
      if let Some(cached) = cached {
        binding(
          format!("{:?} texture (unit {})", target, unit),
          cached,
          self.driver.query_texture_binding(target, unit),
        );
      }
    }

    for (target, cached) in self.framebuffers.iter() {
      if let Some(cached) = cached {
        binding(
          format!("{:?} framebuffer", target),
          cached,
          self.driver.query_framebuffer_binding(target),
        );
      }
    }

    for (&capability, stack) in &self.capabilities {
      if let Some(&cached) = stack.get() {
        let actual = self.driver.query_capability(capability);

        if cached != actual {
          divergences.push(Divergence::Capability {
            capability,
            cached,
            actual,
          });
        }
      }
    }

    if let Some(&cached) = self.viewport.get() {
      let actual = self.driver.query_viewport();

      if cached != actual {
        divergences.push(Divergence::Region {
          region: "viewport",
          cached,
          actual,
        });
      }
    }

    if let Some(&cached) = self.scissor.get() {
      let actual = self.driver.query_scissor();

      if cached != actual {
        divergences.push(Divergence::Region {
          region: "scissor",
          cached,
          actual,
        });
      }
    }

    if let Some(&cached) = self.blend.get() {
      let actual = self.driver.query_blend_factors();

      if actual != Some(cached) {
        divergences.push(Divergence::BlendFactors { cached, actual });
      }
    }

    divergences
  }

  // drop every object held by the stacks
  fn release_objects(&mut self) {
    self.vao = StateStack::unknown();
    self.program = StateStack::unknown();
    self.transform_feedback = None;
  }
}

/// A graphics context.
///
/// See the [module documentation](crate::context) for further details.
pub struct Context<D>
where
  D: Driver,
{
  _a: PhantomData<*const ()>, // !Send and !Sync
  id: ContextId,
  registry: ContextRegistry,
  platform: Rc<dyn PlatformData>,
  caps: DriverCaps,
  environment: Environment,
  graveyard: Graveyard,
  state: RefCell<ContextState<D>>,
  stock_shaders: RefCell<BTreeMap<ShaderDef, ProgramRef>>,
  default_vao: RefCell<Option<VaoRef>>,
  default_array_vbo: RefCell<Option<BufferRef>>,
  default_element_vbo: RefCell<Option<BufferRef>>,
}

impl<D> fmt::Debug for Context<D>
where
  D: Driver,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Context")
      .field("id", &self.id)
      .field("profile", &self.environment.profile())
      .field("renderer", &self.caps.renderer)
      .finish()
  }
}

impl<D> Context<D>
where
  D: Driver,
{
  /// Wrap an existing native context and its driver.
  ///
  /// The new context becomes current on the calling thread.
  pub fn create_from_existing(
    platform: Rc<dyn PlatformData>,
    mut driver: D,
    registry: &ContextRegistry,
  ) -> Result<Self, ContextError> {
    let caps = driver.capabilities();
    let environment = Environment::detect(&caps);
    let id = registry.allocate_id();

    platform.make_current()?;
    registry.make_current(id)?;

    let ctx = Context {
      _a: PhantomData,
      id,
      registry: registry.clone(),
      platform,
      caps: caps.clone(),
      environment,
      graveyard: Rc::new(RefCell::new(Vec::new())),
      state: RefCell::new(ContextState::new(driver, caps, &environment)),
      stock_shaders: RefCell::new(BTreeMap::new()),
      default_vao: RefCell::new(None),
      default_array_vbo: RefCell::new(None),
      default_element_vbo: RefCell::new(None),
    };

    log::debug!(
      "created context {} ({:?} profile, {})",
      id,
      environment.profile(),
      ctx.caps.renderer
    );

    // core profiles cannot draw without a vertex array
    if environment.profile() == Profile::Core {
      let vao = ctx.default_vao();
      ctx.bind_vao(Some(&vao));
    }

    Ok(ctx)
  }

  /// Create a context sharing its objects with this one.
  ///
  /// The new context becomes current on the calling thread.
  pub fn create_shared(&self) -> Result<Self, ContextError> {
    let platform = self.platform.create_shared()?;
    let driver = self.state.borrow().driver.create_shared()?;

    Self::create_from_existing(platform, driver, &self.registry)
  }

  /// Identifier of the context in its registry.
  pub fn id(&self) -> ContextId {
    self.id
  }

  /// Registry tracking which context is current on which thread.
  pub fn registry(&self) -> &ContextRegistry {
    &self.registry
  }

  /// Platform data of the native context.
  pub fn platform_data(&self) -> &Rc<dyn PlatformData> {
    &self.platform
  }

  /// Shader environment matching the detected profile.
  pub fn environment(&self) -> &Environment {
    &self.environment
  }

  /// Capabilities detected when the context was created.
  pub fn capabilities(&self) -> &DriverCaps {
    &self.caps
  }

  /// Direct access to the driver.
  ///
  /// Commands issued this way bypass the caches; invalidate what they touch.
  pub fn driver(&self) -> RefMut<D> {
    RefMut::map(self.state(), |state| &mut state.driver)
  }

  pub(crate) fn owner(&self) -> Owner {
    Owner::new(&self.graveyard, self.id)
  }

  pub(crate) fn vao_kind(&self) -> VaoKind {
    if !self.caps.vertex_array_objects {
      VaoKind::Software
    } else if self.caps.es {
      VaoKind::Es
    } else {
      VaoKind::Hardware
    }
  }

  /// Access the cached state, applying pending deletions first.
  pub(crate) fn state(&self) -> RefMut<ContextState<D>> {
    if cfg!(debug_assertions) && !self.registry.is_current(self.id) {
      fatal(format_args!("context {} used while not current", self.id));
    }

    let mut state = self.state.borrow_mut();
    let pending = mem::take(&mut *self.graveyard.borrow_mut());

    for deletion in pending {
      state.delete(deletion);
    }

    state
  }

  /// Whether the context is current on the calling thread.
  pub fn is_current(&self) -> bool {
    self.registry.is_current(self.id)
  }

  /// Make the context current on the calling thread.
  ///
  /// Does nothing if the context is already current. Otherwise, every known cached value is sent to the driver
  /// again.
  pub fn make_current(&self) -> Result<(), ContextError> {
    if self.is_current() {
      return Ok(());
    }

    self.registry.make_current(self.id)?;

    if let Err(e) = self.platform.make_current() {
      self.registry.clear_current();
      return Err(e.into());
    }

    log::debug!("context {} made current", self.id);
    self.state().reassert();

    Ok(())
  }

  // vertex arrays

  /// Bind a vertex array, or none.
  pub fn bind_vao(&self, vao: Option<&VaoRef>) {
    self.state().bind_vao(vao);
  }

  /// Save the bound vertex array and bind another one.
  pub fn push_vao(&self, vao: Option<&VaoRef>) {
    self.state().push_vao(vao);
  }

  /// Rebind the vertex array saved by the matching push.
  pub fn pop_vao(&self) {
    self.state().pop_vao();
  }

  /// Bound vertex array, if any and known.
  pub fn vao(&self) -> Option<VaoRef> {
    self.state().bound_vao().cloned()
  }

  /// Vertex array bound when nothing else is.
  pub fn default_vao(&self) -> VaoRef {
    if let Some(ref vao) = *self.default_vao.borrow() {
      return vao.clone();
    }

    let vao = Vao::create(self);
    *self.default_vao.borrow_mut() = Some(vao.clone());
    vao
  }

  // viewport

  /// Current viewport, queried from the driver if unknown.
  pub fn viewport(&self) -> Region {
    self.state().current_viewport().unwrap_or_default()
  }

  /// Replace the current viewport.
  pub fn set_viewport(&self, region: Region) {
    let mut state = self.state();

    if state.viewport.set(region) {
      state.driver.viewport(region);
    }
  }

  /// Save the current viewport and set a new one.
  pub fn push_viewport(&self, region: Region) {
    let mut state = self.state();
    state.current_viewport();

    if state.viewport.push(region) {
      state.driver.viewport(region);
    }
  }

  /// Restore the viewport saved by the matching push.
  pub fn pop_viewport(&self) {
    let mut state = self.state();

    if let Some(region) = pop_restore(&mut state.viewport, "viewport") {
      state.driver.viewport(region);
    }
  }

  // scissor

  /// Current scissor box, queried from the driver if unknown.
  pub fn scissor(&self) -> Region {
    self.state().current_scissor().unwrap_or_default()
  }

  /// Replace the current scissor box.
  pub fn set_scissor(&self, region: Region) {
    let mut state = self.state();

    if state.scissor.set(region) {
      state.driver.scissor(region);
    }
  }

  /// Save the current scissor box and set a new one.
  pub fn push_scissor(&self, region: Region) {
    let mut state = self.state();
    state.current_scissor();

    if state.scissor.push(region) {
      state.driver.scissor(region);
    }
  }

  /// Restore the scissor box saved by the matching push.
  pub fn pop_scissor(&self) {
    let mut state = self.state();

    if let Some(region) = pop_restore(&mut state.scissor, "scissor") {
      state.driver.scissor(region);
    }
  }

  // buffers

  /// Bind a buffer. Array and element array bindings are recorded by the bound vertex array.
  pub fn bind_buffer(&self, target: BufferTarget, id: ObjectId) {
    self.state().bind_buffer(target, id);
  }

  /// Save the buffer bound to a target and bind another one.
  pub fn push_buffer_binding(&self, target: BufferTarget, id: ObjectId) {
    self.state().push_buffer_binding(target, id);
  }

  /// Rebind the buffer saved by the matching push.
  pub fn pop_buffer_binding(&self, target: BufferTarget) {
    self.state().pop_buffer_binding(target);
  }

  /// Buffer bound to a target, queried from the driver if unknown.
  pub fn buffer_binding(&self, target: BufferTarget) -> ObjectId {
    self.state().current_buffer_binding(target)
  }

  /// Forget the cached binding of a target; the next bind always reaches the driver.
  pub fn invalidate_buffer_binding(&self, target: BufferTarget) {
    self.state().buffers.invalidate(target);
  }

  /// Bind a buffer to an indexed binding point.
  ///
  /// Transform feedback bindings go through the bound transform feedback object, if any.
  pub fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: &BufferRef) {
    let mut state = self.state();
    let state = &mut *state;

    let issued = match (target, &state.transform_feedback) {
      (BufferTarget::TransformFeedback, Some(xfo)) => {
        xfo.set_index(&mut state.driver, index, buffer)
      }
      _ => {
        state.driver.bind_buffer_base(target, index, buffer.id());
        true
      }
    };

    // indexed binds also bind the generic binding point
    if issued {
      state.buffers.assume(target, buffer.id());
    }
  }

  /// Array buffer for transient vertex data, grown to at least `size` bytes.
  pub fn default_array_vbo(&self, size: usize) -> BufferRef {
    self.default_vbo(&self.default_array_vbo, BufferTarget::Array, size)
  }

  /// Element array buffer for transient index data, grown to at least `size` bytes.
  pub fn default_element_vbo(&self, size: usize) -> BufferRef {
    self.default_vbo(&self.default_element_vbo, BufferTarget::ElementArray, size)
  }

  fn default_vbo(&self, slot: &RefCell<Option<BufferRef>>, target: BufferTarget, size: usize) -> BufferRef {
    let size = size.max(1);
    let existing = slot.borrow().clone();

    match existing {
      Some(buffer) => {
        buffer.ensure_minimum_size(self, size);
        buffer
      }

      None => {
        let buffer = Buffer::create(self, target, size, None, BufferUsage::StreamDraw);
        *slot.borrow_mut() = Some(buffer.clone());
        buffer
      }
    }
  }

  // programs

  /// Use a program, or none.
  pub fn bind_program(&self, program: Option<&ProgramRef>) {
    self.state().bind_program(program);
  }

  /// Save the program in use and use another one.
  pub fn push_program(&self, program: Option<&ProgramRef>) {
    self.state().push_program(program);
  }

  /// Use the program saved by the matching push again.
  pub fn pop_program(&self) {
    self.state().pop_program();
  }

  /// Program in use, if any and known.
  pub fn program(&self) -> Option<ProgramRef> {
    self.state().program.get().cloned().flatten()
  }

  /// Stock shader for a definition, built on first use and cached for the lifetime of the context.
  ///
  /// Build failures are not cached.
  pub fn stock_shader(&self, def: &ShaderDef) -> Result<ProgramRef, ProgramError> {
    if let Some(program) = self.stock_shaders.borrow().get(def) {
      return Ok(program.clone());
    }

    let program = self.environment.build_shader(self, def)?;
    self
      .stock_shaders
      .borrow_mut()
      .insert(*def, program.clone());

    Ok(program)
  }

  /// Use the stock shader for a definition.
  pub fn bind_stock_shader(&self, def: &ShaderDef) -> Result<ProgramRef, ProgramError> {
    let program = self.stock_shader(def)?;
    self.bind_program(Some(&program));
    Ok(program)
  }

  /// Set an integer uniform of a program.
  ///
  /// Returns `false` if the program has no such uniform.
  pub fn uniform_int(&self, program: &ProgramRef, name: &str, value: i32) -> bool {
    let location = match program.uniform_location(self, name) {
      Some(location) => location,
      None => return false,
    };

    self.push_program(Some(program));
    self.state().driver.uniform_1i(location, value);
    self.pop_program();

    true
  }

  /// Upload the matrices and the current color to the program in use.
  ///
  /// Only the uniforms the program declares are uploaded; the color attribute is only set if the bound vertex array
  /// doesn’t source it from a buffer.
  pub fn set_default_shader_vars(&self) {
    let mut state = self.state();
    let state = &mut *state;

    let program = match state.program.get().cloned().flatten() {
      Some(program) => program,
      None => return,
    };

    let model_view = state.model_view.get().copied().unwrap_or_else(Matrix4::identity);
    let projection = state.projection.get().copied().unwrap_or_else(Matrix4::identity);

    for &(semantic, location) in program.semantics() {
      match semantic {
        UniformSemantic::ModelView => state.driver.uniform_matrix4(location, model_view.into()),
        UniformSemantic::Projection => state.driver.uniform_matrix4(location, projection.into()),
        UniformSemantic::ModelViewProjection => state
          .driver
          .uniform_matrix4(location, (projection * model_view).into()),
        UniformSemantic::NormalMatrix => state
          .driver
          .uniform_matrix3(location, normal_matrix(&model_view).into()),
      }
    }

    if let Some(attrib) = program.color_attrib() {
      let sourced = state
        .bound_vao()
        .map_or(false, |vao| vao.layout().attrib(attrib).map_or(false, |a| a.enabled));

      if !sourced {
        let color = state.color.get().copied().unwrap_or([1., 1., 1., 1.]);
        state.driver.vertex_attrib(attrib, color);
      }
    }
  }

  // textures

  /// Select the active texture unit.
  pub fn set_active_texture(&self, unit: u32) {
    self.state().set_active_texture(unit);
  }

  /// Save the active texture unit and activate another one.
  pub fn push_active_texture(&self, unit: u32) {
    self.state().push_active_texture(unit);
  }

  /// Reactivate the texture unit saved by the matching push.
  pub fn pop_active_texture(&self) {
    self.state().pop_active_texture();
  }

  /// Active texture unit, queried from the driver if unknown.
  pub fn active_texture(&self) -> u32 {
    self.state().current_active_texture()
  }

  /// Bind a texture on the active texture unit.
  pub fn bind_texture(&self, target: TextureTarget, id: ObjectId) {
    self.state().bind_texture(target, id);
  }

  /// Bind a texture on a given texture unit, leaving the active unit unchanged.
  pub fn bind_texture_on(&self, target: TextureTarget, id: ObjectId, unit: u32) {
    let mut state = self.state();
    state.push_active_texture(unit);
    state.bind_texture(target, id);
    state.pop_active_texture();
  }

  /// Push a texture binding on the active texture unit.
  pub fn push_texture_binding(&self, target: TextureTarget, id: ObjectId) {
    self.state().push_texture_binding(target, id);
  }

  /// Push a texture binding on a given texture unit, leaving the active unit unchanged.
  pub fn push_texture_binding_on(&self, target: TextureTarget, id: ObjectId, unit: u32) {
    let mut state = self.state();
    state.push_active_texture(unit);
    state.push_texture_binding(target, id);
    state.pop_active_texture();
  }

  /// Pop a texture binding on the active texture unit.
  pub fn pop_texture_binding(&self, target: TextureTarget) {
    self.state().pop_texture_binding(target);
  }

  /// Pop a texture binding on a given texture unit, leaving the active unit unchanged.
  pub fn pop_texture_binding_on(&self, target: TextureTarget, unit: u32) {
    let mut state = self.state();
    state.push_active_texture(unit);
    state.pop_texture_binding(target);
    state.pop_active_texture();
  }

  /// Texture bound to a target on a unit, queried from the driver if unknown.
  pub fn texture_binding(&self, target: TextureTarget, unit: u32) -> ObjectId {
    self.state().current_texture_binding(target, unit)
  }

  /// Forget the texture bound to a target on a unit, so that the next bind is issued.
  pub fn invalidate_texture_binding(&self, target: TextureTarget, unit: u32) {
    self.state().textures.invalidate((unit, target));
  }

  // framebuffers

  /// Bind a framebuffer. On drivers without separate read and draw targets, every target means both.
  pub fn bind_framebuffer(&self, target: FramebufferTarget, id: ObjectId) {
    self.state().bind_framebuffer(target, id);
  }

  /// Save the framebuffer bound to a target and bind another one.
  pub fn push_framebuffer(&self, target: FramebufferTarget, id: ObjectId) {
    self.state().push_framebuffer(target, id);
  }

  /// Rebind the framebuffer saved by the matching push.
  pub fn pop_framebuffer(&self, target: FramebufferTarget) {
    self.state().pop_framebuffer(target);
  }

  /// Bound framebuffer. [`FramebufferTarget::Both`] reports the draw framebuffer.
  pub fn framebuffer(&self, target: FramebufferTarget) -> ObjectId {
    self.state().current_framebuffer(target)
  }

  /// Bind a framebuffer object, marking it as needing resolve and mipmap regeneration.
  pub fn bind_fbo(&self, fbo: &FramebufferRef, target: FramebufferTarget) {
    fbo.mark_as_dirty();
    self.bind_framebuffer(target, fbo.id());
  }

  /// Push a framebuffer object, marking it as needing resolve and mipmap regeneration.
  pub fn push_fbo(&self, fbo: &FramebufferRef, target: FramebufferTarget) {
    fbo.mark_as_dirty();
    self.push_framebuffer(target, fbo.id());
  }

  // capabilities

  /// Enable or disable a capability.
  pub fn enable(&self, cap: Capability, value: bool) {
    self.state().enable(cap, value);
  }

  /// Disable a capability.
  pub fn disable(&self, cap: Capability) {
    self.enable(cap, false);
  }

  /// Save the state of a capability and set a new one.
  pub fn push_bool_state(&self, cap: Capability, value: bool) {
    self.state().push_bool_state(cap, value);
  }

  /// Restore the state of a capability saved by the matching push.
  pub fn pop_bool_state(&self, cap: Capability) {
    self.state().pop_bool_state(cap);
  }

  /// Whether a capability is enabled, queried from the driver if unknown.
  pub fn bool_state(&self, cap: Capability) -> bool {
    self.state().current_capability(cap)
  }

  /// Enable or disable writes to the depth buffer.
  pub fn depth_mask(&self, write: bool) {
    self.enable(Capability::DepthWrite, write);
  }

  // blending

  /// Set the same blending factors for color and alpha.
  pub fn blend_func(&self, src: Factor, dst: Factor) {
    self.blend_func_separate(BlendFactors::new(src, dst));
  }

  /// Set separate blending factors for color and alpha.
  pub fn blend_func_separate(&self, factors: BlendFactors) {
    let mut state = self.state();

    if state.blend.set(factors) {
      state.driver.blend_func_separate(factors);
    }
  }

  /// Save the blending factors and set new ones.
  pub fn push_blend_func_separate(&self, factors: BlendFactors) {
    let mut state = self.state();
    state.current_blend();

    if state.blend.push(factors) {
      state.driver.blend_func_separate(factors);
    }
  }

  /// Restore the blending factors saved by the matching push.
  pub fn pop_blend_func_separate(&self) {
    let mut state = self.state();

    if let Some(factors) = pop_restore(&mut state.blend, "blend function") {
      state.driver.blend_func_separate(factors);
    }
  }

  /// Blend function, if known.
  pub fn blend_factors(&self) -> Option<BlendFactors> {
    self.state().current_blend()
  }

  // polygon mode

  /// Select how polygons are rasterized. Unavailable on OpenGL ES.
  pub fn polygon_mode(&self, face: Face, mode: PolygonMode) {
    if !self.environment.supports_polygon_mode() {
      log::warn!("polygon mode is unavailable on {:?}", self.environment.profile());
      return;
    }

    let mut state = self.state();
    let faces = match face {
      Face::FrontAndBack => vec![Face::Front, Face::Back],
      _ => vec![face],
    };

    let changed = faces.iter().any(|f| {
      state
        .polygon_modes
        .get(f)
        .map_or(true, |cached| cached.is_invalid(&mode))
    });

    if changed {
      state.driver.polygon_mode(face, mode);

      for f in faces {
        state
          .polygon_modes
          .entry(f)
          .or_insert_with(|| Cached::new(mode))
          .set(mode);
      }
    }
  }

  // vertex attributes

  /// Source a vertex attribute from the bound array buffer.
  pub fn vertex_attrib_pointer(&self, pointer: AttribPointer) {
    let mut state = self.state();
    let state = &mut *state;
    let array_buffer = state.buffers.get(BufferTarget::Array);

    match state.vao.get().and_then(Option::as_ref) {
      Some(vao) => vao.vertex_attrib_pointer(&mut state.driver, pointer, array_buffer),
      None => state.driver.vertex_attrib_pointer(pointer),
    }
  }

  /// Enable a vertex attribute array on the bound vertex array.
  pub fn enable_vertex_attrib_array(&self, index: u32) {
    let mut state = self.state();
    let state = &mut *state;

    match state.vao.get().and_then(Option::as_ref) {
      Some(vao) => vao.enable_vertex_attrib_array(&mut state.driver, index),
      None => state.driver.enable_vertex_attrib_array(index),
    }
  }

  /// Disable a vertex attribute array on the bound vertex array.
  pub fn disable_vertex_attrib_array(&self, index: u32) {
    let mut state = self.state();
    let state = &mut *state;

    match state.vao.get().and_then(Option::as_ref) {
      Some(vao) => vao.disable_vertex_attrib_array(&mut state.driver, index),
      None => state.driver.disable_vertex_attrib_array(index),
    }
  }

  /// Set the constant value of a vertex attribute. Missing components are `0`, and `1` for `w`.
  pub fn vertex_attrib1(&self, index: u32, x: f32) {
    self.vertex_attrib4(index, x, 0., 0., 1.);
  }

  pub fn vertex_attrib2(&self, index: u32, x: f32, y: f32) {
    self.vertex_attrib4(index, x, y, 0., 1.);
  }

  pub fn vertex_attrib3(&self, index: u32, x: f32, y: f32, z: f32) {
    self.vertex_attrib4(index, x, y, z, 1.);
  }

  /// Set the constant value of a vertex attribute, used when its array is disabled.
  pub fn vertex_attrib4(&self, index: u32, x: f32, y: f32, z: f32, w: f32) {
    self.state().driver.vertex_attrib(index, [x, y, z, w]);
  }

  // draws

  /// Draw vertices in order.
  pub fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
    self.state().driver.draw_arrays(mode, first, count);
  }

  /// Draw vertices indexed by the bound element array buffer.
  pub fn draw_elements(&self, mode: PrimitiveMode, count: i32, ty: IndexType, offset: usize) {
    self.state().driver.draw_elements(mode, count, ty, offset);
  }

  // transform feedback

  /// Bind a transform feedback object, or none to capture through the default one.
  pub fn bind_transform_feedback(&self, xfo: Option<&TransformFeedbackRef>) {
    self.state().bind_transform_feedback(xfo);
  }

  /// Bound transform feedback object, if any.
  pub fn transform_feedback(&self) -> Option<TransformFeedbackRef> {
    self.state().transform_feedback.clone()
  }

  /// Capture state of the bound transform feedback object (or of the default one).
  pub fn capture_state(&self) -> CaptureState {
    self.state().capture_state()
  }

  /// Start capturing vertices.
  pub fn begin_transform_feedback(&self, mode: PrimitiveMode) {
    let mut state = self.state();
    state.capture(CaptureOp::Begin);
    state.driver.begin_transform_feedback(mode);
  }

  /// Pause a running capture.
  pub fn pause_transform_feedback(&self) {
    let mut state = self.state();
    state.capture(CaptureOp::Pause);
    state.driver.pause_transform_feedback();
  }

  /// Resume a paused capture.
  pub fn resume_transform_feedback(&self) {
    let mut state = self.state();
    state.capture(CaptureOp::Resume);
    state.driver.resume_transform_feedback();
  }

  /// Stop capturing vertices.
  pub fn end_transform_feedback(&self) {
    let mut state = self.state();
    state.capture(CaptureOp::End);
    state.driver.end_transform_feedback();
  }

  // matrices

  /// Current model-view matrix.
  pub fn model_view(&self) -> Matrix4<f32> {
    self.state().model_view.get().copied().unwrap_or_else(Matrix4::identity)
  }

  /// Replace the current model-view matrix.
  pub fn set_model_view(&self, m: Matrix4<f32>) {
    self.state().model_view.set(m);
  }

  /// Save the model-view matrix.
  pub fn push_model_view(&self) {
    let mut state = self.state();
    let top = state.model_view.get().copied().unwrap_or_else(Matrix4::identity);
    state.model_view.push(top);
  }

  /// Restore the model-view matrix saved by the matching push.
  pub fn pop_model_view(&self) {
    if self.state().model_view.pop().is_err() {
      fatal(format_args!("model-view matrix stack underflow"));
    }
  }

  /// Post-multiply the model-view matrix.
  pub fn mult_model_view(&self, m: Matrix4<f32>) {
    let mut state = self.state();
    let top = state.model_view.get().copied().unwrap_or_else(Matrix4::identity);
    state.model_view.set(top * m);
  }

  /// Current projection matrix.
  pub fn projection(&self) -> Matrix4<f32> {
    self.state().projection.get().copied().unwrap_or_else(Matrix4::identity)
  }

  /// Replace the current projection matrix.
  pub fn set_projection(&self, m: Matrix4<f32>) {
    self.state().projection.set(m);
  }

  /// Save the projection matrix.
  pub fn push_projection(&self) {
    let mut state = self.state();
    let top = state.projection.get().copied().unwrap_or_else(Matrix4::identity);
    state.projection.push(top);
  }

  /// Restore the projection matrix saved by the matching push.
  pub fn pop_projection(&self) {
    if self.state().projection.pop().is_err() {
      fatal(format_args!("projection matrix stack underflow"));
    }
  }

  /// Post-multiply the projection matrix.
  pub fn mult_projection(&self, m: Matrix4<f32>) {
    let mut state = self.state();
    let top = state.projection.get().copied().unwrap_or_else(Matrix4::identity);
    state.projection.set(top * m);
  }

  /// Projection matrix times model-view matrix.
  pub fn model_view_projection(&self) -> Matrix4<f32> {
    self.projection() * self.model_view()
  }

  /// Inverse transpose of the upper-left 3×3 part of the model-view matrix.
  pub fn normal_matrix(&self) -> Matrix3<f32> {
    normal_matrix(&self.model_view())
  }

  // color

  /// Current color, fed to the stock shaders.
  pub fn current_color(&self) -> [f32; 4] {
    self.state().color.get().copied().unwrap_or([1., 1., 1., 1.])
  }

  /// Replace the current color.
  pub fn set_current_color(&self, color: [f32; 4]) {
    self.state().color.set(color);
  }

  /// Save the current color and set a new one.
  pub fn push_color(&self, color: [f32; 4]) {
    self.state().color.push(color);
  }

  /// Restore the color saved by the matching push.
  pub fn pop_color(&self) {
    if self.state().color.pop().is_err() {
      fatal(format_args!("color stack underflow"));
    }
  }

  // diagnostics

  /// Check that every push was matched by a pop.
  pub fn check_balanced(&self) -> Result<(), SanityError> {
    let divergences = self.state().unbalanced();

    if divergences.is_empty() {
      Ok(())
    } else {
      Err(SanityError { divergences })
    }
  }

  /// Compare every known cached value with the driver, and check that every push was matched by a pop.
  pub fn sanity_check(&self) -> Result<(), SanityError> {
    let divergences = self.state().diverging();

    if divergences.is_empty() {
      Ok(())
    } else {
      for divergence in &divergences {
        log::warn!("context {}: {}", self.id, divergence);
      }

      Err(SanityError { divergences })
    }
  }

  /// Write the cached state in a human readable way.
  pub fn print_state<W>(&self, out: &mut W) -> io::Result<()>
  where
    W: io::Write,
  {
    let state = self.state();
    let unknown = |known: bool| if known { "" } else { " (unknown)" };

    writeln!(out, "context {} ({:?}, {})", self.id, self.environment.profile(), self.caps.renderer)?;

    match state.vao.get() {
      Some(Some(vao)) => writeln!(out, "  vertex array: {} ({:?})", vao.id(), vao.kind())?,
      Some(None) => writeln!(out, "  vertex array: none")?,
      None => writeln!(out, "  vertex array: unknown")?,
    }

    writeln!(out, "  viewport: {:?}{}", state.viewport.get(), unknown(state.viewport.get().is_some()))?;
    writeln!(out, "  scissor: {:?}{}", state.scissor.get(), unknown(state.scissor.get().is_some()))?;

    match state.program.get() {
      Some(program) => writeln!(out, "  program: {}", program_id(program))?,
      None => writeln!(out, "  program: unknown")?,
    }

    writeln!(out, "  active texture: {:?}", state.active_texture.get())?;

    for (target, id) in state.buffers.iter() {
      writeln!(out, "  {:?} buffer: {:?}", target, id)?;
    }

    for ((unit, target), id) in state.textures.iter() {
      writeln!(out, "  {:?} texture on unit {}: {:?}", target, unit, id)?;
    }

    for (target, id) in state.framebuffers.iter() {
      writeln!(out, "  {:?} framebuffer: {:?}", target, id)?;
    }

    for (cap, stack) in &state.capabilities {
      writeln!(out, "  {:?}: {:?} (depth {})", cap, stack.get(), stack.depth())?;
    }

    writeln!(out, "  blend function: {:?}", state.blend.get())?;
    writeln!(out, "  color: {:?}", state.color.get())?;
    writeln!(out, "  model-view depth: {}", state.model_view.depth())?;
    writeln!(out, "  projection depth: {}", state.projection.depth())?;
    writeln!(out, "  transform feedback capture: {:?}", state.capture_state())?;

    Ok(())
  }

  /// Stock shaders built so far.
  pub fn stock_shaders(&self) -> Ref<BTreeMap<ShaderDef, ProgramRef>> {
    self.stock_shaders.borrow()
  }
}

impl<D> Drop for Context<D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.stock_shaders.get_mut().clear();
    self.default_vao.get_mut().take();
    self.default_array_vbo.get_mut().take();
    self.default_element_vbo.get_mut().take();

    let state = self.state.get_mut();
    let unbalanced = state.unbalanced();

    state.release_objects();

    let pending = mem::take(&mut *self.graveyard.borrow_mut());
    for deletion in pending {
      state.delete(deletion);
    }

    self.registry.release(self.id);
    log::debug!("destroyed context {}", self.id);

    if !unbalanced.is_empty() && !thread::panicking() {
      for divergence in &unbalanced {
        log::error!("context {} destroyed with {}", self.id, divergence);
      }

      debug_assert!(
        unbalanced.is_empty(),
        "context {} destroyed with unbalanced state stacks",
        self.id
      );
    }
  }
}

fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix3<f32> {
  let upper = Matrix3::from_cols(
    model_view.x.truncate(),
    model_view.y.truncate(),
    model_view.z.truncate(),
  );

  upper
    .invert()
    .map(|inverse| inverse.transpose())
    .unwrap_or_else(Matrix3::identity)
}
