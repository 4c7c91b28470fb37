//! Headless driver.
//!
//! [`HeadlessDriver`] simulates the subset of the OpenGL state machine the engine drives, without any GPU. Every
//! command updates a [`HeadlessState`] and is appended to its call log as a [`Call`]; queries answer from that state
//! and are not logged. It’s meant for tests and for applications that must run without a graphics device.
//!
//! The driver is a cheap handle: cloning it yields another view on the same simulated state, so that a test can keep
//! one around while a [`Context`](crate::context::Context) owns the other.
//!
//! Shader programs are not compiled; their uniforms and attributes are extracted from the declarations found in the
//! sources, which is enough to resolve locations.

use std::any::Any;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::blending::BlendFactors;
use crate::buffer::BufferUsage;
use crate::capability::Capability;
use crate::driver::{Driver, DriverCaps, DriverError, ObjectId};
use crate::environment::Profile;
use crate::platform::{PlatformData, PlatformError};
use crate::program::{ProgramError, ProgramSources};
use crate::region::Region;
use crate::target::{BufferTarget, FramebufferTarget, TextureTarget};
use crate::vertex::{AttribPointer, Face, IndexType, PolygonMode, PrimitiveMode};

/// A command received by a [`HeadlessDriver`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  Viewport(Region),
  Scissor(Region),
  SetCapability(Capability, bool),
  BlendFuncSeparate(BlendFactors),
  ActiveTexture(u32),
  BindTexture(TextureTarget, ObjectId),
  BindBuffer(BufferTarget, ObjectId),
  BindBufferBase(BufferTarget, u32, ObjectId),
  BindFramebuffer(FramebufferTarget, ObjectId),
  BindVertexArray(ObjectId),
  BindVertexArrayOes(ObjectId),
  UseProgram(ObjectId),
  PolygonMode(Face, PolygonMode),
  GenBuffer(ObjectId),
  DeleteBuffer(ObjectId),
  GenTexture(ObjectId),
  DeleteTexture(ObjectId),
  GenFramebuffer(ObjectId),
  DeleteFramebuffer(ObjectId),
  GenVertexArray(ObjectId),
  DeleteVertexArray(ObjectId),
  GenTransformFeedback(ObjectId),
  DeleteTransformFeedback(ObjectId),
  BufferData(BufferTarget, usize, BufferUsage),
  BufferSubData(BufferTarget, usize, usize),
  GenerateMipmap(TextureTarget),
  FramebufferTexture(FramebufferTarget, u32, TextureTarget, ObjectId),
  BlitFramebuffer(Region, Region),
  BindTransformFeedback(ObjectId),
  BeginTransformFeedback(PrimitiveMode),
  PauseTransformFeedback,
  ResumeTransformFeedback,
  EndTransformFeedback,
  VertexAttribPointer(AttribPointer),
  EnableVertexAttribArray(u32),
  DisableVertexAttribArray(u32),
  VertexAttrib(u32, [f32; 4]),
  DrawArrays(PrimitiveMode, i32, i32),
  DrawElements(PrimitiveMode, i32, IndexType, usize),
  CompileProgram(ObjectId),
  DeleteProgram(ObjectId),
  Uniform1i(i32, i32),
  UniformMatrix3(i32, [[f32; 3]; 3]),
  UniformMatrix4(i32, [[f32; 4]; 4]),
}

impl Call {
  /// Whether the call binds something.
  pub fn is_bind(&self) -> bool {
    matches!(
      *self,
      Call::BindTexture(..)
        | Call::BindBuffer(..)
        | Call::BindBufferBase(..)
        | Call::BindFramebuffer(..)
        | Call::BindVertexArray(_)
        | Call::BindVertexArrayOes(_)
        | Call::UseProgram(_)
        | Call::BindTransformFeedback(_)
    )
  }
}

// Object names, shared between drivers created with `create_shared`.
#[derive(Debug, Default)]
struct Names {
  last: ObjectId,
  live: BTreeSet<ObjectId>,
}

impl Names {
  fn gen(&mut self) -> ObjectId {
    self.last += 1;
    self.live.insert(self.last);
    self.last
  }

  fn delete(&mut self, id: ObjectId) {
    self.live.remove(&id);
  }
}

/// Interface of a simulated program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadlessProgram {
  pub uniforms: Vec<String>,
  pub attribs: BTreeMap<String, u32>,
}

impl HeadlessProgram {
  fn reflect(sources: &ProgramSources) -> Self {
    let mut uniforms = Vec::new();
    let mut attribs = BTreeMap::new();
    let mut inputs = Vec::new();

    let stages = [
      Some(&sources.vertex),
      sources.geometry.as_ref(),
      Some(&sources.fragment),
    ];

    for (stage, source) in stages.iter().enumerate() {
      let source = match source {
        Some(source) => source,
        None => continue,
      };

      for line in source.lines() {
        let tokens: Vec<_> = line
          .trim()
          .trim_end_matches(';')
          .split_whitespace()
          .collect();

        match tokens.as_slice() {
          ["uniform", .., name] if !uniforms.iter().any(|u| u == name) => {
            uniforms.push(name.to_string())
          }
          ["in", .., name] | ["attribute", .., name] if stage == 0 => inputs.push(name.to_string()),
          _ => (),
        }
      }
    }

    for (name, location) in &sources.attrib_locations {
      if inputs.contains(name) {
        attribs.insert(name.clone(), *location);
      }
    }

    let mut next = 0;
    for name in inputs {
      if attribs.contains_key(&name) {
        continue;
      }

      while attribs.values().any(|&loc| loc == next) {
        next += 1;
      }

      attribs.insert(name, next);
    }

    HeadlessProgram { uniforms, attribs }
  }
}

/// Simulated driver state.
///
/// Fields can be altered directly to simulate third-party code changing the driver state behind the engine’s back.
#[derive(Debug)]
pub struct HeadlessState {
  pub caps: DriverCaps,
  pub viewport: Region,
  pub scissor: Region,
  pub capabilities: BTreeMap<Capability, bool>,
  pub blend: BlendFactors,
  pub active_texture: u32,
  pub textures: BTreeMap<(u32, TextureTarget), ObjectId>,
  /// Buffer bindings, the element array one excepted.
  pub buffers: BTreeMap<BufferTarget, ObjectId>,
  /// Element array buffer of each vertex array, `0` being the default one.
  pub elements: BTreeMap<ObjectId, ObjectId>,
  /// Indexed buffer bindings. Transform feedback objects do not keep their own set.
  pub indexed_buffers: BTreeMap<(BufferTarget, u32), ObjectId>,
  pub read_framebuffer: ObjectId,
  pub draw_framebuffer: ObjectId,
  pub vertex_array: ObjectId,
  pub program: ObjectId,
  pub transform_feedback: ObjectId,
  pub polygon_modes: BTreeMap<Face, PolygonMode>,
  pub programs: BTreeMap<ObjectId, HeadlessProgram>,
  pub buffer_sizes: BTreeMap<ObjectId, usize>,
  pub calls: Vec<Call>,
  fail_next_compile: Option<ProgramError>,
  names: Rc<RefCell<Names>>,
}

impl HeadlessState {
  fn new(caps: DriverCaps, names: Rc<RefCell<Names>>) -> Self {
    let capabilities = [
      (Capability::DepthWrite, true),
      (Capability::Multisample, true),
    ]
    .into_iter()
    .collect();

    let polygon_modes = [
      (Face::Front, PolygonMode::Fill),
      (Face::Back, PolygonMode::Fill),
    ]
    .into_iter()
    .collect();

    HeadlessState {
      caps,
      viewport: Region::sized(640, 480),
      scissor: Region::sized(640, 480),
      capabilities,
      blend: BlendFactors::default(),
      active_texture: 0,
      textures: BTreeMap::new(),
      buffers: BTreeMap::new(),
      elements: BTreeMap::new(),
      indexed_buffers: BTreeMap::new(),
      read_framebuffer: 0,
      draw_framebuffer: 0,
      vertex_array: 0,
      program: 0,
      transform_feedback: 0,
      polygon_modes,
      programs: BTreeMap::new(),
      buffer_sizes: BTreeMap::new(),
      calls: Vec::new(),
      fail_next_compile: None,
      names,
    }
  }

  /// Whether an object name is alive.
  pub fn is_live(&self, id: ObjectId) -> bool {
    self.names.borrow().live.contains(&id)
  }

  pub fn indexed_buffer(&self, target: BufferTarget, index: u32) -> ObjectId {
    self.indexed_buffers.get(&(target, index)).copied().unwrap_or(0)
  }

  pub fn capability(&self, cap: Capability) -> bool {
    self.capabilities.get(&cap).copied().unwrap_or(false)
  }

  pub fn texture(&self, unit: u32, target: TextureTarget) -> ObjectId {
    self.textures.get(&(unit, target)).copied().unwrap_or(0)
  }

  pub fn buffer(&self, target: BufferTarget) -> ObjectId {
    match target {
      BufferTarget::ElementArray => self.elements.get(&self.vertex_array).copied().unwrap_or(0),
      _ => self.buffers.get(&target).copied().unwrap_or(0),
    }
  }

  fn set_buffer(&mut self, target: BufferTarget, id: ObjectId) {
    match target {
      BufferTarget::ElementArray => {
        self.elements.insert(self.vertex_array, id);
      }
      _ => {
        self.buffers.insert(target, id);
      }
    }
  }

  fn gen(&mut self) -> ObjectId {
    self.names.borrow_mut().gen()
  }

  fn delete(&mut self, id: ObjectId) {
    self.names.borrow_mut().delete(id);
  }
}

/// Simulated driver.
#[derive(Clone, Debug)]
pub struct HeadlessDriver {
  state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDriver {
  /// A driver behaving like a typical implementation of a profile.
  ///
  /// Core drivers have vertex array and transform feedback objects, compatibility drivers only vertex array objects
  /// and ES 2 drivers neither.
  pub fn new(profile: Profile) -> Self {
    let (es, core_profile, vertex_array_objects, transform_feedback_objects) = match profile {
      Profile::Core => (false, true, true, true),
      Profile::Compatibility => (false, false, true, false),
      Profile::Es2 => (true, false, false, false),
    };

    Self::with_caps(DriverCaps {
      es,
      core_profile,
      vertex_array_objects,
      transform_feedback_objects,
      max_texture_units: 16,
      renderer: format!("headless ({:?})", profile),
    })
  }

  pub fn with_caps(caps: DriverCaps) -> Self {
    let names = Rc::new(RefCell::new(Names::default()));

    HeadlessDriver {
      state: Rc::new(RefCell::new(HeadlessState::new(caps, names))),
    }
  }

  pub fn state(&self) -> Ref<HeadlessState> {
    self.state.borrow()
  }

  pub fn state_mut(&self) -> RefMut<HeadlessState> {
    self.state.borrow_mut()
  }

  /// Commands received so far.
  pub fn calls(&self) -> Vec<Call> {
    self.state.borrow().calls.clone()
  }

  pub fn clear_calls(&self) {
    self.state.borrow_mut().calls.clear();
  }

  /// Number of commands received so far matching a predicate.
  pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
    self.state.borrow().calls.iter().filter(|call| pred(call)).count()
  }

  /// Make the next program compilation fail.
  pub fn fail_next_compile(&self, error: ProgramError) {
    self.state.borrow_mut().fail_next_compile = Some(error);
  }

  fn record(&mut self, call: Call) -> RefMut<HeadlessState> {
    let mut state = self.state.borrow_mut();
    state.calls.push(call);
    state
  }
}

impl Driver for HeadlessDriver {
  fn capabilities(&mut self) -> DriverCaps {
    self.state.borrow().caps.clone()
  }

  fn create_shared(&self) -> Result<Self, DriverError> {
    let state = self.state.borrow();

    Ok(HeadlessDriver {
      state: Rc::new(RefCell::new(HeadlessState::new(
        state.caps.clone(),
        state.names.clone(),
      ))),
    })
  }

  fn query_viewport(&mut self) -> Region {
    self.state.borrow().viewport
  }

  fn query_scissor(&mut self) -> Region {
    self.state.borrow().scissor
  }

  fn query_capability(&mut self, cap: Capability) -> bool {
    self.state.borrow().capability(cap)
  }

  fn query_blend_factors(&mut self) -> Option<BlendFactors> {
    Some(self.state.borrow().blend)
  }

  fn query_buffer_binding(&mut self, target: BufferTarget) -> ObjectId {
    self.state.borrow().buffer(target)
  }

  fn query_texture_binding(&mut self, target: TextureTarget, unit: u32) -> ObjectId {
    self.state.borrow().texture(unit, target)
  }

  fn query_active_texture(&mut self) -> u32 {
    self.state.borrow().active_texture
  }

  fn query_framebuffer_binding(&mut self, target: FramebufferTarget) -> ObjectId {
    let state = self.state.borrow();

    match target {
      FramebufferTarget::Read => state.read_framebuffer,
      FramebufferTarget::Draw | FramebufferTarget::Both => state.draw_framebuffer,
    }
  }

  fn query_vertex_array_binding(&mut self) -> ObjectId {
    self.state.borrow().vertex_array
  }

  fn query_program(&mut self) -> ObjectId {
    self.state.borrow().program
  }

  fn viewport(&mut self, region: Region) {
    self.record(Call::Viewport(region)).viewport = region;
  }

  fn scissor(&mut self, region: Region) {
    self.record(Call::Scissor(region)).scissor = region;
  }

  fn set_capability(&mut self, cap: Capability, enabled: bool) {
    self
      .record(Call::SetCapability(cap, enabled))
      .capabilities
      .insert(cap, enabled);
  }

  fn blend_func_separate(&mut self, factors: BlendFactors) {
    self.record(Call::BlendFuncSeparate(factors)).blend = factors;
  }

  fn active_texture(&mut self, unit: u32) {
    self.record(Call::ActiveTexture(unit)).active_texture = unit;
  }

  fn bind_texture(&mut self, target: TextureTarget, id: ObjectId) {
    let mut state = self.record(Call::BindTexture(target, id));
    let unit = state.active_texture;
    state.textures.insert((unit, target), id);
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: ObjectId) {
    self.record(Call::BindBuffer(target, id)).set_buffer(target, id);
  }

  fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: ObjectId) {
    let mut state = self.record(Call::BindBufferBase(target, index, id));
    state.indexed_buffers.insert((target, index), id);
    state.set_buffer(target, id);
  }

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: ObjectId) {
    let mut state = self.record(Call::BindFramebuffer(target, id));

    if target != FramebufferTarget::Draw {
      state.read_framebuffer = id;
    }

    if target != FramebufferTarget::Read {
      state.draw_framebuffer = id;
    }
  }

  fn bind_vertex_array(&mut self, id: ObjectId) {
    self.record(Call::BindVertexArray(id)).vertex_array = id;
  }

  fn bind_vertex_array_oes(&mut self, id: ObjectId) {
    self.record(Call::BindVertexArrayOes(id)).vertex_array = id;
  }

  fn use_program(&mut self, id: ObjectId) {
    self.record(Call::UseProgram(id)).program = id;
  }

  fn polygon_mode(&mut self, face: Face, mode: PolygonMode) {
    let mut state = self.record(Call::PolygonMode(face, mode));

    match face {
      Face::FrontAndBack => {
        state.polygon_modes.insert(Face::Front, mode);
        state.polygon_modes.insert(Face::Back, mode);
      }
      _ => {
        state.polygon_modes.insert(face, mode);
      }
    }
  }

  fn gen_buffer(&mut self) -> ObjectId {
    let id = self.state.borrow_mut().gen();
    self.record(Call::GenBuffer(id));
    id
  }

  fn delete_buffer(&mut self, id: ObjectId) {
    let mut guard = self.record(Call::DeleteBuffer(id));
    let state = &mut *guard;
    state.delete(id);
    state.buffer_sizes.remove(&id);
    state
      .buffers
      .values_mut()
      .chain(state.elements.values_mut())
      .chain(state.indexed_buffers.values_mut())
      .for_each(|bound| {
        if *bound == id {
          *bound = 0;
        }
      });
  }

  fn gen_texture(&mut self) -> ObjectId {
    let id = self.state.borrow_mut().gen();
    self.record(Call::GenTexture(id));
    id
  }

  fn delete_texture(&mut self, id: ObjectId) {
    let mut state = self.record(Call::DeleteTexture(id));
    state.delete(id);
    state.textures.values_mut().for_each(|bound| {
      if *bound == id {
        *bound = 0;
      }
    });
  }

  fn gen_framebuffer(&mut self) -> ObjectId {
    let id = self.state.borrow_mut().gen();
    self.record(Call::GenFramebuffer(id));
    id
  }

  fn delete_framebuffer(&mut self, id: ObjectId) {
    let mut state = self.record(Call::DeleteFramebuffer(id));
    state.delete(id);

    if state.read_framebuffer == id {
      state.read_framebuffer = 0;
    }

    if state.draw_framebuffer == id {
      state.draw_framebuffer = 0;
    }
  }

  fn gen_vertex_array(&mut self) -> ObjectId {
    let id = self.state.borrow_mut().gen();
    self.record(Call::GenVertexArray(id));
    id
  }

  fn delete_vertex_array(&mut self, id: ObjectId) {
    let mut state = self.record(Call::DeleteVertexArray(id));
    state.delete(id);
    state.elements.remove(&id);

    if state.vertex_array == id {
      state.vertex_array = 0;
    }
  }

  fn gen_transform_feedback(&mut self) -> ObjectId {
    let id = self.state.borrow_mut().gen();
    self.record(Call::GenTransformFeedback(id));
    id
  }

  fn delete_transform_feedback(&mut self, id: ObjectId) {
    let mut state = self.record(Call::DeleteTransformFeedback(id));
    state.delete(id);

    if state.transform_feedback == id {
      state.transform_feedback = 0;
    }
  }

  fn buffer_data(&mut self, target: BufferTarget, size: usize, _: Option<&[u8]>, usage: BufferUsage) {
    let mut state = self.record(Call::BufferData(target, size, usage));
    let bound = state.buffer(target);
    state.buffer_sizes.insert(bound, size);
  }

  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
    self.record(Call::BufferSubData(target, offset, data.len()));
  }

  fn generate_mipmap(&mut self, target: TextureTarget) {
    self.record(Call::GenerateMipmap(target));
  }

  fn framebuffer_texture(
    &mut self,
    target: FramebufferTarget,
    attachment: u32,
    texture_target: TextureTarget,
    texture: ObjectId,
  ) {
    self.record(Call::FramebufferTexture(
      target,
      attachment,
      texture_target,
      texture,
    ));
  }

  fn blit_framebuffer(&mut self, src: Region, dst: Region) {
    self.record(Call::BlitFramebuffer(src, dst));
  }

  fn bind_transform_feedback(&mut self, id: ObjectId) {
    self.record(Call::BindTransformFeedback(id)).transform_feedback = id;
  }

  fn begin_transform_feedback(&mut self, mode: PrimitiveMode) {
    self.record(Call::BeginTransformFeedback(mode));
  }

  fn pause_transform_feedback(&mut self) {
    self.record(Call::PauseTransformFeedback);
  }

  fn resume_transform_feedback(&mut self) {
    self.record(Call::ResumeTransformFeedback);
  }

  fn end_transform_feedback(&mut self) {
    self.record(Call::EndTransformFeedback);
  }

  fn vertex_attrib_pointer(&mut self, pointer: AttribPointer) {
    self.record(Call::VertexAttribPointer(pointer));
  }

  fn enable_vertex_attrib_array(&mut self, index: u32) {
    self.record(Call::EnableVertexAttribArray(index));
  }

  fn disable_vertex_attrib_array(&mut self, index: u32) {
    self.record(Call::DisableVertexAttribArray(index));
  }

  fn vertex_attrib(&mut self, index: u32, value: [f32; 4]) {
    self.record(Call::VertexAttrib(index, value));
  }

  fn draw_arrays(&mut self, mode: PrimitiveMode, first: i32, count: i32) {
    self.record(Call::DrawArrays(mode, first, count));
  }

  fn draw_elements(&mut self, mode: PrimitiveMode, count: i32, ty: IndexType, offset: usize) {
    self.record(Call::DrawElements(mode, count, ty, offset));
  }

  fn compile_program(&mut self, sources: &ProgramSources) -> Result<ObjectId, ProgramError> {
    let mut state = self.state.borrow_mut();

    if let Some(error) = state.fail_next_compile.take() {
      return Err(error);
    }

    let id = state.gen();
    state.programs.insert(id, HeadlessProgram::reflect(sources));
    state.calls.push(Call::CompileProgram(id));

    Ok(id)
  }

  fn delete_program(&mut self, id: ObjectId) {
    let mut state = self.record(Call::DeleteProgram(id));
    state.delete(id);
    state.programs.remove(&id);
  }

  fn uniform_location(&mut self, program: ObjectId, name: &str) -> Option<i32> {
    let state = self.state.borrow();
    let program = state.programs.get(&program)?;

    program
      .uniforms
      .iter()
      .position(|uniform| uniform == name)
      .map(|loc| loc as i32)
  }

  fn attrib_location(&mut self, program: ObjectId, name: &str) -> Option<u32> {
    let state = self.state.borrow();
    state.programs.get(&program)?.attribs.get(name).copied()
  }

  fn uniform_1i(&mut self, location: i32, value: i32) {
    self.record(Call::Uniform1i(location, value));
  }

  fn uniform_matrix3(&mut self, location: i32, value: [[f32; 3]; 3]) {
    self.record(Call::UniformMatrix3(location, value));
  }

  fn uniform_matrix4(&mut self, location: i32, value: [[f32; 4]; 4]) {
    self.record(Call::UniformMatrix4(location, value));
  }
}

/// Native context stand-in for the [`HeadlessDriver`].
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
  failing: Cell<bool>,
  make_current_count: Cell<usize>,
}

impl HeadlessPlatform {
  pub fn new() -> Rc<Self> {
    Rc::new(Self::default())
  }

  /// Make every subsequent platform operation fail.
  pub fn set_failing(&self, failing: bool) {
    self.failing.set(failing);
  }

  /// Number of successful [`PlatformData::make_current`] calls.
  pub fn make_current_count(&self) -> usize {
    self.make_current_count.get()
  }
}

impl PlatformData for HeadlessPlatform {
  fn make_current(&self) -> Result<(), PlatformError> {
    if self.failing.get() {
      return Err(PlatformError::MakeCurrentFailed("headless platform failure".to_owned()));
    }

    self.make_current_count.set(self.make_current_count.get() + 1);
    Ok(())
  }

  fn create_shared(&self) -> Result<Rc<dyn PlatformData>, PlatformError> {
    if self.failing.get() {
      return Err(PlatformError::CreationFailed("headless platform failure".to_owned()));
    }

    Ok(HeadlessPlatform::new())
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reflection_finds_uniforms_and_attributes() {
    let sources = ProgramSources::new(
      "#version 150\nuniform mat4 uModelViewProjection;\nin vec4 vPosition;\nin vec4 vColor;\n",
      "#version 150\nuniform sampler2D uTex0;\nin lowp vec4 Color;\nout vec4 oColor;\n",
    )
    .attrib_location("vColor", 0);

    let program = HeadlessProgram::reflect(&sources);

    assert_eq!(program.uniforms, vec!["uModelViewProjection", "uTex0"]);
    assert_eq!(program.attribs.get("vColor"), Some(&0));
    assert_eq!(program.attribs.get("vPosition"), Some(&1));
    assert_eq!(program.attribs.get("Color"), None);
  }

  #[test]
  fn element_array_binding_follows_vertex_array() {
    let mut driver = HeadlessDriver::new(Profile::Core);
    let vao = driver.gen_vertex_array();
    let ebo = driver.gen_buffer();

    driver.bind_vertex_array(vao);
    driver.bind_buffer(BufferTarget::ElementArray, ebo);
    assert_eq!(driver.query_buffer_binding(BufferTarget::ElementArray), ebo);

    driver.bind_vertex_array(0);
    assert_eq!(driver.query_buffer_binding(BufferTarget::ElementArray), 0);
  }

  #[test]
  fn deleting_unbinds() {
    let mut driver = HeadlessDriver::new(Profile::Core);
    let buffer = driver.gen_buffer();

    driver.bind_buffer(BufferTarget::Array, buffer);
    driver.delete_buffer(buffer);

    assert_eq!(driver.query_buffer_binding(BufferTarget::Array), 0);
    assert!(!driver.state().is_live(buffer));
  }

  #[test]
  fn shared_drivers_share_names() {
    let mut a = HeadlessDriver::new(Profile::Core);
    let mut b = a.create_shared().unwrap();

    let x = a.gen_buffer();
    let y = b.gen_buffer();

    assert_ne!(x, y);
    assert!(b.state().is_live(x));
    assert_eq!(b.query_buffer_binding(BufferTarget::Array), 0);
  }
}
