//! Driver interface.
//!
//! [`Driver`] is the single seam between the state-tracking engine and the graphics API. It exposes one method per
//! driver command or query the engine needs, with no caching of its own: every call is expected to reach the
//! underlying API. Caching and redundancy elision are entirely handled by [`Context`](crate::context::Context).
//!
//! Two implementations are provided: an OpenGL 3.3 one in the `gloam-gl` crate, and [`headless::HeadlessDriver`], a
//! simulated state machine recording every call it receives.

pub mod headless;

use std::error;
use std::fmt;

use crate::blending::BlendFactors;
use crate::buffer::BufferUsage;
use crate::capability::Capability;
use crate::program::{ProgramError, ProgramSources};
use crate::region::Region;
use crate::target::{BufferTarget, FramebufferTarget, TextureTarget};
use crate::vertex::{AttribPointer, Face, IndexType, PolygonMode, PrimitiveMode};

/// Driver object name.
///
/// `0` is never a valid object and stands for “nothing bound”.
pub type ObjectId = u32;

/// Features of a driver, detected once when a [`Context`](crate::context::Context) is created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DriverCaps {
  /// The driver implements OpenGL ES.
  pub es: bool,
  /// The driver runs a core profile context (no fixed-function leftovers).
  pub core_profile: bool,
  /// Vertex array objects are available, either natively or through `OES_vertex_array_object` on ES.
  pub vertex_array_objects: bool,
  /// Transform feedback objects (`glGenTransformFeedbacks`) are available.
  pub transform_feedback_objects: bool,
  /// Number of texture units the fragment stage can sample from.
  pub max_texture_units: u32,
  /// Human readable description of the driver.
  pub renderer: String,
}

/// Error that might occur when setting up a driver.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum DriverError {
  /// The driver cannot share its objects with another one.
  SharingUnsupported,
  /// The driver is unusable on this thread.
  Unavailable(String),
}

impl fmt::Display for DriverError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DriverError::SharingUnsupported => f.write_str("driver objects cannot be shared"),
      DriverError::Unavailable(ref reason) => write!(f, "unavailable driver: {}", reason),
    }
  }
}

impl error::Error for DriverError {}

/// Commands and queries of the graphics API.
///
/// Implementors must issue every call to the underlying API; the caller takes care of eliding redundant commands.
/// Queries are only issued when a cached value is unknown.
pub trait Driver {
  /// Detect the driver features.
  fn capabilities(&mut self) -> DriverCaps;

  /// Create a driver sharing its objects with this one.
  fn create_shared(&self) -> Result<Self, DriverError>
  where
    Self: Sized;

  // queries

  fn query_viewport(&mut self) -> Region;

  fn query_scissor(&mut self) -> Region;

  fn query_capability(&mut self, cap: Capability) -> bool;

  /// `None` if the driver reports factors it doesn’t know about.
  fn query_blend_factors(&mut self) -> Option<BlendFactors>;

  fn query_buffer_binding(&mut self, target: BufferTarget) -> ObjectId;

  /// Texture bound to a target of a texture unit.
  ///
  /// The active texture unit is left unchanged.
  fn query_texture_binding(&mut self, target: TextureTarget, unit: u32) -> ObjectId;

  /// Active texture unit, relative to the first one.
  fn query_active_texture(&mut self) -> u32;

  /// Framebuffer bound to a target. [`FramebufferTarget::Both`] queries the draw target.
  fn query_framebuffer_binding(&mut self, target: FramebufferTarget) -> ObjectId;

  fn query_vertex_array_binding(&mut self) -> ObjectId;

  fn query_program(&mut self) -> ObjectId;

  // state

  fn viewport(&mut self, region: Region);

  fn scissor(&mut self, region: Region);

  fn set_capability(&mut self, cap: Capability, enabled: bool);

  fn blend_func_separate(&mut self, factors: BlendFactors);

  /// Select the active texture unit, relative to the first one.
  fn active_texture(&mut self, unit: u32);

  fn bind_texture(&mut self, target: TextureTarget, id: ObjectId);

  fn bind_buffer(&mut self, target: BufferTarget, id: ObjectId);

  fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: ObjectId);

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: ObjectId);

  fn bind_vertex_array(&mut self, id: ObjectId);

  /// Bind a vertex array through `OES_vertex_array_object`.
  fn bind_vertex_array_oes(&mut self, id: ObjectId) {
    self.bind_vertex_array(id)
  }

  fn use_program(&mut self, id: ObjectId);

  fn polygon_mode(&mut self, face: Face, mode: PolygonMode);

  // objects

  fn gen_buffer(&mut self) -> ObjectId;

  fn delete_buffer(&mut self, id: ObjectId);

  fn gen_texture(&mut self) -> ObjectId;

  fn delete_texture(&mut self, id: ObjectId);

  fn gen_framebuffer(&mut self) -> ObjectId;

  fn delete_framebuffer(&mut self, id: ObjectId);

  fn gen_vertex_array(&mut self) -> ObjectId;

  fn delete_vertex_array(&mut self, id: ObjectId);

  fn gen_vertex_array_oes(&mut self) -> ObjectId {
    self.gen_vertex_array()
  }

  fn delete_vertex_array_oes(&mut self, id: ObjectId) {
    self.delete_vertex_array(id)
  }

  fn gen_transform_feedback(&mut self) -> ObjectId;

  fn delete_transform_feedback(&mut self, id: ObjectId);

  // buffer storage

  /// (Re)allocate the storage of the buffer bound to a target, optionally filling it.
  fn buffer_data(&mut self, target: BufferTarget, size: usize, data: Option<&[u8]>, usage: BufferUsage);

  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);

  // textures and framebuffers

  fn generate_mipmap(&mut self, target: TextureTarget);

  /// Attach a texture level to a color attachment of the framebuffer bound to a target.
  fn framebuffer_texture(
    &mut self,
    target: FramebufferTarget,
    attachment: u32,
    texture_target: TextureTarget,
    texture: ObjectId,
  );

  /// Copy the color buffer of the read framebuffer into the draw framebuffer.
  fn blit_framebuffer(&mut self, src: Region, dst: Region);

  // transform feedback

  fn bind_transform_feedback(&mut self, id: ObjectId);

  fn begin_transform_feedback(&mut self, mode: PrimitiveMode);

  fn pause_transform_feedback(&mut self);

  fn resume_transform_feedback(&mut self);

  fn end_transform_feedback(&mut self);

  // vertex attributes

  /// Describe an attribute sourced from the buffer bound to [`BufferTarget::Array`].
  fn vertex_attrib_pointer(&mut self, pointer: AttribPointer);

  fn enable_vertex_attrib_array(&mut self, index: u32);

  fn disable_vertex_attrib_array(&mut self, index: u32);

  /// Constant value of a disabled attribute.
  fn vertex_attrib(&mut self, index: u32, value: [f32; 4]);

  // draws

  fn draw_arrays(&mut self, mode: PrimitiveMode, first: i32, count: i32);

  /// Draw indexed primitives, `offset` bytes into the element array buffer.
  fn draw_elements(&mut self, mode: PrimitiveMode, count: i32, ty: IndexType, offset: usize);

  // programs

  /// Compile and link a program.
  fn compile_program(&mut self, sources: &ProgramSources) -> Result<ObjectId, ProgramError>;

  fn delete_program(&mut self, id: ObjectId);

  fn uniform_location(&mut self, program: ObjectId, name: &str) -> Option<i32>;

  fn attrib_location(&mut self, program: ObjectId, name: &str) -> Option<u32>;

  /// Upload an integer (or sampler) uniform of the program in use.
  fn uniform_1i(&mut self, location: i32, value: i32);

  /// Upload a column-major 3×3 matrix uniform of the program in use.
  fn uniform_matrix3(&mut self, location: i32, value: [[f32; 3]; 3]);

  /// Upload a column-major 4×4 matrix uniform of the program in use.
  fn uniform_matrix4(&mut self, location: i32, value: [[f32; 4]; 4]);
}
