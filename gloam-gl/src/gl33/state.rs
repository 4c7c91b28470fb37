//! Enum mappings and raw state queries.

use gl::types::*;

use gloam::blending::{BlendFactors, Factor};
use gloam::buffer::BufferUsage;
use gloam::capability::Capability;
use gloam::driver::ObjectId;
use gloam::region::Region;
use gloam::target::{BufferTarget, FramebufferTarget, TextureTarget};
use gloam::vertex::{AttribType, Face, IndexType, PolygonMode, PrimitiveMode};

pub(crate) fn from_blending_factor(factor: Factor) -> GLenum {
  match factor {
    Factor::One => gl::ONE,
    Factor::Zero => gl::ZERO,
    Factor::SrcColor => gl::SRC_COLOR,
    Factor::SrcColorComplement => gl::ONE_MINUS_SRC_COLOR,
    Factor::DestColor => gl::DST_COLOR,
    Factor::DestColorComplement => gl::ONE_MINUS_DST_COLOR,
    Factor::SrcAlpha => gl::SRC_ALPHA,
    Factor::SrcAlphaComplement => gl::ONE_MINUS_SRC_ALPHA,
    Factor::DstAlpha => gl::DST_ALPHA,
    Factor::DstAlphaComplement => gl::ONE_MINUS_DST_ALPHA,
    Factor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
  }
}

pub(crate) fn from_gl_blending_factor(factor: GLenum) -> Result<Factor, GLenum> {
  match factor {
    gl::ONE => Ok(Factor::One),
    gl::ZERO => Ok(Factor::Zero),
    gl::SRC_COLOR => Ok(Factor::SrcColor),
    gl::ONE_MINUS_SRC_COLOR => Ok(Factor::SrcColorComplement),
    gl::DST_COLOR => Ok(Factor::DestColor),
    gl::ONE_MINUS_DST_COLOR => Ok(Factor::DestColorComplement),
    gl::SRC_ALPHA => Ok(Factor::SrcAlpha),
    gl::ONE_MINUS_SRC_ALPHA => Ok(Factor::SrcAlphaComplement),
    gl::DST_ALPHA => Ok(Factor::DstAlpha),
    gl::ONE_MINUS_DST_ALPHA => Ok(Factor::DstAlphaComplement),
    gl::SRC_ALPHA_SATURATE => Ok(Factor::SrcAlphaSaturate),
    _ => Err(factor),
  }
}

/// `glEnable` enum of a capability; `None` for the depth mask.
pub(crate) fn from_capability(cap: Capability) -> Option<GLenum> {
  match cap {
    Capability::Blend => Some(gl::BLEND),
    Capability::DepthTest => Some(gl::DEPTH_TEST),
    Capability::DepthWrite => None,
    Capability::ScissorTest => Some(gl::SCISSOR_TEST),
    Capability::StencilTest => Some(gl::STENCIL_TEST),
    Capability::CullFace => Some(gl::CULL_FACE),
    Capability::PolygonOffsetFill => Some(gl::POLYGON_OFFSET_FILL),
    Capability::Multisample => Some(gl::MULTISAMPLE),
    Capability::LineSmooth => Some(gl::LINE_SMOOTH),
    Capability::ProgramPointSize => Some(gl::PROGRAM_POINT_SIZE),
    Capability::FramebufferSrgb => Some(gl::FRAMEBUFFER_SRGB),
    Capability::RasterizerDiscard => Some(gl::RASTERIZER_DISCARD),
    Capability::PrimitiveRestart => Some(gl::PRIMITIVE_RESTART),
  }
}

pub(crate) fn from_buffer_target(target: BufferTarget) -> GLenum {
  match target {
    BufferTarget::Array => gl::ARRAY_BUFFER,
    BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    BufferTarget::Uniform => gl::UNIFORM_BUFFER,
    BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
    BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
    BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
    BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
    BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
    BufferTarget::Texture => gl::TEXTURE_BUFFER,
  }
}

// the copy and texture targets double as their own binding queries
fn buffer_binding_query(target: BufferTarget) -> GLenum {
  match target {
    BufferTarget::Array => gl::ARRAY_BUFFER_BINDING,
    BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER_BINDING,
    BufferTarget::Uniform => gl::UNIFORM_BUFFER_BINDING,
    BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER_BINDING,
    BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER_BINDING,
    BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER_BINDING,
    BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
    BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
    BufferTarget::Texture => gl::TEXTURE_BUFFER,
  }
}

pub(crate) fn from_texture_target(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture1D => gl::TEXTURE_1D,
    TextureTarget::Texture2D => gl::TEXTURE_2D,
    TextureTarget::Texture3D => gl::TEXTURE_3D,
    TextureTarget::Texture1DArray => gl::TEXTURE_1D_ARRAY,
    TextureTarget::Texture2DArray => gl::TEXTURE_2D_ARRAY,
    TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
    TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
    TextureTarget::Buffer => gl::TEXTURE_BUFFER,
    TextureTarget::Texture2DMultisample => gl::TEXTURE_2D_MULTISAMPLE,
  }
}

fn texture_binding_query(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture1D => gl::TEXTURE_BINDING_1D,
    TextureTarget::Texture2D => gl::TEXTURE_BINDING_2D,
    TextureTarget::Texture3D => gl::TEXTURE_BINDING_3D,
    TextureTarget::Texture1DArray => gl::TEXTURE_BINDING_1D_ARRAY,
    TextureTarget::Texture2DArray => gl::TEXTURE_BINDING_2D_ARRAY,
    TextureTarget::Rectangle => gl::TEXTURE_BINDING_RECTANGLE,
    TextureTarget::CubeMap => gl::TEXTURE_BINDING_CUBE_MAP,
    TextureTarget::Buffer => gl::TEXTURE_BINDING_BUFFER,
    TextureTarget::Texture2DMultisample => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
  }
}

pub(crate) fn from_framebuffer_target(target: FramebufferTarget) -> GLenum {
  match target {
    FramebufferTarget::Read => gl::READ_FRAMEBUFFER,
    FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
    FramebufferTarget::Both => gl::FRAMEBUFFER,
  }
}

pub(crate) fn from_primitive_mode(mode: PrimitiveMode) -> GLenum {
  match mode {
    PrimitiveMode::Points => gl::POINTS,
    PrimitiveMode::Lines => gl::LINES,
    PrimitiveMode::LineStrip => gl::LINE_STRIP,
    PrimitiveMode::LineLoop => gl::LINE_LOOP,
    PrimitiveMode::Triangles => gl::TRIANGLES,
    PrimitiveMode::TriangleStrip => gl::TRIANGLE_STRIP,
    PrimitiveMode::TriangleFan => gl::TRIANGLE_FAN,
  }
}

pub(crate) fn from_index_type(ty: IndexType) -> GLenum {
  match ty {
    IndexType::U8 => gl::UNSIGNED_BYTE,
    IndexType::U16 => gl::UNSIGNED_SHORT,
    IndexType::U32 => gl::UNSIGNED_INT,
  }
}

pub(crate) fn from_attrib_type(ty: AttribType) -> GLenum {
  match ty {
    AttribType::Byte => gl::BYTE,
    AttribType::UnsignedByte => gl::UNSIGNED_BYTE,
    AttribType::Short => gl::SHORT,
    AttribType::UnsignedShort => gl::UNSIGNED_SHORT,
    AttribType::Int => gl::INT,
    AttribType::UnsignedInt => gl::UNSIGNED_INT,
    AttribType::Float => gl::FLOAT,
  }
}

pub(crate) fn from_polygon_mode(mode: PolygonMode) -> GLenum {
  match mode {
    PolygonMode::Point => gl::POINT,
    PolygonMode::Line => gl::LINE,
    PolygonMode::Fill => gl::FILL,
  }
}

pub(crate) fn from_face(face: Face) -> GLenum {
  match face {
    Face::Front => gl::FRONT,
    Face::Back => gl::BACK,
    Face::FrontAndBack => gl::FRONT_AND_BACK,
  }
}

pub(crate) fn from_buffer_usage(usage: BufferUsage) -> GLenum {
  match usage {
    BufferUsage::StreamDraw => gl::STREAM_DRAW,
    BufferUsage::StreamRead => gl::STREAM_READ,
    BufferUsage::StreamCopy => gl::STREAM_COPY,
    BufferUsage::StaticDraw => gl::STATIC_DRAW,
    BufferUsage::StaticRead => gl::STATIC_READ,
    BufferUsage::StaticCopy => gl::STATIC_COPY,
    BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
    BufferUsage::DynamicRead => gl::DYNAMIC_READ,
    BufferUsage::DynamicCopy => gl::DYNAMIC_COPY,
  }
}

pub(crate) unsafe fn get_ctx_integer(name: GLenum) -> GLint {
  let mut value = 0;
  gl::GetIntegerv(name, &mut value);
  value
}

unsafe fn get_ctx_region(name: GLenum) -> Region {
  let mut data = [0; 4];
  gl::GetIntegerv(name, data.as_mut_ptr());
  Region::new(data[0], data[1], data[2], data[3])
}

pub(crate) unsafe fn get_ctx_viewport() -> Region {
  get_ctx_region(gl::VIEWPORT)
}

pub(crate) unsafe fn get_ctx_scissor() -> Region {
  get_ctx_region(gl::SCISSOR_BOX)
}

pub(crate) unsafe fn get_ctx_capability(cap: Capability) -> bool {
  match from_capability(cap) {
    Some(name) => gl::IsEnabled(name) == gl::TRUE,
    None => {
      let mut mask = gl::FALSE;
      gl::GetBooleanv(gl::DEPTH_WRITEMASK, &mut mask);
      mask == gl::TRUE
    }
  }
}

pub(crate) unsafe fn get_ctx_blending_factors() -> Result<BlendFactors, GLenum> {
  let src_rgb = from_gl_blending_factor(get_ctx_integer(gl::BLEND_SRC_RGB) as GLenum)?;
  let dst_rgb = from_gl_blending_factor(get_ctx_integer(gl::BLEND_DST_RGB) as GLenum)?;
  let src_alpha = from_gl_blending_factor(get_ctx_integer(gl::BLEND_SRC_ALPHA) as GLenum)?;
  let dst_alpha = from_gl_blending_factor(get_ctx_integer(gl::BLEND_DST_ALPHA) as GLenum)?;

  Ok(BlendFactors::separate(src_rgb, dst_rgb, src_alpha, dst_alpha))
}

pub(crate) unsafe fn get_ctx_buffer_binding(target: BufferTarget) -> ObjectId {
  get_ctx_integer(buffer_binding_query(target)) as ObjectId
}

pub(crate) unsafe fn get_ctx_current_texture_unit() -> u32 {
  get_ctx_integer(gl::ACTIVE_TEXTURE) as GLenum - gl::TEXTURE0
}

/// Texture bound on a given unit; the active unit is switched back afterwards.
pub(crate) unsafe fn get_ctx_texture_binding(target: TextureTarget, unit: u32) -> ObjectId {
  let active = get_ctx_current_texture_unit();

  if active != unit {
    gl::ActiveTexture(gl::TEXTURE0 + unit);
  }

  let id = get_ctx_integer(texture_binding_query(target)) as ObjectId;

  if active != unit {
    gl::ActiveTexture(gl::TEXTURE0 + active);
  }

  id
}

pub(crate) unsafe fn get_ctx_bound_framebuffer(target: FramebufferTarget) -> ObjectId {
  let name = match target {
    FramebufferTarget::Read => gl::READ_FRAMEBUFFER_BINDING,
    FramebufferTarget::Draw | FramebufferTarget::Both => gl::DRAW_FRAMEBUFFER_BINDING,
  };

  get_ctx_integer(name) as ObjectId
}

pub(crate) unsafe fn get_ctx_bound_vertex_array() -> ObjectId {
  get_ctx_integer(gl::VERTEX_ARRAY_BINDING) as ObjectId
}

pub(crate) unsafe fn get_ctx_current_program() -> ObjectId {
  get_ctx_integer(gl::CURRENT_PROGRAM) as ObjectId
}

pub(crate) unsafe fn get_ctx_string(name: GLenum) -> String {
  let s = gl::GetString(name);

  if s.is_null() {
    String::new()
  } else {
    std::ffi::CStr::from_ptr(s as *const _).to_string_lossy().into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blending_factors_map_back() {
    let factors = [
      Factor::One,
      Factor::Zero,
      Factor::SrcAlpha,
      Factor::SrcAlphaComplement,
      Factor::SrcAlphaSaturate,
    ];

    for &factor in &factors {
      assert_eq!(from_gl_blending_factor(from_blending_factor(factor)), Ok(factor));
    }
  }

  #[test]
  fn unknown_blending_factors_are_rejected() {
    assert_eq!(from_gl_blending_factor(gl::CONSTANT_COLOR), Err(gl::CONSTANT_COLOR));
  }

  #[test]
  fn depth_write_is_not_a_toggle() {
    assert_eq!(from_capability(Capability::DepthWrite), None);
    assert_eq!(from_capability(Capability::Blend), Some(gl::BLEND));
  }

  #[test]
  fn both_framebuffer_targets_use_the_generic_enum() {
    assert_eq!(from_framebuffer_target(FramebufferTarget::Both), gl::FRAMEBUFFER);
    assert_eq!(from_framebuffer_target(FramebufferTarget::Read), gl::READ_FRAMEBUFFER);
  }
}
