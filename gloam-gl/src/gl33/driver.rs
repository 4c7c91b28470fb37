use gl::types::*;
use std::os::raw::c_void;
use std::ptr::null;

use gloam::blending::BlendFactors;
use gloam::buffer::BufferUsage;
use gloam::capability::Capability;
use gloam::driver::{Driver, DriverCaps, DriverError, ObjectId};
use gloam::program::{ProgramError, ProgramSources};
use gloam::region::Region;
use gloam::target::{BufferTarget, FramebufferTarget, TextureTarget};
use gloam::vertex::{AttribPointer, Face, IndexType, PolygonMode, PrimitiveMode};

use crate::gl33::shader;
use crate::gl33::state::*;
use crate::gl33::GL33;

impl Driver for GL33 {
  fn capabilities(&mut self) -> DriverCaps {
    unsafe {
      let version = get_ctx_string(gl::VERSION);
      let es = version.starts_with("OpenGL ES");
      let core_profile =
        !es && get_ctx_integer(gl::CONTEXT_PROFILE_MASK) as GLenum & gl::CONTEXT_CORE_PROFILE_BIT != 0;
      let renderer = format!(
        "{} {} (OpenGL {})",
        get_ctx_string(gl::VENDOR),
        get_ctx_string(gl::RENDERER),
        version
      );

      let caps = DriverCaps {
        es,
        core_profile,
        vertex_array_objects: gl::GenVertexArrays::is_loaded(),
        transform_feedback_objects: gl::GenTransformFeedbacks::is_loaded(),
        max_texture_units: get_ctx_integer(gl::MAX_TEXTURE_IMAGE_UNITS).max(1) as u32,
        renderer,
      };

      log::debug!("detected driver: {:?}", caps);
      caps
    }
  }

  fn create_shared(&self) -> Result<Self, DriverError> {
    GL33::new()
  }

  fn query_viewport(&mut self) -> Region {
    unsafe { get_ctx_viewport() }
  }

  fn query_scissor(&mut self) -> Region {
    unsafe { get_ctx_scissor() }
  }

  fn query_capability(&mut self, cap: Capability) -> bool {
    unsafe { get_ctx_capability(cap) }
  }

  fn query_blend_factors(&mut self) -> Option<BlendFactors> {
    match unsafe { get_ctx_blending_factors() } {
      Ok(factors) => Some(factors),
      Err(factor) => {
        log::warn!("unknown blending factor: 0x{:x}", factor);
        None
      }
    }
  }

  fn query_buffer_binding(&mut self, target: BufferTarget) -> ObjectId {
    unsafe { get_ctx_buffer_binding(target) }
  }

  fn query_texture_binding(&mut self, target: TextureTarget, unit: u32) -> ObjectId {
    unsafe { get_ctx_texture_binding(target, unit) }
  }

  fn query_active_texture(&mut self) -> u32 {
    unsafe { get_ctx_current_texture_unit() }
  }

  fn query_framebuffer_binding(&mut self, target: FramebufferTarget) -> ObjectId {
    unsafe { get_ctx_bound_framebuffer(target) }
  }

  fn query_vertex_array_binding(&mut self) -> ObjectId {
    unsafe { get_ctx_bound_vertex_array() }
  }

  fn query_program(&mut self) -> ObjectId {
    unsafe { get_ctx_current_program() }
  }

  fn viewport(&mut self, region: Region) {
    unsafe { gl::Viewport(region.x, region.y, region.width, region.height) }
  }

  fn scissor(&mut self, region: Region) {
    unsafe { gl::Scissor(region.x, region.y, region.width, region.height) }
  }

  fn set_capability(&mut self, cap: Capability, enabled: bool) {
    unsafe {
      match from_capability(cap) {
        Some(name) if enabled => gl::Enable(name),
        Some(name) => gl::Disable(name),
        None => gl::DepthMask(if enabled { gl::TRUE } else { gl::FALSE }),
      }
    }
  }

  fn blend_func_separate(&mut self, factors: BlendFactors) {
    unsafe {
      gl::BlendFuncSeparate(
        from_blending_factor(factors.src_rgb),
        from_blending_factor(factors.dst_rgb),
        from_blending_factor(factors.src_alpha),
        from_blending_factor(factors.dst_alpha),
      )
    }
  }

  fn active_texture(&mut self, unit: u32) {
    unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) }
  }

  fn bind_texture(&mut self, target: TextureTarget, id: ObjectId) {
    unsafe { gl::BindTexture(from_texture_target(target), id) }
  }

  fn bind_buffer(&mut self, target: BufferTarget, id: ObjectId) {
    unsafe { gl::BindBuffer(from_buffer_target(target), id) }
  }

  fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: ObjectId) {
    unsafe { gl::BindBufferBase(from_buffer_target(target), index, id) }
  }

  fn bind_framebuffer(&mut self, target: FramebufferTarget, id: ObjectId) {
    unsafe { gl::BindFramebuffer(from_framebuffer_target(target), id) }
  }

  fn bind_vertex_array(&mut self, id: ObjectId) {
    unsafe { gl::BindVertexArray(id) }
  }

  fn use_program(&mut self, id: ObjectId) {
    unsafe { gl::UseProgram(id) }
  }

  fn polygon_mode(&mut self, face: Face, mode: PolygonMode) {
    unsafe { gl::PolygonMode(from_face(face), from_polygon_mode(mode)) }
  }

  fn gen_buffer(&mut self) -> ObjectId {
    let mut id = 0;
    unsafe { gl::GenBuffers(1, &mut id) };
    id
  }

  fn delete_buffer(&mut self, id: ObjectId) {
    unsafe { gl::DeleteBuffers(1, &id) }
  }

  fn gen_texture(&mut self) -> ObjectId {
    let mut id = 0;
    unsafe { gl::GenTextures(1, &mut id) };
    id
  }

  fn delete_texture(&mut self, id: ObjectId) {
    unsafe { gl::DeleteTextures(1, &id) }
  }

  fn gen_framebuffer(&mut self) -> ObjectId {
    let mut id = 0;
    unsafe { gl::GenFramebuffers(1, &mut id) };
    id
  }

  fn delete_framebuffer(&mut self, id: ObjectId) {
    unsafe { gl::DeleteFramebuffers(1, &id) }
  }

  fn gen_vertex_array(&mut self) -> ObjectId {
    let mut id = 0;
    unsafe { gl::GenVertexArrays(1, &mut id) };
    id
  }

  fn delete_vertex_array(&mut self, id: ObjectId) {
    unsafe { gl::DeleteVertexArrays(1, &id) }
  }

  fn gen_transform_feedback(&mut self) -> ObjectId {
    let mut id = 0;
    unsafe { gl::GenTransformFeedbacks(1, &mut id) };
    id
  }

  fn delete_transform_feedback(&mut self, id: ObjectId) {
    unsafe { gl::DeleteTransformFeedbacks(1, &id) }
  }

  fn buffer_data(&mut self, target: BufferTarget, size: usize, data: Option<&[u8]>, usage: BufferUsage) {
    let target = from_buffer_target(target);
    let usage = from_buffer_usage(usage);

    unsafe {
      match data {
        Some(data) if data.len() >= size => gl::BufferData(
          target,
          data.len() as GLsizeiptr,
          data.as_ptr() as *const c_void,
          usage,
        ),

        Some(data) => {
          gl::BufferData(target, size as GLsizeiptr, null(), usage);
          gl::BufferSubData(target, 0, data.len() as GLsizeiptr, data.as_ptr() as *const c_void);
        }

        None => gl::BufferData(target, size as GLsizeiptr, null(), usage),
      }
    }
  }

  fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
    unsafe {
      gl::BufferSubData(
        from_buffer_target(target),
        offset as GLintptr,
        data.len() as GLsizeiptr,
        data.as_ptr() as *const c_void,
      )
    }
  }

  fn generate_mipmap(&mut self, target: TextureTarget) {
    unsafe { gl::GenerateMipmap(from_texture_target(target)) }
  }

  fn framebuffer_texture(
    &mut self,
    target: FramebufferTarget,
    attachment: u32,
    texture_target: TextureTarget,
    texture: ObjectId,
  ) {
    unsafe {
      gl::FramebufferTexture2D(
        from_framebuffer_target(target),
        gl::COLOR_ATTACHMENT0 + attachment,
        from_texture_target(texture_target),
        texture,
        0,
      )
    }
  }

  fn blit_framebuffer(&mut self, src: Region, dst: Region) {
    unsafe {
      gl::BlitFramebuffer(
        src.x,
        src.y,
        src.x + src.width,
        src.y + src.height,
        dst.x,
        dst.y,
        dst.x + dst.width,
        dst.y + dst.height,
        gl::COLOR_BUFFER_BIT,
        gl::NEAREST,
      )
    }
  }

  fn bind_transform_feedback(&mut self, id: ObjectId) {
    unsafe { gl::BindTransformFeedback(gl::TRANSFORM_FEEDBACK, id) }
  }

  fn begin_transform_feedback(&mut self, mode: PrimitiveMode) {
    unsafe { gl::BeginTransformFeedback(from_primitive_mode(mode)) }
  }

  fn pause_transform_feedback(&mut self) {
    unsafe { gl::PauseTransformFeedback() }
  }

  fn resume_transform_feedback(&mut self) {
    unsafe { gl::ResumeTransformFeedback() }
  }

  fn end_transform_feedback(&mut self) {
    unsafe { gl::EndTransformFeedback() }
  }

  fn vertex_attrib_pointer(&mut self, pointer: AttribPointer) {
    unsafe {
      gl::VertexAttribPointer(
        pointer.index,
        pointer.size,
        from_attrib_type(pointer.ty),
        if pointer.normalized { gl::TRUE } else { gl::FALSE },
        pointer.stride,
        pointer.offset as *const c_void,
      )
    }
  }

  fn enable_vertex_attrib_array(&mut self, index: u32) {
    unsafe { gl::EnableVertexAttribArray(index) }
  }

  fn disable_vertex_attrib_array(&mut self, index: u32) {
    unsafe { gl::DisableVertexAttribArray(index) }
  }

  fn vertex_attrib(&mut self, index: u32, value: [f32; 4]) {
    unsafe { gl::VertexAttrib4fv(index, value.as_ptr()) }
  }

  fn draw_arrays(&mut self, mode: PrimitiveMode, first: i32, count: i32) {
    unsafe { gl::DrawArrays(from_primitive_mode(mode), first, count) }
  }

  fn draw_elements(&mut self, mode: PrimitiveMode, count: i32, ty: IndexType, offset: usize) {
    unsafe {
      gl::DrawElements(
        from_primitive_mode(mode),
        count,
        from_index_type(ty),
        offset as *const c_void,
      )
    }
  }

  fn compile_program(&mut self, sources: &ProgramSources) -> Result<ObjectId, ProgramError> {
    unsafe { shader::compile_program(sources) }
  }

  fn delete_program(&mut self, id: ObjectId) {
    unsafe { gl::DeleteProgram(id) }
  }

  fn uniform_location(&mut self, program: ObjectId, name: &str) -> Option<i32> {
    unsafe { shader::get_uniform_location(program, name) }
  }

  fn attrib_location(&mut self, program: ObjectId, name: &str) -> Option<u32> {
    unsafe { shader::get_attrib_location(program, name) }
  }

  fn uniform_1i(&mut self, location: i32, value: i32) {
    unsafe { gl::Uniform1i(location, value) }
  }

  fn uniform_matrix3(&mut self, location: i32, value: [[f32; 3]; 3]) {
    unsafe { gl::UniformMatrix3fv(location, 1, gl::FALSE, value.as_ptr() as *const f32) }
  }

  fn uniform_matrix4(&mut self, location: i32, value: [[f32; 4]; 4]) {
    unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr() as *const f32) }
  }
}
