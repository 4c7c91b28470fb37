use gl::types::*;
use std::ffi::CString;
use std::ptr::{null, null_mut};

use gloam::driver::ObjectId;
use gloam::program::{ProgramError, ProgramSources, StageType};

// A compiled stage, deleted once attached and linked.
struct Stage {
  handle: GLuint,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::GeometryShader => gl::GEOMETRY_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

unsafe fn new_stage(ty: StageType, src: &str) -> Result<Stage, ProgramError> {
  let handle = gl::CreateShader(opengl_shader_type(ty));

  if handle == 0 {
    return Err(ProgramError::CompilationFailed(
      ty,
      "unable to create shader stage".to_owned(),
    ));
  }

  let stage = Stage { handle };

  let c_src = CString::new(src.as_bytes())
    .map_err(|_| ProgramError::CompilationFailed(ty, "source contains a nul byte".to_owned()))?;
  gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
  gl::CompileShader(handle);

  let mut compiled: GLint = gl::FALSE.into();
  gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

  if compiled == gl::TRUE.into() {
    Ok(stage)
  } else {
    let mut log_len: GLint = 0;
    gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
    gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

    Err(ProgramError::CompilationFailed(ty, info_log(log)))
  }
}

unsafe fn link(handle: GLuint) -> Result<(), ProgramError> {
  gl::LinkProgram(handle);

  let mut linked: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

  if linked == gl::TRUE.into() {
    Ok(())
  } else {
    let mut log_len: GLint = 0;
    gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
    gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

    Err(ProgramError::LinkFailed(info_log(log)))
  }
}

// logs are nul-terminated
fn info_log(mut log: Vec<u8>) -> String {
  if let Some(end) = log.iter().position(|&b| b == 0) {
    log.truncate(end);
  }

  String::from_utf8_lossy(&log).into_owned()
}

/// Compile every stage, bind the requested attribute locations and link.
///
/// The program is deleted if anything fails.
pub(crate) unsafe fn compile_program(sources: &ProgramSources) -> Result<ObjectId, ProgramError> {
  let vertex = new_stage(StageType::VertexShader, &sources.vertex)?;
  let geometry = match sources.geometry {
    Some(ref src) => Some(new_stage(StageType::GeometryShader, src)?),
    None => None,
  };
  let fragment = new_stage(StageType::FragmentShader, &sources.fragment)?;

  let handle = gl::CreateProgram();

  gl::AttachShader(handle, vertex.handle);

  if let Some(ref geometry) = geometry {
    gl::AttachShader(handle, geometry.handle);
  }

  gl::AttachShader(handle, fragment.handle);

  for (name, location) in &sources.attrib_locations {
    match CString::new(name.as_bytes()) {
      Ok(c_name) => gl::BindAttribLocation(handle, *location, c_name.as_ptr() as *const GLchar),
      Err(_) => log::warn!("cannot bind attribute {:?}: name contains a nul byte", name),
    }
  }

  match link(handle) {
    Ok(()) => Ok(handle),
    Err(e) => {
      gl::DeleteProgram(handle);
      Err(e)
    }
  }
}

pub(crate) unsafe fn get_uniform_location(program: GLuint, name: &str) -> Option<GLint> {
  let c_name = CString::new(name.as_bytes()).ok()?;
  let location = gl::GetUniformLocation(program, c_name.as_ptr() as *const GLchar);

  if location < 0 {
    None
  } else {
    Some(location)
  }
}

pub(crate) unsafe fn get_attrib_location(program: GLuint, name: &str) -> Option<GLuint> {
  let c_name = CString::new(name.as_bytes()).ok()?;
  let location = gl::GetAttribLocation(program, c_name.as_ptr() as *const GLchar);

  if location < 0 {
    None
  } else {
    Some(location as GLuint)
  }
}
