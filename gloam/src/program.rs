//! Shader programs.
//!
//! A [`Program`] owns a linked driver program. At creation, the locations of the uniforms and attributes the
//! context knows how to feed – see [`UniformSemantic`] – are looked up once, so that
//! [`Context::set_default_shader_vars`] can upload matrices without querying the driver again.

use std::error;
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};

/// Name of the vertex attribute fed with the current color when no array is enabled for it.
pub const COLOR_ATTRIB: &str = "vColor";

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Geometry shader.
  GeometryShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::GeometryShader => f.write_str("geometry shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that a [`Program`] can generate.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile. The `String` is the compilation log.
  CompilationFailed(StageType, String),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// The driver doesn’t support a stage.
  Unsupported(StageType),
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ProgramError::CompilationFailed(ref ty, ref r) => {
        write!(f, "{} compilation error: {}", ty, r)
      }
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::Unsupported(ty) => write!(f, "unsupported {}", ty),
    }
  }
}

impl error::Error for ProgramError {}

/// Sources of a program, along with the attribute locations to bind before linking.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProgramSources {
  pub vertex: String,
  pub geometry: Option<String>,
  pub fragment: String,
  pub attrib_locations: Vec<(String, u32)>,
}

impl ProgramSources {
  pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
    ProgramSources {
      vertex: vertex.into(),
      fragment: fragment.into(),
      ..Default::default()
    }
  }

  pub fn geometry(mut self, geometry: impl Into<String>) -> Self {
    self.geometry = Some(geometry.into());
    self
  }

  /// Bind an attribute to a location before linking.
  pub fn attrib_location(mut self, name: impl Into<String>, location: u32) -> Self {
    self.attrib_locations.push((name.into(), location));
    self
  }
}

/// Uniforms fed by [`Context::set_default_shader_vars`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformSemantic {
  /// `mat4 uModelView`
  ModelView,
  /// `mat4 uProjection`
  Projection,
  /// `mat4 uModelViewProjection`
  ModelViewProjection,
  /// `mat3 uNormalMatrix`, the inverse transpose of the upper-left part of the model-view matrix.
  NormalMatrix,
}

impl UniformSemantic {
  pub const ALL: [UniformSemantic; 4] = [
    UniformSemantic::ModelView,
    UniformSemantic::Projection,
    UniformSemantic::ModelViewProjection,
    UniformSemantic::NormalMatrix,
  ];

  pub fn name(self) -> &'static str {
    match self {
      UniformSemantic::ModelView => "uModelView",
      UniformSemantic::Projection => "uProjection",
      UniformSemantic::ModelViewProjection => "uModelViewProjection",
      UniformSemantic::NormalMatrix => "uNormalMatrix",
    }
  }
}

/// Shared handle to a [`Program`].
pub type ProgramRef = Rc<Program>;

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
  id: ObjectId,
  owner: Owner,
  semantics: Vec<(UniformSemantic, i32)>,
  color_attrib: Option<u32>,
}

impl Program {
  /// Compile and link a program.
  pub fn create<D>(ctx: &Context<D>, sources: &ProgramSources) -> Result<ProgramRef, ProgramError>
  where
    D: Driver,
  {
    let mut state = ctx.state();
    let driver = &mut state.driver;

    let id = driver.compile_program(sources).map_err(|e| {
      log::error!("{}", e);
      e
    })?;

    let semantics = UniformSemantic::ALL
      .iter()
      .filter_map(|&sem| driver.uniform_location(id, sem.name()).map(|loc| (sem, loc)))
      .collect();
    let color_attrib = driver.attrib_location(id, COLOR_ATTRIB);

    log::debug!("created program {} on context {}", id, ctx.id());

    Ok(Rc::new(Program {
      id,
      owner: ctx.owner(),
      semantics,
      color_attrib,
    }))
  }

  pub fn id(&self) -> ObjectId {
    self.id
  }

  /// Location of a semantic uniform, if the program uses it.
  pub fn semantic_location(&self, semantic: UniformSemantic) -> Option<i32> {
    self
      .semantics
      .iter()
      .find(|(sem, _)| *sem == semantic)
      .map(|(_, loc)| *loc)
  }

  /// Semantic uniforms used by the program, with their locations.
  pub fn semantics(&self) -> &[(UniformSemantic, i32)] {
    &self.semantics
  }

  /// Location of the [`COLOR_ATTRIB`] attribute, if the program uses it.
  pub fn color_attrib(&self) -> Option<u32> {
    self.color_attrib
  }

  pub fn uniform_location<D>(&self, ctx: &Context<D>, name: &str) -> Option<i32>
  where
    D: Driver,
  {
    ctx.state().driver.uniform_location(self.id, name)
  }

  pub fn attrib_location<D>(&self, ctx: &Context<D>, name: &str) -> Option<u32>
  where
    D: Driver,
  {
    ctx.state().driver.attrib_location(self.id, name)
  }
}

impl PartialEq for Program {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && self.owner.context() == other.owner.context()
  }
}

impl Drop for Program {
  fn drop(&mut self) {
    self.owner.bury(Deletion::Program(self.id));
  }
}
