//! Profile-specific environment.
//!
//! The GLSL dialect a driver accepts depends on its profile: OpenGL ES 2 wants `#version 100` with precision
//! qualifiers, compatibility contexts speak GLSL 1.20 (`attribute` / `varying` / `gl_FragColor`) and core contexts
//! GLSL 1.50 (`in` / `out`). An [`Environment`] is selected once per [`Context`] from the driver capabilities and
//! generates the stock shaders in the right dialect.
//!
//! All the stock shaders share the same interface:
//!
//! - `vec4 vPosition` (bound to location `0`), `vec2 vTexCoord0` and `vec4 vColor` vertex attributes;
//! - a `mat4 uModelViewProjection` uniform and, when sampling, a `uTex0` sampler on texture unit `0`.

use std::fmt::Write as _;

use crate::context::Context;
use crate::driver::{Driver, DriverCaps};
use crate::program::{Program, ProgramError, ProgramRef, ProgramSources, COLOR_ATTRIB};
use crate::shader::ShaderDef;

/// Name of the position attribute of stock shaders.
pub const POSITION_ATTRIB: &str = "vPosition";

/// Name of the texture coordinates attribute of stock shaders.
pub const TEX_COORD_ATTRIB: &str = "vTexCoord0";

/// Name of the sampler uniform of stock shaders.
pub const SAMPLER_UNIFORM: &str = "uTex0";

/// Flavour of graphics API a context runs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Profile {
  /// OpenGL ES 2.
  Es2,
  /// OpenGL 3.2+ core profile.
  Core,
  /// Compatibility (or legacy) OpenGL.
  Compatibility,
}

impl Profile {
  pub fn detect(caps: &DriverCaps) -> Self {
    if caps.es {
      Profile::Es2
    } else if caps.core_profile {
      Profile::Core
    } else {
      Profile::Compatibility
    }
  }
}

/// Shader generation and building for a [`Profile`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Environment {
  profile: Profile,
}

impl Environment {
  pub fn new(profile: Profile) -> Self {
    Environment { profile }
  }

  pub fn detect(caps: &DriverCaps) -> Self {
    Self::new(Profile::detect(caps))
  }

  pub fn profile(&self) -> Profile {
    self.profile
  }

  /// Whether the profile allows `glPolygonMode`.
  pub fn supports_polygon_mode(&self) -> bool {
    self.profile != Profile::Es2
  }

  /// Whether read and draw framebuffers can be bound separately.
  pub fn supports_framebuffer_split(&self) -> bool {
    self.profile != Profile::Es2
  }

  // GLSL 1.20 has no precision qualifiers
  fn precisions(&self) -> (&'static str, &'static str) {
    match self.profile {
      Profile::Compatibility => ("", ""),
      _ => ("highp ", "lowp "),
    }
  }

  /// Generate the vertex shader of a stock shader.
  pub fn generate_vertex_shader(&self, def: &ShaderDef) -> String {
    let (header, attr_in, var_out) = match self.profile {
      Profile::Es2 => ("#version 100\n", "attribute", "varying"),
      Profile::Core => ("#version 150\n", "in", "out"),
      Profile::Compatibility => ("#version 120\n", "attribute", "varying"),
    };

    let (highp, lowp) = self.precisions();

    let mut s = String::from(header);
    s.push_str("\nuniform mat4 uModelViewProjection;\n\n");
    let _ = writeln!(s, "{} vec4 {};", attr_in, POSITION_ATTRIB);

    if def.uses_texture() {
      let _ = writeln!(s, "{} vec2 {};", attr_in, TEX_COORD_ATTRIB);
      let _ = writeln!(s, "{} {}vec2 TexCoord;", var_out, highp);
    }

    if def.uses_color() {
      let _ = writeln!(s, "{} vec4 {};", attr_in, COLOR_ATTRIB);
      let _ = writeln!(s, "{} {}vec4 Color;", var_out, lowp);
    }

    s.push_str("\nvoid main(void) {\n");
    let _ = writeln!(s, "  gl_Position = uModelViewProjection * {};", POSITION_ATTRIB);

    if def.uses_texture() {
      let _ = writeln!(s, "  TexCoord = {};", TEX_COORD_ATTRIB);
    }

    if def.uses_color() {
      let _ = writeln!(s, "  Color = {};", COLOR_ATTRIB);
    }

    s.push_str("}\n");
    s
  }

  /// Generate the fragment shader of a stock shader.
  pub fn generate_fragment_shader(&self, def: &ShaderDef) -> String {
    // rectangle textures don’t exist on ES 2
    let rectangle = def.uses_texture_rectangle() && self.profile != Profile::Es2;

    let (header, var_in, output, sample) = match self.profile {
      Profile::Es2 => (
        "#version 100\n\nprecision highp float;\n",
        "varying",
        "gl_FragColor",
        "texture2D",
      ),
      Profile::Core => ("#version 150\n\nout vec4 oColor;\n", "in", "oColor", "texture"),
      Profile::Compatibility if rectangle => (
        "#version 120\n#extension GL_ARB_texture_rectangle : require\n",
        "varying",
        "gl_FragColor",
        "texture2DRect",
      ),
      Profile::Compatibility => ("#version 120\n", "varying", "gl_FragColor", "texture2D"),
    };

    let (highp, lowp) = self.precisions();

    let mut s = String::from(header);
    s.push('\n');

    if def.uses_texture() {
      let sampler = if rectangle {
        "sampler2DRect"
      } else {
        "sampler2D"
      };

      let _ = writeln!(s, "uniform {} {};", sampler, SAMPLER_UNIFORM);
      let _ = writeln!(s, "{} {}vec2 TexCoord;", var_in, highp);
    }

    if def.uses_color() {
      let _ = writeln!(s, "{} {}vec4 Color;", var_in, lowp);
    }

    let texel = format!("{}({}, TexCoord.st)", sample, SAMPLER_UNIFORM);
    let value = match (def.uses_texture(), def.uses_color()) {
      (true, true) => format!("{} * Color", texel),
      (true, false) => texel,
      (false, true) => "Color".to_owned(),
      (false, false) => "vec4(1.0)".to_owned(),
    };

    s.push_str("\nvoid main(void) {\n");
    let _ = writeln!(s, "  {} = {};", output, value);
    s.push_str("}\n");
    s
  }

  /// Sources of a stock shader, with its attribute locations.
  pub fn stock_sources(&self, def: &ShaderDef) -> ProgramSources {
    ProgramSources::new(
      self.generate_vertex_shader(def),
      self.generate_fragment_shader(def),
    )
    .attrib_location(POSITION_ATTRIB, 0)
  }

  /// Compile and link a stock shader.
  ///
  /// Samplers are bound to texture unit `0`.
  pub fn build_shader<D>(&self, ctx: &Context<D>, def: &ShaderDef) -> Result<ProgramRef, ProgramError>
  where
    D: Driver,
  {
    let sources = self.stock_sources(def);

    log::trace!("{:?} vertex shader:\n{}", def, sources.vertex);
    log::trace!("{:?} fragment shader:\n{}", def, sources.fragment);

    let program = Program::create(ctx, &sources)?;

    if def.uses_texture() {
      ctx.uniform_int(&program, SAMPLER_UNIFORM, 0);
    }

    Ok(program)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn caps(es: bool, core_profile: bool) -> DriverCaps {
    DriverCaps {
      es,
      core_profile,
      vertex_array_objects: true,
      transform_feedback_objects: false,
      max_texture_units: 16,
      renderer: String::new(),
    }
  }

  #[test]
  fn profile_detection() {
    assert_eq!(Profile::detect(&caps(true, false)), Profile::Es2);
    assert_eq!(Profile::detect(&caps(false, true)), Profile::Core);
    assert_eq!(Profile::detect(&caps(false, false)), Profile::Compatibility);
  }

  #[test]
  fn core_shaders_use_in_out() {
    let env = Environment::new(Profile::Core);
    let def = ShaderDef::new().texture().color();
    let vs = env.generate_vertex_shader(&def);
    let fs = env.generate_fragment_shader(&def);

    assert!(vs.starts_with("#version 150"));
    assert!(vs.contains("in vec4 vPosition;"));
    assert!(vs.contains("out highp vec2 TexCoord;"));
    assert!(vs.contains("Color = vColor;"));
    assert!(fs.contains("out vec4 oColor;"));
    assert!(fs.contains("oColor = texture(uTex0, TexCoord.st) * Color;"));
    assert!(!fs.contains("gl_FragColor"));
  }

  #[test]
  fn compatibility_rectangle_sampler() {
    let env = Environment::new(Profile::Compatibility);
    let def = ShaderDef::new().texture_target(crate::target::TextureTarget::Rectangle);
    let vs = env.generate_vertex_shader(&def);
    let fs = env.generate_fragment_shader(&def);

    assert!(vs.starts_with("#version 120"));
    assert!(vs.contains("attribute vec2 vTexCoord0;"));
    assert!(vs.contains("varying vec2 TexCoord;"));
    assert!(fs.contains("uniform sampler2DRect uTex0;"));
    assert!(fs.contains("gl_FragColor = texture2DRect(uTex0, TexCoord.st);"));
  }

  #[test]
  fn es2_has_precision_and_no_rectangle() {
    let env = Environment::new(Profile::Es2);
    let def = ShaderDef::new().texture_target(crate::target::TextureTarget::Rectangle);
    let fs = env.generate_fragment_shader(&def);

    assert!(fs.contains("precision highp float;"));
    assert!(fs.contains("uniform sampler2D uTex0;"));
    assert!(fs.contains("gl_FragColor = texture2D(uTex0, TexCoord.st);"));
  }

  #[test]
  fn plain_shader_writes_white() {
    let env = Environment::new(Profile::Core);
    let fs = env.generate_fragment_shader(&ShaderDef::new());

    assert!(fs.contains("oColor = vec4(1.0);"));
    assert!(!fs.contains("uTex0"));
  }

  #[test]
  fn position_is_bound_to_location_zero() {
    let env = Environment::new(Profile::Es2);
    let sources = env.stock_sources(&ShaderDef::new());

    assert_eq!(sources.attrib_locations, vec![(POSITION_ATTRIB.to_owned(), 0)]);
  }
}
