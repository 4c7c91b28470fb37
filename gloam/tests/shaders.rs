mod common;

use std::rc::Rc;

use cgmath::{vec3, Matrix4};

use gloam::driver::headless::Call;
use gloam::environment::Profile;
use gloam::program::{Program, ProgramError, ProgramSources, StageType, UniformSemantic};
use gloam::scope::ScopedProgram;
use gloam::shader::ShaderDef;
use gloam::target::TextureTarget;

use common::context;

#[test]
fn stock_shaders_are_built_once() {
  let (ctx, driver) = context(Profile::Core);
  let def = ShaderDef::new().texture().color();

  let a = ctx.stock_shader(&def).expect("stock shader");
  let b = ctx.stock_shader(&def).expect("stock shader");

  assert!(Rc::ptr_eq(&a, &b));
  assert_eq!(driver.count(|call| matches!(call, Call::CompileProgram(_))), 1);
  assert_eq!(ctx.stock_shaders().len(), 1);

  let other = ctx.stock_shader(&ShaderDef::new().color()).expect("stock shader");
  assert!(!Rc::ptr_eq(&a, &other));
  assert_eq!(ctx.stock_shaders().len(), 2);
}

#[test]
fn stock_shader_failures_are_not_cached() {
  let (ctx, driver) = context(Profile::Core);
  let def = ShaderDef::new().color();

  driver.fail_next_compile(ProgramError::CompilationFailed(
    StageType::FragmentShader,
    "0:1: syntax error".to_owned(),
  ));

  assert!(matches!(
    ctx.stock_shader(&def),
    Err(ProgramError::CompilationFailed(StageType::FragmentShader, _))
  ));
  assert!(ctx.stock_shaders().is_empty());

  assert!(ctx.stock_shader(&def).is_ok());
  assert_eq!(ctx.stock_shaders().len(), 1);
}

#[test]
fn textured_stock_shaders_sample_unit_zero() {
  let (ctx, driver) = context(Profile::Compatibility);

  let program = ctx
    .stock_shader(&ShaderDef::new().texture_target(TextureTarget::Rectangle))
    .expect("stock shader");
  let sampler = program.uniform_location(&ctx, "uTex0").expect("sampler uniform");

  assert!(driver.calls().contains(&Call::Uniform1i(sampler, 0)));

  // the program in use is left untouched
  assert_eq!(driver.state().program, 0);
  assert_eq!(ctx.program(), None);
}

#[test]
fn programs_resolve_their_semantics() {
  let (ctx, _driver) = context(Profile::Core);

  let sources = ProgramSources::new(
    "#version 150\nuniform mat4 uModelView;\nuniform mat4 uProjection;\nin vec4 vPosition;\nin vec4 vColor;\n",
    "#version 150\nuniform mat3 uNormalMatrix;\nout vec4 oColor;\n",
  )
  .attrib_location("vPosition", 0);
  let program = Program::create(&ctx, &sources).expect("program");

  assert!(program.semantic_location(UniformSemantic::ModelView).is_some());
  assert!(program.semantic_location(UniformSemantic::Projection).is_some());
  assert!(program.semantic_location(UniformSemantic::NormalMatrix).is_some());
  assert_eq!(program.semantic_location(UniformSemantic::ModelViewProjection), None);
  assert_eq!(program.color_attrib(), Some(1));
  assert_eq!(program.attrib_location(&ctx, "vPosition"), Some(0));
}

#[test]
fn default_shader_vars_feed_the_program_in_use() {
  let (ctx, driver) = context(Profile::Core);

  let program = ctx.bind_stock_shader(&ShaderDef::new().color()).expect("stock shader");
  let mvp = program
    .semantic_location(UniformSemantic::ModelViewProjection)
    .expect("mvp uniform");
  let color = program.color_attrib().expect("color attribute");

  let model_view = Matrix4::from_translation(vec3(1., 2., 3.));
  let projection = cgmath::perspective(cgmath::Deg(60.), 4. / 3., 0.1, 100.);

  ctx.set_model_view(model_view);
  ctx.set_projection(projection);
  ctx.set_current_color([1., 0., 0., 1.]);

  driver.clear_calls();
  ctx.set_default_shader_vars();

  assert_eq!(
    driver.calls(),
    vec![
      Call::UniformMatrix4(mvp, (projection * model_view).into()),
      Call::VertexAttrib(color, [1., 0., 0., 1.]),
    ]
  );
}

#[test]
fn color_sourced_from_a_buffer_is_left_alone() {
  let (ctx, driver) = context(Profile::Core);

  let program = ctx.bind_stock_shader(&ShaderDef::new().color()).expect("stock shader");
  let color = program.color_attrib().expect("color attribute");

  ctx.enable_vertex_attrib_array(color);
  driver.clear_calls();
  ctx.set_default_shader_vars();

  assert_eq!(driver.count(|call| matches!(call, Call::VertexAttrib(..))), 0);
  assert_eq!(driver.count(|call| matches!(call, Call::UniformMatrix4(..))), 1);

  ctx.disable_vertex_attrib_array(color);
}

#[test]
fn scoped_program_restores_the_previous_one() {
  let (ctx, driver) = context(Profile::Core);

  let flat = ctx.bind_stock_shader(&ShaderDef::new()).expect("stock shader");

  {
    let _program = ScopedProgram::stock(&ctx, &ShaderDef::new().color()).expect("stock shader");
    assert_ne!(driver.state().program, flat.id());
  }

  assert_eq!(driver.state().program, flat.id());
  assert_eq!(ctx.program(), Some(flat));
}

#[test]
fn uniform_int_reports_missing_uniforms() {
  let (ctx, _driver) = context(Profile::Core);

  let program = ctx.stock_shader(&ShaderDef::new()).expect("stock shader");
  assert!(!ctx.uniform_int(&program, "uDoesNotExist", 3));
}
