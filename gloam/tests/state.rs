mod common;

use cgmath::{vec3, Matrix3, Matrix4, SquareMatrix};

use gloam::blending::{BlendFactors, Factor};
use gloam::capability::Capability;
use gloam::driver::headless::Call;
use gloam::environment::Profile;
use gloam::region::Region;
use gloam::scope::{
  ScopedActiveTexture, ScopedBlend, ScopedColor, ScopedMatrices, ScopedModelMatrix, ScopedScissor, ScopedState,
  ScopedTextureBind, ScopedViewport,
};
use gloam::target::{BufferTarget, FramebufferTarget, TextureTarget};
use gloam::vertex::{Face, PolygonMode};

use common::context;

#[test]
fn viewport_is_restored_when_the_scope_ends() {
  let (ctx, driver) = context(Profile::Core);
  let outer = Region::sized(800, 600);
  let inner = Region::sized(400, 300);

  ctx.set_viewport(outer);

  {
    let _viewport = ScopedViewport::new(&ctx, inner);
    assert_eq!(ctx.viewport(), inner);
    assert_eq!(driver.state().viewport, inner);
  }

  assert_eq!(ctx.viewport(), outer);
  assert_eq!(driver.state().viewport, outer);
  assert_eq!(
    driver.calls(),
    vec![Call::Viewport(outer), Call::Viewport(inner), Call::Viewport(outer)]
  );
}

#[test]
fn unknown_viewport_is_queried_once() {
  let (ctx, driver) = context(Profile::Core);

  assert_eq!(ctx.viewport(), Region::sized(640, 480));

  // pushing the current value changes nothing
  ctx.push_viewport(Region::sized(640, 480));
  ctx.pop_viewport();

  assert!(driver.calls().is_empty());
}

#[test]
fn nested_scopes_only_issue_changes() {
  let (ctx, driver) = context(Profile::Core);
  let region = Region::new(10, 10, 100, 100);

  {
    let _outer = ScopedViewport::new(&ctx, region);
    let _inner = ScopedViewport::new(&ctx, region);
    let _innermost = ScopedViewport::new(&ctx, Region::sized(640, 480));
  }

  // in: region, full; out: region, full
  assert_eq!(driver.count(|call| matches!(call, Call::Viewport(_))), 4);
  assert_eq!(driver.state().viewport, Region::sized(640, 480));
  assert!(ctx.check_balanced().is_ok());
}

#[test]
fn textures_are_bound_per_unit() {
  let (ctx, driver) = context(Profile::Core);

  ctx.bind_texture_on(TextureTarget::Texture2D, 5, 0);
  ctx.bind_texture_on(TextureTarget::Texture2D, 9, 1);

  assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 5);
  assert_eq!(driver.state().texture(1, TextureTarget::Texture2D), 9);
  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 0), 5);
  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 1), 9);

  // the active unit is left untouched
  assert_eq!(ctx.active_texture(), 0);
  assert_eq!(driver.state().active_texture, 0);
}

#[test]
fn scoped_texture_bind_restores_unit_and_binding() {
  let (ctx, driver) = context(Profile::Core);

  ctx.bind_texture(TextureTarget::Texture2D, 3);

  {
    let _unit = ScopedActiveTexture::new(&ctx, 2);
    let _tex = ScopedTextureBind::new(&ctx, TextureTarget::Texture2D, 7);
    assert_eq!(driver.state().texture(2, TextureTarget::Texture2D), 7);

    {
      let _other = ScopedTextureBind::on_unit(&ctx, TextureTarget::CubeMap, 8, 4);
      assert_eq!(driver.state().texture(4, TextureTarget::CubeMap), 8);
      assert_eq!(driver.state().active_texture, 2);
    }

    assert_eq!(driver.state().texture(4, TextureTarget::CubeMap), 0);
  }

  assert_eq!(driver.state().active_texture, 0);
  assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 3);
  assert_eq!(driver.state().texture(2, TextureTarget::Texture2D), 0);
}

#[test]
fn scoped_texture_bind_pops_the_unit_it_pushed_on() {
  let (ctx, driver) = context(Profile::Core);

  ctx.bind_texture(TextureTarget::Texture2D, 3);

  {
    let _tex = ScopedTextureBind::new(&ctx, TextureTarget::Texture2D, 7);
    ctx.set_active_texture(1);
    assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 7);
  }

  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 0), 3);
  assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 3);
  assert_eq!(driver.state().texture(1, TextureTarget::Texture2D), 0);

  // the active unit set inside the scope is kept
  assert_eq!(ctx.active_texture(), 1);
  assert_eq!(driver.state().active_texture, 1);
  assert!(ctx.check_balanced().is_ok());
}

#[test]
fn binding_on_a_pushed_unit_leaves_the_other_units_alone() {
  let (ctx, driver) = context(Profile::Core);

  ctx.bind_texture(TextureTarget::Texture2D, 5);
  ctx.push_active_texture(1);
  ctx.bind_texture(TextureTarget::Texture2D, 9);
  ctx.pop_active_texture();

  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 0), 5);
  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 1), 9);
  assert_eq!(ctx.active_texture(), 0);

  assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 5);
  assert_eq!(driver.state().texture(1, TextureTarget::Texture2D), 9);
  assert_eq!(driver.state().active_texture, 0);
}

#[test]
fn redundant_binds_are_elided() {
  let (ctx, driver) = context(Profile::Compatibility);

  ctx.bind_buffer(BufferTarget::Array, 3);
  ctx.bind_buffer(BufferTarget::Array, 3);
  ctx.enable(Capability::DepthTest, true);
  ctx.enable(Capability::DepthTest, true);
  ctx.bind_framebuffer(FramebufferTarget::Both, 0);

  assert_eq!(
    driver.calls(),
    vec![
      Call::BindBuffer(BufferTarget::Array, 3),
      Call::SetCapability(Capability::DepthTest, true),
      Call::BindFramebuffer(FramebufferTarget::Both, 0),
    ]
  );

  // both framebuffer targets are known now
  driver.clear_calls();
  ctx.bind_framebuffer(FramebufferTarget::Read, 0);
  assert!(driver.calls().is_empty());
}

#[test]
fn invalidated_binding_is_rebound() {
  let (ctx, driver) = context(Profile::Compatibility);

  ctx.bind_buffer(BufferTarget::Uniform, 4);

  // some third-party code changes the binding behind our back
  driver.state_mut().buffers.insert(BufferTarget::Uniform, 12);
  ctx.invalidate_buffer_binding(BufferTarget::Uniform);

  ctx.bind_buffer(BufferTarget::Uniform, 4);
  assert_eq!(driver.state().buffer(BufferTarget::Uniform), 4);
  assert_eq!(driver.count(|call| *call == Call::BindBuffer(BufferTarget::Uniform, 4)), 2);
}

#[test]
fn bool_state_scopes() {
  let (ctx, driver) = context(Profile::Core);

  assert!(!ctx.bool_state(Capability::CullFace));

  {
    let _cull = ScopedState::new(&ctx, Capability::CullFace, true);
    assert!(driver.state().capability(Capability::CullFace));

    {
      let _no_cull = ScopedState::new(&ctx, Capability::CullFace, false);
      assert!(!driver.state().capability(Capability::CullFace));
    }

    assert!(driver.state().capability(Capability::CullFace));
  }

  assert!(!driver.state().capability(Capability::CullFace));
  assert!(!ctx.bool_state(Capability::CullFace));
}

#[test]
fn depth_mask_is_a_bool_state() {
  let (ctx, driver) = context(Profile::Core);

  ctx.depth_mask(false);
  assert!(!driver.state().capability(Capability::DepthWrite));
  assert!(!ctx.bool_state(Capability::DepthWrite));
}

#[test]
fn scoped_blend_restores_factors_and_capability() {
  let (ctx, driver) = context(Profile::Core);

  {
    let _blend = ScopedBlend::alpha(&ctx);
    assert!(driver.state().capability(Capability::Blend));
    assert_eq!(
      driver.state().blend,
      BlendFactors::new(Factor::SrcAlpha, Factor::SrcAlphaComplement)
    );
  }

  assert!(!driver.state().capability(Capability::Blend));
  assert_eq!(driver.state().blend, BlendFactors::default());
  assert_eq!(ctx.blend_factors(), Some(BlendFactors::default()));
}

#[test]
fn scoped_blend_toggle_leaves_factors_alone() {
  let (ctx, driver) = context(Profile::Core);

  ctx.blend_func(Factor::One, Factor::One);
  driver.clear_calls();

  {
    let _blend = ScopedBlend::new(&ctx, true);
  }

  assert_eq!(
    driver.calls(),
    vec![
      Call::SetCapability(Capability::Blend, true),
      Call::SetCapability(Capability::Blend, false),
    ]
  );
}

#[test]
fn scoped_scissor_enables_the_test() {
  let (ctx, driver) = context(Profile::Core);
  let region = Region::new(8, 8, 32, 32);

  {
    let _scissor = ScopedScissor::new(&ctx, region);
    assert!(driver.state().capability(Capability::ScissorTest));
    assert_eq!(driver.state().scissor, region);
  }

  assert!(!driver.state().capability(Capability::ScissorTest));
  assert_eq!(driver.state().scissor, Region::sized(640, 480));
}

#[test]
fn framebuffer_pop_restores_both_targets_at_once() {
  let (ctx, driver) = context(Profile::Core);

  ctx.push_framebuffer(FramebufferTarget::Both, 4);
  assert_eq!(driver.state().read_framebuffer, 4);
  assert_eq!(driver.state().draw_framebuffer, 4);

  driver.clear_calls();
  ctx.pop_framebuffer(FramebufferTarget::Both);

  assert_eq!(driver.calls(), vec![Call::BindFramebuffer(FramebufferTarget::Both, 0)]);
}

#[test]
fn framebuffer_targets_are_tracked_separately() {
  let (ctx, driver) = context(Profile::Core);

  ctx.bind_framebuffer(FramebufferTarget::Draw, 2);
  ctx.push_framebuffer(FramebufferTarget::Read, 3);

  assert_eq!(ctx.framebuffer(FramebufferTarget::Read), 3);
  assert_eq!(ctx.framebuffer(FramebufferTarget::Draw), 2);
  assert_eq!(ctx.framebuffer(FramebufferTarget::Both), 2);

  ctx.pop_framebuffer(FramebufferTarget::Read);
  assert_eq!(driver.state().read_framebuffer, 0);
  assert_eq!(driver.state().draw_framebuffer, 2);
}

#[test]
fn framebuffer_targets_collapse_without_split_support() {
  let (ctx, driver) = context(Profile::Es2);

  ctx.bind_framebuffer(FramebufferTarget::Read, 6);

  assert_eq!(driver.calls(), vec![Call::BindFramebuffer(FramebufferTarget::Both, 6)]);
  assert_eq!(ctx.framebuffer(FramebufferTarget::Draw), 6);
}

#[test]
fn polygon_mode_is_cached() {
  let (ctx, driver) = context(Profile::Core);

  ctx.polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  ctx.polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  ctx.polygon_mode(Face::Front, PolygonMode::Line);
  ctx.polygon_mode(Face::Back, PolygonMode::Fill);

  assert_eq!(
    driver.calls(),
    vec![
      Call::PolygonMode(Face::FrontAndBack, PolygonMode::Line),
      Call::PolygonMode(Face::Back, PolygonMode::Fill),
    ]
  );
}

#[test]
fn polygon_mode_is_ignored_on_es() {
  let (ctx, driver) = context(Profile::Es2);

  ctx.polygon_mode(Face::FrontAndBack, PolygonMode::Line);
  assert!(driver.calls().is_empty());
}

#[test]
fn model_view_scope() {
  let (ctx, _driver) = context(Profile::Core);
  let translation = Matrix4::from_translation(vec3(1., 2., 3.));

  {
    let _m = ScopedModelMatrix::mult(&ctx, translation);
    assert_eq!(ctx.model_view(), translation);

    ctx.mult_model_view(translation);
    assert_eq!(ctx.model_view(), translation * translation);
  }

  assert_eq!(ctx.model_view(), Matrix4::identity());
}

#[test]
fn matrices_scope_saves_projection() {
  let (ctx, _driver) = context(Profile::Core);
  let projection = cgmath::ortho(0., 800., 600., 0., -1., 1.);
  let model_view = Matrix4::from_scale(2.);

  {
    let _m = ScopedMatrices::new(&ctx);
    ctx.set_projection(projection);
    ctx.set_model_view(model_view);

    assert_eq!(ctx.model_view_projection(), projection * model_view);
  }

  assert_eq!(ctx.projection(), Matrix4::identity());
  assert_eq!(ctx.model_view_projection(), Matrix4::identity());
}

#[test]
fn normal_matrix_is_the_inverse_transpose() {
  let (ctx, _driver) = context(Profile::Core);

  ctx.set_model_view(Matrix4::from_scale(2.));
  assert_eq!(ctx.normal_matrix(), Matrix3::identity() * 0.5);

  // singular matrices fall back to the identity
  ctx.set_model_view(Matrix4::from_scale(0.));
  assert_eq!(ctx.normal_matrix(), Matrix3::identity());
}

#[test]
fn color_scope() {
  let (ctx, _driver) = context(Profile::Core);

  assert_eq!(ctx.current_color(), [1., 1., 1., 1.]);

  {
    let _color = ScopedColor::color(&ctx, [1., 0., 0., 1.]);
    assert_eq!(ctx.current_color(), [1., 0., 0., 1.]);

    {
      let _saved = ScopedColor::new(&ctx);
      ctx.set_current_color([0., 0., 1., 0.5]);
    }

    assert_eq!(ctx.current_color(), [1., 0., 0., 1.]);
  }

  assert_eq!(ctx.current_color(), [1., 1., 1., 1.]);
}

#[test]
#[should_panic]
fn popping_below_the_floor_panics() {
  let (ctx, _driver) = context(Profile::Core);
  ctx.pop_viewport();
}
