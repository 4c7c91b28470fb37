mod common;

use gloam::buffer::{Buffer, BufferUsage};
use gloam::context::Context;
use gloam::driver::headless::{Call, HeadlessDriver, HeadlessPlatform};
use gloam::driver::DriverCaps;
use gloam::environment::Profile;
use gloam::framebuffer::Framebuffer;
use gloam::registry::ContextRegistry;
use gloam::scope::{ScopedBuffer, ScopedFramebuffer, ScopedVao};
use gloam::target::{BufferTarget, FramebufferTarget, TextureTarget};
use gloam::texture::Texture;
use gloam::vao::{Vao, VaoKind};
use gloam::vertex::{AttribPointer, AttribType};

use common::context;

fn position_pointer() -> AttribPointer {
  AttribPointer {
    index: 0,
    size: 3,
    ty: AttribType::Float,
    normalized: false,
    stride: 0,
    offset: 0,
  }
}

#[test]
fn buffer_creation_leaves_bindings_untouched() {
  let (ctx, driver) = context(Profile::Compatibility);

  ctx.bind_buffer(BufferTarget::Array, 0);
  let vbo = Buffer::create(&ctx, BufferTarget::Array, 128, None, BufferUsage::StaticDraw);

  assert_eq!(vbo.size(), 128);
  assert_eq!(driver.state().buffer_sizes.get(&vbo.id()), Some(&128));
  assert_eq!(driver.state().buffer(BufferTarget::Array), 0);
  assert_eq!(ctx.buffer_binding(BufferTarget::Array), 0);
}

#[test]
fn buffer_data_length_wins_over_size() {
  let (ctx, _driver) = context(Profile::Compatibility);

  let data = [0u8; 12];
  let vbo = Buffer::create(&ctx, BufferTarget::Array, 4, Some(&data), BufferUsage::StaticDraw);

  assert_eq!(vbo.size(), 12);
}

#[test]
fn default_vbos_only_grow() {
  let (ctx, driver) = context(Profile::Core);

  let vbo = ctx.default_array_vbo(16);
  assert_eq!(vbo.size(), 16);
  assert_eq!(vbo.usage(), BufferUsage::StreamDraw);

  let same = ctx.default_array_vbo(8);
  assert_eq!(same.id(), vbo.id());
  assert_eq!(same.size(), 16);

  let grown = ctx.default_array_vbo(64);
  assert_eq!(grown.id(), vbo.id());
  assert_eq!(grown.size(), 64);

  assert_eq!(driver.count(|call| matches!(call, Call::GenBuffer(_))), 1);
  assert_eq!(driver.count(|call| matches!(call, Call::BufferData(..))), 2);

  let elements = ctx.default_element_vbo(0);
  assert_eq!(elements.size(), 1);
  assert_eq!(elements.target(), BufferTarget::ElementArray);
  assert_ne!(elements.id(), vbo.id());
}

#[test]
fn dropped_objects_are_deleted_and_unbound() {
  let (ctx, driver) = context(Profile::Core);

  let texture = Texture::create(&ctx, TextureTarget::Texture2D, false);
  let id = texture.id();

  texture.bind(&ctx, 0);
  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 0), id);

  drop(texture);

  // deletion happens on the next use of the context
  assert_eq!(ctx.texture_binding(TextureTarget::Texture2D, 0), 0);
  assert!(!driver.state().is_live(id));
  assert_eq!(driver.count(|call| *call == Call::DeleteTexture(id)), 1);

  // the cache agrees with the driver again
  driver.clear_calls();
  ctx.bind_texture(TextureTarget::Texture2D, 0);
  assert!(driver.calls().is_empty());
}

#[test]
fn saved_bindings_of_deleted_buffers_are_not_restored() {
  let (ctx, driver) = context(Profile::Compatibility);

  let ubo = Buffer::create(&ctx, BufferTarget::Uniform, 64, None, BufferUsage::DynamicDraw);
  let id = ubo.id();

  ctx.bind_buffer(BufferTarget::Uniform, id);
  ctx.push_buffer_binding(BufferTarget::Uniform, 0);
  drop(ubo);

  driver.clear_calls();
  ctx.pop_buffer_binding(BufferTarget::Uniform);

  assert_eq!(driver.count(|call| *call == Call::BindBuffer(BufferTarget::Uniform, id)), 0);
  assert_eq!(ctx.buffer_binding(BufferTarget::Uniform), 0);
}

#[test]
fn objects_outliving_their_context_are_not_deleted() {
  let (ctx, driver) = context(Profile::Core);

  let vbo = Buffer::create(&ctx, BufferTarget::Array, 16, None, BufferUsage::StaticDraw);
  let id = vbo.id();

  drop(ctx);
  driver.clear_calls();
  drop(vbo);

  assert!(driver.calls().is_empty());
  assert!(driver.state().is_live(id));
}

#[test]
fn context_drop_deletes_its_own_objects() {
  let (ctx, driver) = context(Profile::Core);

  let vao = ctx.default_vao();
  let vao_id = vao.id();
  let program = ctx.stock_shader(&Default::default()).expect("stock shader");
  let program_id = program.id();

  drop(vao);
  drop(program);
  drop(ctx);

  assert!(!driver.state().is_live(vao_id));
  assert!(!driver.state().is_live(program_id));
}

#[test]
fn core_contexts_bind_a_default_vertex_array() {
  let (ctx, driver) = context(Profile::Core);

  let vao = ctx.vao().expect("default vertex array");
  assert_eq!(vao.kind(), VaoKind::Hardware);
  assert_eq!(driver.state().vertex_array, vao.id());
  assert_eq!(vao.id(), ctx.default_vao().id());
}

#[test]
fn hardware_vertex_arrays_own_their_element_binding() {
  let (ctx, driver) = context(Profile::Core);

  let vao = Vao::create(&ctx);
  let ebo = Buffer::create(&ctx, BufferTarget::ElementArray, 6, None, BufferUsage::StaticDraw);

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    ebo.bind(&ctx);
    assert_eq!(vao.layout().element_buffer(), Some(ebo.id()));
  }

  // back to the default vertex array, which has no element buffer
  assert_eq!(driver.state().buffer(BufferTarget::ElementArray), 0);
  assert_eq!(ctx.buffer_binding(BufferTarget::ElementArray), 0);

  driver.clear_calls();

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    assert_eq!(ctx.buffer_binding(BufferTarget::ElementArray), ebo.id());

    // already bound as part of the vertex array
    ebo.bind(&ctx);
  }

  assert_eq!(driver.count(|call| matches!(call, Call::BindBuffer(..))), 0);
}

#[test]
fn software_vertex_arrays_replay_their_layout() {
  let (ctx, driver) = context(Profile::Es2);

  let vao = Vao::create(&ctx);
  assert!(vao.is_software());

  let vbo = Buffer::create(&ctx, BufferTarget::Array, 64, None, BufferUsage::StaticDraw);

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    let _vbo = ScopedBuffer::buffer(&ctx, &vbo);

    ctx.enable_vertex_attrib_array(0);
    ctx.vertex_attrib_pointer(position_pointer());
  }

  let attrib = *vao.layout().attrib(0).expect("recorded attribute");
  assert!(attrib.enabled);
  assert_eq!(attrib.pointer, Some(position_pointer()));
  assert_eq!(attrib.array_buffer, vbo.id());

  driver.clear_calls();

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    let calls = driver.calls();

    assert!(calls.contains(&Call::EnableVertexAttribArray(0)));
    assert!(calls.contains(&Call::BindBuffer(BufferTarget::Array, vbo.id())));
    assert!(calls.contains(&Call::VertexAttribPointer(position_pointer())));
  }

  assert_eq!(driver.calls().last(), Some(&Call::DisableVertexAttribArray(0)));
}

#[test]
fn unbound_vertex_arrays_forget_deleted_buffers() {
  let (ctx, driver) = context(Profile::Es2);

  let vao = Vao::create(&ctx);
  let vbo = Buffer::create(&ctx, BufferTarget::Array, 64, None, BufferUsage::StaticDraw);
  let vbo_id = vbo.id();

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    let _vbo = ScopedBuffer::buffer(&ctx, &vbo);

    ctx.enable_vertex_attrib_array(0);
    ctx.vertex_attrib_pointer(position_pointer());
  }

  drop(vbo);

  // any use of the context processes pending deletions
  ctx.buffer_binding(BufferTarget::Array);
  assert_eq!(driver.count(|call| *call == Call::DeleteBuffer(vbo_id)), 1);
  assert_eq!(vao.layout().attrib(0).map(|attrib| attrib.array_buffer), Some(0));

  driver.clear_calls();

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
    assert!(driver.calls().contains(&Call::EnableVertexAttribArray(0)));
    assert!(!driver.calls().contains(&Call::BindBuffer(BufferTarget::Array, vbo_id)));
  }
}

#[test]
fn es_vertex_arrays_use_the_extension() {
  common::init_logger();

  let driver = HeadlessDriver::with_caps(DriverCaps {
    es: true,
    core_profile: false,
    vertex_array_objects: true,
    transform_feedback_objects: false,
    max_texture_units: 8,
    renderer: "headless (ES 2 with OES_vertex_array_object)".to_owned(),
  });
  let ctx = Context::create_from_existing(HeadlessPlatform::new(), driver.clone(), &ContextRegistry::new())
    .expect("headless context");

  let vao = Vao::create(&ctx);
  assert_eq!(vao.kind(), VaoKind::Es);

  {
    let _vao = ScopedVao::new(&ctx, Some(&vao));
  }

  assert!(driver.calls().contains(&Call::BindVertexArrayOes(vao.id())));
  assert_eq!(driver.calls().last(), Some(&Call::BindVertexArrayOes(0)));
}

#[test]
fn rendering_into_a_framebuffer_marks_it_dirty() {
  let (ctx, driver) = context(Profile::Core);

  let msaa = Framebuffer::create(&ctx, 64, 64);
  let resolved = Framebuffer::create(&ctx, 64, 64);
  let texture = Texture::create(&ctx, TextureTarget::Texture2D, true);

  resolved.attach_texture(&ctx, 0, &texture);
  msaa.set_resolve_target(Some(resolved.clone()));
  assert!(!msaa.needs_resolve());

  {
    let _fb = ScopedFramebuffer::fbo(&ctx, &msaa, FramebufferTarget::Both);
    assert_eq!(driver.state().draw_framebuffer, msaa.id());
  }

  assert!(msaa.needs_resolve());
  assert!(msaa.needs_mipmap_update());

  driver.clear_calls();
  msaa.update_mipmaps(&ctx);

  let calls = driver.calls();
  assert!(calls.contains(&Call::BlitFramebuffer(msaa.bounds(), resolved.bounds())));
  assert!(calls.contains(&Call::GenerateMipmap(TextureTarget::Texture2D)));
  assert!(!msaa.needs_resolve());
  assert!(!msaa.needs_mipmap_update());

  // nothing left to do
  driver.clear_calls();
  msaa.update_mipmaps(&ctx);
  assert!(driver.calls().is_empty());

  assert_eq!(driver.state().read_framebuffer, 0);
  assert_eq!(driver.state().draw_framebuffer, 0);
  assert_eq!(driver.state().texture(0, TextureTarget::Texture2D), 0);
}
