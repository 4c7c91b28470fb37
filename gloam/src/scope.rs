//! Scope guards.
//!
//! Each guard pushes a piece of state onto a [`Context`] when created and pops it back when dropped, so that the
//! state is restored on every exit path, unwinding included. Guards borrow the context, hence cannot outlive it.
//!
//! ```ignore
//! {
//!   let _viewport = ScopedViewport::new(&ctx, Region::sized(400, 300));
//!   let _blend = ScopedBlend::premultiplied(&ctx);
//!
//!   // draw
//! } // viewport and blending restored here
//! ```

use cgmath::Matrix4;

use crate::blending::{BlendFactors, Factor};
use crate::buffer::BufferRef;
use crate::capability::Capability;
use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::framebuffer::FramebufferRef;
use crate::program::{ProgramError, ProgramRef};
use crate::region::Region;
use crate::shader::ShaderDef;
use crate::target::{BufferTarget, FramebufferTarget, TextureTarget};
use crate::texture::TextureRef;
use crate::vao::VaoRef;

/// Scoped vertex array binding.
#[must_use = "the vertex array is unbound as soon as the guard is dropped"]
pub struct ScopedVao<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedVao<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, vao: Option<&VaoRef>) -> Self {
    ctx.push_vao(vao);
    ScopedVao { ctx }
  }
}

impl<'a, D> Drop for ScopedVao<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_vao();
  }
}

/// Scoped buffer binding.
#[must_use = "the buffer is unbound as soon as the guard is dropped"]
pub struct ScopedBuffer<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
  target: BufferTarget,
}

impl<'a, D> ScopedBuffer<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, target: BufferTarget, id: ObjectId) -> Self {
    ctx.push_buffer_binding(target, id);
    ScopedBuffer { ctx, target }
  }

  /// Bind a buffer to the target it was created for.
  pub fn buffer(ctx: &'a Context<D>, buffer: &BufferRef) -> Self {
    Self::new(ctx, buffer.target(), buffer.id())
  }
}

impl<'a, D> Drop for ScopedBuffer<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_buffer_binding(self.target);
  }
}

/// Scoped capability.
#[must_use = "the capability is restored as soon as the guard is dropped"]
pub struct ScopedState<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
  cap: Capability,
}

impl<'a, D> ScopedState<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, cap: Capability, value: bool) -> Self {
    ctx.push_bool_state(cap, value);
    ScopedState { ctx, cap }
  }
}

impl<'a, D> Drop for ScopedState<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_bool_state(self.cap);
  }
}

/// Scoped blending.
///
/// Enables (or disables) [`Capability::Blend`] and, for every constructor but [`ScopedBlend::new`], sets the blend
/// function.
#[must_use = "blending is restored as soon as the guard is dropped"]
pub struct ScopedBlend<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
  factors: bool,
}

impl<'a, D> ScopedBlend<'a, D>
where
  D: Driver,
{
  /// Only toggle blending, leaving the blend function as is.
  pub fn new(ctx: &'a Context<D>, enable: bool) -> Self {
    ctx.push_bool_state(Capability::Blend, enable);
    ScopedBlend {
      ctx,
      factors: false,
    }
  }

  /// Enable blending with the same function for color and alpha.
  pub fn factors(ctx: &'a Context<D>, src: Factor, dst: Factor) -> Self {
    Self::separate(ctx, BlendFactors::new(src, dst))
  }

  /// Enable blending with separate color and alpha functions.
  pub fn separate(ctx: &'a Context<D>, factors: BlendFactors) -> Self {
    ctx.push_bool_state(Capability::Blend, true);
    ctx.push_blend_func_separate(factors);
    ScopedBlend { ctx, factors: true }
  }

  /// Classic alpha blending.
  pub fn alpha(ctx: &'a Context<D>) -> Self {
    Self::factors(ctx, Factor::SrcAlpha, Factor::SrcAlphaComplement)
  }

  /// Blending of colors premultiplied by their alpha.
  pub fn premultiplied(ctx: &'a Context<D>) -> Self {
    Self::factors(ctx, Factor::One, Factor::SrcAlphaComplement)
  }

  /// Additive blending, weighted by the source alpha.
  pub fn additive(ctx: &'a Context<D>) -> Self {
    Self::factors(ctx, Factor::SrcAlpha, Factor::One)
  }
}

impl<'a, D> Drop for ScopedBlend<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    if self.factors {
      self.ctx.pop_blend_func_separate();
    }

    self.ctx.pop_bool_state(Capability::Blend);
  }
}

/// Scoped program.
#[must_use = "the program is restored as soon as the guard is dropped"]
pub struct ScopedProgram<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedProgram<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, program: Option<&ProgramRef>) -> Self {
    ctx.push_program(program);
    ScopedProgram { ctx }
  }

  /// Use the stock shader for a definition, building it if needed.
  ///
  /// Nothing is pushed if the shader fails to build.
  pub fn stock(ctx: &'a Context<D>, def: &ShaderDef) -> Result<Self, ProgramError> {
    let program = ctx.stock_shader(def)?;
    Ok(Self::new(ctx, Some(&program)))
  }
}

impl<'a, D> Drop for ScopedProgram<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_program();
  }
}

/// Scoped framebuffer binding.
#[must_use = "the framebuffer is unbound as soon as the guard is dropped"]
pub struct ScopedFramebuffer<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
  target: FramebufferTarget,
}

impl<'a, D> ScopedFramebuffer<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, target: FramebufferTarget, id: ObjectId) -> Self {
    ctx.push_framebuffer(target, id);
    ScopedFramebuffer { ctx, target }
  }

  /// Render into a framebuffer object, marking it dirty.
  pub fn fbo(ctx: &'a Context<D>, fbo: &FramebufferRef, target: FramebufferTarget) -> Self {
    ctx.push_fbo(fbo, target);
    ScopedFramebuffer { ctx, target }
  }
}

impl<'a, D> Drop for ScopedFramebuffer<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_framebuffer(self.target);
  }
}

/// Scoped active texture unit.
#[must_use = "the active texture unit is restored as soon as the guard is dropped"]
pub struct ScopedActiveTexture<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedActiveTexture<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, unit: u32) -> Self {
    ctx.push_active_texture(unit);
    ScopedActiveTexture { ctx }
  }
}

impl<'a, D> Drop for ScopedActiveTexture<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_active_texture();
  }
}

/// Scoped texture binding.
///
/// The binding is made on the active unit, or on an explicit one without changing the active unit.
#[must_use = "the texture is unbound as soon as the guard is dropped"]
pub struct ScopedTextureBind<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
  target: TextureTarget,
  unit: u32,
}

impl<'a, D> ScopedTextureBind<'a, D>
where
  D: Driver,
{
  /// Bind on the unit active when the guard is created; that unit is restored on drop even if the active unit
  /// changes meanwhile.
  pub fn new(ctx: &'a Context<D>, target: TextureTarget, id: ObjectId) -> Self {
    let unit = ctx.active_texture();
    Self::on_unit(ctx, target, id, unit)
  }

  /// Bind on an explicit unit without changing the active unit.
  pub fn on_unit(ctx: &'a Context<D>, target: TextureTarget, id: ObjectId, unit: u32) -> Self {
    ctx.push_texture_binding_on(target, id, unit);
    ScopedTextureBind { ctx, target, unit }
  }

  /// Bind a texture to its target on a unit.
  pub fn texture(ctx: &'a Context<D>, texture: &TextureRef, unit: u32) -> Self {
    Self::on_unit(ctx, texture.target(), texture.id(), unit)
  }
}

impl<'a, D> Drop for ScopedTextureBind<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_texture_binding_on(self.target, self.unit);
  }
}

/// Scoped scissor test, enabled on a region.
#[must_use = "the scissor is restored as soon as the guard is dropped"]
pub struct ScopedScissor<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedScissor<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, region: Region) -> Self {
    ctx.push_bool_state(Capability::ScissorTest, true);
    ctx.push_scissor(region);
    ScopedScissor { ctx }
  }
}

impl<'a, D> Drop for ScopedScissor<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_scissor();
    self.ctx.pop_bool_state(Capability::ScissorTest);
  }
}

/// Scoped viewport.
#[must_use = "the viewport is restored as soon as the guard is dropped"]
pub struct ScopedViewport<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedViewport<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>, region: Region) -> Self {
    ctx.push_viewport(region);
    ScopedViewport { ctx }
  }
}

impl<'a, D> Drop for ScopedViewport<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_viewport();
  }
}

/// Saves the model-view matrix.
#[must_use = "the model-view matrix is restored as soon as the guard is dropped"]
pub struct ScopedModelMatrix<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedModelMatrix<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>) -> Self {
    ctx.push_model_view();
    ScopedModelMatrix { ctx }
  }

  /// Save the model-view matrix, then post-multiply it.
  pub fn mult(ctx: &'a Context<D>, m: Matrix4<f32>) -> Self {
    let scope = Self::new(ctx);
    ctx.mult_model_view(m);
    scope
  }
}

impl<'a, D> Drop for ScopedModelMatrix<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_model_view();
  }
}

/// Saves the projection matrix.
#[must_use = "the projection matrix is restored as soon as the guard is dropped"]
pub struct ScopedProjectionMatrix<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedProjectionMatrix<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>) -> Self {
    ctx.push_projection();
    ScopedProjectionMatrix { ctx }
  }
}

impl<'a, D> Drop for ScopedProjectionMatrix<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_projection();
  }
}

/// Saves both the model-view and projection matrices.
#[must_use = "the matrices are restored as soon as the guard is dropped"]
pub struct ScopedMatrices<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedMatrices<'a, D>
where
  D: Driver,
{
  pub fn new(ctx: &'a Context<D>) -> Self {
    ctx.push_model_view();
    ctx.push_projection();
    ScopedMatrices { ctx }
  }
}

impl<'a, D> Drop for ScopedMatrices<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_projection();
    self.ctx.pop_model_view();
  }
}

/// Scoped current color.
#[must_use = "the color is restored as soon as the guard is dropped"]
pub struct ScopedColor<'a, D>
where
  D: Driver,
{
  ctx: &'a Context<D>,
}

impl<'a, D> ScopedColor<'a, D>
where
  D: Driver,
{
  /// Save the current color, leaving it as is.
  pub fn new(ctx: &'a Context<D>) -> Self {
    let color = ctx.current_color();
    Self::color(ctx, color)
  }

  pub fn color(ctx: &'a Context<D>, color: [f32; 4]) -> Self {
    ctx.push_color(color);
    ScopedColor { ctx }
  }
}

impl<'a, D> Drop for ScopedColor<'a, D>
where
  D: Driver,
{
  fn drop(&mut self) {
    self.ctx.pop_color();
  }
}
