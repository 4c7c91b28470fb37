//! Framebuffers.
//!
//! A [`Framebuffer`] owns a driver framebuffer object and the textures attached to its color attachments. Rendering
//! into it leaves derived data stale: a multisampled framebuffer must be resolved into its resolve target, and
//! mipmapped attachments need their chain regenerated. Binding a framebuffer through
//! [`Context::bind_fbo`](crate::context::Context::bind_fbo) or [`Context::push_fbo`](crate::context::Context::push_fbo)
//! marks it dirty; [`Framebuffer::update_mipmaps`] brings everything up to date.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};
use crate::region::Region;
use crate::target::FramebufferTarget;
use crate::texture::TextureRef;

/// Shared handle to a [`Framebuffer`].
pub type FramebufferRef = Rc<Framebuffer>;

/// A framebuffer object.
#[derive(Debug)]
pub struct Framebuffer {
  id: ObjectId,
  width: i32,
  height: i32,
  attachments: RefCell<Vec<(u32, TextureRef)>>,
  resolve_target: RefCell<Option<FramebufferRef>>,
  needs_resolve: Cell<bool>,
  needs_mipmap_update: Cell<bool>,
  owner: Owner,
}

impl Framebuffer {
  pub fn create<D>(ctx: &Context<D>, width: i32, height: i32) -> FramebufferRef
  where
    D: Driver,
  {
    let id = ctx.state().driver.gen_framebuffer();

    ctx.push_framebuffer(FramebufferTarget::Both, id);
    ctx.pop_framebuffer(FramebufferTarget::Both);

    log::debug!(
      "created framebuffer {} ({}×{}) on context {}",
      id,
      width,
      height,
      ctx.id()
    );

    Rc::new(Framebuffer {
      id,
      width,
      height,
      attachments: RefCell::new(Vec::new()),
      resolve_target: RefCell::new(None),
      needs_resolve: Cell::new(false),
      needs_mipmap_update: Cell::new(false),
      owner: ctx.owner(),
    })
  }

  pub fn id(&self) -> ObjectId {
    self.id
  }

  /// Full area of the framebuffer.
  pub fn bounds(&self) -> Region {
    Region::sized(self.width, self.height)
  }

  /// Attach a texture to a color attachment, replacing the previous one.
  pub fn attach_texture<D>(&self, ctx: &Context<D>, attachment: u32, texture: &TextureRef)
  where
    D: Driver,
  {
    ctx.push_framebuffer(FramebufferTarget::Both, self.id);
    ctx.state().driver.framebuffer_texture(
      FramebufferTarget::Both,
      attachment,
      texture.target(),
      texture.id(),
    );
    ctx.pop_framebuffer(FramebufferTarget::Both);

    let mut attachments = self.attachments.borrow_mut();
    attachments.retain(|(index, _)| *index != attachment);
    attachments.push((attachment, texture.clone()));
  }

  pub fn texture(&self, attachment: u32) -> Option<TextureRef> {
    self
      .attachments
      .borrow()
      .iter()
      .find(|(index, _)| *index == attachment)
      .map(|(_, texture)| texture.clone())
  }

  /// Set the single-sampled framebuffer this one is resolved into.
  pub fn set_resolve_target(&self, target: Option<FramebufferRef>) {
    *self.resolve_target.borrow_mut() = target;
  }

  pub fn resolve_target(&self) -> Option<FramebufferRef> {
    self.resolve_target.borrow().clone()
  }

  /// Flag derived data as stale after rendering.
  pub fn mark_as_dirty(&self) {
    self.needs_resolve.set(self.resolve_target.borrow().is_some());
    self
      .needs_mipmap_update
      .set(self.final_textures().iter().any(|t| t.is_mipmapped()));
  }

  pub fn needs_resolve(&self) -> bool {
    self.needs_resolve.get()
  }

  pub fn needs_mipmap_update(&self) -> bool {
    self.needs_mipmap_update.get()
  }

  /// Blit the color buffer into the resolve target, if stale.
  pub fn resolve_textures<D>(&self, ctx: &Context<D>)
  where
    D: Driver,
  {
    if !self.needs_resolve.replace(false) {
      return;
    }

    if let Some(target) = self.resolve_target() {
      ctx.push_framebuffer(FramebufferTarget::Read, self.id);
      ctx.push_framebuffer(FramebufferTarget::Draw, target.id);
      ctx
        .state()
        .driver
        .blit_framebuffer(self.bounds(), target.bounds());
      ctx.pop_framebuffer(FramebufferTarget::Draw);
      ctx.pop_framebuffer(FramebufferTarget::Read);
    }
  }

  /// Resolve, then regenerate the mipmap chains of the mipmapped textures holding the final image, if stale.
  pub fn update_mipmaps<D>(&self, ctx: &Context<D>)
  where
    D: Driver,
  {
    self.resolve_textures(ctx);

    if !self.needs_mipmap_update.replace(false) {
      return;
    }

    for texture in self.final_textures().iter().filter(|t| t.is_mipmapped()) {
      texture.generate_mipmap(ctx);
    }
  }

  // textures holding the image once resolved
  fn final_textures(&self) -> Vec<TextureRef> {
    let resolve_target = self.resolve_target.borrow();
    let attachments = match *resolve_target {
      Some(ref target) => target.attachments.borrow(),
      None => self.attachments.borrow(),
    };

    let textures = attachments.iter().map(|(_, texture)| texture.clone()).collect();
    textures
  }
}

impl PartialEq for Framebuffer {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && self.owner.context() == other.owner.context()
  }
}

impl Drop for Framebuffer {
  fn drop(&mut self) {
    self.owner.bury(Deletion::Framebuffer(self.id));
  }
}
