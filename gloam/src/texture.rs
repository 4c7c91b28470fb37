//! Textures.
//!
//! Image upload is left to the callers – through the driver of their choice – so a [`Texture`] only owns the driver
//! object, its target and whether it carries a mipmap chain worth regenerating.

use std::rc::Rc;

use crate::context::Context;
use crate::driver::{Driver, ObjectId};
use crate::object::{Deletion, Owner};
use crate::target::TextureTarget;

/// Shared handle to a [`Texture`].
pub type TextureRef = Rc<Texture>;

/// A texture object.
#[derive(Debug)]
pub struct Texture {
  id: ObjectId,
  target: TextureTarget,
  mipmapped: bool,
  owner: Owner,
}

impl Texture {
  /// Create a texture.
  ///
  /// The texture is bound once to its target on the active unit so that the driver object exists; the previous
  /// binding is restored right away.
  pub fn create<D>(ctx: &Context<D>, target: TextureTarget, mipmapped: bool) -> TextureRef
  where
    D: Driver,
  {
    let id = ctx.state().driver.gen_texture();

    ctx.push_texture_binding(target, id);
    ctx.pop_texture_binding(target);

    log::debug!("created texture {} ({:?}) on context {}", id, target, ctx.id());

    Rc::new(Texture {
      id,
      target,
      mipmapped,
      owner: ctx.owner(),
    })
  }

  pub fn id(&self) -> ObjectId {
    self.id
  }

  pub fn target(&self) -> TextureTarget {
    self.target
  }

  pub fn is_mipmapped(&self) -> bool {
    self.mipmapped
  }

  /// Bind the texture to its target on a texture unit.
  pub fn bind<D>(&self, ctx: &Context<D>, unit: u32)
  where
    D: Driver,
  {
    ctx.bind_texture_on(self.target, self.id, unit);
  }

  /// Regenerate the mipmap chain from the base level.
  pub fn generate_mipmap<D>(&self, ctx: &Context<D>)
  where
    D: Driver,
  {
    ctx.push_texture_binding(self.target, self.id);
    ctx.state().driver.generate_mipmap(self.target);
    ctx.pop_texture_binding(self.target);
  }
}

impl PartialEq for Texture {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && self.owner.context() == other.owner.context()
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    self.owner.bury(Deletion::Texture(self.id));
  }
}
