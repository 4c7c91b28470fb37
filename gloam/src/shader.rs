//! Stock shader definitions.
//!
//! A [`ShaderDef`] describes the feature set of a stock shader. It’s a plain value: two equal definitions always
//! designate the same shader, which is what the per-context stock shader cache is keyed by.

use crate::target::TextureTarget;

/// Feature set of a stock shader.
///
/// Definitions are totally ordered by texture mapping first, then by the rectangle texture variant, then by color.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShaderDef {
  texture_mapping: bool,
  texture_rectangle: bool,
  color: bool,
}

impl ShaderDef {
  /// A shader drawing solid white geometry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sample a 2D texture with the `vTexCoord0` attribute.
  pub fn texture(self) -> Self {
    self.texture_target(TextureTarget::Texture2D)
  }

  /// Sample a texture of the given target with the `vTexCoord0` attribute.
  ///
  /// Only [`TextureTarget::Rectangle`] yields a different shader; any other target samples a 2D texture.
  pub fn texture_target(self, target: TextureTarget) -> Self {
    ShaderDef {
      texture_mapping: true,
      texture_rectangle: target == TextureTarget::Rectangle,
      ..self
    }
  }

  /// Multiply by the per-vertex `vColor` attribute.
  pub fn color(self) -> Self {
    ShaderDef {
      color: true,
      ..self
    }
  }

  pub fn uses_texture(&self) -> bool {
    self.texture_mapping
  }

  pub fn uses_texture_rectangle(&self) -> bool {
    self.texture_mapping && self.texture_rectangle
  }

  pub fn uses_color(&self) -> bool {
    self.color
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_definitions_are_equal_keys() {
    assert_eq!(ShaderDef::new().color(), ShaderDef::new().color());
    assert_eq!(
      ShaderDef::new().texture().color(),
      ShaderDef::new().color().texture()
    );
    assert_ne!(ShaderDef::new(), ShaderDef::new().color());
  }

  #[test]
  fn ordering_is_texture_then_rectangle_then_color() {
    let plain = ShaderDef::new();
    let color = ShaderDef::new().color();
    let texture = ShaderDef::new().texture();
    let rect = ShaderDef::new().texture_target(TextureTarget::Rectangle);
    let rect_color = rect.color();

    let mut defs = vec![rect_color, texture, color, rect, plain];
    defs.sort();

    assert_eq!(defs, vec![plain, color, texture, rect, rect_color]);
  }

  #[test]
  fn non_rectangle_targets_sample_2d() {
    let cube = ShaderDef::new().texture_target(TextureTarget::CubeMap);

    assert_eq!(cube, ShaderDef::new().texture());
    assert!(!cube.uses_texture_rectangle());
  }
}
