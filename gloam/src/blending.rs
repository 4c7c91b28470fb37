//! Blending factors.
//!
//! Given two pixels *src* and *dst* – source and destination, we associate each pixel a blending
//! factor – respectively, *srcK* and *dstK*. *src* is the pixel being computed, and *dst* is the
//! pixel that is already stored in the framebuffer. The RGB and alpha channels each get their own pair of factors,
//! stored in [`BlendFactors`].

/// Blending factors. Pixel data are multiplied by these factors when blending is enabled.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Factor {
  /// `1 * color = factor`
  One,
  /// `0 * color = 0`
  Zero,
  /// `src * color`
  SrcColor,
  /// `(1 - src) * color`
  SrcColorComplement,
  /// `dst * color`
  DestColor,
  /// `(1 - dst) * color`
  DestColorComplement,
  /// `srcA * color`
  SrcAlpha,
  /// `(1 - srcA) * color`
  SrcAlphaComplement,
  /// `dstA * color`
  DstAlpha,
  /// `(1 - dstA) * color`
  DstAlphaComplement,
  /// `min(srcA, 1 - dstA) * color`
  SrcAlphaSaturate,
}

/// The four factors of a separate blend function.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct BlendFactors {
  pub src_rgb: Factor,
  pub dst_rgb: Factor,
  pub src_alpha: Factor,
  pub dst_alpha: Factor,
}

impl BlendFactors {
  /// Same factors for the RGB and alpha channels.
  pub fn new(src: Factor, dst: Factor) -> Self {
    Self::separate(src, dst, src, dst)
  }

  pub fn separate(src_rgb: Factor, dst_rgb: Factor, src_alpha: Factor, dst_alpha: Factor) -> Self {
    BlendFactors {
      src_rgb,
      dst_rgb,
      src_alpha,
      dst_alpha,
    }
  }
}

impl Default for BlendFactors {
  /// `ONE, ZERO` for both channels, the initial driver state.
  fn default() -> Self {
    Self::new(Factor::One, Factor::Zero)
  }
}
