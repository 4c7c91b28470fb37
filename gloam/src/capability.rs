//! Boolean capabilities.

/// A boolean piece of driver state.
///
/// Most of them are toggled with `glEnable` / `glDisable`; [`Capability::DepthWrite`] is the depth mask, which is
/// tracked the same way.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Capability {
  /// Color blending.
  Blend,
  /// Depth test.
  DepthTest,
  /// Writes to the depth buffer.
  DepthWrite,
  /// Scissor test.
  ScissorTest,
  /// Stencil test.
  StencilTest,
  /// Face culling.
  CullFace,
  /// Polygon offset for filled polygons.
  PolygonOffsetFill,
  /// Multisample rasterization.
  Multisample,
  /// Antialiased lines.
  LineSmooth,
  /// Point size written by the vertex shader.
  ProgramPointSize,
  /// Linear to sRGB conversion on framebuffer writes.
  FramebufferSrgb,
  /// Primitives discarded before rasterization.
  RasterizerDiscard,
  /// Primitive restart on a special index.
  PrimitiveRestart,
}
