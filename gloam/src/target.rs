//! Binding targets.
//!
//! Each enum of this module is an independent binding namespace: binding an object to one target never affects the
//! objects bound to another.

/// Buffer binding targets.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BufferTarget {
  /// Vertex attribute data.
  Array,
  /// Vertex indices. Part of the state of the bound vertex array.
  ElementArray,
  /// Uniform block storage.
  Uniform,
  /// Transform feedback output.
  TransformFeedback,
  /// Source of texture uploads.
  PixelUnpack,
  /// Destination of pixel reads.
  PixelPack,
  /// Source of buffer-to-buffer copies.
  CopyRead,
  /// Destination of buffer-to-buffer copies.
  CopyWrite,
  /// Storage of buffer textures.
  Texture,
}

impl BufferTarget {
  /// Whether the binding is recorded by the bound vertex array rather than being global state.
  pub fn is_vertex_array_state(self) -> bool {
    matches!(self, BufferTarget::ElementArray)
  }
}

/// Texture binding targets.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TextureTarget {
  Texture1D,
  Texture2D,
  Texture3D,
  Texture1DArray,
  Texture2DArray,
  /// Rectangle textures, addressed with unnormalized coordinates.
  Rectangle,
  CubeMap,
  /// Buffer textures.
  Buffer,
  Texture2DMultisample,
}

/// Framebuffer binding targets.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FramebufferTarget {
  /// Target of pixel reads and blit sources.
  Read,
  /// Target of draws and blit destinations.
  Draw,
  /// Both the read and the draw targets.
  Both,
}

impl FramebufferTarget {
  /// The individual targets this target designates.
  pub fn split(self) -> &'static [FramebufferTarget] {
    match self {
      FramebufferTarget::Read => &[FramebufferTarget::Read],
      FramebufferTarget::Draw => &[FramebufferTarget::Draw],
      FramebufferTarget::Both => &[FramebufferTarget::Read, FramebufferTarget::Draw],
    }
  }
}
