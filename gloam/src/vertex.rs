//! Vertex specification and draw types.

/// Primitive topology of a draw call.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum PrimitiveMode {
  Points,
  Lines,
  LineStrip,
  LineLoop,
  Triangles,
  TriangleStrip,
  TriangleFan,
}

/// Type of the indices read from the element array buffer.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum IndexType {
  U8,
  U16,
  U32,
}

impl IndexType {
  /// Size of a single index, in bytes.
  pub fn bytes(self) -> usize {
    match self {
      IndexType::U8 => 1,
      IndexType::U16 => 2,
      IndexType::U32 => 4,
    }
  }
}

/// Type of the components of a vertex attribute, as stored in its buffer.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum AttribType {
  Byte,
  UnsignedByte,
  Short,
  UnsignedShort,
  Int,
  UnsignedInt,
  Float,
}

/// Layout of a single vertex attribute inside its array buffer.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttribPointer {
  /// Attribute index.
  pub index: u32,
  /// Number of components, `1` to `4`.
  pub size: i32,
  pub ty: AttribType,
  pub normalized: bool,
  /// Bytes between two consecutive attributes; `0` for tightly packed data.
  pub stride: i32,
  /// Offset of the first attribute in the buffer, in bytes.
  pub offset: usize,
}

/// How polygons are rasterized.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  Point,
  Line,
  Fill,
}

/// Polygon faces, as selected by their winding.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Face {
  Front,
  Back,
  FrontAndBack,
}
