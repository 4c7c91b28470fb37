//! Screen regions.
//!
//! Both the viewport and the scissor test are expressed as a rectangular [`Region`] of the framebuffer, its origin
//! being the lower-left corner.

/// A rectangular area of the framebuffer.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Region {
  /// The x screen position of the region.
  pub x: i32,

  /// The y screen position of the region.
  pub y: i32,

  /// The screen width of the region.
  pub width: i32,

  /// The screen height of the region.
  pub height: i32,
}

impl Region {
  pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
    Region {
      x,
      y,
      width,
      height,
    }
  }

  /// A region starting at the origin.
  pub fn sized(width: i32, height: i32) -> Self {
    Self::new(0, 0, width, height)
  }

  /// Width over height; `0.` for a degenerate region.
  pub fn aspect_ratio(&self) -> f32 {
    if self.height == 0 {
      0.
    } else {
      self.width as f32 / self.height as f32
    }
  }
}

impl From<[i32; 4]> for Region {
  fn from([x, y, width, height]: [i32; 4]) -> Self {
    Region::new(x, y, width, height)
  }
}

impl From<Region> for [i32; 4] {
  fn from(region: Region) -> Self {
    [region.x, region.y, region.width, region.height]
  }
}
