//! OpenGL 3.3 driver.
//!
//! This module implements an OpenGL 3.3 driver for gloam. The driver type is [`GL33`].

mod driver;
mod shader;
mod state;

use gloam::driver::DriverError;
use std::marker::PhantomData;

/// An OpenGL 3.3 driver.
///
/// The type holds no state: every command goes straight to the OpenGL context current on the calling thread, which
/// is why it’s neither [`Send`] nor [`Sync`].
#[derive(Debug)]
pub struct GL33 {
  _a: PhantomData<*const ()>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 driver.
  ///
  /// Fails if the OpenGL symbols haven’t been loaded.
  pub fn new() -> Result<Self, DriverError> {
    if !gl::Viewport::is_loaded() || !gl::BindBuffer::is_loaded() {
      return Err(DriverError::Unavailable("OpenGL symbols are not loaded".to_owned()));
    }

    Ok(GL33 { _a: PhantomData })
  }
}
