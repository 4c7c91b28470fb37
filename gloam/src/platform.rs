//! Platform-native context handles.
//!
//! Creating native contexts is the business of windowing crates; this module only defines what a
//! [`Context`](crate::context::Context) needs from one: becoming current, and spawning a sibling sharing its objects.

use std::any::Any;
use std::error;
use std::fmt;
use std::rc::Rc;

/// Error that might occur when dealing with a native context.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlatformError {
  /// The native context couldn’t be created.
  CreationFailed(String),
  /// The native context couldn’t be made current.
  MakeCurrentFailed(String),
}

impl fmt::Display for PlatformError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      PlatformError::CreationFailed(ref e) => write!(f, "cannot create native context: {}", e),
      PlatformError::MakeCurrentFailed(ref e) => {
        write!(f, "cannot make native context current: {}", e)
      }
    }
  }
}

impl error::Error for PlatformError {}

/// Opaque handle to a native context.
pub trait PlatformData: fmt::Debug {
  /// Make the native context current on the calling thread.
  fn make_current(&self) -> Result<(), PlatformError>;

  /// Create a native context sharing its objects with this one.
  fn create_shared(&self) -> Result<Rc<dyn PlatformData>, PlatformError>;

  /// Access the concrete handle, for downcasting.
  fn as_any(&self) -> &dyn Any;
}
