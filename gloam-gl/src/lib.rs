//! OpenGL drivers.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) drivers for [gloam](https://crates.io/crates/gloam).
//! A driver is handed to [`Context::create_from_existing`] along with the platform data of the native context it
//! talks to; the OpenGL symbols must have been loaded beforehand (with [`gl::load_with`]) by the windowing code
//! owning that native context.
//!
//! [`Context::create_from_existing`]: gloam::context::Context::create_from_existing

pub mod gl33;

pub use gl33::GL33;
