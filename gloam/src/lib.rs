//! # Scoped, cached GPU state for OpenGL-style drivers
//!
//! OpenGL is a big global state machine: every draw call depends on a pile of bindings and switches that every piece
//! of rendering code is free to change. gloam keeps a software shadow of that state per context, so that:
//!
//! - Redundant driver calls are elided: binding what is already bound costs nothing.
//! - State changes can be *scoped*: a piece of code pushes the state it needs and pops it back when done, leaving the
//!   surrounding state exactly as it found it. The [`scope`] module provides guards doing that for you.
//! - Switching contexts – or threads – is safe: making a context current replays its cached state.
//!
//! gloam doesn’t talk to OpenGL directly. Instead, every command goes through a [`Driver`](driver::Driver), which
//! is a thin layer over the actual API. The `gloam-gl` crate provides an OpenGL 3.3 driver, and the
//! [`HeadlessDriver`](driver::headless::HeadlessDriver) records commands in memory, which is useful for testing.
//!
//! # What’s included?
//!
//! - A [`Context`](context::Context) owning the cached state and the driver.
//! - Object wrappers: [buffers](buffer), [textures](texture), [framebuffers](framebuffer),
//!   [vertex arrays](vao), [programs](program) and [transform feedback objects](transform_feedback). They are
//!   reference counted and deleted through the context they were created with when the last handle goes away.
//! - Stock shaders, generated from a [`ShaderDef`](shader::ShaderDef) for the profile of the context – see
//!   [`environment`].
//! - Model-view and projection matrix stacks, plus a current color, fed to programs declaring the matching
//!   uniforms.
//!
//! # Contexts and threads
//!
//! A context is not [`Send`]. At most one context is current per thread, and a context is current on at most one
//! thread; a [`ContextRegistry`](registry::ContextRegistry) keeps track of that, and can be shared by all the
//! contexts of an application.
//!
//! # Usage errors
//!
//! Popping more than was pushed, or driving transform feedback through an invalid transition, is a programming error
//! and panics after logging the problem.

//#![deny(missing_docs)]

pub mod binding;
pub mod blending;
pub mod buffer;
pub mod capability;
pub mod context;
pub mod driver;
pub mod environment;
pub mod framebuffer;
mod object;
pub mod platform;
pub mod program;
pub mod region;
pub mod registry;
pub mod scope;
pub mod shader;
pub mod stack;
pub mod target;
pub mod texture;
pub mod transform_feedback;
pub mod vao;
pub mod vertex;
