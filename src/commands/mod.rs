//! # CLI Command Implementations
//!
//! `mbutane` has a single command, composing a working directory. It lives
//! in its own module the same way as any future command would:
//! - an `Args` struct derived with `clap`
//! - an `execute` function calling into the `mbutane` library

pub mod compose;
