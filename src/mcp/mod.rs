//! Model Context Protocol server layer.

pub mod args;
pub mod handler;
pub mod registry;
pub mod shaper;
pub mod tools;
pub mod transport;
