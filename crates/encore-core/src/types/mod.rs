//! Core type definitions used across the Encore workspace.

pub mod id;

pub use id::*;
