//! SpritePack CLI library.
//!
//! This crate wires the asset pipeline together: source discovery, sprite
//! collection, packing, output emission and the `pack`/`doctor` commands.

pub mod commands;
pub mod discovery;
pub mod emit;
pub mod pipeline;
