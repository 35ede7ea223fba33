//! SpritePack End-to-End Test Infrastructure
//!
//! Integration tests run the whole pipeline over synthetic source trees:
//!
//! - Packing: sprites, tile sheets and drawings -> sheets and indices
//! - Animation: frame tables and inline playback -> Godot `SpriteFrames`
//! - **Determinism**: byte-identical output across runs
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spritepack-tests
//! ```
//!
//! Vector drawings are exported through a stub exporter, so no Inkscape
//! installation is needed.

pub mod determinism;
pub mod fixtures;

pub use determinism::{compute_hash, hash_tree, verify_determinism, DeterminismResult, DiffInfo};
pub use fixtures::{tile_color, SourceTreeFixture, FRAME_TABLE_HEADER};
