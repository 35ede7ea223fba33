//! SpritePack Spec Library
//!
//! This crate holds the pure, raster-free part of the atlas pipeline: how
//! asset names and companion tables are interpreted, how animations are
//! described, and what the emitted atlas index looks like.
//!
//! # Example
//!
//! ```
//! use spritepack_spec::naming::{parse_asset_name, AssetLayout, GridSpec};
//!
//! let layout = parse_asset_name("chars/hero__16x16p1fps12loop").unwrap();
//! assert_eq!(layout.name(), "chars/hero");
//! assert_eq!(layout.grid(), Some(GridSpec::new(16, 16).with_padding(1)));
//! assert!(layout.playback().unwrap().looping);
//!
//! assert!(matches!(
//!     parse_asset_name("ui/icon").unwrap(),
//!     AssetLayout::Single { .. }
//! ));
//! ```
//!
//! # Modules
//!
//! - [`naming`]: Filename grammar (`<name>__<w>x<h>[p<pad>][fps<rate>[loop]]`)
//! - [`frame_table`]: Companion `;`-delimited clip tables
//! - [`animation`]: Clips and per-tileset frame sets
//! - [`index`]: Generic JSON atlas index document
//! - [`error`]: Error taxonomy and the shared [`BackendError`] trait

pub mod animation;
pub mod error;
pub mod frame_table;
pub mod index;
pub mod naming;

// Re-export commonly used types at the crate root
pub use animation::{AnimationClip, SpriteFrameSet, DEFAULT_CLIP_NAME};
pub use error::{BackendError, ErrorKind, SpecError};
pub use frame_table::{FrameTable, FrameTableRecord};
pub use index::{AtlasIndex, IndexFrame, IndexMeta, IndexRect, IndexSize};
pub use naming::{parse_asset_name, AssetLayout, GridSpec, InlinePlayback};
