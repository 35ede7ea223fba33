//! Output emission: sheet images, JSON indices, Godot resources and
//! individual sprite images.
//!
//! Called only after every sheet has been composed.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use spritepack_backend_texture::png::write_rgba_to_vec_with_hash;
use spritepack_backend_texture::{PackLayout, PackedSheet, SheetImage, Sprite};
use spritepack_spec::{AtlasIndex, IndexRect, SpriteFrameSet};

use crate::pipeline::{PipelineConfig, PipelineError, SpriteCatalog};

/// Generator name recorded in every index.
pub const APP_NAME: &str = "SpritePack";

/// Default Godot directory holding the sheet images.
pub const DEFAULT_RESOURCE_DIR: &str = "res://textures/";

/// Extension of Godot text resources.
pub const RESOURCE_EXTENSION: &str = "tres";

/// Files belonging to one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFiles {
    pub png: PathBuf,
    pub json: PathBuf,
    /// Godot path of the sheet image.
    pub resource_path: String,
}

/// Everything written by [`write_outputs`].
#[derive(Debug, Clone, Default)]
pub struct EmittedFiles {
    pub sheets: Vec<SheetFiles>,
    pub resources: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
}

/// Where a packed sprite ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRegion {
    /// Godot path of the sheet image.
    pub resource_path: String,
    /// Pixel region of the sprite on the sheet.
    pub rect: IndexRect,
}

/// Appends `suffix` to the file name of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Output path prefix of sheet `index`: `<output>` for a single sheet,
/// `<output>_<index>` otherwise.
pub fn sheet_prefix(output: &Path, index: usize, sheet_count: usize) -> PathBuf {
    if sheet_count == 1 {
        output.to_path_buf()
    } else {
        with_suffix(output, &format!("_{index}"))
    }
}

/// Godot path of a sheet image: the resource dir without surrounding `/`,
/// then the image file name.
pub fn resource_path(resource_dir: &str, image_name: &str) -> String {
    format!("{}/{}", resource_dir.trim_matches('/'), image_name)
}

/// Plans the files of every sheet.
pub fn plan_sheet_files(output: &Path, resource_dir: &str, sheet_count: usize) -> Vec<SheetFiles> {
    (0..sheet_count)
        .map(|index| {
            let prefix = sheet_prefix(output, index, sheet_count);
            let png = with_suffix(&prefix, ".png");
            let image_name = png
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            SheetFiles {
                json: with_suffix(&prefix, ".json"),
                resource_path: resource_path(resource_dir, &image_name),
                png,
            }
        })
        .collect()
}

/// Builds the JSON index of one sheet.
pub fn build_index(sheet: &PackedSheet, sprites: &[Sprite], image_name: &str) -> AtlasIndex {
    let mut index = AtlasIndex::new(APP_NAME, env!("CARGO_PKG_VERSION"), image_name, sheet.side);
    for placement in &sheet.placements {
        let (x, y) = placement.origin();
        index.push_frame(
            sprites[placement.sprite].name.clone(),
            x,
            y,
            placement.width,
            placement.height,
        );
    }
    index
}

/// Maps every packed sprite name to its sheet region.
pub fn frame_regions(
    layout: &PackLayout,
    sprites: &[Sprite],
    files: &[SheetFiles],
) -> HashMap<String, FrameRegion> {
    let mut regions = HashMap::new();
    for (sheet, files) in layout.sheets.iter().zip(files) {
        for placement in &sheet.placements {
            let (x, y) = placement.origin();
            regions.insert(
                sprites[placement.sprite].name.clone(),
                FrameRegion {
                    resource_path: files.resource_path.clone(),
                    rect: IndexRect::new(x, y, placement.width, placement.height),
                },
            );
        }
    }
    regions
}

/// Text of a Godot `AtlasTexture` resource.
pub fn atlas_texture_resource(region: &FrameRegion) -> String {
    let r = region.rect;
    format!(
        "[gd_resource type=\"AtlasTexture\" format=2]\n\
         \n\
         [ext_resource path=\"{}\" type=\"Texture\" id=1]\n\
         \n\
         [resource]\n\
         atlas = ExtResource(1)\n\
         region = Rect2({}, {}, {}, {})\n",
        escape(&region.resource_path),
        r.x,
        r.y,
        r.w,
        r.h
    )
}

/// Text of a Godot `SpriteFrames` resource.
///
/// Sheet images are declared once each, in first-use order. Every frame
/// reference gets its own `AtlasTexture` sub-resource, numbered across clips.
pub fn sprite_frames_resource(
    set: &SpriteFrameSet,
    regions: &HashMap<String, FrameRegion>,
) -> Result<String, PipelineError> {
    let mut ext_paths: Vec<&str> = Vec::new();
    let mut clips: Vec<Vec<(usize, &FrameRegion)>> = Vec::with_capacity(set.clips.len());

    for clip in &set.clips {
        let mut frames = Vec::with_capacity(clip.frames.len());
        for frame in &clip.frames {
            let region = regions
                .get(frame)
                .ok_or_else(|| PipelineError::UnpackedFrame {
                    set: set.name.clone(),
                    frame: frame.clone(),
                })?;
            let ext_id = match ext_paths.iter().position(|p| *p == region.resource_path) {
                Some(position) => position + 1,
                None => {
                    ext_paths.push(&region.resource_path);
                    ext_paths.len()
                }
            };
            frames.push((ext_id, region));
        }
        clips.push(frames);
    }

    let mut out = String::from("[gd_resource type=\"SpriteFrames\" format=3]\n\n");
    for (i, path) in ext_paths.iter().enumerate() {
        let _ = writeln!(
            out,
            "[ext_resource path=\"{}\" type=\"Texture\" id={}]",
            escape(path),
            i + 1
        );
    }
    out.push('\n');

    let mut sub_id = 0;
    let mut animations = Vec::with_capacity(set.clips.len());
    for (clip, frames) in set.clips.iter().zip(&clips) {
        let mut frame_entries = Vec::with_capacity(frames.len());
        for (ext_id, region) in frames {
            sub_id += 1;
            let r = region.rect;
            let _ = write!(
                out,
                "[sub_resource type=\"AtlasTexture\" id={}]\n\
                 atlas = ExtResource({})\n\
                 region = Rect2({}, {}, {}, {})\n\n",
                sub_id, ext_id, r.x, r.y, r.w, r.h
            );
            frame_entries.push(format!(
                "{{\"duration\": 1.0, \"texture\": SubResource({})}}",
                sub_id
            ));
        }

        let frames_text = if frame_entries.is_empty() {
            "[]".to_string()
        } else {
            format!("[\n        {}\n    ]", frame_entries.join(",\n        "))
        };
        animations.push(format!(
            "{{\n    \"frames\": {},\n    \"loop\": {},\n    \"name\": &\"{}\",\n    \"speed\": {:.1}\n}}",
            frames_text,
            clip.looping,
            escape(&clip.name),
            f64::from(clip.fps)
        ));
    }

    let _ = writeln!(out, "[resource]\nanimations = [{}]", animations.join(", "));
    Ok(out)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    };
    write().map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every output of a finished run.
pub fn write_outputs(
    config: &PipelineConfig,
    catalog: &SpriteCatalog,
    layout: &PackLayout,
    sheets: &[SheetImage],
) -> Result<EmittedFiles, PipelineError> {
    let files = plan_sheet_files(&config.output, &config.resource_dir, layout.sheets.len());
    let mut emitted = EmittedFiles::default();

    for ((sheet, image), sheet_files) in layout.sheets.iter().zip(sheets).zip(&files) {
        write_file(&sheet_files.png, &image.png_data)?;

        let image_name = sheet_files
            .png
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let index = build_index(sheet, &catalog.sprites, &image_name);
        write_file(&sheet_files.json, index.to_json()?.as_bytes())?;
    }

    if let Some(godot_dir) = &config.godot_dir {
        let regions = frame_regions(layout, &catalog.sprites, &files);

        for sprite in catalog.sprites.iter().filter(|s| !s.animated) {
            if let Some(region) = regions.get(&sprite.name) {
                let path = godot_dir.join(format!("{}.{}", sprite.name, RESOURCE_EXTENSION));
                write_file(&path, atlas_texture_resource(region).as_bytes())?;
                emitted.resources.push(path);
            }
        }

        for set in &catalog.frame_sets {
            let text = sprite_frames_resource(set, &regions)?;
            let path = godot_dir.join(format!("{}.{}", set.name, RESOURCE_EXTENSION));
            write_file(&path, text.as_bytes())?;
            emitted.resources.push(path);
        }
    }

    if let Some(image_dir) = &config.image_dir {
        for sprite in &catalog.sprites {
            let path = image_dir.join(format!("{}.png", sprite.name));
            let (data, _) = write_rgba_to_vec_with_hash(&sprite.image, &config.png)?;
            write_file(&path, &data)?;
            emitted.images.push(path);
        }
    }

    emitted.sheets = files;
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spritepack_spec::AnimationClip;

    fn region(resource: &str, x: u32, y: u32, w: u32, h: u32) -> FrameRegion {
        FrameRegion {
            resource_path: resource.to_string(),
            rect: IndexRect::new(x, y, w, h),
        }
    }

    #[test]
    fn test_sheet_naming() {
        let single = plan_sheet_files(Path::new("out/atlas"), DEFAULT_RESOURCE_DIR, 1);
        assert_eq!(single[0].png, PathBuf::from("out/atlas.png"));
        assert_eq!(single[0].json, PathBuf::from("out/atlas.json"));
        assert_eq!(single[0].resource_path, "res://textures/atlas.png");

        let multi = plan_sheet_files(Path::new("out/atlas.v2"), "/res://sprites/", 2);
        assert_eq!(multi[0].png, PathBuf::from("out/atlas.v2_0.png"));
        assert_eq!(multi[1].json, PathBuf::from("out/atlas.v2_1.json"));
        assert_eq!(multi[1].resource_path, "res://sprites/atlas.v2_1.png");
    }

    #[test]
    fn test_atlas_texture_text() {
        let text = atlas_texture_resource(&region("res://textures/atlas.png", 1, 13, 8, 4));
        assert_eq!(
            text,
            "[gd_resource type=\"AtlasTexture\" format=2]\n\
             \n\
             [ext_resource path=\"res://textures/atlas.png\" type=\"Texture\" id=1]\n\
             \n\
             [resource]\n\
             atlas = ExtResource(1)\n\
             region = Rect2(1, 13, 8, 4)\n"
        );
    }

    #[test]
    fn test_sprite_frames_text() {
        let mut regions = HashMap::new();
        regions.insert("h__0x0".to_string(), region("res://a_0.png", 1, 1, 4, 2));
        regions.insert("h__1x0".to_string(), region("res://a_1.png", 1, 1, 4, 2));

        let mut set = SpriteFrameSet::new("h");
        set.clips.push(
            AnimationClip::new("walk", 12, true)
                .with_frame("h__0x0")
                .with_frame("h__1x0"),
        );
        set.clips
            .push(AnimationClip::new("idle", 4, false).with_frame("h__0x0"));

        let text = sprite_frames_resource(&set, &regions).unwrap();
        let expected = "[gd_resource type=\"SpriteFrames\" format=3]\n\
\n\
[ext_resource path=\"res://a_0.png\" type=\"Texture\" id=1]\n\
[ext_resource path=\"res://a_1.png\" type=\"Texture\" id=2]\n\
\n\
[sub_resource type=\"AtlasTexture\" id=1]\n\
atlas = ExtResource(1)\n\
region = Rect2(1, 1, 4, 2)\n\
\n\
[sub_resource type=\"AtlasTexture\" id=2]\n\
atlas = ExtResource(2)\n\
region = Rect2(1, 1, 4, 2)\n\
\n\
[sub_resource type=\"AtlasTexture\" id=3]\n\
atlas = ExtResource(1)\n\
region = Rect2(1, 1, 4, 2)\n\
\n\
[resource]\n\
animations = [{\n    \"frames\": [\n        {\"duration\": 1.0, \"texture\": SubResource(1)},\n        {\"duration\": 1.0, \"texture\": SubResource(2)}\n    ],\n    \"loop\": true,\n    \"name\": &\"walk\",\n    \"speed\": 12.0\n}, {\n    \"frames\": [\n        {\"duration\": 1.0, \"texture\": SubResource(3)}\n    ],\n    \"loop\": false,\n    \"name\": &\"idle\",\n    \"speed\": 4.0\n}]\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_unpacked_frame_is_reported() {
        let mut set = SpriteFrameSet::new("h");
        set.clips
            .push(AnimationClip::new("walk", 12, true).with_frame("missing"));
        let err = sprite_frames_resource(&set, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("'missing'"));
    }
}
