//! End-to-end tests for vector layer extraction.
//!
//! Inkscape is replaced by a stub exporter that writes a PNG sized after the
//! layer id, so these tests run without any external tool.

use std::cell::RefCell;

use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use spritepack_backend_inkscape::{
    ExportRequest, ExportStatus, InkscapeConfig, InkscapeResult, LayerExporter, RetryPolicy,
};
use spritepack_backend_texture::png::write_rgba;
use spritepack_backend_texture::PngConfig;
use spritepack_cli::pipeline::run_pipeline_with;
use spritepack_spec::{AtlasIndex, BackendError, ErrorKind};
use spritepack_tests::SourceTreeFixture;

/// Writes a `6×(n+1)` image for layer `layerN`; fails for ids starting with `bad`.
#[derive(Default)]
struct StubInkscape {
    exported: RefCell<Vec<String>>,
}

impl LayerExporter for StubInkscape {
    fn export(&self, request: &ExportRequest<'_>) -> InkscapeResult<ExportStatus> {
        self.exported.borrow_mut().push(request.layer_id.to_string());
        if request.layer_id.starts_with("bad") {
            return Ok(ExportStatus {
                exit_code: 1,
                stderr: "cannot export".to_string(),
            });
        }
        let n: u32 = request
            .layer_id
            .trim_start_matches("layer")
            .parse()
            .unwrap_or(0);
        let image = RgbaImage::from_pixel(6, n + 1, Rgba([0, 80, 160, 255]));
        write_rgba(&image, request.output, &PngConfig::default()).unwrap();
        Ok(ExportStatus::success())
    }
}

fn fast_inkscape() -> InkscapeConfig {
    InkscapeConfig::default().retry(RetryPolicy::immediate(2))
}

#[test]
fn test_layers_become_named_sprites() {
    let fixture = SourceTreeFixture::new();
    fixture.add_svg(
        "chars/hero.svg",
        &[("layer1", "Body"), ("layer2", "Sword &amp; Shield!"), ("layer3", "")],
    );
    fixture.add_png("icon.png", 4, 4, [1, 1, 1, 255]);

    let stub = StubInkscape::default();
    let config = fixture.config().inkscape(fast_inkscape());
    let report = run_pipeline_with(&config, &stub).unwrap();
    assert_eq!(report.sprite_count, 4);
    assert!(report.skipped_layers.is_empty());

    let index = AtlasIndex::from_json(
        &std::fs::read_to_string(fixture.output("atlas.json")).unwrap(),
    )
    .unwrap();
    let mut names: Vec<&str> = index.frames.iter().map(|f| f.filename.as_str()).collect();
    names.sort();
    // A layer without a label is named after its id
    assert_eq!(
        names,
        vec!["chars/hero/Body", "chars/hero/Sword  Shield", "chars/hero/layer3", "icon"]
    );

    let body = index.frames.iter().find(|f| f.filename == "chars/hero/Body").unwrap();
    assert_eq!((body.frame.w, body.frame.h), (6, 2));
}

#[test]
fn test_failed_layer_is_skipped() {
    let fixture = SourceTreeFixture::new();
    fixture.add_svg("props.svg", &[("layer1", "Barrel"), ("bad1", "Crate")]);

    let stub = StubInkscape::default();
    let config = fixture.config().inkscape(fast_inkscape());
    let report = run_pipeline_with(&config, &stub).unwrap();

    assert_eq!(report.sprite_count, 1);
    assert_eq!(report.skipped_layers.len(), 1);
    assert_eq!(report.skipped_layers[0].layer, "Crate");
    assert_eq!(report.skipped_layers[0].reason, "exit status 1: cannot export");
    assert_eq!(*stub.exported.borrow(), vec!["layer1", "bad1"]);
}

#[test]
fn test_failed_layer_can_be_fatal() {
    let fixture = SourceTreeFixture::new();
    fixture.add_svg("props.svg", &[("bad1", "Crate")]);

    let config = fixture
        .config()
        .inkscape(fast_inkscape().fail_on_export_error(true));
    let err = run_pipeline_with(&config, StubInkscape::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalToolFailure);
    assert!(err.to_string().contains("Crate"));
    assert!(!fixture.out_dir.exists());
}

#[test]
fn test_vector_and_raster_name_collision() {
    let fixture = SourceTreeFixture::new();
    fixture.add_svg("hero.svg", &[("layer1", "Body")]);
    fixture.add_png("hero/Body.png", 2, 2, [5, 5, 5, 255]);

    let config = fixture.config().inkscape(fast_inkscape());
    let err = run_pipeline_with(&config, StubInkscape::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateSpriteName);
    assert!(err.to_string().contains("hero/Body"));
}

#[test]
fn test_label_without_usable_characters_uses_layer_id() {
    let fixture = SourceTreeFixture::new();
    fixture.add_svg("hero.svg", &[("layer2", "***"), ("layer4", "Cape")]);

    let config = fixture.config().inkscape(fast_inkscape());
    let report = run_pipeline_with(&config, StubInkscape::default()).unwrap();
    assert_eq!(report.sprite_count, 2);

    let index = AtlasIndex::from_json(
        &std::fs::read_to_string(fixture.output("atlas.json")).unwrap(),
    )
    .unwrap();
    let mut names: Vec<&str> = index.frames.iter().map(|f| f.filename.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["hero/Cape", "hero/layer2"]);
}
