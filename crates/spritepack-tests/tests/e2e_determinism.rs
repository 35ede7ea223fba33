//! End-to-End Determinism Tests for SpritePack
//!
//! Two runs over an unchanged source tree must write byte-identical sheets,
//! indices and resources.

use pretty_assertions::assert_eq;
use spritepack_cli::pipeline::run_pipeline;
use spritepack_tests::{compute_hash, hash_tree, verify_determinism, SourceTreeFixture};

fn populated_fixture() -> SourceTreeFixture {
    let fixture = SourceTreeFixture::new();
    fixture.add_tile_sheet("chars/hero__4x2.png", 2, 4, 4, 2);
    fixture.add_frame_table("chars/hero.csv", &["walk;0;0;2;4;12;true", "idle;0;0;1;1;4;false"]);
    fixture.add_tile_sheet("fx/coin__6x6p1fps10loop.png", 4, 1, 7, 7);
    for (i, size) in [12u32, 30, 7, 18, 25].iter().enumerate() {
        fixture.add_png(
            &format!("props/p{}.png", i),
            *size,
            size + 3,
            [i as u8 * 40, 90, 200, 255],
        );
    }
    fixture
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let fixture = populated_fixture();
    let godot = fixture.out_dir.join("godot");
    let config = fixture.config().godot_dir(&godot);

    let first = run_pipeline(&config).unwrap();
    let first_tree = hash_tree(&fixture.out_dir);

    let second = run_pipeline(&config).unwrap();
    let second_tree = hash_tree(&fixture.out_dir);

    assert_eq!(first_tree, second_tree);
    assert_eq!(
        first.sheets.iter().map(|s| &s.hash).collect::<Vec<_>>(),
        second.sheets.iter().map(|s| &s.hash).collect::<Vec<_>>()
    );
    // atlas.png, atlas.json, hero.tres, coin.tres and five prop resources
    assert_eq!(first_tree.len(), 2 + 2 + 5);
}

#[test]
fn test_sheet_hash_matches_file() {
    let fixture = populated_fixture();
    let report = run_pipeline(&fixture.config()).unwrap();

    let data = std::fs::read(fixture.output("atlas.png")).unwrap();
    assert_eq!(report.sheets[0].hash, compute_hash(&data));
}

#[test]
fn test_sheet_bytes_are_stable() {
    let fixture = populated_fixture();
    let config = fixture.config();

    let result = verify_determinism(
        || {
            run_pipeline(&config).unwrap();
            std::fs::read(fixture.output("atlas.png")).unwrap()
        },
        3,
    );
    result.assert_deterministic();
}
