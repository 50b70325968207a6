//! Tests run in a wasm32 runtime with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use fur_viewer::mesh::SourceMesh;
use fur_viewer::strands::{ColorMode, StrandGenerator, StrandParams};
use fur_viewer::{FurConfig, FurScene, FurWarning};

fn body() -> SourceMesh {
    SourceMesh::new(
        "body",
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        Some(vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]),
        None,
    )
    .unwrap()
}

#[wasm_bindgen_test]
fn straight_strand_in_wasm() {
    let mesh = SourceMesh::new("dot", vec![0.0; 3], Some(vec![0.0, 1.0, 0.0]), None).unwrap();
    let params = StrandParams {
        segment_count: 2,
        strand_length: 0.1,
        gravity_bias: 0.0,
        ..Default::default()
    };
    let buffer = StrandGenerator::new(params, ColorMode::Normal)
        .generate(&mesh)
        .unwrap()
        .buffer;

    let expected = [0.0, 0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.1, 0.0, 0.0, 0.2, 0.0];
    for (got, want) in buffer.positions().iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-6);
    }
}

#[wasm_bindgen_test]
fn scene_lifecycle_in_wasm() {
    let mut scene = FurScene::new(FurConfig::from_yaml("shader: plain").unwrap());
    scene.begin_asset("environment").unwrap();
    scene.add_mesh(body()).unwrap();
    scene.report_progress("environment", 1.0, 2.0);
    scene.finish_model().unwrap();
    assert!(scene.finish_asset("environment").unwrap());

    assert!(scene.advance(1.0 / 60.0));
    assert_eq!(scene.fur().unwrap().buffer.total_segments(), 10);
}

#[wasm_bindgen_test]
fn missing_normals_in_wasm() {
    let mut scene = FurScene::new(FurConfig::default());
    scene
        .add_mesh(SourceMesh::new("bare", vec![0.0; 3], None, None).unwrap())
        .unwrap();
    scene.finish_model().unwrap();

    assert_eq!(scene.warnings(), &[FurWarning::NoEligibleMesh]);
    assert!(scene.advance(0.016));
}
