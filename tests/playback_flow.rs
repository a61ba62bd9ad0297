//! Transport driving the scene compiler, the way a host UI would wire it.

use vizplay::{PlaybackController, VisualizationData, compile_scene};

fn scripted_doc() -> VisualizationData {
    serde_json::from_str(
        r#"{
            "visualization_type": "tree",
            "components": [
                {"id": "a", "type": "node", "properties": {"x": 100, "y": 100},
                 "connections": ["b"]},
                {"id": "b", "type": "node", "properties": {"x": 200, "y": 200}}
            ],
            "steps": [
                {"description": "first", "duration": 1.0, "highlight": ["a"]},
                {"description": "second", "duration": 1.0, "highlight": ["b"]},
                {"description": "third", "duration": 1.0, "highlight": []}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn autoplay_walks_every_step_once() {
    let doc = scripted_doc();
    let mut c = PlaybackController::for_document(&doc);
    c.play(0.0);

    let mut seen = vec![c.step_index()];
    let mut now = 0.0;
    while c.is_playing() {
        now += 100.0;
        if c.tick(now) {
            seen.push(c.step_index());
        }
        assert!(now < 60_000.0, "autoplay failed to halt");
    }
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(c.step_index(), c.step_count() - 1);
}

#[test]
fn each_step_compiles_with_its_own_highlights() {
    let doc = scripted_doc();
    let mut c = PlaybackController::for_document(&doc);

    // The compiled scene is a pure function of (document, index, zoom); the
    // controller only supplies the index.
    let s0 = compile_scene(&doc, c.step_index(), c.zoom());
    c.step_forward();
    let s1 = compile_scene(&doc, c.step_index(), c.zoom());
    assert_eq!(s0.ops.len(), s1.ops.len());

    c.step_forward();
    let s2 = compile_scene(&doc, c.step_index(), c.zoom());
    assert_eq!(s2.transform, s0.transform);
}

#[test]
fn zoom_from_controller_shapes_the_scene_transform() {
    let doc = scripted_doc();
    let mut c = PlaybackController::for_document(&doc);
    for _ in 0..3 {
        c.zoom_in();
    }
    assert!((c.zoom() - 1.6).abs() < 1e-9);
    let scene = compile_scene(&doc, c.step_index(), c.zoom());
    assert_eq!(scene.transform.as_coeffs()[0], c.zoom());
}

#[test]
fn pause_before_deadline_prevents_the_advance() {
    let doc = scripted_doc();
    let mut c = PlaybackController::for_document(&doc);
    c.play(0.0);
    c.pause();
    assert!(!c.tick(5_000.0));
    assert_eq!(c.step_index(), 0);
}

#[test]
fn document_swap_mid_play_invalidates_the_timer() {
    let doc = scripted_doc();
    let mut c = PlaybackController::for_document(&doc);
    c.play(0.0);

    let other: VisualizationData = serde_json::from_str(
        r#"{"visualization_type": "graph",
            "steps": [{"description": "only", "duration": 9.0}]}"#,
    )
    .unwrap();
    c.set_document(&other);

    // The old 1 s deadline must not advance the new document.
    assert!(!c.tick(1_000.0));
    assert_eq!(c.step_index(), 0);
    assert!(!c.is_playing());
}
