//! The interactive tree engine end to end: build, animate, render.

use vizplay::{
    Canvas, CpuRenderer, DrawOp, RenderSettings, TraversalKind, TreeEngine, TreePreset,
    TreeWorkspace, NodeState, traversal_order, tree_scene,
};

#[test]
fn insertions_keep_the_structure_a_bst() {
    let mut tree = TreeWorkspace::new();
    for v in [45, 25, 65, 15, 35, 55, 75] {
        tree.insert(v);
        assert!(tree.is_valid_bst());
    }
    assert_eq!(
        traversal_order(&tree, TraversalKind::Inorder),
        vec![15, 25, 35, 45, 55, 65, 75]
    );
}

#[test]
fn adversarial_orders_still_satisfy_the_invariant() {
    for values in [
        vec![1, 2, 3, 4, 5, 6, 7],
        vec![7, 6, 5, 4, 3, 2, 1],
        vec![4, 4, 4, 4],
        vec![0, 99, 1, 98, 2, 97],
    ] {
        let mut tree = TreeWorkspace::new();
        for v in &values {
            tree.insert(*v);
        }
        assert!(tree.is_valid_bst(), "order {values:?}");
        let inorder = traversal_order(&tree, TraversalKind::Inorder);
        assert!(inorder.windows(2).all(|w| w[0] <= w[1]), "order {values:?}");
    }
}

#[test]
fn traversal_animates_states_through_to_completion() {
    let mut engine = TreeEngine::new();
    engine.load(TreePreset::Lecture);
    engine.start(TraversalKind::Preorder, 0.0);

    // Mid-run: exactly the emitted prefix is published.
    engine.tick(600.0);
    assert_eq!(engine.output(), &[45]);
    assert!(engine.is_running());

    engine.tick(7_000.0);
    assert!(!engine.is_running());
    assert_eq!(engine.output(), &[45, 25, 15, 35, 65, 55, 75]);
    assert!(
        engine
            .tree()
            .nodes()
            .all(|n| n.state == NodeState::Visited)
    );
}

#[test]
fn new_traversal_resets_states_and_output() {
    let mut engine = TreeEngine::new();
    engine.load(TreePreset::Balanced);
    engine.start(TraversalKind::Inorder, 0.0);
    engine.tick(10_000.0);
    assert!(!engine.is_running());
    assert!(!engine.output().is_empty());

    engine.start(TraversalKind::LevelOrder, 10_000.0);
    // The previous run's output is gone; states were reset before the
    // level-order front-load marked the root.
    let visiting = engine
        .tree()
        .nodes()
        .filter(|n| n.state == NodeState::Visiting)
        .count();
    assert_eq!(visiting, 1);
    assert!(engine.output().is_empty());
}

#[test]
fn tree_scene_reflects_traversal_state_in_fill_colors() {
    let mut engine = TreeEngine::new();
    engine.load(TreePreset::Balanced);
    engine.start(TraversalKind::LevelOrder, 0.0);
    engine.tick(600.0); // root emitted, children front-loaded as visiting

    let scene = tree_scene(engine.tree(), 1.0);
    let fill_colors: Vec<_> = scene
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Fill { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(fill_colors.len(), 7);
    assert!(fill_colors.contains(&vizplay::scene::VISITED_FILL));
    assert!(fill_colors.contains(&vizplay::scene::VISITING_FILL));
    assert!(fill_colors.contains(&vizplay::scene::NODE_FILL));
}

#[test]
fn tree_renders_to_a_frame() {
    let mut engine = TreeEngine::new();
    engine.load(TreePreset::Balanced);

    let mut renderer = CpuRenderer::new(RenderSettings {
        clear_rgba: Some([15, 23, 42, 255]),
    });
    let frame = renderer
        .render_tree(
            engine.tree(),
            1.0,
            Canvas {
                width: 800,
                height: 500,
            },
        )
        .unwrap();
    assert_eq!(frame.data.len(), 800 * 500 * 4);
}

#[test]
fn empty_tree_renders_and_traverses_trivially() {
    let mut engine = TreeEngine::new();
    assert!(engine.start(TraversalKind::Inorder, 0.0));
    assert!(!engine.is_running());
    assert!(engine.output().is_empty());

    let mut renderer = CpuRenderer::new(RenderSettings::default());
    assert!(
        renderer
            .render_tree(
                engine.tree(),
                1.0,
                Canvas {
                    width: 64,
                    height: 64
                }
            )
            .is_ok()
    );
}
