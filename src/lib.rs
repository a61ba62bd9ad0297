#![forbid(unsafe_code)]

pub mod core;
pub mod error;
pub mod model;
pub mod playback;
pub mod render_cpu;
pub mod scene;
pub mod traversal;
pub mod tree;

pub use core::{Canvas, Rgba8};
pub use error::{VizError, VizResult};
pub use model::{
    AnimationStep, ComponentKind, ComponentProps, PropertyChange, RenderStrategy,
    VisualComponent, VisualizationData, VisualizationType,
};
pub use playback::{PlaybackController, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
pub use render_cpu::{CpuRenderer, DEFAULT_CANVAS, FrameRgba, RenderSettings};
pub use scene::{DrawOp, Scene, compile_scene, tree_scene};
pub use traversal::{TraversalKind, TreeEngine, traversal_order, traversal_script};
pub use tree::{NodeId, NodeState, TreeNode, TreePreset, TreeWorkspace};
