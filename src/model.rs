use std::collections::{BTreeMap, HashSet};

use crate::error::{VizError, VizResult};

/// A complete visualization document, as delivered by the generation service.
///
/// The document is read-only data owned by the caller. The playback controller
/// and the renderer only ever borrow it; unknown wire fields (producer flags,
/// interactive control lists) are ignored on deserialization.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VisualizationData {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub visualization_type: VisualizationType,
    #[serde(default)]
    pub components: Vec<VisualComponent>,
    #[serde(default)]
    pub steps: Vec<AnimationStep>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// One drawable primitive. Immutable for the lifetime of a document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VisualComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub properties: ComponentProps,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub connections: Vec<String>,
}

/// Typed view of a component's property bag. Fields the renderer does not
/// understand are preserved in `extra` for forward compatibility.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ComponentProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One frame of a scripted animation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationStep {
    /// Informational only; playback order is positional.
    #[serde(default)]
    pub step_number: u32,
    #[serde(default)]
    pub description: String,
    /// Declared pacing in seconds. Use [`AnimationStep::effective_duration_s`]
    /// for scheduling; the raw value may be non-positive on the wire.
    #[serde(default = "default_duration_s")]
    pub duration: f64,
    #[serde(default)]
    pub changes: Vec<PropertyChange>,
    #[serde(default)]
    pub highlight: Vec<String>,
}

/// Free-form property delta carried by a step. The reference renderer only
/// consumes `highlight`; richer renderers may apply these.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PropertyChange {
    #[serde(default)]
    pub component_id: String,
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub from: serde_json::Value,
    #[serde(default)]
    pub to: serde_json::Value,
}

fn default_duration_s() -> f64 {
    1.0
}

/// Minimum step pacing. A non-positive declared duration never produces a
/// zero or negative wait.
pub const MIN_STEP_DURATION_S: f64 = 1.0;

impl AnimationStep {
    pub fn effective_duration_s(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            MIN_STEP_DURATION_S
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisualizationType {
    Tree,
    Graph,
    Flowchart,
    Animation,
    Comparison,
    Timeline,
    Process,
    /// Any kind this crate does not recognize. Renders via the box-and-arrow
    /// strategy like the other non-graph kinds.
    Unknown,
}

impl VisualizationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Graph => "graph",
            Self::Flowchart => "flowchart",
            Self::Animation => "animation",
            Self::Comparison => "comparison",
            Self::Timeline => "timeline",
            Self::Process => "process",
            Self::Unknown => "unknown",
        }
    }

    /// The six declared kinds collapse onto two drawing strategies. The
    /// mapping is explicit here rather than scattered through the renderer.
    pub fn strategy(self) -> RenderStrategy {
        match self {
            Self::Tree | Self::Graph => RenderStrategy::NodeEdge,
            Self::Flowchart
            | Self::Animation
            | Self::Comparison
            | Self::Timeline
            | Self::Process
            | Self::Unknown => RenderStrategy::BoxArrow,
        }
    }
}

impl From<String> for VisualizationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "tree" => Self::Tree,
            "graph" => Self::Graph,
            "flowchart" => Self::Flowchart,
            "animation" => Self::Animation,
            "comparison" => Self::Comparison,
            "timeline" => Self::Timeline,
            "process" => Self::Process,
            _ => Self::Unknown,
        }
    }
}

impl From<VisualizationType> for String {
    fn from(t: VisualizationType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Node,
    Edge,
    Shape,
    Text,
    Arrow,
    Unknown,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Shape => "shape",
            Self::Text => "text",
            Self::Arrow => "arrow",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "node" => Self::Node,
            "edge" => Self::Edge,
            "shape" => Self::Shape,
            "text" => Self::Text,
            "arrow" => Self::Arrow,
            _ => Self::Unknown,
        }
    }
}

impl From<ComponentKind> for String {
    fn from(k: ComponentKind) -> Self {
        k.as_str().to_string()
    }
}

/// The renderer's two drawing algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Filled circles joined by plain lines (tree, graph).
    NodeEdge,
    /// Labelled rectangles joined by arrowed lines (everything else).
    BoxArrow,
}

impl VisualizationData {
    pub fn component(&self, id: &str) -> Option<&VisualComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Number of presentable steps. A document with no scripted steps still
    /// has one static view.
    pub fn step_count(&self) -> usize {
        self.steps.len().max(1)
    }

    /// Highlight set for a step. Out-of-range indices and stepless documents
    /// yield the empty set; unresolved ids are kept here and ignored at draw
    /// time.
    pub fn highlight_for(&self, step_index: usize) -> HashSet<&str> {
        self.steps
            .get(step_index)
            .map(|s| s.highlight.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.visualization_type.strategy()
    }

    /// Minimal defensive check: component ids must be non-empty and unique.
    /// Rendering does not require a validated document; the CLI validates on
    /// load so producer bugs surface early.
    pub fn validate(&self) -> VizResult<()> {
        let mut seen = HashSet::new();
        for c in &self.components {
            if c.id.trim().is_empty() {
                return Err(VizError::document("component id must be non-empty"));
            }
            if !seen.insert(c.id.as_str()) {
                return Err(VizError::document(format!(
                    "duplicate component id '{}'",
                    c.id
                )));
            }
        }
        Ok(())
    }
}
