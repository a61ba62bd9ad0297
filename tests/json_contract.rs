//! The inbound document contract: whatever the generation service emits must
//! load, degrade gracefully, and stay round-trippable.

use vizplay::{ComponentKind, VisualizationData, VisualizationType};

fn producer_payload() -> &'static str {
    r##"{
        "success": true,
        "topic": "Merge Sort",
        "title": "Merge Sort, Step by Step",
        "description": "Divide, sort, and merge.",
        "visualization_type": "flowchart",
        "components": [
            {
                "id": "split",
                "type": "shape",
                "properties": {"x": 200, "y": 100, "width": 140, "height": 60,
                               "color": "#8b5cf6", "label": "Split the array"},
                "content": "Split the array into halves",
                "connections": ["sort-left", "sort-right"]
            },
            {
                "id": "sort-left",
                "type": "shape",
                "properties": {"x": 100, "y": 260}
            },
            {
                "id": "sort-right",
                "type": "shape",
                "properties": {"x": 300, "y": 260},
                "connections": ["merge"]
            },
            {
                "id": "merge",
                "type": "hexagon",
                "properties": {"label": "Merge"}
            }
        ],
        "steps": [
            {"step_number": 1, "description": "split", "duration": 2.0,
             "changes": [{"component_id": "split", "property": "color",
                          "from": "#8b5cf6", "to": "#f59e0b"}],
             "highlight": ["split"]},
            {"step_number": 2, "description": "recurse", "duration": 0,
             "highlight": ["sort-left", "sort-right", "not-a-component"]}
        ],
        "interactive_elements": [
            {"id": "btn", "type": "button", "label": "Replay", "action": "reset"}
        ],
        "metadata": {
            "difficulty": "intermediate",
            "category": "algorithms",
            "estimated_time": "5 minutes",
            "key_concepts": ["divide and conquer", "recursion"]
        }
    }"##
}

#[test]
fn producer_payload_loads_and_validates() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    assert!(doc.validate().is_ok());
    assert_eq!(doc.visualization_type, VisualizationType::Flowchart);
    assert_eq!(doc.components.len(), 4);
    assert_eq!(doc.steps.len(), 2);
    assert_eq!(doc.metadata.len(), 4);
}

#[test]
fn unknown_component_kind_is_tolerated() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    assert_eq!(doc.component("merge").unwrap().kind, ComponentKind::Unknown);
}

#[test]
fn changes_are_carried_verbatim() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    let change = &doc.steps[0].changes[0];
    assert_eq!(change.component_id, "split");
    assert_eq!(change.property, "color");
    assert_eq!(change.to, serde_json::json!("#f59e0b"));
}

#[test]
fn zero_duration_step_gets_a_floor() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    assert_eq!(doc.steps[1].duration, 0.0);
    assert_eq!(doc.steps[1].effective_duration_s(), 1.0);
}

#[test]
fn highlight_may_reference_missing_components() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    let hl = doc.highlight_for(1);
    assert!(hl.contains("not-a-component"));
    // Resolution happens (and fails silently) at draw time, not here.
    assert!(doc.component("not-a-component").is_none());
}

#[test]
fn document_round_trips_through_json() {
    let doc: VisualizationData = serde_json::from_str(producer_payload()).unwrap();
    let s = serde_json::to_string(&doc).unwrap();
    let back: VisualizationData = serde_json::from_str(&s).unwrap();
    assert_eq!(back.components.len(), doc.components.len());
    assert_eq!(back.visualization_type, doc.visualization_type);
    // The open extension bag survives the trip.
    assert_eq!(
        back.component("split").unwrap().properties.color.as_deref(),
        Some("#8b5cf6")
    );
}
