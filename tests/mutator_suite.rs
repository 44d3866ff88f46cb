use std::path::{Path, PathBuf};

use branching_rs_editor::{
    ContentNode, EditorError, NodeDefaults, PlaceRequest, SpecificDefaults, emit_content,
    parse_content, place, remove, replace, validate_graph,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Vec<ContentNode> {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    parse_content(&input).expect("fixture parse failed")
}

fn assert_invariants(content: &[ContentNode]) {
    validate_graph(content).expect("links out of bounds");
    // The entry point must stay unreferenced; loops back to it are authored
    // through alternatives in fixtures that want them, not created by the
    // mutator.
    for node in content {
        assert!(
            !node.link_values().contains(&0),
            "mutation created a link to the entry point"
        );
    }
}

fn titled(content: &[ContentNode], id: usize) -> &str {
    content[id].title.as_deref().unwrap_or("")
}

#[test]
fn fixtures_round_trip_through_the_wire_shape() {
    for name in [
        "single.json",
        "linear.json",
        "branching_basic.json",
        "converging.json",
        "loopback.json",
        "nested_branching.json",
    ] {
        let content = load_fixture(name);
        let emitted = emit_content(&content).expect("emit failed");
        let reparsed = parse_content(&emitted).expect("reparse failed");
        assert_eq!(content, reparsed, "{name}: wire round-trip changed content");
    }
}

#[test]
fn invariants_hold_across_an_editing_session() {
    let mut content = load_fixture("branching_basic.json");

    // Drop a new node onto the edge between the intro and the question.
    content = place(
        &content,
        &PlaceRequest {
            id: -1,
            next_content_id: 1,
            parent_id: Some(0),
            defaults: Some(NodeDefaults {
                specific: Some(SpecificDefaults {
                    content_title: Some("Detour".to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
    .expect("insert failed");
    assert_invariants(&content);
    assert_eq!(content.len(), 6);
    assert_eq!(content[0].link_values(), vec![5]);
    assert_eq!(titled(&content, 5), "Detour");
    assert_eq!(content[5].link_values(), vec![1]);

    // Delete the short route.
    content = remove(&content, 2, false).expect("remove failed");
    assert_invariants(&content);
    assert_eq!(content.len(), 5);

    // Promote the detour to the entry point.
    let detour = content
        .iter()
        .position(|node| node.title.as_deref() == Some("Detour"))
        .expect("detour vanished") as i32;
    content = place(
        &content,
        &PlaceRequest {
            id: detour,
            next_content_id: 0,
            ..Default::default()
        },
    )
    .expect("promotion failed");
    assert_invariants(&content);
    assert_eq!(titled(&content, 0), "Detour");
}

#[test]
fn insertion_then_deletion_restores_the_array() {
    let original = load_fixture("linear.json");
    let inserted = place(
        &original,
        &PlaceRequest {
            id: -1,
            next_content_id: 1,
            parent_id: Some(0),
            ..Default::default()
        },
    )
    .expect("insert failed");
    assert_eq!(inserted.len(), original.len() + 1);

    let restored = remove(&inserted, inserted.len() as i32 - 1, false).expect("remove failed");
    assert_eq!(restored, original);
}

#[test]
fn entry_point_promotion_moves_node_to_index_zero() {
    let content = load_fixture("linear.json");
    let promoted = place(
        &content,
        &PlaceRequest {
            id: 2,
            next_content_id: 0,
            ..Default::default()
        },
    )
    .expect("promotion failed");

    assert_eq!(titled(&promoted, 0), "Wrap up");
    // The previous top node becomes the promoted node's successor.
    assert_eq!(promoted[0].link_values(), vec![1]);
    assert_eq!(titled(&promoted, 1), "Opening video");
    assert_eq!(promoted[1].link_values(), vec![2]);
    // The node that pointed at the promoted one had no successor to adopt.
    assert_eq!(promoted[2].link_values(), vec![-1]);
    assert_invariants(&promoted);
}

#[test]
fn entry_point_demotion_swaps_with_its_replacement() {
    let content = load_fixture("linear.json");
    let demoted = place(
        &content,
        &PlaceRequest {
            id: 0,
            next_content_id: 1,
            ..Default::default()
        },
    )
    .expect("demotion failed");

    assert_eq!(titled(&demoted, 0), "Context");
    assert_eq!(demoted[0].link_values(), vec![1]);
    assert_eq!(titled(&demoted, 1), "Opening video");
    // The evicted entry point adopts its replacement's former successor.
    assert_eq!(demoted[1].link_values(), vec![2]);
    assert_eq!(titled(&demoted, 2), "Wrap up");
    assert_invariants(&demoted);
}

#[test]
fn cascading_delete_collapses_a_branching_subtree() {
    let content = load_fixture("branching_basic.json");
    let collapsed = remove(&content, 1, true).expect("remove failed");
    assert_eq!(collapsed.len(), 1);
    assert_eq!(titled(&collapsed, 0), "Intro");
    assert_eq!(collapsed[0].link_values(), vec![-1]);
}

#[test]
fn moving_a_node_resets_its_emptied_alternative() {
    let content = parse_content(
        r#"[
            { "type": { "library": "H5P.AdvancedText 1.1", "params": {} }, "nextContentId": 1, "contentTitle": "Intro" },
            { "type": { "library": "H5P.BranchingQuestion 1.0", "params": { "branchingQuestion": {
                "alternatives": [
                    { "nextContentId": 2, "text": "Only choice" },
                    { "nextContentId": -1, "text": "Give up" }
                ] } } } },
            { "type": { "library": "H5P.Image 1.1", "params": {} }, "nextContentId": -1, "contentTitle": "Moved" }
        ]"#,
    )
    .expect("parse failed");

    // Pull the image out of the alternative and park it in front of the
    // question instead.
    let moved = place(
        &content,
        &PlaceRequest {
            id: 2,
            next_content_id: 1,
            ..Default::default()
        },
    )
    .expect("move failed");

    assert_eq!(moved[0].link_values(), vec![2]);
    assert_eq!(moved[2].link_values(), vec![1]);
    // The alternative the image left behind falls back to the default end.
    assert_eq!(moved[1].link_values(), vec![-1, -1]);
    assert_invariants(&moved);
}

#[test]
fn inserting_into_an_alternative_attaches_the_parent_cell() {
    let content = parse_content(
        r#"[
            { "type": { "library": "H5P.AdvancedText 1.1", "params": {} }, "nextContentId": 1 },
            { "type": { "library": "H5P.BranchingQuestion 1.0", "params": { "branchingQuestion": {
                "alternatives": [
                    { "nextContentId": -1, "text": "A" },
                    { "nextContentId": -1, "text": "B" }
                ] } } } }
        ]"#,
    )
    .expect("parse failed");

    let grown = place(
        &content,
        &PlaceRequest {
            id: -1,
            next_content_id: -1,
            parent_id: Some(1),
            alternative_index: Some(1),
            defaults: Some(NodeDefaults {
                specific: Some(SpecificDefaults {
                    content_title: Some("Branch B content".to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
    .expect("insert failed");

    assert_eq!(grown[1].link_values(), vec![-1, 2]);
    assert_eq!(titled(&grown, 2), "Branch B content");
    assert_invariants(&grown);
}

#[test]
fn cascade_ignores_external_referrers_of_forward_children() {
    // The cascade does not recompute reachability: a forward node owned by
    // the removed subtree is deleted even when an unrelated node still
    // points at it, and that reference falls back to the default end.
    let content = parse_content(
        r#"[
            { "type": { "library": "H5P.AdvancedText 1.1", "params": {} }, "nextContentId": 1, "contentTitle": "Intro" },
            { "type": { "library": "H5P.BranchingQuestion 1.0", "params": { "branchingQuestion": {
                "alternatives": [ { "nextContentId": 2, "text": "Onward" }, { "nextContentId": -1, "text": "Stop" } ] } } } },
            { "type": { "library": "H5P.Video 1.6", "params": {} }, "nextContentId": 4, "contentTitle": "Bridge" },
            { "type": { "library": "H5P.AdvancedText 1.1", "params": {} }, "nextContentId": 4, "contentTitle": "Elsewhere" },
            { "type": { "library": "H5P.Image 1.1", "params": {} }, "nextContentId": -1, "contentTitle": "Shared finale" }
        ]"#,
    )
    .expect("parse failed");

    let pruned = remove(&content, 1, true).expect("remove failed");
    assert_eq!(pruned.len(), 2);
    assert_eq!(titled(&pruned, 0), "Intro");
    assert_eq!(pruned[0].link_values(), vec![-1]);
    // "Elsewhere" survives, but the shared finale it pointed at is gone.
    assert_eq!(titled(&pruned, 1), "Elsewhere");
    assert_eq!(pruned[1].link_values(), vec![-1]);
}

#[test]
fn deleting_a_loop_tail_does_not_relink_into_the_cycle() {
    let content = load_fixture("loopback.json");
    let trimmed = remove(&content, 3, false).expect("remove failed");
    assert_eq!(trimmed.len(), 3);
    // The loop body's dangling link falls back to the default end instead
    // of jumping backward to the loop head.
    assert_eq!(trimmed[2].link_values(), vec![-1]);
    assert_invariants(&trimmed);
}

#[test]
fn replace_keeps_position_and_link() {
    let content = load_fixture("linear.json");
    let swapped = replace(
        &content,
        1,
        Some(&NodeDefaults {
            library: Some("H5P.Image 1.1".to_string()),
            specific: Some(SpecificDefaults {
                content_title: Some("A picture instead".to_string()),
            }),
            ..Default::default()
        }),
    )
    .expect("replace failed");

    assert_eq!(swapped.len(), content.len());
    assert_eq!(titled(&swapped, 1), "A picture instead");
    assert_eq!(swapped[1].library, "H5P.Image 1.1");
    assert_eq!(swapped[1].link_values(), vec![2]);
    // Neighbours untouched.
    assert_eq!(swapped[0], content[0]);
    assert_eq!(swapped[2], content[2]);
}

#[test]
fn replace_refuses_branching_targets() {
    let content = load_fixture("branching_basic.json");
    let err = replace(&content, 1, None).unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedPlacement(_)));
}

#[test]
fn place_defends_against_mismatched_parents() {
    let content = load_fixture("branching_basic.json");

    // Branching parent without an alternative index.
    let err = place(
        &content,
        &PlaceRequest {
            id: -1,
            next_content_id: -1,
            parent_id: Some(1),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedPlacement(_)));

    // Simple parent with an alternative index.
    let err = place(
        &content,
        &PlaceRequest {
            id: -1,
            next_content_id: -1,
            parent_id: Some(0),
            alternative_index: Some(0),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, EditorError::UnsupportedPlacement(_)));

    // Out-of-bounds successor.
    let err = place(
        &content,
        &PlaceRequest {
            id: -1,
            next_content_id: 42,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, EditorError::InvalidGraph(_)));
}
