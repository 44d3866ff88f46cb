use crate::error::EditorError;
use crate::ir::{
    Alternative, ContentNode, DEFAULT_END_SCENARIO, NodeKind, is_end_scenario, link_value,
};
use crate::parser::{is_branching_library, validate_graph};
use serde::Deserialize;
use serde_json::Value;

/// Library used for freshly inserted nodes when the request carries none.
pub const DEFAULT_LIBRARY: &str = "H5P.AdvancedText 1.1";

/// Author intent for inserting or moving a node, as delivered by the editor
/// shell.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRequest {
    /// Existing node id, or `-1` to insert a new node.
    pub id: i32,
    /// The placed node's new successor; `0` promotes it to the entry point.
    pub next_content_id: i32,
    /// Node whose designated link-cell should attach to the placed node.
    #[serde(default)]
    pub parent_id: Option<i32>,
    /// Which alternative of a branching parent receives the attachment.
    #[serde(default)]
    pub alternative_index: Option<usize>,
    #[serde(default)]
    pub defaults: Option<NodeDefaults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefaults {
    #[serde(default)]
    pub library: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub specific: Option<SpecificDefaults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificDefaults {
    #[serde(default)]
    pub content_title: Option<String>,
}

fn fresh_node(defaults: Option<&NodeDefaults>) -> ContentNode {
    let library = defaults
        .and_then(|d| d.library.as_deref())
        .unwrap_or(DEFAULT_LIBRARY);
    let params = defaults
        .and_then(|d| d.params.clone())
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    let title = defaults
        .and_then(|d| d.specific.as_ref())
        .and_then(|s| s.content_title.clone());
    let mut node = ContentNode::new_simple(library, params, title);
    if is_branching_library(library) {
        node.kind = NodeKind::Branching {
            alternatives: vec![Alternative::end_scenario()],
        };
    }
    node
}

/// Insert or move a node. Returns the mutated array; the input snapshot is
/// left untouched. After `place` returns, all link invariants hold.
pub fn place(
    content: &[ContentNode],
    request: &PlaceRequest,
) -> Result<Vec<ContentNode>, EditorError> {
    validate_graph(content)?;
    let mut content = content.to_vec();

    let id = if request.id == -1 {
        content.push(fresh_node(request.defaults.as_ref()));
        content.len() - 1
    } else {
        check_node_id(&content, request.id, "placed node")?
    };

    // The very first node needs no wiring; it is the entry point already.
    if content.len() == 1 {
        return Ok(content);
    }

    let next = request.next_content_id;
    if !is_end_scenario(next) && next as usize >= content.len() {
        return Err(EditorError::invalid(format!(
            "successor {next} is out of bounds for {} nodes",
            content.len()
        )));
    }
    if next == id as i32 {
        return Err(EditorError::unsupported(
            "a node cannot become its own successor",
        ));
    }
    if request.parent_id == Some(id as i32) {
        return Err(EditorError::unsupported("a node cannot attach to itself"));
    }
    check_parent(&content, request)?;

    if id == 0 && next == 0 {
        return Ok(content);
    }
    if id == 0 && is_end_scenario(next) {
        return Err(EditorError::unsupported(
            "the entry point needs a successor to hand position 0 to",
        ));
    }

    if next == 0 {
        promote_to_entry(&mut content, id);
    } else if id == 0 {
        demote_entry(&mut content, next as usize);
    } else {
        step_into(&mut content, id, next);
        attach_parent(&mut content, id, request);
    }

    debug_assert!(validate_graph(&content).is_ok());
    Ok(content)
}

/// Overwrite the node at `id` with a fresh default node, preserving the
/// original outbound link. A targeted overwrite, so no renumbering happens.
pub fn replace(
    content: &[ContentNode],
    id: i32,
    defaults: Option<&NodeDefaults>,
) -> Result<Vec<ContentNode>, EditorError> {
    validate_graph(content)?;
    let id = check_node_id(content, id, "replaced node")?;
    if content[id].is_branching() {
        return Err(EditorError::unsupported(
            "content cannot be dropped onto a branching question",
        ));
    }

    let mut content = content.to_vec();
    let preserved = match &content[id].kind {
        NodeKind::Simple { next_content_id } => *next_content_id,
        NodeKind::Branching { .. } => unreachable!(),
    };
    let mut node = fresh_node(defaults);
    match &mut node.kind {
        NodeKind::Simple { next_content_id } => *next_content_id = preserved,
        NodeKind::Branching { .. } => {
            return Err(EditorError::unsupported(
                "a branching question cannot replace content in place",
            ));
        }
    }
    content[id] = node;
    Ok(content)
}

/// Normal case: the placed node steps out of its old spot and in front of
/// `next`, with a single scan over every link-cell.
fn step_into(content: &mut [ContentNode], id: usize, next: i32) {
    let old_successor = {
        let successor = content[id].successor();
        // A self-link has no adoptable successor.
        if successor == id as i32 {
            DEFAULT_END_SCENARIO
        } else {
            successor
        }
    };

    for (node_id, node) in content.iter_mut().enumerate() {
        if node_id == id {
            continue;
        }
        for cell in node.link_cells_mut() {
            let value = link_value(cell);
            if value == id as i32 {
                // The node steps out: whoever pointed at it adopts its old
                // successor. An alternative left without descendants falls
                // back to the default end this way.
                *cell = Some(old_successor);
            } else if value == next && next != 0 {
                // The node steps in front of its new successor.
                *cell = Some(id as i32);
            }
        }
    }

    match &mut content[id].kind {
        NodeKind::Simple { next_content_id } => *next_content_id = Some(next),
        NodeKind::Branching { alternatives } => {
            // Only a real edge target is adopted; a plain re-attach must not
            // clobber an authored alternative link.
            if !is_end_scenario(next) {
                if alternatives.is_empty() {
                    alternatives.push(Alternative::end_scenario());
                }
                alternatives[0].next_content_id = Some(next);
            }
        }
    }
}

/// `next_content_id == 0`: the placed node becomes the new entry point. It
/// moves to index 0, links below its old position renumber by +1, inbound
/// links adopt its old successor, and the previous top node becomes its
/// single child.
fn promote_to_entry(content: &mut Vec<ContentNode>, id: usize) {
    let old_successor = {
        let successor = content[id].successor();
        if successor == id as i32 {
            DEFAULT_END_SCENARIO
        } else {
            successor
        }
    };

    let moved = content.remove(id);
    content.insert(0, moved);

    for node in content.iter_mut() {
        for cell in node.link_cells_mut() {
            let value = link_value(cell);
            if is_end_scenario(value) {
                continue;
            }
            let value = value as usize;
            if value == id {
                *cell = Some(shift_after_front_insert(old_successor, id));
            } else if value < id {
                *cell = Some(value as i32 + 1);
            }
        }
    }

    // The previous top node sits at index 1 now.
    content[0].set_successor(1);
}

/// `id == 0`: the entry point moves elsewhere. The node at `target` takes
/// over index 0, the evicted top node becomes its child and adopts its
/// former successor.
fn demote_entry(content: &mut Vec<ContentNode>, target: usize) {
    let replacement_successor = {
        let successor = content[target].successor();
        if successor == target as i32 {
            DEFAULT_END_SCENARIO
        } else {
            successor
        }
    };

    let moved = content.remove(target);
    content.insert(0, moved);

    for node in content.iter_mut() {
        for cell in node.link_cells_mut() {
            let value = link_value(cell);
            if is_end_scenario(value) {
                continue;
            }
            let value = value as usize;
            if value == target {
                // The evicted top node takes the replacement's old place in
                // every chain that pointed there.
                *cell = Some(1);
            } else if value < target {
                *cell = Some(value as i32 + 1);
            }
        }
    }

    content[0].set_successor(1);
    let adopted = shift_after_front_insert(replacement_successor, target);
    // The replacement's old successor now hangs off the evicted node; a
    // link resolving to the evicted node itself would be a self-loop.
    let adopted = if adopted == 1 { DEFAULT_END_SCENARIO } else { adopted };
    content[1].set_successor(adopted);
}

/// Renumber a link value after `remove(index)` + `insert(0)`: everything
/// below the removed index shifts up by one.
fn shift_after_front_insert(value: i32, removed_index: usize) -> i32 {
    if is_end_scenario(value) {
        return value;
    }
    if (value as usize) < removed_index {
        value + 1
    } else {
        value
    }
}

fn attach_parent(content: &mut [ContentNode], id: usize, request: &PlaceRequest) {
    let Some(parent_id) = request.parent_id else {
        return;
    };
    let parent = &mut content[parent_id as usize];
    match (&mut parent.kind, request.alternative_index) {
        (NodeKind::Simple { next_content_id }, None) => {
            *next_content_id = Some(id as i32);
        }
        (NodeKind::Branching { alternatives }, Some(index)) => {
            alternatives[index].next_content_id = Some(id as i32);
        }
        // Mismatches are rejected by check_parent before any mutation.
        _ => unreachable!(),
    }
}

fn check_parent(content: &[ContentNode], request: &PlaceRequest) -> Result<(), EditorError> {
    let Some(parent_id) = request.parent_id else {
        return Ok(());
    };
    let parent_id = check_node_id(content, parent_id, "parent")?;
    let parent = &content[parent_id];
    match (&parent.kind, request.alternative_index) {
        (NodeKind::Simple { .. }, None) => Ok(()),
        (NodeKind::Simple { .. }, Some(_)) => Err(EditorError::unsupported(
            "content cannot attach to an alternative of a simple node",
        )),
        (NodeKind::Branching { .. }, None) => Err(EditorError::unsupported(
            "attaching to a branching question requires an alternative index",
        )),
        (NodeKind::Branching { alternatives }, Some(index)) => {
            if index >= alternatives.len() {
                Err(EditorError::invalid(format!(
                    "alternative {index} does not exist on node {parent_id}"
                )))
            } else {
                Ok(())
            }
        }
    }
}

fn check_node_id(content: &[ContentNode], id: i32, what: &str) -> Result<usize, EditorError> {
    if id < 0 || id as usize >= content.len() {
        return Err(EditorError::invalid(format!(
            "{what} id {id} is out of bounds for {} nodes",
            content.len()
        )));
    }
    Ok(id as usize)
}
