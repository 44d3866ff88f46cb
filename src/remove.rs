use crate::error::EditorError;
use crate::ir::{ContentNode, DEFAULT_END_SCENARIO, NodeKind, is_end_scenario, link_value};
use crate::parser::validate_graph;

/// Remove the node at `start_id`. A branching node always takes its
/// alternatives' direct targets with it; `cascade_children` controls whether
/// the removal keeps walking into their descendants.
pub fn remove(
    content: &[ContentNode],
    start_id: i32,
    cascade_children: bool,
) -> Result<Vec<ContentNode>, EditorError> {
    validate_graph(content)?;
    if start_id < 0 || start_id as usize >= content.len() {
        return Err(EditorError::invalid(format!(
            "node {start_id} is out of bounds for {} nodes",
            content.len()
        )));
    }
    let mut content = content.to_vec();
    remove_step(&mut content, start_id as usize, cascade_children);
    debug_assert!(validate_graph(&content).is_ok());
    Ok(content)
}

/// Caller-level delete policy: branching questions cascade, simple nodes go
/// alone.
pub fn delete(content: &[ContentNode], id: i32) -> Result<Vec<ContentNode>, EditorError> {
    let cascade = id >= 0
        && (id as usize) < content.len()
        && content[id as usize].is_branching();
    remove(content, id, cascade)
}

/// One removal step: the node itself plus, for a branching node, every
/// alternative target. Processed in descending id order so earlier splices
/// don't invalidate later indices mid-pass.
fn remove_step(content: &mut Vec<ContentNode>, id: usize, cascade: bool) {
    if id >= content.len() {
        return;
    }

    let mut doomed = vec![id];
    if let NodeKind::Branching { alternatives } = &content[id].kind {
        doomed.extend(
            alternatives
                .iter()
                .map(|alternative| link_value(&alternative.next_content_id))
                .filter(|value| !is_end_scenario(*value))
                .map(|value| value as usize),
        );
    }
    doomed.sort_unstable();
    doomed.dedup();
    doomed.reverse();

    for delete_id in doomed {
        if delete_id >= content.len() {
            continue;
        }
        delete_single(content, delete_id, cascade);
    }
}

fn delete_single(content: &mut Vec<ContentNode>, delete_id: usize, cascade: bool) {
    // Former children, captured before any links change.
    let children = content[delete_id].child_ids();
    let successor = resolve_successor(content, delete_id);

    // Whoever pointed at the node adopts its successor.
    for node in content.iter_mut() {
        for cell in node.link_cells_mut() {
            if link_value(cell) == delete_id as i32 {
                *cell = Some(successor);
            }
        }
    }
    // Compensate in advance for the impending splice.
    for node in content.iter_mut() {
        for cell in node.link_cells_mut() {
            let value = link_value(cell);
            if !is_end_scenario(value) && value >= delete_id as i32 {
                *cell = Some(value - 1);
            }
        }
    }
    content.remove(delete_id);

    if !cascade {
        return;
    }
    // Only descendants past the hole are owned by this node; backward and
    // loop targets may still carry another live path. Reachability is not
    // recomputed here.
    let mut former: Vec<usize> = children
        .into_iter()
        .filter(|&child| child > delete_id)
        .collect();
    former.sort_unstable();
    former.dedup();
    former.reverse();
    for child in former {
        remove_step(content, child - 1, cascade);
    }
}

/// Successor adopted by inbound links of a removed node. The node's own link
/// value, except that a backward target which already has another referrer
/// is never adopted (that would re-link into a cycle), and a self-loop has
/// nothing to adopt.
fn resolve_successor(content: &[ContentNode], delete_id: usize) -> i32 {
    let successor = content[delete_id].successor();
    if is_end_scenario(successor) {
        return successor;
    }
    if successor as usize == delete_id {
        return DEFAULT_END_SCENARIO;
    }
    if (successor as usize) > delete_id {
        return successor;
    }
    let referenced_elsewhere = content.iter().enumerate().any(|(id, node)| {
        id != delete_id && node.link_values().contains(&successor)
    });
    if referenced_elsewhere {
        DEFAULT_END_SCENARIO
    } else {
        successor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Alternative;
    use serde_json::Value;

    fn simple(next: i32) -> ContentNode {
        let mut node = ContentNode::new_simple("H5P.AdvancedText 1.1", Value::Null, None);
        node.set_successor(next);
        node
    }

    fn branching(targets: &[i32]) -> ContentNode {
        let mut node = ContentNode::new_simple("H5P.BranchingQuestion 1.0", Value::Null, None);
        node.kind = NodeKind::Branching {
            alternatives: targets
                .iter()
                .map(|&target| Alternative {
                    next_content_id: Some(target),
                    extras: serde_json::Map::new(),
                })
                .collect(),
        };
        node
    }

    #[test]
    fn removes_branching_with_end_scenario_alternatives() {
        // [Simple{next:1}, Branching{alts:[-1,-1]}] -> [Simple{next:-1}]
        let base = vec![simple(1), branching(&[-1, -1])];
        let content = remove(&base, 1, true).expect("remove failed");
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].link_values(), vec![-1]);
    }

    #[test]
    fn chain_delete_adopts_forward_successor() {
        // 0 -> 1 -> 2; deleting 1 re-links 0 -> 1 (old 2).
        let base = vec![simple(1), simple(2), simple(-1)];
        let content = remove(&base, 1, false).expect("remove failed");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].link_values(), vec![1]);
        assert_eq!(content[1].link_values(), vec![-1]);
    }

    #[test]
    fn backward_successor_with_other_referrer_falls_back_to_end() {
        // 0 -> 1 -> 2 -> 3 -> 1 (loop tail). Deleting 3 must not re-link
        // node 2 backward into the loop head.
        let base = vec![simple(1), simple(2), simple(3), simple(1)];
        let content = remove(&base, 3, false).expect("remove failed");
        assert_eq!(content.len(), 3);
        assert_eq!(content[2].link_values(), vec![-1]);
    }

    #[test]
    fn self_loop_delete_terminates() {
        let base = vec![simple(1), simple(1)];
        let content = remove(&base, 1, true).expect("remove failed");
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].link_values(), vec![-1]);
    }

    #[test]
    fn out_of_bounds_is_invalid() {
        let base = vec![simple(-1)];
        assert!(matches!(
            remove(&base, 4, false),
            Err(EditorError::InvalidGraph(_))
        ));
    }

    #[test]
    fn delete_policy_cascades_only_for_branching() {
        // Deleting a simple node leaves its successor chain alone.
        let chain = vec![simple(1), simple(2), simple(-1)];
        let content = delete(&chain, 1).expect("delete failed");
        assert_eq!(content.len(), 2);

        // Deleting a branching question takes its subtree along.
        let base = vec![simple(1), branching(&[2]), simple(3), simple(-1)];
        let content = delete(&base, 1).expect("delete failed");
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].link_values(), vec![-1]);
    }
}
