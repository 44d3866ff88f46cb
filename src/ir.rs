use serde_json::Value;

/// `nextContentId` value meaning "no further content, use the generic ending".
pub const DEFAULT_END_SCENARIO: i32 = -1;

/// Machine name of the branching-question library.
pub const BRANCHING_QUESTION: &str = "H5P.BranchingQuestion";

/// One entry of the content array. The node's id is its current array index;
/// ids are positional, not stable identities.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    /// Versioned library string, e.g. `"H5P.CoursePresentation 1.25"`.
    pub library: String,
    pub title: Option<String>,
    pub sub_content_id: String,
    /// Authored body, kept opaque. For branching nodes this excludes the
    /// `branchingQuestion` wrapper, which lives in `kind`.
    pub params: Value,
    pub kind: NodeKind,
    /// Unknown top-level wire fields, round-tripped untouched.
    pub extras: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Simple {
        /// `None` is the transient unset state on freshly created nodes.
        next_content_id: Option<i32>,
    },
    Branching {
        alternatives: Vec<Alternative>,
    },
}

/// One outbound choice of a branching node, with its own link and authored
/// feedback fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub next_content_id: Option<i32>,
    pub extras: serde_json::Map<String, Value>,
}

impl Alternative {
    pub fn end_scenario() -> Self {
        Self {
            next_content_id: Some(DEFAULT_END_SCENARIO),
            extras: serde_json::Map::new(),
        }
    }
}

/// Normalize a link cell: the unset state counts as the default end scenario
/// wherever link integrity matters.
pub fn link_value(cell: &Option<i32>) -> i32 {
    cell.unwrap_or(DEFAULT_END_SCENARIO)
}

/// End scenarios (`-1` default, `< -1` custom) never address a node.
pub fn is_end_scenario(value: i32) -> bool {
    value < 0
}

impl ContentNode {
    pub fn new_simple(library: &str, params: Value, title: Option<String>) -> Self {
        Self {
            library: library.to_string(),
            title,
            sub_content_id: String::new(),
            params,
            kind: NodeKind::Simple {
                next_content_id: None,
            },
            extras: serde_json::Map::new(),
        }
    }

    pub fn is_branching(&self) -> bool {
        matches!(self.kind, NodeKind::Branching { .. })
    }

    /// Mutable link cells: one for a simple node, one per alternative for a
    /// branching node. Graph algorithms operate on these, never on
    /// variant-specific fields.
    pub fn link_cells_mut(&mut self) -> Vec<&mut Option<i32>> {
        match &mut self.kind {
            NodeKind::Simple { next_content_id } => vec![next_content_id],
            NodeKind::Branching { alternatives } => alternatives
                .iter_mut()
                .map(|alternative| &mut alternative.next_content_id)
                .collect(),
        }
    }

    /// Normalized outbound link values in author order.
    pub fn link_values(&self) -> Vec<i32> {
        match &self.kind {
            NodeKind::Simple { next_content_id } => vec![link_value(next_content_id)],
            NodeKind::Branching { alternatives } => alternatives
                .iter()
                .map(|alternative| link_value(&alternative.next_content_id))
                .collect(),
        }
    }

    /// Outbound links that address a node (end scenarios filtered out).
    pub fn child_ids(&self) -> Vec<usize> {
        self.link_values()
            .into_iter()
            .filter(|value| !is_end_scenario(*value))
            .map(|value| value as usize)
            .collect()
    }

    /// The single value inbound links can be redirected to when this node
    /// steps out of its position. A branching node has no one successor, so
    /// inbound links fall back to the default end scenario.
    pub fn successor(&self) -> i32 {
        match &self.kind {
            NodeKind::Simple { next_content_id } => link_value(next_content_id),
            NodeKind::Branching { .. } => DEFAULT_END_SCENARIO,
        }
    }

    /// Point this node's designated outbound link at `target`. For a
    /// branching node the first alternative adopts the target so the edge it
    /// stepped into stays reachable.
    pub fn set_successor(&mut self, target: i32) {
        match &mut self.kind {
            NodeKind::Simple { next_content_id } => *next_content_id = Some(target),
            NodeKind::Branching { alternatives } => {
                if alternatives.is_empty() {
                    alternatives.push(Alternative::end_scenario());
                }
                alternatives[0].next_content_id = Some(target);
            }
        }
    }
}
