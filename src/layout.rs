use crate::config::LayoutConfig;
use crate::error::EditorError;
use crate::ir::{ContentNode, is_end_scenario};
use crate::parser::validate_graph;
use serde::Serialize;
use std::collections::HashSet;

/// A positioned cell of the rendered tree. Loop and empty cells reserve
/// space and carry connector geometry but are not drawn as boxes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    /// Content id for real and loop cells, the raw link value for empty
    /// (end-scenario) cells.
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub is_loop: bool,
    pub is_empty: bool,
    pub is_branching: bool,
    /// Alternative markers of a branching node, one per alternative,
    /// horizontally derived from the corresponding child position.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerLayout>,
    pub children: Vec<LayoutNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayout {
    pub alternative_index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub root: Option<LayoutNode>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Real,
    Loop,
    Empty,
}

/// Pass-1 output: grid coordinates before pixel conversion.
struct StructureCell {
    id: i32,
    kind: CellKind,
    /// Grid column of the cell's left edge.
    x: f32,
    /// Grid columns this cell reserves.
    span: f32,
    depth: usize,
    /// Rows consumed: 2 for branching (content + alternative markers).
    rows: usize,
    branching: bool,
    children: Vec<StructureCell>,
}

/// Walk-local bookkeeping: per-row width cursors plus the visited set that
/// turns re-visits into loop placeholders. Nothing outlives one `layout`
/// call, so the engine is re-entrant.
struct LayoutContext {
    row_cursor: Vec<f32>,
    visited: HashSet<usize>,
}

impl LayoutContext {
    fn new() -> Self {
        Self {
            row_cursor: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Next free column across every row the cell spans. A wide branching
    /// subtree must not overlap a sibling's single-row subtree, so the
    /// maximum wins.
    fn cursor(&mut self, depth: usize, rows: usize) -> f32 {
        if self.row_cursor.len() < depth + rows {
            self.row_cursor.resize(depth + rows, 0.0);
        }
        self.row_cursor[depth..depth + rows]
            .iter()
            .fold(0.0_f32, |acc, value| acc.max(*value))
    }

    fn advance(&mut self, depth: usize, rows: usize, to: f32) {
        if self.row_cursor.len() < depth + rows {
            self.row_cursor.resize(depth + rows, 0.0);
        }
        for cursor in &mut self.row_cursor[depth..depth + rows] {
            *cursor = cursor.max(to);
        }
    }
}

/// Compute the tree layout of every node reachable from `root_id`.
/// Cycles are normal input: a link to an already-visited node becomes a loop
/// placeholder instead of being re-expanded, which keeps the walk finite.
pub fn layout(
    content: &[ContentNode],
    root_id: i32,
    config: &LayoutConfig,
) -> Result<TreeLayout, EditorError> {
    validate_graph(content)?;
    if content.is_empty() {
        return Ok(TreeLayout {
            root: None,
            width: 0.0,
            height: 0.0,
        });
    }
    if root_id < 0 || root_id as usize >= content.len() {
        return Err(EditorError::invalid(format!(
            "layout root {root_id} is out of bounds for {} nodes",
            content.len()
        )));
    }

    let mut context = LayoutContext::new();
    let structure = reserve(content, &mut context, root_id, 0, config);
    let root = render_cell(&structure, config);

    let mut width = 0.0_f32;
    let mut height = 0.0_f32;
    measure(&root, &mut width, &mut height);

    Ok(TreeLayout {
        root: Some(root),
        width,
        height,
    })
}

/// Pass 1: depth-first reservation. Assigns each cell a provisional grid
/// column from the per-row cursor and centers parents over the structural
/// span of their children.
fn reserve(
    content: &[ContentNode],
    context: &mut LayoutContext,
    link: i32,
    depth: usize,
    config: &LayoutConfig,
) -> StructureCell {
    if is_end_scenario(link) {
        return placeholder(context, link, depth, CellKind::Empty, config.empty_slot_span);
    }
    let id = link as usize;
    if context.visited.contains(&id) {
        return placeholder(context, link, depth, CellKind::Loop, config.loop_span);
    }
    context.visited.insert(id);

    let node = &content[id];
    let branching = node.is_branching();
    let rows = if branching { 2 } else { 1 };
    let child_depth = depth + rows;

    let mut children: Vec<StructureCell> = node
        .link_values()
        .into_iter()
        .map(|child_link| reserve(content, context, child_link, child_depth, config))
        .collect();

    let cursor = context.cursor(depth, rows);
    let x = if children.is_empty() {
        cursor
    } else {
        let first = children.first().expect("children checked non-empty");
        let last = children.last().expect("children checked non-empty");
        let centered = ((last.x + last.span) - first.x) / 2.0 - 0.5 + first.x;
        if centered >= cursor {
            centered
        } else {
            // The row is more crowded than the children's rows. The beauty
            // modifier keeps the parent centered by carrying the whole
            // subtree along, and the subtree's reservations move with it so
            // a cousin cannot be handed the vacated columns.
            let modifier = cursor - centered;
            shift_subtree(&mut children, modifier, context);
            cursor
        }
    };
    // A branching node also claims its subtree's span on the rows it
    // consumes, so a wide question cannot end up sharing its marker row
    // with a sibling's single-row subtree.
    let mut extent = x + 1.0;
    if branching && let Some(last) = children.last() {
        extent = extent.max(last.x + last.span);
    }
    context.advance(depth, rows, extent);

    StructureCell {
        id: link,
        kind: CellKind::Real,
        x,
        span: 1.0,
        depth,
        rows,
        branching,
        children,
    }
}

fn shift_subtree(cells: &mut [StructureCell], shift: f32, context: &mut LayoutContext) {
    for cell in cells {
        cell.x += shift;
        context.advance(cell.depth, cell.rows, cell.x + cell.span);
        shift_subtree(&mut cell.children, shift, context);
    }
}

fn placeholder(
    context: &mut LayoutContext,
    link: i32,
    depth: usize,
    kind: CellKind,
    span: f32,
) -> StructureCell {
    let x = context.cursor(depth, 1);
    context.advance(depth, 1, x + span);
    StructureCell {
        id: link,
        kind,
        x,
        span,
        depth,
        rows: 1,
        branching: false,
        children: Vec::new(),
    }
}

/// Pass 2: re-center each parent over its actual rendered children (not the
/// structural estimate) and convert grid cells to pixels.
fn render_cell(cell: &StructureCell, config: &LayoutConfig) -> LayoutNode {
    let unit = config.node_width + config.gap_horizontal;
    let row_height = config.node_height + config.gap_vertical;

    let children: Vec<LayoutNode> = cell
        .children
        .iter()
        .map(|child| render_cell(child, config))
        .collect();

    let grid_x = if children.is_empty() {
        cell.x
    } else {
        let first = children.first().expect("children checked non-empty");
        let last = children.last().expect("children checked non-empty");
        let first_left = first.x / unit;
        let last_right = last.x / unit + last_grid_span(cell);
        ((last_right - first_left) / 2.0 - 0.5 + first_left).max(cell.x)
    };

    let x = grid_x * unit;
    let y = cell.depth as f32 * row_height;
    let (width, height) = match cell.kind {
        CellKind::Real => (config.node_width, config.node_height),
        CellKind::Loop | CellKind::Empty => (config.marker_size, config.marker_size),
    };

    let markers = if cell.branching {
        children
            .iter()
            .enumerate()
            .map(|(alternative_index, child)| MarkerLayout {
                alternative_index,
                x: child.x + child.width / 2.0 - config.marker_size / 2.0,
                y: (cell.depth + 1) as f32 * row_height
                    + (config.node_height - config.marker_size) / 2.0,
                width: config.marker_size,
                height: config.marker_size,
            })
            .collect()
    } else {
        Vec::new()
    };

    LayoutNode {
        id: cell.id,
        x,
        y,
        width,
        height,
        is_loop: cell.kind == CellKind::Loop,
        is_empty: cell.kind == CellKind::Empty,
        is_branching: cell.branching,
        markers,
        children,
    }
}

fn last_grid_span(cell: &StructureCell) -> f32 {
    cell.children
        .last()
        .map(|child| child.span)
        .unwrap_or(1.0)
}

fn measure(node: &LayoutNode, width: &mut f32, height: &mut f32) {
    *width = width.max(node.x + node.width);
    *height = height.max(node.y + node.height);
    for marker in &node.markers {
        *width = width.max(marker.x + marker.width);
        *height = height.max(marker.y + marker.height);
    }
    for child in &node.children {
        measure(child, width, height);
    }
}
