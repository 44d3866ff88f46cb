use crate::layout::{LayoutNode, TreeLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// The layout-response shape consumed by rendering collaborators: nested
/// positioned nodes plus the overall bounding size.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub width: f32,
    pub height: f32,
    pub node_count: usize,
    pub root: Option<&'a LayoutNode>,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a TreeLayout) -> Self {
        let mut node_count = 0;
        if let Some(root) = &layout.root {
            count_rendered(root, &mut node_count);
        }
        LayoutDump {
            width: layout.width,
            height: layout.height,
            node_count,
            root: layout.root.as_ref(),
        }
    }
}

fn count_rendered(node: &LayoutNode, count: &mut usize) {
    if !node.is_loop && !node.is_empty {
        *count += 1;
    }
    for child in &node.children {
        count_rendered(child, count);
    }
}

pub fn layout_dump_string(layout: &TreeLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(
        layout,
    ))?)
}

pub fn write_layout_dump(path: &Path, layout: &TreeLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}
