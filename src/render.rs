use crate::config::RenderConfig;
use crate::ir::ContentNode;
use crate::layout::{LayoutNode, TreeLayout};
use crate::parser::library_machine_name;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Render a computed tree layout as a standalone SVG preview: boxes for
/// content nodes, dots for alternative markers, distinct markers for loop
/// and end-scenario cells.
pub fn render_svg(
    layout: &TreeLayout,
    content: &[ContentNode],
    theme: &Theme,
    render: &RenderConfig,
) -> String {
    let pad = render.padding;
    let width = (layout.width + pad * 2.0).max(200.0);
    let height = (layout.height + pad * 2.0).max(120.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if let Some(root) = &layout.root {
        draw_cell(&mut svg, root, None, content, theme, pad);
    }

    svg.push_str("</svg>");
    svg
}

fn draw_cell(
    svg: &mut String,
    node: &LayoutNode,
    parent_anchor: Option<(f32, f32)>,
    content: &[ContentNode],
    theme: &Theme,
    pad: f32,
) {
    let x = node.x + pad;
    let y = node.y + pad;
    let top_center = (x + node.width / 2.0, y);

    if let Some(from) = parent_anchor {
        let dash = if node.is_loop { " stroke-dasharray=\"4 3\"" } else { "" };
        let stroke = if node.is_loop {
            theme.loop_color.as_str()
        } else {
            theme.line_color.as_str()
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"{}/>",
            elbow_path(from, top_center),
            stroke,
            dash
        ));
    }

    if node.is_loop {
        // Back-reference marker instead of a rendered box.
        let r = node.width / 2.0;
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{r:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.6\"/>",
            x + r,
            y + r,
            theme.loop_color
        ));
        return;
    }
    if node.is_empty {
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\"/>",
            node.width, node.height, theme.end_color
        ));
        return;
    }

    let (fill, border) = if node.is_branching {
        (theme.branching_fill.as_str(), theme.branching_border.as_str())
    } else {
        (theme.node_fill.as_str(), theme.node_border.as_str())
    };
    svg.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"1.4\"/>",
        node.width, node.height
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        x + node.width / 2.0,
        y + node.height / 2.0 + theme.font_size / 3.0,
        theme.font_family,
        theme.font_size,
        theme.node_text_color,
        escape_xml(&cell_label(node, content))
    ));

    for marker in &node.markers {
        let r = marker.width / 2.0;
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{r:.2}\" fill=\"{}\"/>",
            marker.x + pad + r,
            marker.y + pad + r,
            theme.marker_fill
        ));
    }

    for (index, child) in node.children.iter().enumerate() {
        // Branching children hang off their alternative marker, simple
        // children off the node itself.
        let anchor = node
            .markers
            .get(index)
            .map(|marker| {
                (
                    marker.x + pad + marker.width / 2.0,
                    marker.y + pad + marker.height,
                )
            })
            .unwrap_or((x + node.width / 2.0, y + node.height));
        draw_cell(svg, child, Some(anchor), content, theme, pad);
    }
}

fn cell_label(node: &LayoutNode, content: &[ContentNode]) -> String {
    let Some(entry) = content.get(node.id.max(0) as usize) else {
        return format!("#{}", node.id);
    };
    if let Some(title) = &entry.title {
        return title.clone();
    }
    library_machine_name(&entry.library)
        .map(|name| name.trim_start_matches("H5P.").to_string())
        .unwrap_or_else(|| entry.library.clone())
}

fn elbow_path(from: (f32, f32), to: (f32, f32)) -> String {
    let mid_y = (from.1 + to.1) / 2.0;
    format!(
        "M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2}",
        from.0, from.1, from.0, mid_y, to.0, mid_y, to.0, to.1
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
