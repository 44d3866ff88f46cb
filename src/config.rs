use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed node and spacing dimensions of the tree layout. One grid column is
/// `node_width + gap_horizontal` pixels, one row `node_height + gap_vertical`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub gap_horizontal: f32,
    pub gap_vertical: f32,
    /// Side length of alternative, loop and end-scenario markers.
    pub marker_size: f32,
    /// Grid columns reserved by an end-scenario slot.
    pub empty_slot_span: f32,
    /// Grid columns reserved by a loop placeholder.
    pub loop_span: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 121.0,
            node_height: 72.0,
            gap_horizontal: 29.0,
            gap_vertical: 48.0,
            marker_size: 14.0,
            empty_slot_span: 1.0,
            loop_span: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Whitespace around the tree in the rendered preview.
    pub padding: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutOverrides>,
    render: Option<RenderOverrides>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    node_width: Option<f32>,
    node_height: Option<f32>,
    gap_horizontal: Option<f32>,
    gap_vertical: Option<f32>,
    marker_size: Option<f32>,
    empty_slot_span: Option<f32>,
    loop_span: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOverrides {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "light" {
            config.theme = Theme::default_light();
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.gap_horizontal {
            config.layout.gap_horizontal = v;
        }
        if let Some(v) = layout.gap_vertical {
            config.layout.gap_vertical = v;
        }
        if let Some(v) = layout.marker_size {
            config.layout.marker_size = v;
        }
        if let Some(v) = layout.empty_slot_span {
            config.layout.empty_slot_span = v;
        }
        if let Some(v) = layout.loop_span {
            config.layout.loop_span = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
    }

    Ok(config)
}
