use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub node_text_color: String,
    pub branching_fill: String,
    pub branching_border: String,
    pub line_color: String,
    pub marker_fill: String,
    pub loop_color: String,
    pub end_color: String,
    pub background: String,
}

impl Theme {
    pub fn default_light() -> Self {
        Self {
            font_family: "\"Open Sans\", Arial, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#B3C2CE".to_string(),
            node_text_color: "#255C8E".to_string(),
            branching_fill: "#EAF2FA".to_string(),
            branching_border: "#1A73D9".to_string(),
            line_color: "#B3C2CE".to_string(),
            marker_fill: "#1A73D9".to_string(),
            loop_color: "#9B59B6".to_string(),
            end_color: "#76818D".to_string(),
            background: "#F5F7F8".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            node_text_color: "#1C2430".to_string(),
            branching_fill: "#EEF2F8".to_string(),
            branching_border: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            marker_fill: "#3B5BDB".to_string(),
            loop_color: "#845EF7".to_string(),
            end_color: "#868E96".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
