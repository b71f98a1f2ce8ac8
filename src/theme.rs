use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub page_fill: String,
    pub page_text_color: String,
    pub page_border_color: String,
    pub line_color: String,
    pub minimap_background: String,
    pub minimap_border: String,
    pub minimap_node_fill: String,
    pub background: String,
}

impl Theme {
    /// GOV.UK-flavoured palette the designer ships with.
    pub fn designer() -> Self {
        Self {
            font_family: "\"GDS Transport\", arial, sans-serif".to_string(),
            font_size: 16.0,
            page_fill: "#FFFFFF".to_string(),
            page_text_color: "#0B0C0C".to_string(),
            page_border_color: "#0B0C0C".to_string(),
            line_color: "#505A5F".to_string(),
            minimap_background: "#F3F2F1".to_string(),
            minimap_border: "#B1B4B6".to_string(),
            minimap_node_fill: "#1D70B8".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            font_family: "arial, sans-serif".to_string(),
            font_size: 16.0,
            page_fill: "#000000".to_string(),
            page_text_color: "#FFDD00".to_string(),
            page_border_color: "#FFDD00".to_string(),
            line_color: "#FFFFFF".to_string(),
            minimap_background: "#1A1A1A".to_string(),
            minimap_border: "#FFFFFF".to_string(),
            minimap_node_fill: "#FFDD00".to_string(),
            background: "#000000".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "designer" | "default" => Some(Self::designer()),
            "high-contrast" | "contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::designer()
    }
}
