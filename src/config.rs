use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which layered layout implementation positions the page boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// `dagre_rust`, falling back to `Layered` when it yields no positions.
    #[default]
    Dagre,
    /// Built-in longest-path ranking with median crossing reduction.
    Layered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub engine: LayoutEngine,
    /// Gap between boxes sharing a rank column.
    pub node_spacing: f32,
    /// Gap between rank columns (left-to-right flow).
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub label_line_height: f32,
    pub min_node_width: f32,
    pub min_node_height: f32,
    pub order_passes: usize,
    /// Vertical distance between lanes used by backward edges.
    pub back_edge_lane_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::Dagre,
            node_spacing: 50.0,
            rank_spacing: 160.0,
            margin_x: 50.0,
            margin_y: 150.0,
            node_padding_x: 16.0,
            node_padding_y: 10.0,
            label_line_height: 1.5,
            min_node_width: 120.0,
            min_node_height: 60.0,
            order_passes: 4,
            back_edge_lane_gap: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub minimap_scale: f32,
    pub show_minimap: bool,
    /// Distance in canvas pixels within which a click selects an edge.
    pub edge_hit_tolerance: f32,
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            minimap_scale: 0.05,
            show_minimap: true,
            edge_hit_tolerance: 6.0,
            width: 1200.0,
            height: 800.0,
            background: "white".to_string(),
        }
    }
}

/// Construction-time settings for the sync controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upload/download affordances are available and previews are refreshed.
    pub playground_mode: bool,
    /// The designer runs next to a live preview of the form.
    pub split_view: bool,
}

impl SyncConfig {
    pub fn reloads_preview(&self) -> bool {
        self.playground_mode && self.split_view
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::designer();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            sync: SyncConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    minimap: Option<MinimapConfigFile>,
    playground_mode: Option<bool>,
    split_view: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    page_fill: Option<String>,
    page_text_color: Option<String>,
    page_border_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    engine: Option<LayoutEngine>,
    nodesep: Option<f32>,
    ranksep: Option<f32>,
    marginx: Option<f32>,
    marginy: Option<f32>,
    order_passes: Option<usize>,
    min_node_width: Option<f32>,
    min_node_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinimapConfigFile {
    scale: Option<f32>,
    show: Option<bool>,
}

/// Loads a JSON (or JSON5) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;
    apply_config_file(&mut config, parsed)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> anyhow::Result<()> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.page_fill {
            config.theme.page_fill = v;
        }
        if let Some(v) = vars.page_text_color {
            config.theme.page_text_color = v;
        }
        if let Some(v) = vars.page_border_color {
            config.theme.page_border_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.engine {
            config.layout.engine = v;
        }
        if let Some(v) = layout.nodesep {
            config.layout.node_spacing = v.max(0.0);
        }
        if let Some(v) = layout.ranksep {
            config.layout.rank_spacing = v.max(0.0);
        }
        if let Some(v) = layout.marginx {
            config.layout.margin_x = v.max(0.0);
        }
        if let Some(v) = layout.marginy {
            config.layout.margin_y = v.max(0.0);
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
        if let Some(v) = layout.min_node_width {
            config.layout.min_node_width = v.max(0.0);
        }
        if let Some(v) = layout.min_node_height {
            config.layout.min_node_height = v.max(0.0);
        }
    }

    if let Some(minimap) = parsed.minimap {
        if let Some(v) = minimap.scale {
            if v <= 0.0 {
                return Err(anyhow::anyhow!("minimap scale must be positive, got {v}"));
            }
            config.render.minimap_scale = v;
        }
        if let Some(v) = minimap.show {
            config.render.show_minimap = v;
        }
    }

    if let Some(v) = parsed.playground_mode {
        config.sync.playground_mode = v;
    }
    if let Some(v) = parsed.split_view {
        config.sync.split_view = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_flow_layout() {
        let config = Config::default();
        assert_eq!(config.layout.margin_x, 50.0);
        assert_eq!(config.layout.margin_y, 150.0);
        assert_eq!(config.layout.rank_spacing, 160.0);
        assert_eq!(config.render.minimap_scale, 0.05);
        assert!(!config.sync.reloads_preview());
    }

    #[test]
    fn loads_json5_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{{ // designer settings\n layout: {{ ranksep: 200, engine: 'layered' }},\n minimap: {{ scale: 0.1 }},\n playgroundMode: true, splitView: true,\n}}"
        )
        .unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout.rank_spacing, 200.0);
        assert_eq!(config.layout.engine, LayoutEngine::Layered);
        assert_eq!(config.render.minimap_scale, 0.1);
        assert!(config.sync.reloads_preview());
    }

    #[test]
    fn rejects_unknown_theme_and_bad_scale() {
        let mut config = Config::default();
        let parsed: ConfigFile = json5::from_str("{ theme: 'neon' }").unwrap();
        assert!(apply_config_file(&mut config, parsed).is_err());
        let parsed: ConfigFile = json5::from_str("{ minimap: { scale: 0 } }").unwrap();
        assert!(apply_config_file(&mut config, parsed).is_err());
    }
}
