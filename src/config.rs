use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// Grid, fitting, shading, and relaxation parameters. Defaults are the
/// tuned values of the original bubble editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Starting radius for level-0 circles.
    pub base_radius: f32,
    /// Radius lost per nesting level before text fitting.
    pub radius_step: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Clearance kept between wrapped text and the circle edge.
    pub text_padding: f32,
    pub fit_attempts: u32,
    /// Allowed-width shrink ratio applied per fitting attempt.
    pub fit_shrink: f32,
    pub min_wrap_width: f32,

    /// Horizontal distance between level columns.
    pub x_step: f32,
    /// Vertical distance between consecutive items in a group.
    pub y_step: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub right_margin: f32,
    /// Vertical gap between stacked groups.
    pub group_gap: f32,

    /// Whether the collision-relaxation capability is available.
    pub relaxation: bool,
    pub collide_padding: f32,
    pub collide_iterations: usize,
    pub relax_ticks: usize,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub root_anchor_strength: f32,
    pub branch_anchor_strength: f32,
    /// Radius-aware clearance kept from the canvas edge after relaxing.
    pub bounds_margin: f32,

    /// Seed for root palette picks; change it to reshuffle root colors.
    pub color_seed: u64,
    /// How much each nesting level lightens the root color.
    pub level_lighten_step: f32,
    pub max_lighten: f32,
    pub stroke_darken: f32,
    /// Used when a root has no recorded palette pick.
    pub fallback_root_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 40.0,
            radius_step: 8.0,
            min_radius: 16.0,
            max_radius: 100.0,
            text_padding: 10.0,
            fit_attempts: 8,
            fit_shrink: 0.85,
            min_wrap_width: 30.0,

            x_step: 150.0,
            y_step: 90.0,
            left_margin: 60.0,
            top_margin: 50.0,
            right_margin: 60.0,
            group_gap: 80.0,

            relaxation: true,
            collide_padding: 8.0,
            collide_iterations: 2,
            relax_ticks: 18,
            alpha_decay: 0.25,
            velocity_decay: 0.6,
            root_anchor_strength: 0.6,
            branch_anchor_strength: 0.25,
            bounds_margin: 4.0,

            color_seed: 0x42_5542_4c,
            level_lighten_step: 0.25,
            max_lighten: 0.8,
            stroke_darken: 0.2,
            fallback_root_color: "#3b82f6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Supersampling factor for PNG export.
    pub png_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            png_scale: 2.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
    render: Option<RenderOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    font_weight: Option<u16>,
    text_color: Option<String>,
    text_outline_color: Option<String>,
    edge_color: Option<String>,
    background: Option<String>,
    root_palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LayoutOverrides {
    relaxation: Option<bool>,
    x_step: Option<f32>,
    y_step: Option<f32>,
    group_gap: Option<f32>,
    color_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RenderOverrides {
    width: Option<f32>,
    height: Option<f32>,
    png_scale: Option<f32>,
}

/// Load a JSON (or JSON5) config file over the defaults. `None` yields
/// the default config.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "plain" => config.theme = Theme::plain(),
            "poppins" | "default" => config.theme = Theme::poppins(),
            other => log::warn!("unknown theme {other:?}, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.font_weight {
            config.theme.font_weight = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.text_outline_color {
            config.theme.text_outline_color = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.root_palette {
            config.theme.root_palette = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.relaxation {
            config.layout.relaxation = v;
        }
        if let Some(v) = layout.x_step {
            config.layout.x_step = v;
        }
        if let Some(v) = layout.y_step {
            config.layout.y_step = v;
        }
        if let Some(v) = layout.group_gap {
            config.layout.group_gap = v;
        }
        if let Some(v) = layout.color_seed {
            config.layout.color_seed = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.png_scale {
            config.render.png_scale = v;
        }
    }

    Ok(config)
}
