use crate::theme::Theme;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    /// Center y of the first generation row.
    pub base_y: f32,
    /// Width used for row centering when the host reports a degenerate viewport.
    pub min_viewport_width: f32,
    pub max_name_chars: usize,
    pub name_line_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 200.0,
            horizontal_spacing: 250.0,
            vertical_spacing: 300.0,
            base_y: 150.0,
            min_viewport_width: 320.0,
            max_name_chars: 22,
            name_line_height: 1.3,
        }
    }
}

impl LayoutConfig {
    /// Spacing never drops below the node footprint, otherwise neighbours and
    /// rows would overlap.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.node_width = finite_or(config.node_width, 1.0).max(1.0);
        config.node_height = finite_or(config.node_height, 1.0).max(1.0);
        let horizontal = finite_or(config.horizontal_spacing, config.node_width);
        if horizontal < config.node_width {
            tracing::warn!(
                horizontal_spacing = horizontal,
                node_width = config.node_width,
                "horizontal spacing below node width, using node width"
            );
        }
        config.horizontal_spacing = horizontal.max(config.node_width);
        let vertical = finite_or(config.vertical_spacing, config.node_height);
        if vertical < config.node_height {
            tracing::warn!(
                vertical_spacing = vertical,
                node_height = config.node_height,
                "vertical spacing below node height, using node height"
            );
        }
        config.vertical_spacing = vertical.max(config.node_height);
        config.min_viewport_width = finite_or(config.min_viewport_width, 320.0).max(1.0);
        config
    }

    pub fn effective_viewport_width(&self, width: f32) -> f32 {
        if width.is_finite() && width > 0.0 {
            width
        } else {
            self.min_viewport_width.max(1.0)
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub wheel_in_factor: f32,
    pub wheel_out_factor: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 3.0,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
            wheel_in_factor: 1.1,
            wheel_out_factor: 0.9,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let scales = [self.min_scale, self.max_scale];
        if scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            bail!("viewport scale bounds must be positive");
        }
        if self.min_scale > self.max_scale {
            bail!(
                "viewport minScale {} exceeds maxScale {}",
                self.min_scale,
                self.max_scale
            );
        }
        let factors = [
            self.zoom_in_factor,
            self.zoom_out_factor,
            self.wheel_in_factor,
            self.wheel_out_factor,
        ];
        if factors.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            bail!("zoom factors must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::parchment(),
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_fill: Option<String>,
    node_border: Option<String>,
    photo_fill: Option<String>,
    initials_color: Option<String>,
    name_color: Option<String>,
    years_color: Option<String>,
    connector_color: Option<String>,
    connector_width: Option<f32>,
    spouse_dasharray: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
    base_y: Option<f32>,
    min_viewport_width: Option<f32>,
    max_name_chars: Option<usize>,
    name_line_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    min_scale: Option<f32>,
    max_scale: Option<f32>,
    zoom_in_factor: Option<f32>,
    zoom_out_factor: Option<f32>,
    wheel_in_factor: Option<f32>,
    wheel_out_factor: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.photo_fill {
            config.theme.photo_fill = v;
        }
        if let Some(v) = vars.initials_color {
            config.theme.initials_color = v;
        }
        if let Some(v) = vars.name_color {
            config.theme.name_color = v;
        }
        if let Some(v) = vars.years_color {
            config.theme.years_color = v;
        }
        if let Some(v) = vars.connector_color {
            config.theme.connector_color = v;
        }
        if let Some(v) = vars.connector_width {
            config.theme.connector_width = v;
        }
        if let Some(v) = vars.spouse_dasharray {
            config.theme.spouse_dasharray = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.horizontal_spacing {
            config.layout.horizontal_spacing = v;
        }
        if let Some(v) = layout.vertical_spacing {
            config.layout.vertical_spacing = v;
        }
        if let Some(v) = layout.base_y {
            config.layout.base_y = v;
        }
        if let Some(v) = layout.min_viewport_width {
            config.layout.min_viewport_width = v;
        }
        if let Some(v) = layout.max_name_chars {
            config.layout.max_name_chars = v;
        }
        if let Some(v) = layout.name_line_height {
            config.layout.name_line_height = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        if let Some(v) = viewport.min_scale {
            config.viewport.min_scale = v;
        }
        if let Some(v) = viewport.max_scale {
            config.viewport.max_scale = v;
        }
        if let Some(v) = viewport.zoom_in_factor {
            config.viewport.zoom_in_factor = v;
        }
        if let Some(v) = viewport.zoom_out_factor {
            config.viewport.zoom_out_factor = v;
        }
        if let Some(v) = viewport.wheel_in_factor {
            config.viewport.wheel_in_factor = v;
        }
        if let Some(v) = viewport.wheel_out_factor {
            config.viewport.wheel_out_factor = v;
        }
    }
    config.viewport.validate()?;

    Ok(config)
}
