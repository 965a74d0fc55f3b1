#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod details;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod parser;
pub mod render;
pub mod store;
pub mod theme;
pub mod view;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;

pub use config::{Config, LayoutConfig, ViewportConfig};
pub use details::{PersonDetails, person_details};
pub use layout::{Layout, compute_layout};
pub use model::{FamilyTree, Gender, Person};
pub use parser::parse_family_tree;
pub use render::render_svg;
pub use store::{PersonStore, StoreError};
pub use theme::Theme;
pub use view::{TreeHost, TreeView, ViewportSize};
pub use viewport::{ViewTransform, ViewportController};

/// Everything a one-shot render needs besides the tree itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport_width: f32,
    pub transform: ViewTransform,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::parchment()
    }
}

impl RenderOptions {
    pub fn parchment() -> Self {
        Self {
            theme: Theme::parchment(),
            layout: LayoutConfig::default(),
            viewport_width: 1920.0,
            transform: ViewTransform::IDENTITY,
        }
    }

    pub fn midnight() -> Self {
        Self {
            theme: Theme::midnight(),
            ..Self::parchment()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: config.theme.clone(),
            layout: config.layout.clone(),
            viewport_width: config.render.width,
            transform: ViewTransform::IDENTITY,
        }
    }
}

/// Parses a tree document, normalizes its links and renders one SVG.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let tree = PersonStore::from_tree(parse_family_tree(input)?).snapshot();
    let layout = compute_layout(&tree, &options.layout, options.viewport_width);
    Ok(render_svg(
        &layout,
        &tree,
        &options.theme,
        &options.layout,
        options.transform,
    ))
}
