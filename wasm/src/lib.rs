use family_tree_renderer::{RenderOptions, ViewTransform, ViewportController, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    viewport_width: Option<f32>,
    scale: Option<f32>,
    pan_x: Option<f32>,
    pan_y: Option<f32>,
}

fn build_render_options(options: TreeRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("midnight") {
        RenderOptions::midnight()
    } else {
        RenderOptions::parchment()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.viewport_width {
        render_options.viewport_width = width;
    }

    let mut viewport = ViewportController::default();
    viewport.set_scale(options.scale.unwrap_or(ViewTransform::IDENTITY.scale));
    viewport.set_pan(options.pan_x.unwrap_or(0.0), options.pan_y.unwrap_or(0.0));
    render_options.transform = viewport.transform();

    render_options
}

#[wasm_bindgen]
pub fn render_family_tree_svg(
    tree_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TreeRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(tree_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
