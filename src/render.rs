use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::text::node_label;
use crate::layout::{Bounds, EdgeKind, EdgeLayout, Layout, NodePosition};
use crate::model::FamilyTree;
use crate::theme::Theme;
use crate::viewport::ViewTransform;
use anyhow::Result;
use std::path::Path;

const CARD_RADIUS: f32 = 12.0;
const PHOTO_RADIUS: f32 = 40.0;
const PHOTO_OFFSET: f32 = 55.0;
const NAME_OFFSET: f32 = 120.0;
const LIFESPAN_INSET: f32 = 18.0;

/// Draws one layout pass. Connectors go first so cards sit on top of them;
/// both layers get the same `transform`.
pub fn render_svg(
    layout: &Layout,
    tree: &FamilyTree,
    theme: &Theme,
    config: &LayoutConfig,
    transform: ViewTransform,
) -> String {
    let config = config.sanitized();
    let frame = svg_frame(layout, transform);
    let (width, height) = (frame.width().max(1.0), frame.height().max(1.0));
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{:.2} {:.2} {width:.2} {height:.2}\">",
        frame.min_x, frame.min_y
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        frame.min_x,
        frame.min_y,
        escape_xml(&theme.background)
    ));

    let transform_attr = transform.to_svg();
    svg.push_str(&format!(
        "<g class=\"edges\" transform=\"{transform_attr}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\">",
        escape_xml(&theme.connector_color),
        theme.connector_width
    ));
    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge, theme));
    }
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<g class=\"nodes\" transform=\"{transform_attr}\">"
    ));
    for (idx, node) in layout.nodes.iter().enumerate() {
        svg.push_str(&node_svg(idx, node, tree, theme, &config));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

/// Screen area of the output: the viewport strip plus wherever the
/// transformed scene reaches, so a static export never clips a card.
fn svg_frame(layout: &Layout, transform: ViewTransform) -> Bounds {
    let Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
    } = layout.bounds;
    let (x0, y0) = transform.apply(min_x, min_y);
    let (x1, y1) = transform.apply(max_x, max_y);
    Bounds {
        min_x: x0.min(x1).min(0.0),
        min_y: y0.min(y1).min(0.0),
        max_x: x0.max(x1).max(layout.viewport_width),
        max_y: y0.max(y1).max(0.0),
    }
}

fn edge_svg(edge: &EdgeLayout, theme: &Theme) -> String {
    let d = points_to_path(&edge.points);
    match edge.kind {
        EdgeKind::ParentChild => format!(
            "<path class=\"parent-child\" data-source=\"{}\" data-target=\"{}\" d=\"{d}\"/>",
            escape_xml(&edge.sources.join(" ")),
            escape_xml(&edge.target)
        ),
        EdgeKind::Spouse => format!(
            "<path class=\"spouse\" data-source=\"{}\" data-target=\"{}\" d=\"{d}\" stroke-dasharray=\"{}\"/>",
            escape_xml(&edge.sources.join(" ")),
            escape_xml(&edge.target),
            escape_xml(&theme.spouse_dasharray)
        ),
    }
}

fn node_svg(
    idx: usize,
    node: &NodePosition,
    tree: &FamilyTree,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let Some(person) = tree.get(&node.id) else {
        return String::new();
    };
    let label = node_label(person, config, theme.font_size);
    let left = node.x - config.node_width / 2.0;
    let top = node.y - config.node_height / 2.0;
    let font = escape_xml(&theme.font_family);
    let mut out = String::new();

    out.push_str(&format!(
        "<g class=\"node\" data-id=\"{}\" data-generation=\"{}\">",
        escape_xml(&node.id),
        node.generation
    ));
    out.push_str(&format!(
        "<rect x=\"{left:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CARD_RADIUS}\" ry=\"{CARD_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        config.node_width,
        config.node_height,
        escape_xml(&theme.node_fill),
        escape_xml(&theme.node_border)
    ));

    let photo_y = top + PHOTO_OFFSET;
    out.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{photo_y:.2}\" r=\"{PHOTO_RADIUS}\" fill=\"{}\"/>",
        node.x,
        escape_xml(&theme.photo_fill)
    ));
    match person.photo.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(href) => {
            let clip_id = format!("photo-clip-{idx}");
            out.push_str(&format!(
                "<clipPath id=\"{clip_id}\"><circle cx=\"{:.2}\" cy=\"{photo_y:.2}\" r=\"{PHOTO_RADIUS}\"/></clipPath>",
                node.x
            ));
            out.push_str(&format!(
                "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{d:.2}\" height=\"{d:.2}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{clip_id})\"/>",
                escape_xml(href),
                node.x - PHOTO_RADIUS,
                photo_y - PHOTO_RADIUS,
                d = PHOTO_RADIUS * 2.0
            ));
        }
        None => {
            out.push_str(&format!(
                "<text class=\"initials\" x=\"{:.2}\" y=\"{photo_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{font}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                node.x,
                theme.font_size * 1.6,
                escape_xml(&theme.initials_color),
                escape_xml(&label.initials)
            ));
        }
    }

    let line_height = theme.font_size * config.name_line_height;
    out.push_str(&format!(
        "<text class=\"name\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{font}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">",
        node.x,
        top + NAME_OFFSET,
        theme.font_size,
        escape_xml(&theme.name_color)
    ));
    for (line_idx, line) in label.name_lines.iter().enumerate() {
        let dy = if line_idx == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            "<tspan x=\"{:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            node.x,
            escape_xml(line)
        ));
    }
    out.push_str("</text>");

    out.push_str(&format!(
        "<text class=\"years\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{font}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        node.x,
        top + config.node_height - LIFESPAN_INSET,
        theme.font_size * 0.85,
        escape_xml(&theme.years_color),
        escape_xml(&label.lifespan)
    ));
    out.push_str("</g>");
    out
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
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
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
