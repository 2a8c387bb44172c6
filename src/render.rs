//! Scene to SVG (and optionally PNG): circles with soft shadows, straight
//! parent/child connectors, and centered multi-line labels with an
//! outline so text stays readable on any fill. The scene is the only
//! input; no layout runs here.

use crate::config::RenderConfig;
use crate::layout::Scene;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Shown in place of the diagram for an empty or all-blank document.
const PLACEHOLDER_TEXT: &str = "Type an outline to see bubbles here...";

pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let width = scene.width.max(1.0);
    let height = scene.height.max(1.0);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if scene.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"#64748b\">{}</text>",
            width / 2.0,
            height / 2.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            PLACEHOLDER_TEXT
        ));
        svg.push_str("</svg>");
        return svg;
    }

    svg.push_str(
        "<defs><filter id=\"nodeShadow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
         <feDropShadow dx=\"0\" dy=\"3\" stdDeviation=\"3\" flood-color=\"#000000\" flood-opacity=\"0.25\"/>\
         </filter></defs>",
    );

    for edge in &scene.edges {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2\"/>",
            edge.x1, edge.y1, edge.x2, edge.y2, theme.edge_color
        ));
    }

    let line_height = theme.line_height();
    for node in &scene.nodes {
        svg.push_str(&format!("<g id=\"node-{}\">", node.id));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\" filter=\"url(#nodeShadow)\"/>",
            node.x, node.y, node.r, node.fill, node.stroke
        ));
        if !node.lines.is_empty() {
            svg.push_str(&format!(
                "<text text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\" paint-order=\"stroke\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\">",
                theme.text_color,
                theme.text_outline_color,
                escape_xml(&theme.font_family),
                theme.font_size,
                theme.font_weight
            ));
            let start_y = node.y - (node.lines.len() as f32 - 1.0) * line_height / 2.0;
            for (index, line) in node.lines.iter().enumerate() {
                svg.push_str(&format!(
                    "<tspan x=\"{:.2}\" y=\"{:.2}\">{}</tspan>",
                    node.x,
                    start_y + index as f32 * line_height,
                    escape_xml(line)
                ));
            }
            svg.push_str("</text>");
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// Inline diagnostic shown when a layout pass fails; replaces the scene
/// rather than leaving a half-built one on screen.
pub fn render_error_svg(message: &str, theme: &Theme) -> String {
    let mut svg = String::new();
    svg.push_str(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"600\" height=\"160\" viewBox=\"0 0 600 160\">",
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<text x=\"300\" y=\"70\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"18\" fill=\"#dc2626\">Diagram failed to build</text>",
        escape_xml(&theme.font_family)
    ));
    svg.push_str(&format!(
        "<text x=\"300\" y=\"100\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"13\" fill=\"#7f1d1d\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(message)
    ));
    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .unwrap_or("sans-serif")
        .trim()
        .to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.png_scale.max(0.1);
    let size = tree.size();
    let pixel_width = (size.width() * scale).ceil() as u32;
    let pixel_height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixel_width.max(1), pixel_height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
