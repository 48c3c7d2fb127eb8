//! Serialisation of the scene to SVG and to a standalone HTML page.

use crate::layout::Settings;
use crate::scene::{Element, ElementId, Layer, Scene, Shape};
use crate::tooltip::{escape, Tooltip};

/// Default stylesheet embedded into HTML output.
pub const STYLESHEET: &str = r#"
.calendar-heatmap { position: relative; font-family: Helvetica, Arial, sans-serif; user-select: none; }
.calendar-heatmap .item { cursor: pointer; }
.calendar-heatmap .label { cursor: pointer; fill: #aaaaaa; }
.calendar-heatmap .button { cursor: pointer; fill: transparent; stroke-width: 2; stroke: #aaaaaa; }
.calendar-heatmap .button text { stroke-width: 1; text-anchor: middle; fill: #aaaaaa; }
.calendar-heatmap .heatmap-tooltip {
  pointer-events: none; position: absolute; z-index: 9999; width: 250px; max-width: 250px;
  overflow: hidden; padding: 15px; font-size: 12px; line-height: 14px; color: #333333;
  background: rgba(255, 255, 255, 0.75);
}
.calendar-heatmap .heatmap-tooltip .header strong { display: inline-block; width: 250px; }
.calendar-heatmap .heatmap-tooltip span { display: inline-block; width: 50%; padding-right: 10px; box-sizing: border-box; }
.calendar-heatmap .heatmap-tooltip span,
.calendar-heatmap .heatmap-tooltip .header strong { white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
"#;

/// Format a coordinate with at most two decimals.
fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn class_attr(element: &Element) -> String {
    if element.class.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, escape(&element.class))
    }
}

fn style_attr(element: &Element) -> String {
    if element.opacity >= 1.0 {
        String::new()
    } else {
        format!(r#" style="opacity: {}""#, num(element.opacity))
    }
}

fn fill_attr(element: &Element) -> String {
    match &element.fill {
        Some(fill) => format!(r#" fill="{}""#, escape(fill)),
        None => String::new(),
    }
}

fn render_element(scene: &Scene, id: ElementId, depth: usize, out: &mut String) {
    let Some(element) = scene.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let attrs = format!(
        "{}{}{}",
        class_attr(element),
        fill_attr(element),
        style_attr(element)
    );

    match &element.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            radius,
        } => {
            let rounded = if *radius > 0.0 {
                format!(r#" rx="{r}" ry="{r}""#, r = num(*radius))
            } else {
                String::new()
            };
            out.push_str(&format!(
                r#"{}<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
                indent,
                num(*x),
                num(*y),
                num(*width),
                num(*height),
                rounded,
                attrs
            ));
            out.push('\n');
        }
        Shape::Circle { cx, cy, r } => {
            out.push_str(&format!(
                r#"{}<circle cx="{}" cy="{}" r="{}"{}/>"#,
                indent,
                num(*cx),
                num(*cy),
                num(*r),
                attrs
            ));
            out.push('\n');
        }
        Shape::Text {
            x,
            y,
            text,
            font_size,
        } => {
            out.push_str(&format!(
                r#"{}<text x="{}" y="{}" font-size="{}px"{}>{}</text>"#,
                indent,
                num(*x),
                num(*y),
                num(*font_size),
                attrs,
                escape(text)
            ));
            out.push('\n');
        }
        Shape::Group { x, y } => {
            out.push_str(&format!(
                r#"{}<g transform="translate({},{})"{}>"#,
                indent,
                num(*x),
                num(*y),
                attrs
            ));
            out.push('\n');
            for child in scene.children(id) {
                render_element(scene, child, depth + 1, out);
            }
            out.push_str(&indent);
            out.push_str("</g>\n");
        }
    }
}

/// The scene as a standalone `<svg>` document fragment.
pub fn render_svg(scene: &Scene, settings: &Settings) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="calendar-heatmap-svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(settings.width),
        h = num(settings.height),
    ));
    svg.push('\n');

    for layer in Layer::ALL {
        let name = match layer {
            Layer::Items => "items",
            Layer::Labels => "labels",
            Layer::Buttons => "buttons",
        };
        svg.push_str(&format!(r#"  <g class="{}">"#, name));
        svg.push('\n');
        for id in scene.roots(layer) {
            render_element(scene, id, 2, &mut svg);
        }
        svg.push_str("  </g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

/// A complete HTML page: container, SVG, tooltip overlay and stylesheet.
pub fn render_html(scene: &Scene, settings: &Settings, tooltip: &Tooltip) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Calendar heatmap</title>
<style>{stylesheet}</style>
</head>
<body>
<div class="calendar-heatmap" style="width: {width}px">
{svg}<div class="heatmap-tooltip" style="left: {x}px; top: {y}px; opacity: {opacity}">{tooltip}</div>
</div>
</body>
</html>
"#,
        stylesheet = STYLESHEET,
        width = num(settings.width),
        svg = render_svg(scene, settings),
        x = num(tooltip.x),
        y = num(tooltip.y),
        opacity = num(tooltip.opacity),
        tooltip = tooltip.to_html(),
    )
}
