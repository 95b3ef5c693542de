use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::config::RenderConfig;
use crate::ir::{HighlightState, NodeStatus, Tree};
use crate::layout::Layout;
use crate::theme::Theme;

/// Renders one snapshot of the traversal: the layout plus the current
/// highlight overlay. The renderer only consumes derived state; it never
/// feeds anything back into the state machine.
pub fn render_svg(
    tree: &Tree,
    layout: &Layout,
    highlights: &BTreeMap<String, HighlightState>,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let mut svg = String::new();
    let pad = config.padding;
    let width = layout.width + pad * 2.0;
    let height = layout.height + pad * 2.0;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for edge in &layout.edges {
        let retired = matches!(
            highlights.get(&edge.to),
            Some(HighlightState::Deleted | HighlightState::FadedOut)
        );
        let (dash, opacity) = if retired {
            (" stroke-dasharray=\"5 3\"", 0.2)
        } else {
            ("", 1.0)
        };
        let d = points_to_path(&edge.points, pad);
        svg.push_str(&format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" opacity=\"{opacity:.2}\"{dash}/>",
            theme.link_color
        ));
    }

    for (_, node) in tree.iter() {
        let Some(slot) = layout.nodes.get(&node.id) else {
            continue;
        };
        let state = highlights
            .get(&node.id)
            .copied()
            .unwrap_or(HighlightState::None);
        let style = node_style(node.status, node.kind.is_framing(), state, theme);
        let cx = slot.x + pad;
        let cy = slot.y + pad;

        if node.kind.is_framing() {
            svg.push_str(&format!(
                "<ellipse class=\"node {}\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\" opacity=\"{:.2}\"{}/>",
                state.as_str(),
                slot.width / 2.0,
                slot.height / 2.0,
                style.fill,
                style.stroke,
                style.stroke_width,
                style.opacity,
                style.dash
            ));
        } else {
            svg.push_str(&format!(
                "<rect class=\"node {}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\" opacity=\"{:.2}\"{}/>",
                state.as_str(),
                cx - slot.width / 2.0,
                cy - slot.height / 2.0,
                slot.width,
                slot.height,
                style.fill,
                style.stroke,
                style.stroke_width,
                style.opacity,
                style.dash
            ));
        }

        let max = if node.kind.is_framing() {
            config.label_max_framing
        } else {
            config.label_max_thought
        };
        let label = truncate_label(&node.text, max, config.label_break_ratio);
        let decoration = if state == HighlightState::Deleted {
            " text-decoration=\"line-through\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" opacity=\"{:.2}\"{decoration}>{}</text>",
            cy + theme.font_size / 3.0,
            theme.font_family,
            theme.font_size,
            theme.text_color,
            style.opacity,
            escape_xml(&label)
        ));
    }

    svg.push_str("</svg>");
    svg
}

struct NodeStyle {
    fill: String,
    stroke: String,
    stroke_width: f32,
    opacity: f32,
    dash: &'static str,
}

fn node_style(
    status: NodeStatus,
    framing: bool,
    state: HighlightState,
    theme: &Theme,
) -> NodeStyle {
    let mut fill = if framing {
        theme.framing_fill.clone()
    } else {
        theme.thought_fill.clone()
    };
    let mut stroke = if framing {
        theme.framing_border.clone()
    } else {
        match status {
            NodeStatus::Productive => theme.productive_border.clone(),
            NodeStatus::Rejected => theme.rejected_border.clone(),
            NodeStatus::Neutral => theme.thought_border.clone(),
        }
    };
    let mut stroke_width = 1.4;
    let mut opacity = 1.0;
    let mut dash = "";

    match state {
        HighlightState::Current => {
            stroke = theme.current_stroke.clone();
            stroke_width = 3.0;
        }
        HighlightState::Visited => {
            fill = theme.visited_fill.clone();
        }
        HighlightState::UpwardHighlighted => {
            stroke = theme.upward_stroke.clone();
            stroke_width = 2.0;
        }
        HighlightState::Dimmed => {
            opacity = theme.dimmed_opacity;
        }
        HighlightState::Deleted => {
            stroke = theme.deleted_stroke.clone();
            opacity = theme.faded_opacity;
            dash = " stroke-dasharray=\"6 4\"";
        }
        HighlightState::FadedOut => {
            opacity = theme.faded_opacity;
        }
        HighlightState::None => {}
    }

    NodeStyle {
        fill,
        stroke,
        stroke_width,
        opacity,
        dash,
    }
}

fn points_to_path(points: &[(f32, f32)], pad: f32) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!(
        "M {:.2} {:.2}",
        points[0].0 + pad,
        points[0].1 + pad
    ));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0 + pad, point.1 + pad));
    }
    d
}

/// The original truncation rule: hard cut at `max` chars, backing up to
/// the last space when it falls in the final stretch of the label.
fn truncate_label(text: &str, max: usize, break_ratio: f32) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_string();
    }
    let truncated: String = chars[..max].iter().collect();
    let cut = match truncated.rfind(' ') {
        Some(last_space) if last_space as f32 > max as f32 * break_ratio => {
            truncated[..last_space].to_string()
        }
        _ => truncated,
    };
    format!("{cut}...")
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

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::parser::parse_tree;

    #[test]
    fn render_svg_basic() {
        let tree = parse_tree(
            r#"{"id": "r", "text": "Question", "type": "input", "children": [
                {"id": "a", "text": "Alpha", "children": []}
            ]}"#,
        )
        .unwrap();
        let layout = compute_layout(&tree, &LayoutConfig::default());
        let highlights = BTreeMap::new();
        let svg = render_svg(
            &tree,
            &layout,
            &highlights,
            &Theme::light(),
            &RenderConfig::default(),
        );
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Question"));
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn deleted_nodes_render_struck_through_and_dashed() {
        let tree = parse_tree(
            r#"{"id": "r", "text": "r", "type": "input", "children": [
                {"id": "a", "text": "rejected idea", "status": "rejected", "children": []}
            ]}"#,
        )
        .unwrap();
        let layout = compute_layout(&tree, &LayoutConfig::default());
        let mut highlights = BTreeMap::new();
        highlights.insert("a".to_string(), HighlightState::Deleted);
        let svg = render_svg(
            &tree,
            &layout,
            &highlights,
            &Theme::light(),
            &RenderConfig::default(),
        );
        assert!(svg.contains("class=\"node deleted\""));
        assert!(svg.contains("line-through"));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn truncation_respects_word_boundaries() {
        assert_eq!(truncate_label("short", 25, 0.7), "short");
        // Last space late in the window: back up to it.
        assert_eq!(
            truncate_label("supercalifragilistic idea bank", 25, 0.7),
            "supercalifragilistic..."
        );
        // Last space too early: hard cut.
        assert_eq!(
            truncate_label("a reasonably long thought label", 25, 0.7),
            "a reasonably long thought..."
        );
        assert_eq!(
            truncate_label("abcdefghijklmnopqrstuvwxyz", 10, 0.7),
            "abcdefghij..."
        );
    }

    #[test]
    fn escapes_markup_in_labels() {
        let tree = parse_tree(r#"{"id": "r", "text": "a < b & c", "children": []}"#).unwrap();
        let layout = compute_layout(&tree, &LayoutConfig::default());
        let svg = render_svg(
            &tree,
            &layout,
            &BTreeMap::new(),
            &Theme::light(),
            &RenderConfig::default(),
        );
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(!svg.contains("a < b"));
    }
}
