use crate::dom::{Document, NodeKind};
use crate::types::NodeId;

fn shorten(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let trimmed = flat.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

pub fn inline_style_text(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn outline_line(doc: &Document, id: NodeId, indent: &str) -> Option<String> {
    let line = match doc.kind(id)? {
        NodeKind::Document { doctype } => match doctype {
            Some(dt) => format!("{indent}<!DOCTYPE {dt}>"),
            None => format!("{indent}#document"),
        },
        NodeKind::Element(el) => {
            let mut line = format!("{indent}<{}", el.name);
            for key in ["id", "class", "href", "data-theme"] {
                if let Some(v) = el.attribute(key).filter(|v| !v.is_empty()) {
                    line.push_str(&format!(r#" {key}="{v}""#));
                }
            }
            line.push('>');
            let style = inline_style_text(&el.style);
            if !style.is_empty() {
                line.push_str(&format!("  /* {style} */"));
            }
            line
        }
        NodeKind::Text(text) => {
            let t = shorten(text, 40);
            if t.is_empty() {
                return None;
            }
            format!("{indent}\"{t}\"")
        }
        NodeKind::Comment(text) => format!("{indent}<!-- {} -->", shorten(text, 40)),
    };
    Some(line)
}

/// One indented line per node, at most `cap` lines.
pub fn outline(doc: &Document, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![(doc.root(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if out.len() == cap {
            break;
        }
        let Some(line) = outline_line(doc, id, &"  ".repeat(depth)) else {
            continue;
        };
        out.push(line);
        stack.extend(doc.children(id).iter().rev().map(|c| (*c, depth + 1)));
    }
    out
}
