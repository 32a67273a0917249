use crate::dom::Document;
use crate::tokenizer::tokenize;
use crate::types::{NodeId, Token};

/// Builds a [`Document`] from a token stream.
///
/// Tree construction is deliberately simple: start tags nest under the innermost open element,
/// an end tag closes the nearest open element with the same name (and everything opened after
/// it), unmatched end tags are ignored and anything still open at EOF is closed implicitly.
pub fn build_document(tokens: Vec<Token>) -> Document {
    let mut doc = Document::new();
    let mut open: Vec<NodeId> = vec![doc.root()];

    for token in tokens {
        let parent = *open.last().unwrap_or(&NodeId::ROOT);
        match token {
            Token::Doctype(value) => doc.set_doctype(Some(value)),
            Token::StartTag {
                name,
                mut attributes,
                self_closing,
            } => {
                let style = take_inline_style(&mut attributes);
                let el = doc.create_element(&name, attributes);
                if !style.is_empty() {
                    doc.set_inline_style(el, style);
                }
                attach(&mut doc, parent, el);
                if !self_closing {
                    open.push(el);
                }
            }
            Token::EndTag(name) => {
                let depth = open
                    .iter()
                    .rposition(|id| doc.tag_name(*id) == Some(name.as_str()));
                match depth {
                    Some(d) => open.truncate(d),
                    None => {
                        log::trace!(target: "html.dom_builder", "ignoring stray </{name}>");
                    }
                }
            }
            Token::Text(text) => {
                if parent == NodeId::ROOT && text.trim().is_empty() {
                    continue;
                }
                let node = doc.create_text(text);
                attach(&mut doc, parent, node);
            }
            Token::Comment(text) => {
                let node = doc.create_comment(text);
                attach(&mut doc, parent, node);
            }
        }
    }
    doc
}

fn attach(doc: &mut Document, parent: NodeId, child: NodeId) {
    // Both nodes come straight from this builder, so the insert cannot fail.
    if let Err(err) = doc.append_child(parent, child) {
        log::warn!(target: "html.dom_builder", "dropping node: {err}");
    }
}

fn take_inline_style(attributes: &mut Vec<(String, Option<String>)>) -> Vec<(String, String)> {
    let Some(pos) = attributes.iter().position(|(k, _)| k == "style") else {
        return Vec::new();
    };
    let (_, value) = attributes.remove(pos);
    parse_declarations(value.as_deref().unwrap_or(""))
}

/// `"color: red; display:none"` -> `[("color", "red"), ("display", "none")]`
pub fn parse_declarations(input: &str) -> Vec<(String, String)> {
    input
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

pub fn parse_document(input: &str) -> Document {
    build_document(tokenize(input))
}
