//! HTML loading and the mutable document tree the page behaviors operate on.
pub mod dom_utils;

mod dom;
mod dom_builder;
mod entities;
mod selector;
mod tokenizer;
mod types;

use memchr::memchr;

/// Cheap sniff used before committing to a full parse of an on-disk page.
pub fn looks_like_html(input: &str) -> bool {
    let trimmed = input.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with('<') && memchr(b'>', trimmed.as_bytes()).is_some()
}

pub use crate::dom::{Ancestors, Descendants, Document, DomError, ElementData, NodeKind};
pub use crate::dom_builder::{build_document, parse_declarations, parse_document};
pub use crate::selector::{SelectorError, SelectorList};
pub use crate::tokenizer::{Tokenizer, tokenize};
pub use crate::types::{NodeId, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_markup() {
        assert!(looks_like_html("\u{feff}  <!doctype html><html></html>"));
        assert!(!looks_like_html("theme = \"dark\""));
    }
}
