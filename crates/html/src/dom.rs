use crate::selector::{SelectorError, SelectorList};
use crate::types::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} cannot have children")]
    InvalidParent(NodeId),
    #[error("inserting {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("{before} is not a child of {parent}")]
    InvalidSibling { parent: NodeId, before: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<(String, Option<String>)>,
    /// Inline style declarations in source order.
    pub style: Vec<(String, String)>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document { doctype: Option<String> },
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document { .. } | NodeKind::Element(_))
    }
}

/// Arena-backed mutable document tree.
///
/// Node `0` is always the document node. Nodes created with `create_*` start detached and
/// become part of the page once appended under a connected parent.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document { doctype: None },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.record(id).map(|r| &r.kind)
    }

    pub fn set_doctype(&mut self, value: Option<String>) {
        if let NodeKind::Document { doctype } = &mut self.nodes[0].kind {
            *doctype = value;
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.record(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    // ---- construction -------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(
        &mut self,
        name: &str,
        attributes: Vec<(String, Option<String>)>,
    ) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            name: name.to_ascii_lowercase(),
            attributes,
            style: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_record = self.record(parent).ok_or(DomError::UnknownNode(parent))?;
        self.record(child).ok_or(DomError::UnknownNode(child))?;
        if !parent_record.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Appends `child` as the last child of `parent`, moving it if it is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if child == before {
            return Ok(());
        }
        if self.parent(before) != Some(parent) {
            return Err(DomError::InvalidSibling { parent, before });
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.index()].children;
        let pos = siblings
            .iter()
            .position(|k| *k == before)
            .ok_or(DomError::InvalidSibling { parent, before })?;
        siblings.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        match self.children(parent).first().copied() {
            Some(first) => self.insert_before(parent, child, first),
            None => self.append_child(parent, child),
        }
    }

    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id.index()).and_then(|r| r.parent.take()) else {
            return;
        };
        self.nodes[parent.index()].children.retain(|k| *k != id);
    }

    /// Deep-copies the subtree at `id`. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let kind = self.kind(id).ok_or(DomError::UnknownNode(id))?.clone();
        let copy = self.push(match kind {
            NodeKind::Document { .. } => return Err(DomError::InvalidParent(id)),
            other => other,
        });
        // (source, parent of its copy), popped in reverse to keep child order
        let mut stack: Vec<(NodeId, NodeId)> =
            self.children(id).iter().rev().map(|c| (*c, copy)).collect();
        while let Some((source, parent)) = stack.pop() {
            let kind = self.nodes[source.index()].kind.clone();
            let node = self.push(kind);
            self.nodes[node.index()].parent = Some(parent);
            self.nodes[parent.index()].children.push(node);
            stack.extend(self.children(source).iter().rev().map(|c| (*c, node)));
        }
        Ok(copy)
    }

    // ---- traversal ----------------------------------------------------

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// True if `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        if self.tag_name(html) == Some("body") {
            return Some(html);
        }
        self.descendants(html)
            .find(|n| self.tag_name(*n) == Some("body"))
    }

    pub fn get_element_by_id(&self, wanted: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|n| self.attribute(*n, "id") == Some(wanted))
    }

    // ---- selectors ----------------------------------------------------

    pub fn query_selector(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .find(|n| selector.matches(self, *n))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// Parses `selector` and returns every matching descendant of the document.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.query_selector_all(NodeId::ROOT, &list))
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.query_selector(NodeId::ROOT, &list))
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &SelectorList) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| selector.matches(self, *n))
    }

    // ---- attributes and classes ---------------------------------------

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = Some(value.to_string()),
            None => el
                .attributes
                .push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Adds or removes `class`. Returns true if the class list changed.
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.has_class(class) == on {
            return false;
        }
        let mut list: Vec<String> = el.classes().map(str::to_string).collect();
        if on {
            list.push(class.to_string());
        } else {
            list.retain(|c| c != class);
        }
        let joined = list.join(" ");
        self.set_attribute(id, "class", &joined);
        true
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.set_class(id, class, true)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.set_class(id, class, false)
    }

    /// Flips `class` and returns whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        let on = !self.has_class(id, class);
        self.set_class(id, class, on);
        on
    }

    // ---- inline style -------------------------------------------------

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an inline style property; an empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        if value.is_empty() {
            el.style.retain(|(k, _)| k != property);
            return;
        }
        match el.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => el.style.push((property.to_string(), value.to_string())),
        }
    }

    pub(crate) fn set_inline_style(&mut self, id: NodeId, style: Vec<(String, String)>) {
        if let Some(el) = self.element_mut(id) {
            el.style = style;
        }
    }

    // ---- text ---------------------------------------------------------

    /// Concatenation of every descendant text node, like `Node.textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            return text.clone();
        }
        for n in self.descendants(id) {
            if let Some(NodeKind::Text(text)) = self.kind(n) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let Some(NodeKind::Text(existing)) =
            self.nodes.get_mut(id.index()).map(|r| &mut r.kind)
        {
            existing.clear();
            existing.push_str(text);
            return;
        }
        if !self.is_element(id) {
            return;
        }
        let sole_child = match self.children(id) {
            &[only] if !text.is_empty() => Some(only),
            _ => None,
        };
        if let Some(only) = sole_child
            && let NodeKind::Text(existing) = &mut self.nodes[only.index()].kind
        {
            existing.clear();
            existing.push_str(text);
            return;
        }
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.nodes[node.index()].parent = Some(id);
            self.nodes[id.index()].children.push(node);
        }
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.create_element("html", Vec::new());
        let body = doc.create_element("body", Vec::new());
        let p = doc.create_element("p", vec![("class".into(), Some("lead".into()))]);
        let text = doc.create_text("Patrol");
        doc.append_child(doc.root(), html).unwrap();
        doc.append_child(html, body).unwrap();
        doc.append_child(body, p).unwrap();
        doc.append_child(p, text).unwrap();
        (doc, html, body, p)
    }

    #[test]
    fn finds_document_element_and_body() {
        let (doc, html, body, _) = sample();
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.body(), Some(body));
    }

    #[test]
    fn rejects_cycles() {
        let (mut doc, html, body, p) = sample();
        assert_eq!(
            doc.append_child(p, html),
            Err(DomError::CycleDetected { parent: p, child: html })
        );
        assert_eq!(
            doc.append_child(body, body),
            Err(DomError::CycleDetected { parent: body, child: body })
        );
    }

    #[test]
    fn text_nodes_cannot_have_children() {
        let (mut doc, _, _, p) = sample();
        let text = doc.children(p)[0];
        let other = doc.create_text("x");
        assert_eq!(doc.append_child(text, other), Err(DomError::InvalidParent(text)));
    }

    #[test]
    fn append_moves_attached_node() {
        let (mut doc, html, body, p) = sample();
        doc.append_child(html, p).unwrap();
        assert!(doc.children(body).is_empty());
        assert_eq!(doc.parent(p), Some(html));
    }

    #[test]
    fn prepend_puts_node_first() {
        let (mut doc, _, body, p) = sample();
        let bar = doc.create_element("div", Vec::new());
        doc.prepend_child(body, bar).unwrap();
        assert_eq!(doc.children(body), &[bar, p]);
    }

    #[test]
    fn class_list_operations() {
        let (mut doc, _, _, p) = sample();
        assert!(doc.add_class(p, "visible"));
        assert!(!doc.add_class(p, "visible"));
        assert_eq!(doc.attribute(p, "class"), Some("lead visible"));
        assert!(!doc.toggle_class(p, "lead"));
        assert_eq!(doc.attribute(p, "class"), Some("visible"));
        assert!(doc.remove_class(p, "visible"));
        assert_eq!(doc.attribute(p, "class"), Some(""));
    }

    #[test]
    fn inline_style_set_and_clear() {
        let (mut doc, _, body, _) = sample();
        doc.set_style(body, "overflow", "hidden");
        assert_eq!(doc.style(body, "overflow"), Some("hidden"));
        doc.set_style(body, "overflow", "");
        assert_eq!(doc.style(body, "overflow"), None);
    }

    #[test]
    fn text_content_round_trip() {
        let (mut doc, _, body, p) = sample();
        assert_eq!(doc.text_content(body), "Patrol");
        doc.set_text_content(p, "1200+");
        assert_eq!(doc.text_content(p), "1200+");
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn repeated_text_updates_reuse_the_text_node() {
        let (mut doc, _, _, p) = sample();
        let before = doc.len();
        let text = doc.children(p)[0];
        for n in 0..1000 {
            doc.set_text_content(p, &n.to_string());
        }
        assert_eq!(doc.len(), before);
        assert_eq!(doc.children(p), &[text]);
        assert_eq!(doc.text_content(p), "999");
        doc.set_text_content(p, "");
        assert!(doc.children(p).is_empty());
    }

    #[test]
    fn clone_subtree_is_deep_and_detached() {
        let (mut doc, _, body, p) = sample();
        let copy = doc.clone_subtree(body).unwrap();
        assert_eq!(doc.parent(copy), None);
        assert!(!doc.is_connected(copy));
        let copied_p = doc.children(copy)[0];
        assert_ne!(copied_p, p);
        assert_eq!(doc.text_content(copied_p), "Patrol");
        doc.add_class(copied_p, "clone");
        assert!(!doc.has_class(p, "clone"));
    }

    #[test]
    fn deep_trees_clone_without_recursion() {
        let mut doc = Document::new();
        let mut top = doc.create_text("deep");
        for _ in 0..100_000 {
            let div = doc.create_element("div", Vec::new());
            doc.append_child(div, top).unwrap();
            top = div;
        }
        let before = doc.len();
        let copy = doc.clone_subtree(top).unwrap();
        assert_eq!(doc.len(), before + 100_001);
        assert_eq!(doc.descendants(copy).count(), 100_000);
        assert_eq!(doc.text_content(copy), "deep");
    }
}
