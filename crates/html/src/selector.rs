//! The CSS selector subset page scripts rely on.
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute selectors
//! (`[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`), descendant and child (`>`)
//! combinators, and comma-separated lists. Pseudo-classes are rejected.
use crate::dom::{Document, ElementData};
use crate::types::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found:?} at byte {pos} in {selector:?}")]
    Unexpected {
        selector: String,
        found: char,
        pos: usize,
    },
    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
    #[error("unsupported selector {0:?}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    /// `None` means universal.
    tag: Option<String>,
    simples: Vec<Simple>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut selectors = Vec::new();
        for part in source.split(',') {
            selectors.push(Parser::new(source, part).complex()?);
        }
        Ok(Self {
            source: source.trim().to_string(),
            selectors,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.element(id).is_some() && self.selectors.iter().any(|c| c.matches(doc, id))
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectorList::parse(s)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.matches_at(doc, id, self.compounds.len() - 1)
    }

    fn matches_at(&self, doc: &Document, id: NodeId, idx: usize) -> bool {
        let Some(el) = doc.element(id) else {
            return false;
        };
        if !self.compounds[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(id)
                .is_some_and(|p| self.matches_at(doc, p, idx - 1)),
            Combinator::Descendant => doc
                .ancestors(id)
                .any(|a| self.matches_at(doc, a, idx - 1)),
        }
    }
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !el.name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simples.iter().all(|s| match s {
            Simple::Id(want) => el.attribute("id") == Some(want.as_str()),
            Simple::Class(want) => el.has_class(want),
            Simple::Attr { name, op, value } => {
                let Some(actual) = el.attribute(name) else {
                    return false;
                };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => actual == value,
                    AttrOp::Includes => actual.split_ascii_whitespace().any(|w| w == value),
                    AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                    AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                    AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
                }
            }
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Parser<'a> {
    source: &'a str,
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, input: &'a str) -> Self {
        Self {
            source,
            input,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            found,
            pos: self.pos,
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Unsupported(self.source.to_string()),
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.unexpected(c)),
            }
            compounds.push(self.compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.simples.push(Simple::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    compound.simples.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    compound.simples.push(self.attribute()?);
                }
                Some(':') => return Err(SelectorError::Unsupported(self.source.to_string())),
                _ => break,
            }
        }
        if compound.tag.is_none() && compound.simples.is_empty() && !universal {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let op = match self.bump() {
            Some(']') => {
                return Ok(Simple::Attr {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(self.unexpected(c));
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(SelectorError::UnterminatedAttribute(self.source.to_string())),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                let rel = self.input[start..]
                    .find(q)
                    .ok_or_else(|| SelectorError::UnterminatedAttribute(self.source.to_string()))?;
                self.pos = start + rel + 1;
                self.input[start..start + rel].to_string()
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(SelectorError::UnterminatedAttribute(self.source.to_string()));
        }
        Ok(Simple::Attr { name, op, value })
    }
}
