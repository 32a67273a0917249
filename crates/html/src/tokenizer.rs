//! Small forgiving HTML tokenizer for documentation pages.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and are lower-cased. `<script>` and
//! `<style>` bodies are raw text. There is no HTML5 parse-error recovery: stray `<` that do not
//! start a tag are kept as text.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_ignore_ascii_case(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes
        .get(at..at + needle.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(needle))
}

/// Find `</name` followed by optional ASCII whitespace and `>`.
/// Returns (start of the close tag, end just past `>`).
fn find_raw_text_end(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case(bytes, i + 2, name.as_bytes())
        {
            let mut k = i + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).run()
}

pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Token> {
        let input = self.input;
        let bytes = input.as_bytes();
        // Slices are only cut at ASCII structural bytes, so they stay on char boundaries.
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'<' {
                self.text_until_tag();
                continue;
            }
            let rest = &self.input[self.pos..];
            if rest.starts_with(COMMENT_START) {
                self.comment();
            } else if starts_with_ignore_ascii_case(bytes, self.pos, b"<!doctype") {
                self.doctype();
            } else if bytes.get(self.pos + 1) == Some(&b'/') {
                self.end_tag();
            } else if bytes.get(self.pos + 1).copied().is_some_and(is_name_byte) {
                self.start_tag();
            } else {
                self.push_text("<");
                self.pos += 1;
            }
        }
        log::trace!(target: "html.tokenizer", "emitted {} tokens", self.out.len());
        self.out
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(&decoded);
        } else {
            self.out.push(Token::Text(decoded));
        }
    }

    fn text_until_tag(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        let end = memchr(b'<', &bytes[self.pos..])
            .map(|rel| self.pos + rel)
            .unwrap_or(bytes.len());
        let raw = &input[self.pos..end];
        self.push_text(raw);
        self.pos = end;
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.input.len();
            }
        }
    }

    fn doctype(&mut self) {
        let rest = &self.input[self.pos + 2..];
        match rest.find('>') {
            Some(end) => {
                let value = rest[..end]
                    .get("doctype".len()..)
                    .unwrap_or("")
                    .trim()
                    .to_string();
                self.out.push(Token::Doctype(value));
                self.pos += 2 + end + 1;
            }
            None => self.pos = self.input.len(),
        }
    }

    fn read_name(&mut self) -> String {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && is_name_byte(bytes[self.pos]) {
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        let input = self.input;
        let bytes = input.as_bytes();
        self.pos = memchr(b'>', &bytes[self.pos..])
            .map(|rel| self.pos + rel + 1)
            .unwrap_or(bytes.len());
        if !name.is_empty() {
            self.out.push(Token::EndTag(name));
        }
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let mut attributes = Vec::new();
        let mut self_closing = false;
        let input = self.input;
        let bytes = input.as_bytes();

        loop {
            self.skip_whitespace();
            let Some(&b) = bytes.get(self.pos) else {
                break;
            };
            if b == b'>' {
                self.pos += 1;
                break;
            }
            if b == b'/' {
                self.pos += 1;
                if bytes.get(self.pos) == Some(&b'>') {
                    self_closing = true;
                    self.pos += 1;
                    break;
                }
                continue;
            }
            let attr_name = self.read_name();
            if attr_name.is_empty() {
                // Unsupported attribute character; skip it whole.
                self.pos += input[self.pos..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            self.skip_whitespace();
            let value = if bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.attribute_value())
            } else {
                None
            };
            attributes.push((attr_name, value));
        }

        if is_void_element(&name) {
            self_closing = true;
        }
        let raw_text = !self_closing && (name == "script" || name == "style");
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if raw_text {
            let body = &input[self.pos..];
            match find_raw_text_end(body, &name) {
                Some((start, end)) => {
                    if start > 0 {
                        self.out.push(Token::Text(body[..start].to_string()));
                    }
                    self.pos += end;
                }
                None => {
                    // Unterminated: the rest of the input is raw text.
                    if !body.is_empty() {
                        self.out.push(Token::Text(body.to_string()));
                    }
                    self.pos = self.input.len();
                }
            }
            self.out.push(Token::EndTag(name));
        }
    }

    fn attribute_value(&mut self) -> String {
        let input = self.input;
        let bytes = input.as_bytes();
        match bytes.get(self.pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let start = self.pos + 1;
                let end = memchr(quote, &bytes[start..])
                    .map(|rel| start + rel)
                    .unwrap_or(bytes.len());
                self.pos = (end + 1).min(bytes.len());
                decode_entities(&input[start..end])
            }
            _ => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && bytes[self.pos] != b'>'
                {
                    if bytes[self.pos] == b'/' && bytes.get(self.pos + 1) == Some(&b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                decode_entities(&input[start..self.pos])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, Option<&str>)]) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            self_closing: false,
        }
    }

    #[test]
    fn tokenizes_elements_with_attributes() {
        let tokens = tokenize(r#"<DIV class="article-block" id=intro hidden>Hi</div>"#);
        assert_eq!(
            tokens,
            vec![
                start(
                    "div",
                    &[
                        ("class", Some("article-block")),
                        ("id", Some("intro")),
                        ("hidden", None)
                    ]
                ),
                Token::Text("Hi".into()),
                Token::EndTag("div".into()),
            ]
        );
    }

    #[test]
    fn doctype_and_comments() {
        let tokens = tokenize("<!DOCTYPE html><!-- nav --><p>x</p>");
        assert_eq!(tokens[0], Token::Doctype("html".into()));
        assert_eq!(tokens[1], Token::Comment(" nav ".into()));
    }

    #[test]
    fn void_elements_self_close() {
        let tokens = tokenize(r#"<input id="docs-search" type="search"><br/>"#);
        assert!(matches!(
            &tokens[0],
            Token::StartTag { name, self_closing: true, .. } if name == "input"
        ));
        assert!(matches!(
            &tokens[1],
            Token::StartTag { name, self_closing: true, .. } if name == "br"
        ));
    }

    #[test]
    fn script_body_is_raw_text() {
        let tokens = tokenize("<script>if (a < b) { x(); }</ScRiPt ><p>after</p>");
        assert_eq!(tokens[1], Token::Text("if (a < b) { x(); }".into()));
        assert_eq!(tokens[2], Token::EndTag("script".into()));
        assert_eq!(tokens[3], start("p", &[]));
    }

    #[test]
    fn unterminated_style_consumes_rest() {
        let tokens = tokenize("<style>.a{}");
        assert_eq!(tokens[1], Token::Text(".a{}".into()));
        assert_eq!(tokens[2], Token::EndTag("style".into()));
    }

    #[test]
    fn stray_angle_bracket_stays_text() {
        let tokens = tokenize("<p>1 < 2 &amp; 3</p>");
        assert_eq!(tokens[1], Token::Text("1 < 2 & 3".into()));
    }

    #[test]
    fn utf8_text_survives() {
        let tokens = tokenize("<button>📑 Spis treści</button>");
        assert_eq!(tokens[1], Token::Text("📑 Spis treści".into()));
    }
}
