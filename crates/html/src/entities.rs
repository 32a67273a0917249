/// Decode the small set of character references documentation pages actually use.
///
/// Named references come from [`NAMED`]; numeric references (`&#215;`, `&#xD7;`) decode
/// only when semicolon-terminated and a valid Unicode scalar. Anything else is copied through
/// unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    if memchr::memchr(b'&', s.as_bytes()).is_none() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("copy", '©'),
    ("mdash", '—'),
    ("ndash", '–'),
    ("hellip", '…'),
    ("laquo", '«'),
    ("raquo", '»'),
];

// 0x10FFFF / 1114111
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

/// `tail` starts with `&`. Returns the decoded char and the number of bytes consumed.
fn decode_one(tail: &str) -> Option<(char, usize)> {
    let body = &tail[1..];
    let semi = body
        .bytes()
        .take(MAX_DEC_DIGITS + 2)
        .position(|b| b == b';')?;
    let name = &body[..semi];
    let consumed = semi + 2;

    if let Some(num) = name.strip_prefix('#') {
        let (digits, radix, max) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, MAX_HEX_DIGITS),
            None => (num, 10, MAX_DEC_DIGITS),
        };
        if digits.is_empty()
            || digits.len() > max
            || !digits.bytes().all(|b| (b as char).is_digit(radix))
        {
            return None;
        }
        let ch = u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)?;
        return Some((ch, consumed));
    }

    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ch)| (*ch, consumed))
}
