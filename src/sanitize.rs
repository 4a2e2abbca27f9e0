// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Allow-list sanitizer for lesson markdown.
//!
//! Markdown may embed raw HTML. Tags on the allow-list are re-emitted in a
//! normalized form; anything else that looks like markup is escaped so it
//! renders as visible text instead of disappearing. Text between tags is
//! passed through untouched, so markdown syntax (`>`, `*`, `#`, ...) survives.
//!
//! The output is a fixed point: sanitizing it again changes nothing.

/// Tags kept as markup (block, inline and table structure).
pub const ALLOWED_TAGS: &[&str] = &[
    "address", "article", "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6",
    "hgroup", "main", "nav", "section", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "hr", "li", "ol", "p", "pre", "ul", "a", "abbr", "b", "bdi", "bdo", "br", "cite",
    "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "rb", "rp", "rt", "rtc", "ruby", "s",
    "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "caption", "col",
    "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Attributes kept on anchors. No other tag keeps any attribute.
pub const ALLOWED_ANCHOR_ATTRIBUTES: &[&str] = &["href", "target"];

/// URL schemes permitted in `href`. Relative URLs are always permitted.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "tel"];

const VOID_TAGS: &[&str] = &["br", "col", "hr", "wbr"];

/// A parsed start or end tag.
#[derive(Debug, PartialEq)]
struct Tag {
    /// Lowercased tag name
    name: String,
    closing: bool,
    self_closing: bool,
    attributes: Vec<(String, Option<String>)>,
    /// Byte length of the tag in the source, `<` through `>`
    len: usize,
}

/// Sanitize markdown/HTML against the allow-list.
pub fn sanitize_markdown(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        out.push_str(&input[text_start..i]);
        let rest = &input[i..];

        let consumed = if let Some(body) = rest.strip_prefix("<!--") {
            match body.find("-->") {
                // Comments are dropped
                Some(end) => 4 + end + 3,
                None => {
                    out.push_str("&lt;");
                    1
                }
            }
        } else {
            match parse_tag(rest) {
                Some(tag) if is_allowed(&tag.name) => {
                    write_allowed(&mut out, &tag);
                    tag.len
                }
                Some(tag) => {
                    escape_into(&mut out, &rest[..tag.len]);
                    tag.len
                }
                // A stray `<` is escaped so no later edit can turn it into a tag
                None => {
                    out.push_str("&lt;");
                    1
                }
            }
        };

        i += consumed;
        text_start = i;
    }

    out.push_str(&input[text_start..]);
    out
}

fn is_allowed(name: &str) -> bool {
    ALLOWED_TAGS.contains(&name)
}

/// Parse a tag at the start of `src` (which begins with `<`).
///
/// Returns `None` when the text is not a tag or the tag never closes.
fn parse_tag(src: &str) -> Option<Tag> {
    let bytes = src.as_bytes();
    let mut j = 1;

    let closing = bytes.get(j) == Some(&b'/');
    if closing {
        j += 1;
    }

    if !bytes.get(j)?.is_ascii_alphabetic() {
        return None;
    }

    let name_start = j;
    while j < bytes.len() && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = src[name_start..j].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        match bytes.get(j)? {
            b'>' => {
                j += 1;
                break;
            }
            b'/' => {
                if bytes.get(j + 1) == Some(&b'>') {
                    self_closing = true;
                    j += 2;
                    break;
                }
                j += 1;
                continue;
            }
            _ => {}
        }

        // Attribute name; a leading `=` is taken as part of the name
        let attr_start = j;
        j += 1;
        while j < bytes.len() && !is_attr_name_end(bytes[j]) {
            j += 1;
        }
        let attr_name = src[attr_start..j].to_ascii_lowercase();

        let mut k = j;
        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }

        let value = if bytes.get(k) == Some(&b'=') {
            k += 1;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }

            match bytes.get(k)? {
                quote @ (b'"' | b'\'') => {
                    let close = src[k + 1..].find(*quote as char)?;
                    let value = src[k + 1..k + 1 + close].to_string();
                    j = k + 1 + close + 1;
                    Some(value)
                }
                _ => {
                    let value_start = k;
                    while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>'
                    {
                        k += 1;
                    }
                    j = k;
                    Some(src[value_start..k].to_string())
                }
            }
        } else {
            None
        };

        attributes.push((attr_name, value));
    }

    Some(Tag {
        name,
        closing,
        self_closing,
        attributes,
        len: j,
    })
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':'
}

fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
}

/// Emit an allowed tag in normalized form.
fn write_allowed(out: &mut String, tag: &Tag) {
    if tag.closing {
        out.push_str("</");
        out.push_str(&tag.name);
        out.push('>');
        return;
    }

    out.push('<');
    out.push_str(&tag.name);

    if tag.name == "a" {
        let mut written: Vec<&str> = Vec::new();
        for (name, value) in &tag.attributes {
            let Some(value) = value else { continue };
            if !ALLOWED_ANCHOR_ATTRIBUTES.contains(&name.as_str()) || written.contains(&name.as_str())
            {
                continue;
            }
            if name == "href" && !is_safe_href(value) {
                continue;
            }

            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
            written.push(name);
        }
    }

    if tag.self_closing || VOID_TAGS.contains(&tag.name.as_str()) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

/// Escape markup so it renders as text.
fn escape_into(out: &mut String, raw: &str) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Whether an `href` is relative or uses an allowed scheme.
///
/// Entities are decoded and whitespace/control characters removed first,
/// since browsers ignore them when resolving the scheme.
fn is_safe_href(value: &str) -> bool {
    let normalized: String = decode_entities(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.find([':', '/', '?', '#']) {
        Some(idx) if normalized.as_bytes()[idx] == b':' => {
            ALLOWED_SCHEMES.contains(&&normalized[..idx])
        }
        _ => true,
    }
}

/// Decode numeric character references and the named entities that matter
/// for scheme detection. Unknown entities are left as-is.
fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        match decode_one(rest) {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode one entity at the start of `src`, returning the character and the
/// number of bytes consumed. The trailing `;` is optional for numeric forms.
fn decode_one(src: &str) -> Option<(char, usize)> {
    const NAMED: &[(&str, char)] = &[
        ("&colon;", ':'),
        ("&tab;", '\t'),
        ("&newline;", '\n'),
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
    ];

    if let Some(numeric) = src.strip_prefix("&#") {
        let (radix, digits_from) = match numeric.as_bytes().first()? {
            b'x' | b'X' => (16, 1),
            _ => (10, 0),
        };
        let digits: &str = &numeric[digits_from..];
        let end = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }

        let code = u32::from_str_radix(&digits[..end], radix).ok()?;
        let c = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
        let mut len = 2 + digits_from + end;
        if digits[end..].starts_with(';') {
            len += 1;
        }
        return Some((c, len));
    }

    NAMED
        .iter()
        .find(|(name, _)| {
            src.len() >= name.len()
                && src.as_bytes()[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        })
        .map(|(name, c)| (*c, name.len()))
}
