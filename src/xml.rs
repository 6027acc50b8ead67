use std::collections::HashSet;

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escape text for use in element content or a double-quoted attribute.
///
/// Dataset strings (names, cities, subtypes) are user supplied, so characters
/// that XML 1.0 cannot carry are dropped instead of producing an unparsable
/// document.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Make an id usable inside `id="…"` and `url(#…)` references.
pub fn dom_id(prefix: &str, raw: &str) -> String {
    let mut id = String::with_capacity(prefix.len() + raw.len() + 1);
    id.push_str(prefix);
    id.push('-');
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            id.push(c);
        } else {
            id.push('_');
        }
    }
    id
}

/// Hands out [`dom_id`]s that are unique within one document. A sanitized id
/// already taken gets a `-2`, `-3`, ... suffix.
#[derive(Debug, Default)]
pub struct DomIds {
    used: HashSet<String>,
}

impl DomIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, prefix: &str, raw: &str) -> String {
        let base = dom_id(prefix, raw);
        let mut id = base.clone();
        let mut n = 2;
        while !self.used.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }
        id
    }
}

/// First character of a label, uppercased, escaped. Empty labels give "".
pub fn initial(label: &str) -> String {
    label
        .chars()
        .find(|c| is_valid_xml_char(*c) && !c.is_whitespace())
        .map(|c| escape_xml(&c.to_uppercase().collect::<String>()))
        .unwrap_or_default()
}
