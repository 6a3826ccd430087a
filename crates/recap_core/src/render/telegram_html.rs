//! Markdown to Telegram-flavored HTML.
//!
//! Telegram's HTML parse mode accepts only a small tag set, so this is a
//! line-oriented rewrite rather than a full markdown render: headings and
//! `**bold**` runs become `<b>` tags, bullets are normalized to `- `, and
//! everything else is escaped text.

/// Convert markdown to text safe for `parse_mode=HTML`.
pub fn markdown_to_telegram_html(markdown: &str) -> String {
    let mut lines = Vec::new();
    for raw in markdown.split('\n') {
        let stripped = raw.trim();
        if stripped.is_empty() {
            lines.push(String::new());
        } else if stripped.starts_with('#') {
            let heading = stripped.trim_start_matches('#').trim();
            lines.push(format!("<b>{}</b>", escape_html(heading)));
        } else if let Some(content) = bullet_content(stripped) {
            lines.push(format!("- {}", format_inline(content)));
        } else {
            lines.push(format_inline(stripped));
        }
    }
    lines.join("\n")
}

/// Escape the characters Telegram's HTML parser treats specially.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn bullet_content(stripped: &str) -> Option<&str> {
    let rest = stripped
        .strip_prefix('-')
        .or_else(|| stripped.strip_prefix('*'))?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn format_inline(text: &str) -> String {
    let mut out = String::new();
    for span in split_marker(text, "**") {
        match span {
            Span::Bold(inner) => push_bold(&mut out, inner),
            Span::Text(plain) => {
                for nested in split_marker(plain, "__") {
                    match nested {
                        Span::Bold(inner) => push_bold(&mut out, inner),
                        Span::Text(rest) => out.push_str(&escape_html(rest)),
                    }
                }
            }
        }
    }
    out
}

fn push_bold(out: &mut String, inner: &str) {
    out.push_str("<b>");
    out.push_str(&escape_html(inner));
    out.push_str("</b>");
}

enum Span<'a> {
    Text(&'a str),
    Bold(&'a str),
}

/// Split on non-empty `<marker>content<marker>` pairs, shortest match first.
fn split_marker<'a>(text: &'a str, marker: &str) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(marker) {
        let after = &rest[open + marker.len()..];
        let close = match after.find(marker) {
            Some(0) => match after.get(1..).and_then(|tail| tail.find(marker)) {
                Some(found) => found + 1,
                None => break,
            },
            Some(found) => found,
            None => break,
        };
        spans.push(Span::Text(&rest[..open]));
        spans.push(Span::Bold(&after[..close]));
        rest = &after[close + marker.len()..];
    }
    spans.push(Span::Text(rest));
    spans
}
