//! Plain-text sanitation and slug helpers.
//!
//! All free text coming from the public surface (author names,
//! messages, titles, descriptions, category names, search queries)
//! passes through [`sanitize_text`] before validation or storage.

/// Strips HTML tags, decodes the common entities and collapses
/// whitespace runs into single spaces. The result is trimmed plain
/// text; no markup survives.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {},
        }
    }

    let decoded = decode_entities(&stripped);

    let mut out = String::with_capacity(decoded.len());
    let mut last_was_space = false;
    for ch in decoded.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

fn decode_entities(input: &str) -> String {
    // Only the entities the legacy content actually contains.
    input
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
}

/// Derives a URL slug from a title: lowercase ASCII alphanumerics,
/// with every other run of characters collapsed to a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
