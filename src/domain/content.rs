//! Rich-text helpers shared by validators.

/// True when the HTML body has no visible text once tags and `&nbsp;` are removed.
pub fn is_content_empty(html: &str) -> bool {
    strip_nbsp(&strip_tags(html)).trim().is_empty()
}

/// Hashtags may only contain ASCII word characters and Hangul syllables.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ('가'..='힣').contains(&ch))
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find('>') {
            Some(end) => rest = &tail[end + 1..],
            None => {
                // Unterminated `<` is literal text.
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_nbsp(text: &str) -> String {
    const ENTITY: &str = "&nbsp;";
    let mut out = String::with_capacity(text.len());
    let mut index = 0;
    while index < text.len() {
        let candidate = text.get(index..index + ENTITY.len());
        if candidate.is_some_and(|chunk| chunk.eq_ignore_ascii_case(ENTITY)) {
            index += ENTITY.len();
            continue;
        }
        let Some(ch) = text[index..].chars().next() else {
            break;
        };
        out.push(ch);
        index += ch.len_utf8();
    }
    out
}
