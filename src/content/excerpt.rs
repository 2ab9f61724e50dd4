//! Word-bounded truncation of rendered HTML for post previews

const ELLIPSIS: &str = " …";

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Truncate HTML to at most `words` words of text
///
/// Tags do not count as words. Tags still open at the cut are closed in
/// reverse order so the fragment can be embedded in a page. Input with
/// `words` or fewer words is returned unchanged.
pub fn truncate_html_words(html: &str, words: usize) -> String {
    if words == 0 {
        return String::new();
    }

    let mut open: Vec<String> = Vec::new();
    let mut count = 0;
    let mut in_word = false;
    let mut cut: Option<(usize, Vec<String>)> = None;
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with('<') {
            let end = rest.find('>').map(|e| pos + e + 1).unwrap_or(html.len());
            if in_word {
                in_word = false;
                if count == words {
                    cut = Some((pos, open.clone()));
                }
            }
            track_tag(&html[pos..end], &mut open);
            pos = end;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() {
            if in_word {
                in_word = false;
                if count == words {
                    cut = Some((pos, open.clone()));
                }
            }
        } else if !in_word {
            if count == words {
                // A word beyond the limit: truncate at the recorded cut.
                if let Some((at, still_open)) = cut {
                    return close_at(html, at, &still_open);
                }
            }
            in_word = true;
            count += 1;
        }

        pos += c.len_utf8();
    }

    html.to_string()
}

fn close_at(html: &str, at: usize, open: &[String]) -> String {
    let mut out = String::with_capacity(at + ELLIPSIS.len() + open.len() * 8);
    out.push_str(&html[..at]);
    out.push_str(ELLIPSIS);
    for tag in open.iter().rev() {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

fn track_tag(tag: &str, open: &mut Vec<String>) {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    if inner.starts_with('!') || inner.starts_with('?') {
        return;
    }

    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name: String = inner
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect::<String>()
        .to_ascii_lowercase();
    if name.is_empty() {
        return;
    }

    if closing {
        if let Some(idx) = open.iter().rposition(|t| *t == name) {
            open.truncate(idx);
        }
    } else if !inner.ends_with('/') && !VOID_ELEMENTS.contains(&name.as_str()) {
        open.push(name);
    }
}
