/// Annotation prefixes that mark a bracketed remaster/reissue note, lowercase
const ANNOTATION_PREFIXES: [&str; 4] = ["remaster", "re-master", "reissue", "re-issue"];

fn is_open_bracket(c: char) -> bool {
    c == '(' || c == '['
}

fn is_close_bracket(c: char) -> bool {
    c == ')' || c == ']'
}

fn starts_with_annotation(s: &str) -> bool {
    let head = s.chars().take(9).collect::<String>().to_lowercase();
    ANNOTATION_PREFIXES.iter().any(|p| head.starts_with(p))
}

/// Strip "(Remastered 2012)"-style annotations and collapse whitespace.
///
/// An annotation starts at `(` or `[` directly followed (case-insensitively) by
/// "remaster", "re-master", "reissue" or "re-issue", and runs to the first closing
/// bracket of either kind. Whitespace before it goes with it.
pub fn clean_song_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;

    while let Some(open) = rest.find(is_open_bracket) {
        let (before, bracketed) = rest.split_at(open);
        let inner = &bracketed[1..];

        if starts_with_annotation(inner) {
            if let Some(close) = inner.find(is_close_bracket) {
                out.push_str(before.trim_end());
                rest = &inner[close + 1..];
                continue;
            }
        }

        out.push_str(before);
        out.push_str(&bracketed[..1]);
        rest = inner;
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
