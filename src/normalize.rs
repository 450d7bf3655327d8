// src/normalize.rs

/// Normalize review text: map zero-width and non-breaking spaces to plain
/// spaces, collapse whitespace runs, trim. Empty input stays empty.
pub fn clean_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let mut out = s.replace(['\u{200B}', '\u{00A0}'], " ");

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs_and_trims() {
        assert_eq!(clean_text("  Great   app \n works\tfine  "), "Great app works fine");
    }

    #[test]
    fn strips_zero_width_and_nbsp() {
        assert_eq!(clean_text("bad\u{200B}\u{00A0}update"), "bad update");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }
}
