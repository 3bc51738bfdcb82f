use regex_lite::Regex;
use static_init::dynamic;

pub mod gemini;
pub mod system_menus;

/// Whether a scrape hint should be treated as a URL (and therefore fed to the
/// search-grounded stage) rather than as free-text context.
pub fn looks_like_url(hint: &str) -> bool {
    #[dynamic]
    static RE: Regex = Regex::new(r"^(?i)(https?://|www\.)").unwrap();
    RE.is_match(hint.trim())
}

pub fn escape_markdown_v2(input: &str) -> String {
    // all 'special' chars have to be escaped when using telegram markdown_v2
    input
        .replace('.', r"\.")
        .replace('!', r"\!")
        .replace('+', r"\+")
        .replace('-', r"\-")
        .replace('<', r"\<")
        .replace('>', r"\>")
        .replace('(', r"\(")
        .replace(')', r"\)")
        .replace('=', r"\=")
        .replace('#', r"\#")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_hints() {
        assert!(looks_like_url("https://order.cava.com/"));
        assert!(looks_like_url("http://www.bordercafe.com"));
        assert!(looks_like_url("  www.example.com/menu"));
        assert!(looks_like_url("HTTPS://EXAMPLE.COM"));
    }

    #[test]
    fn free_text_hints() {
        assert!(!looks_like_url(""));
        assert!(!looks_like_url("a diner on route 46"));
        assert!(!looks_like_url("menu at example.com"));
    }
}
