//! HTML rendering for the highlight view.
//!
//! The server escapes the paste and tags it with a `language-*` class; the
//! actual coloring runs in the browser via highlight.js, so the server never
//! parses the language itself.

/// Render a text paste as a standalone highlight page.
///
/// # Arguments
/// - `code`: Paste text.
/// - `language`: Requested language segment from the URL.
///
/// # Returns
/// A complete HTML document.
pub fn highlight_page(code: &str, language: &str) -> String {
    let language = sanitize_language(language);
    let escaped = escape_html(code);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css">
  <script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js"></script>
  <link href="https://fonts.googleapis.com/css2?family=JetBrains+Mono&display=swap" rel="stylesheet">
  <style>
    code {{
      font-family: 'JetBrains Mono', monospace;
      font-size: 14px;
    }}
  </style>
</head>
<body class="hljs">
  <pre><code class="language-{language}">{escaped}</code></pre>
  <script>hljs.highlightAll();</script>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The language segment lands in a class attribute; anything outside a small
/// identifier charset falls back to plaintext.
fn sanitize_language(language: &str) -> String {
    let cleaned: String = language
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+'))
        .collect();
    if cleaned.chars().any(|ch| ch.is_ascii_alphanumeric()) {
        cleaned.to_ascii_lowercase()
    } else {
        "plaintext".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_contains_escaped_code_and_language_class() {
        let page = highlight_page("fn main() { println!(\"<hi>\"); }", "rust");
        assert!(page.contains("language-rust"));
        assert!(page.contains("&lt;hi&gt;"));
        assert!(!page.contains("<hi>"));
    }

    #[test]
    fn markup_in_code_is_never_live() {
        let page = highlight_page("<script>alert(1)</script>", "html");
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn language_segment_is_sanitized() {
        let page = highlight_page("x", "rust\"><script>");
        assert!(page.contains("language-rustscript"));
        let fallback = highlight_page("x", "\"><!--");
        assert!(fallback.contains("language-plaintext"));
    }
}
