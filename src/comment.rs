/// Markdown title every bot comment starts with.
pub const COMMENT_HEADER: &str = "## 🤖 GLM Code Review Bot";

/// Build the comment body for a review. The review text is appended
/// verbatim: no escaping, no truncation.
pub fn format_comment(review: &str) -> String {
    format!("{}\n\n{}", COMMENT_HEADER, review)
}
