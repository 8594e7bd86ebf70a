//! Instruction bodies: markdown to sanitized HTML, and sibling navigation

use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;

use crate::models::InstructionSummary;

/// Render user-authored markdown to HTML safe to embed in a page
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut unsafe_html = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut unsafe_html, Parser::new_ext(body, options));
    ammonia::clean(&unsafe_html)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SiblingNav {
    pub prev_id: Option<i64>,
    pub next_id: Option<i64>,
}

/// Neighbours of `current_id` among the instructions of the same item.
///
/// Siblings arrive newest first, so "previous" is the entry after the
/// current one and "next" the entry before it.
pub fn sibling_navigation(siblings: &[InstructionSummary], current_id: i64) -> SiblingNav {
    let Some(idx) = siblings.iter().position(|s| s.id == current_id) else {
        return SiblingNav::default();
    };
    SiblingNav {
        prev_id: siblings.get(idx + 1).map(|s| s.id),
        next_id: idx.checked_sub(1).and_then(|i| siblings.get(i)).map(|s| s.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn strips_scripts_and_handlers() {
        let html = render_markdown("# Setup\n\n<script>alert(1)</script>\n\n<img src=\"x.png\" onerror=\"alert(1)\">");
        assert!(html.contains("<h1>Setup</h1>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("onerror"));
    }

    fn summaries(ids: &[i64]) -> Vec<InstructionSummary> {
        ids.iter()
            .map(|&id| InstructionSummary { id, ..Default::default() })
            .collect()
    }

    #[test]
    fn navigation_follows_newest_first_order() {
        let siblings = summaries(&[30, 20, 10]);
        assert_eq!(
            sibling_navigation(&siblings, 20),
            SiblingNav { prev_id: Some(10), next_id: Some(30) }
        );
        assert_eq!(sibling_navigation(&siblings, 30).next_id, None);
        assert_eq!(sibling_navigation(&siblings, 10).prev_id, None);
        assert_eq!(sibling_navigation(&siblings, 99), SiblingNav::default());
    }
}
