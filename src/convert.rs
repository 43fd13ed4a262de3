use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;

// Optional closing `#` run is dropped: `### Iter ###` -> level 3, "Iter".
static ATX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").unwrap());
static SETEXT_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(=+|-+)\s*$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// `#` repeated to the heading level.
    #[default]
    Atx,
    /// Underlined `=` / `-` for levels 1-2, ATX below that.
    Setext,
}

impl HeadingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingStyle::Atx => "atx",
            HeadingStyle::Setext => "setext",
        }
    }
}

/// Convert an HTML fragment to Markdown.
///
/// html2md underlines h1/h2 and closes h3-h6 with a `#` run; headings are
/// first normalized to plain ATX, then rewritten for the requested style.
pub fn to_markdown(fragment: &str, style: HeadingStyle) -> String {
    let markdown = normalize_headings(&html2md::parse_html(fragment));
    match style {
        HeadingStyle::Atx => markdown,
        HeadingStyle::Setext => atx_to_setext(&markdown),
    }
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn setext_level(line: &str) -> Option<usize> {
    let caps = SETEXT_RULE_RE.captures(line)?;
    Some(if caps[1].starts_with('=') { 1 } else { 2 })
}

fn join_like(lines: Vec<String>, source: &str) -> String {
    let mut joined = lines.join("\n");
    if source.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Rewrite every heading outside fenced code as `#`-prefixed ATX.
fn normalize_headings(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_fence(line) {
            in_fence = !in_fence;
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        let underline = lines.get(i + 1).and_then(|next| setext_level(next));
        match underline {
            Some(level) if !line.trim().is_empty() && setext_level(line).is_none() => {
                out.push(format!("{} {}", "#".repeat(level), line.trim()));
                i += 2;
            }
            _ => {
                match ATX_RE.captures(line) {
                    Some(caps) => out.push(format!("{} {}", &caps[1], &caps[2])),
                    None => out.push(line.to_string()),
                }
                i += 1;
            }
        }
    }

    join_like(out, markdown)
}

/// Rewrite level 1 and 2 ATX headings as setext, leaving fenced code alone.
fn atx_to_setext(markdown: &str) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }

        let heading = if in_fence { None } else { ATX_RE.captures(line) };
        match heading {
            Some(caps) if caps[1].len() <= 2 => {
                let text = &caps[2];
                let rule = if caps[1].len() == 1 { "=" } else { "-" };
                out.push(text.to_string());
                out.push(rule.repeat(text.chars().count().max(3)));
            }
            _ => out.push(line.to_string()),
        }
    }

    join_like(out, markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADINGS: &str = "<h1>Array</h1><h2>Arrays</h2><h3>Iter</h3><p>Body</p>";

    fn is_rule_line(line: &str) -> bool {
        SETEXT_RULE_RE.is_match(line)
    }

    #[test]
    fn paragraph_becomes_plain_text() {
        assert_eq!(to_markdown("<p>Hello</p>", HeadingStyle::Atx).trim(), "Hello");
    }

    #[test]
    fn atx_heading_levels() {
        let md = to_markdown(HEADINGS, HeadingStyle::Atx);
        let lines: Vec<&str> = md.lines().collect();

        assert!(lines.contains(&"# Array"), "got {md:?}");
        assert!(lines.contains(&"## Arrays"), "got {md:?}");
        assert!(lines.contains(&"### Iter"), "got {md:?}");
        assert!(md.contains("Body"));
        assert!(!lines.iter().any(|l| is_rule_line(l)), "underline left in {md:?}");
        assert!(!lines.iter().any(|l| l.ends_with(" #") || l.ends_with("##")));
    }

    #[test]
    fn underlined_and_closed_headings_normalize_to_atx() {
        let md = "Array\n==========\n\nArrays\n----------\n\n### Iter ###\n\nBody";
        assert_eq!(normalize_headings(md), "# Array\n\n## Arrays\n\n### Iter\n\nBody");
    }

    #[test]
    fn hash_inside_heading_text_is_kept() {
        assert_eq!(normalize_headings("### Module C#"), "### Module C#");
    }

    #[test]
    fn normalize_leaves_fenced_code() {
        let md = "```\ntype t\n-------\n### x ###\n```\n";
        assert_eq!(normalize_headings(md), md);
    }

    #[test]
    fn setext_underlines_top_levels_only() {
        let md = to_markdown(HEADINGS, HeadingStyle::Setext);
        let lines: Vec<&str> = md.lines().collect();

        // rule length follows the title, so it comes from the rewrite
        let array = lines.iter().position(|l| *l == "Array").unwrap();
        assert_eq!(lines[array + 1], "=====");
        let arrays = lines.iter().position(|l| *l == "Arrays").unwrap();
        assert_eq!(lines[arrays + 1], "------");
        assert!(lines.contains(&"### Iter"));
        assert!(!md.contains("# Array"));
    }

    #[test]
    fn setext_leaves_fenced_code() {
        let md = "```\n# not a heading\n```\n## Real\n";
        assert_eq!(atx_to_setext(md), "```\n# not a heading\n```\nReal\n----\n");
    }

    #[test]
    fn short_titles_get_minimum_rule() {
        assert_eq!(atx_to_setext("# A"), "A\n===");
    }

    #[test]
    fn conversion_is_deterministic() {
        let html = std::fs::read_to_string("tests/fixtures/array.html").unwrap();
        assert_eq!(
            to_markdown(&html, HeadingStyle::Atx),
            to_markdown(&html, HeadingStyle::Atx)
        );
    }

    #[test]
    fn style_names_match_config_values() {
        assert_eq!(HeadingStyle::Atx.as_str(), "atx");
        assert_eq!(HeadingStyle::Setext.as_str(), "setext");
        assert_eq!(HeadingStyle::default(), HeadingStyle::Atx);
    }
}
