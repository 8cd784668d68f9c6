//! Hashtag and mention handling
//!
//! Hashtags and mentions are edited as free text next to the post body and
//! split into tokens only when the payload is built.

use regex::Regex;
use std::sync::OnceLock;

fn hashtag_regex() -> &'static Regex {
    static HASHTAG: OnceLock<Regex> = OnceLock::new();
    HASHTAG.get_or_init(|| Regex::new(r"#[A-Za-z0-9_]+").expect("hashtag regex should compile"))
}

fn bold_regex() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex should compile"))
}

/// Whitespace-separated tokens that start with `#`
pub fn parse_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| t.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Whitespace-separated tokens that start with `@`
pub fn parse_mentions(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| t.starts_with('@'))
        .map(str::to_string)
        .collect()
}

/// Mentions turned into YouTube tags: `@` stripped, empties dropped
pub fn mentions_as_tags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.strip_prefix('@').unwrap_or(t))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Content with its hashtags pulled out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub content: String,
    pub hashtags: Vec<String>,
}

/// Strip every `#tag` out of the text.
///
/// Lines are trimmed and collapsed; a line left empty is dropped. Tags are
/// returned once each in first-seen order.
pub fn extract_hashtags_from_content(text: &str) -> ExtractedContent {
    let re = hashtag_regex();
    let mut lines = Vec::new();
    let mut hashtags: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let found: Vec<&str> = re.find_iter(trimmed).map(|m| m.as_str()).collect();

        if found.is_empty() {
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
            continue;
        }

        for tag in found {
            if !hashtags.iter().any(|t| t == tag) {
                hashtags.push(tag.to_string());
            }
        }

        let stripped = re.replace_all(trimmed, "");
        let clean = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if !clean.is_empty() {
            lines.push(clean);
        }
    }

    ExtractedContent {
        content: lines.join("\n").trim().to_string(),
        hashtags,
    }
}

/// Split generated copy into body and hashtags.
///
/// Lines made only of hashtags are moved out of the body. When no such line
/// exists the body is kept as-is and every inline tag is reported instead.
pub fn split_generated_content(text: &str) -> ExtractedContent {
    let re = hashtag_regex();
    let all: Vec<String> = re.find_iter(text).map(|m| m.as_str().to_string()).collect();
    if all.is_empty() {
        return ExtractedContent {
            content: text.to_string(),
            hashtags: Vec::new(),
        };
    }

    let mut body = Vec::new();
    let mut tag_lines = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim();
        let tags: Vec<&str> = re.find_iter(trimmed).map(|m| m.as_str()).collect();
        if !tags.is_empty() && re.replace_all(trimmed, "").trim().is_empty() {
            tag_lines.extend(tags.into_iter().map(str::to_string));
        } else {
            body.push(line);
        }
    }

    ExtractedContent {
        content: body.join("\n").trim().to_string(),
        hashtags: if tag_lines.is_empty() { all } else { tag_lines },
    }
}

/// Append suggestions to a free-text field, prefixing each with `prefix`
pub fn append_suggestions(existing: &str, suggestions: &[String], prefix: char) -> String {
    let additions: Vec<String> = suggestions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with(prefix) {
                s.to_string()
            } else {
                format!("{}{}", prefix, s)
            }
        })
        .filter(|s| !existing.split_whitespace().any(|t| t == s))
        .collect();

    match (existing.trim().is_empty(), additions.is_empty()) {
        (_, true) => existing.to_string(),
        (true, false) => additions.join(" "),
        (false, false) => format!("{} {}", existing.trim_end(), additions.join(" ")),
    }
}

/// Map ASCII letters and digits to Mathematical Bold code points
pub fn to_unicode_bold(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mapped = match c {
                'A'..='Z' => char::from_u32(0x1D400 + (c as u32 - 'A' as u32)),
                'a'..='z' => char::from_u32(0x1D41A + (c as u32 - 'a' as u32)),
                '0'..='9' => char::from_u32(0x1D7CE + (c as u32 - '0' as u32)),
                _ => None,
            };
            mapped.unwrap_or(c)
        })
        .collect()
}

/// Render `**bold**` spans with bold code points, since social feeds do not render markdown
pub fn render_markdown_bold(content: &str) -> String {
    bold_regex()
        .replace_all(content, |caps: &regex::Captures<'_>| to_unicode_bold(&caps[1]))
        .into_owned()
}
