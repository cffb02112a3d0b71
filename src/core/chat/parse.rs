//! Post-validation of chat-completion replies.
//!
//! List replies come back as free text and are filtered line by line;
//! "structured" replies are requested as JSON but frequently arrive
//! wrapped in markdown fences or not as JSON at all, so parsing degrades
//! to the raw text instead of failing the call.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of entries returned by a list operation.
pub const MAX_LIST_ITEMS: usize = 10;

/// Leading enumeration marker ("1." / "1、") the model sometimes adds
/// despite being told not to.
static ENUMERATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.、]").expect("valid enumeration marker pattern"));

/// Markdown code-fence wrappers around JSON replies.
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*|\s*```").expect("valid code fence pattern"));

/// Split a free-text list reply into validated entries.
///
/// Lines are trimmed; blank lines, enumerated lines and lines that do not
/// contain `target` are discarded. At most [`MAX_LIST_ITEMS`] entries
/// survive. Under-delivery is not an error.
pub fn filter_list_reply(content: &str, target: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !ENUMERATION_MARKER.is_match(line))
        .filter(|line| line.contains(target))
        .take(MAX_LIST_ITEMS)
        .map(str::to_string)
        .collect()
}

/// Remove markdown code-fence wrappers and surrounding whitespace.
pub fn strip_code_fences(content: &str) -> String {
    CODE_FENCE.replace_all(content, "").trim().to_string()
}

/// Explanation of a word with usage examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordExplanation {
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Outcome of parsing a reply that was requested as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply {
    /// The reply parsed as the requested JSON object.
    Structured(WordExplanation),
    /// The reply was not valid JSON; the raw text is kept.
    Fallback(String),
}

impl StructuredReply {
    /// Flatten into `(explanation, examples)`; the fallback becomes the
    /// explanation with no examples.
    pub fn into_parts(self) -> (String, Vec<String>) {
        match self {
            StructuredReply::Structured(parsed) => (parsed.explanation, parsed.examples),
            StructuredReply::Fallback(raw) => (raw, Vec::new()),
        }
    }
}

/// Parse a word-explanation reply, degrading to the raw text on malformed JSON.
pub fn parse_word_explanation(content: &str) -> StructuredReply {
    let clean = strip_code_fences(content);
    match serde_json::from_str::<WordExplanation>(&clean) {
        Ok(parsed) => StructuredReply::Structured(parsed),
        Err(_) => StructuredReply::Fallback(content.to_string()),
    }
}

/// A generated educational story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub title: String,
    pub story: String,
}

#[derive(Debug, Deserialize)]
struct StoryReply {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    story: Option<String>,
}

/// Parse a story reply. Missing or unparseable fields fall back to a
/// templated title ("{name}的故事") and the raw reply text respectively.
pub fn parse_story(content: &str, name: &str) -> Story {
    let fallback_title = || format!("{name}的故事");

    let clean = strip_code_fences(content);
    match serde_json::from_str::<StoryReply>(&clean) {
        Ok(reply) => Story {
            title: reply
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(fallback_title),
            story: reply
                .story
                .filter(|story| !story.is_empty())
                .unwrap_or_else(|| content.to_string()),
        },
        Err(_) => Story {
            title: fallback_title(),
            story: content.to_string(),
        },
    }
}
