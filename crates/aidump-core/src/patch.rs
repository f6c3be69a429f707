//! Parser for AI responses containing whole-file replacements
//!
//! A response is a sequence of fenced code blocks, each preceded somewhere by
//! a mention of the file path it replaces. The last path-like token between
//! the previous block and the current opening fence names the file.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([`~]{3,})(\S*)").expect("valid fence regex"));
static FENCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`~]{3,}").expect("valid marker regex"));
static OUTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[a-zA-Z0-9]*\n(.*?)\n```\z").expect("valid outer block regex")
});
static FILE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\./)?(?:[\w\-.]+/)*[\w\-.]+\.[A-Za-z0-9]+$").expect("valid path regex")
});

/// Characters markdown may wrap around a path mention
const MARKDOWN_WRAPPERS: &[char] = &['*', '`', '_', '[', ']', '(', ')', '<', '>', '!'];

/// A file path and the full new content for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchBlock {
    pub path: String,
    pub content: String,
}

#[derive(Debug)]
struct CodeBlock {
    opening_start: usize,
    content_end: usize,
    content: String,
}

#[derive(Debug)]
struct OpenFence {
    marker: String,
    line: usize,
    content_start: usize,
    opening_start: usize,
}

/// Extract `(path, content)` pairs from an AI response
pub fn parse_patch(text: &str) -> Vec<PatchBlock> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let stripped = text.trim();
    let source = match OUTER_BLOCK.captures(stripped).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text,
    };

    let blocks = find_top_level_blocks(source);
    let mut patches = Vec::new();
    let mut last_block_end = 0;

    for block in blocks {
        let search_space = source
            .get(last_block_end..block.opening_start)
            .unwrap_or_default();

        match extract_path(search_space) {
            Some(path) => patches.push(PatchBlock {
                path,
                content: block.content.trim().to_string(),
            }),
            None => {
                let preview: String = block
                    .content
                    .trim()
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(70)
                    .collect();
                warn!(
                    "Skipping code block without a valid file path: '{}...'",
                    preview
                );
            }
        }

        last_block_end = match FENCE_MARKER.find(&source[block.content_end..]) {
            Some(closing) => block.content_end + closing.end(),
            None => block.content_end,
        };
    }

    patches
}

/// Top-level fenced blocks in order of appearance. Nested fences are
/// tracked so an inner block's closer does not end the outer one.
fn find_top_level_blocks(text: &str) -> Vec<CodeBlock> {
    let mut stack: Vec<OpenFence> = Vec::new();
    let mut found = Vec::new();

    for caps in FENCE.captures_iter(text) {
        let (Some(whole), Some(marker), Some(info)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let marker = marker.as_str();

        if let Some(parent) = stack.last() {
            let is_closer = marker.chars().next() == parent.marker.chars().next()
                && marker.len() >= parent.marker.len()
                && info.as_str().is_empty();

            if is_closer {
                if let Some(closed) = stack.pop() {
                    if stack.is_empty() {
                        let mut content_end = whole.start();
                        if content_end > 0 && text.as_bytes()[content_end - 1] == b'\n' {
                            content_end -= 1;
                        }
                        let content_start = closed.content_start.min(content_end);
                        found.push(CodeBlock {
                            opening_start: closed.opening_start,
                            content_end,
                            content: text[content_start..content_end].to_string(),
                        });
                    }
                }
                continue;
            }
        }

        let content_start = match text[whole.end()..].find('\n') {
            Some(offset) => whole.end() + offset + 1,
            None => text.len(),
        };

        stack.push(OpenFence {
            marker: marker.to_string(),
            line: text[..whole.start()].matches('\n').count() + 1,
            content_start,
            opening_start: whole.start(),
        });
    }

    for open in &stack {
        warn!("Unclosed code block opened on line {}", open.line);
    }

    found.sort_by_key(|b| b.opening_start);
    found
}

/// Last path-like token in free text, `..` escapes rejected
fn extract_path(text: &str) -> Option<String> {
    let mut found = None;

    for token in text.split_whitespace() {
        let cleaned = clean_markdown_wrappers(token);
        let cleaned = cleaned.strip_prefix('@').unwrap_or(cleaned);
        let candidate = cleaned.replace('\\', "/");

        if !FILE_PATH.is_match(&candidate) {
            continue;
        }

        if candidate.split('/').any(|segment| segment == "..") {
            warn!(
                "Rejected path escaping the project directory: '{}'",
                candidate
            );
            continue;
        }

        found = Some(candidate);
    }

    found
}

fn clean_markdown_wrappers(token: &str) -> &str {
    // Sentence-ending period, possibly outside the markdown wrapper
    let token = match token.strip_suffix('.') {
        Some(rest) if !rest.is_empty() => rest,
        _ => token,
    };

    let cleaned = token.trim_matches(MARKDOWN_WRAPPERS);

    match cleaned.strip_suffix('.') {
        Some(rest) if rest.contains('.') => rest,
        _ => cleaned,
    }
}
