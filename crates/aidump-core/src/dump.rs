//! Dump text format
//!
//! Each file is rendered as a `File:` header followed by a fenced block:
//!
//! ```text
//! ---
//! File: src/main.rs
//! ---
//! ```rust
//! fn main() {}
//! ```
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^---[ \t]*\r?\nFile:[ \t]*([^\r\n]+?)[ \t]*\r?\n---[ \t]*$")
        .expect("valid header regex")
});
static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A\s*```[^\n]*\n(.*)\n```\s*\z").expect("valid body regex"));

/// Separator placed between rendered files
pub const FILE_SEPARATOR: &str = "\n\n";

/// One file in a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpFile {
    pub path: String,
    pub content: String,
}

impl DumpFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Built-in extension to code fence language map
pub fn default_extension_map() -> BTreeMap<String, String> {
    [
        // Web
        (".js", "javascript"),
        (".jsx", "jsx"),
        (".ts", "typescript"),
        (".tsx", "tsx"),
        (".html", "html"),
        (".css", "css"),
        (".scss", "scss"),
        (".sass", "sass"),
        (".less", "less"),
        (".vue", "vue"),
        // Backend
        (".py", "python"),
        (".rb", "ruby"),
        (".php", "php"),
        (".java", "java"),
        (".go", "go"),
        (".rs", "rust"),
        (".c", "c"),
        (".cpp", "cpp"),
        (".cs", "csharp"),
        (".swift", "swift"),
        (".kt", "kotlin"),
        // Data & config
        (".json", "json"),
        (".yaml", "yaml"),
        (".yml", "yaml"),
        (".toml", "toml"),
        (".xml", "xml"),
        (".sql", "sql"),
        (".graphql", "graphql"),
        // Shell
        (".sh", "bash"),
        (".bash", "bash"),
        (".zsh", "zsh"),
        (".fish", "fish"),
        (".ps1", "powershell"),
        // Documentation
        (".md", "markdown"),
        (".mdx", "mdx"),
        (".rst", "rst"),
        (".txt", "text"),
        // Other
        (".r", "r"),
        (".lua", "lua"),
        (".dart", "dart"),
        (".elm", "elm"),
    ]
    .into_iter()
    .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
    .collect()
}

/// Fence language for a path, empty when the extension is unknown
pub fn language_for<'a>(path: &str, extension_map: &'a BTreeMap<String, String>) -> &'a str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = match file_name.rfind('.') {
        // A leading dot is a hidden file, not an extension
        Some(idx) if idx > 0 => &file_name[idx..],
        _ => return "",
    };

    extension_map
        .get(extension)
        .map(String::as_str)
        .unwrap_or("")
}

pub fn render_file(file: &DumpFile, lang: &str) -> String {
    format!(
        "---\nFile: {}\n---\n```{}\n{}\n```",
        file.path, lang, file.content
    )
}

/// Render files in the given order
pub fn render_dump(files: &[DumpFile], extension_map: &BTreeMap<String, String>) -> String {
    files
        .iter()
        .map(|file| render_file(file, language_for(&file.path, extension_map)))
        .collect::<Vec<_>>()
        .join(FILE_SEPARATOR)
}

/// Recover files from dump text. Content may itself contain code fences;
/// each body extends to the last fence before the next header.
pub fn parse_dump(text: &str) -> Vec<DumpFile> {
    let headers: Vec<_> = HEADER.captures_iter(text).collect();
    let mut files = Vec::new();

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let body = &text[whole.end()..body_end];

        if let Some(content) = BODY.captures(body).and_then(|c| c.get(1)) {
            files.push(DumpFile::new(path.as_str().trim(), content.as_str()));
        }
    }

    files
}

/// Line count as reported in the dump summary
pub fn count_lines(content: &str) -> usize {
    content.matches('\n').count() + 1
}
