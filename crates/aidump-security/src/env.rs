use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static ENV_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid key regex"));

/// Parse dotenv-style content and return its non-empty values.
///
/// Supported line forms:
/// - `KEY=value`
/// - `KEY="value"` / `KEY='value'`
/// - `export KEY=value`
///
/// Blank lines, `#` comments, lines without `=` and lines whose key is not an
/// identifier are ignored.
pub fn parse_env_values(content: &str) -> Vec<String> {
    let mut values = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").map(str::trim).unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        if !ENV_KEY.is_match(key.trim()) {
            continue;
        }

        let value = unquote(value.trim()).trim();
        if !value.is_empty() {
            values.push(value.to_string());
        }
    }

    values
}

/// Read and parse one env file
pub fn parse_env_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_env_values(&content))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
