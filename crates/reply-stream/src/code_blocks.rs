//! Long fenced code blocks are moved out of the reply text into file attachments.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use relay_core::Attachment;

use crate::config::StreamConfig;

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(\w*)\n?([\s\S]*?)```").expect("code block pattern is valid"));

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}

/// True for languages whose short illustrative commands should stay inline longer.
fn is_shell_family(language: &str) -> bool {
    matches!(normalize(language).as_str(), "shell" | "bash" | "sh" | "powershell")
}

/// Minimum line count at which a block of `language` becomes an attachment.
pub fn min_code_lines(language: &str, config: &StreamConfig) -> usize {
    if is_shell_family(language) {
        config.shell_code_file_min_lines
    } else {
        config.code_file_min_lines
    }
}

/// File extension (with dot) for a fence language; `.txt` when unknown.
pub fn file_extension(language: &str) -> &'static str {
    match normalize(language).as_str() {
        "javascript" | "js" => ".js",
        "typescript" | "ts" => ".ts",
        "python" | "py" => ".py",
        "java" => ".java",
        "cpp" | "c++" => ".cpp",
        "c" => ".c",
        "csharp" | "c#" => ".cs",
        "php" => ".php",
        "ruby" => ".rb",
        "go" => ".go",
        "rust" | "rs" => ".rs",
        "swift" => ".swift",
        "kotlin" => ".kt",
        "dart" => ".dart",
        "scala" => ".scala",
        "r" => ".r",
        "matlab" => ".m",
        "sql" => ".sql",
        "html" => ".html",
        "css" => ".css",
        "scss" => ".scss",
        "sass" => ".sass",
        "json" => ".json",
        "xml" => ".xml",
        "yaml" => ".yaml",
        "yml" => ".yml",
        "markdown" | "md" => ".md",
        "shell" | "bash" | "sh" => ".sh",
        "powershell" => ".ps1",
        "dockerfile" => ".dockerfile",
        "toml" => ".toml",
        _ => ".txt",
    }
}

/// Marker left in the text where an extracted block used to be.
pub fn attachment_marker(filename: &str) -> String {
    format!("📎 {} attached", filename)
}

/// Replaces every fenced block at or above its language threshold with [`attachment_marker`] and returns
/// the extracted files. `counter` numbers files across a whole render pass (`code_1`, `code_2`, ...).
pub fn extract_large_code_blocks(
    text: &str,
    config: &StreamConfig,
    counter: &mut usize,
) -> (String, Vec<Attachment>) {
    let mut attachments = Vec::new();

    let modified = CODE_BLOCK.replace_all(text, |caps: &Captures| {
        let language = caps.get(1).map_or("", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim();
        // Blank lines count.
        let line_count = code.split('\n').count();

        if line_count < min_code_lines(language, config) {
            return caps[0].to_string();
        }

        *counter += 1;
        let filename = format!("code_{}{}", counter, file_extension(language));
        let label = if language.is_empty() { "text" } else { language };
        attachments.push(Attachment {
            filename: filename.clone(),
            content: code.as_bytes().to_vec(),
            description: format!("Generated code file ({})", label),
        });
        attachment_marker(&filename)
    });

    (modified.into_owned(), attachments)
}
