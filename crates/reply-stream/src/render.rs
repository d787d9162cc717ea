//! Renderer: part log → display text + attachments.
//!
//! Pure and stateless; the synchronizer re-renders the whole log on every new part.

use relay_core::{Attachment, FailureCause};

use crate::code_blocks::extract_large_code_blocks;
use crate::config::StreamConfig;
use crate::part::Part;

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// Truncates `text` to `threshold` characters and appends `…` when it was longer.
pub fn snip(text: &str, threshold: usize) -> String {
    match text.char_indices().nth(threshold) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Human-friendly label for a tool name; unknown names pass through verbatim.
pub fn tool_label(tool_name: &str) -> &str {
    match tool_name {
        "CodeExecutionTool" => "Code Execution",
        "MathTool" => "Math Tool",
        "WebPageScrapingTool" => "Web Page Scraping",
        "WebResearchTool" => "Web Research",
        "CodeGenerationTool" => "Code Generation",
        "DeepThinkTool" => "Deep Think",
        "YouTubeAnalysisTool" => "YouTube Analysis",
        "updateWorkingMemory" => "Update Working Memory",
        other => other,
    }
}

/// One-line, user-safe description of a streaming failure. One template per category.
pub fn describe_failure(cause: &FailureCause) -> String {
    match cause {
        FailureCause::Validation { .. } => {
            "⚠️ The model returned data that failed validation.".to_string()
        }
        FailureCause::UpstreamCall { .. } => "⚠️ An error occurred while calling the API.".to_string(),
        FailureCause::RetryExhausted { .. } => {
            "⚠️ The request still failed after several retries.".to_string()
        }
        FailureCause::ToolExecution { tool, .. } => {
            format!("⚠️ The tool \"{}\" failed to run.", tool_label(tool))
        }
        FailureCause::Other(_) => "⚠️ An error occurred.".to_string(),
    }
}

/// Renders parts with the configured thresholds.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: StreamConfig,
}

impl Renderer {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Renders every part to a line, joined with `\n` in log order. Long code blocks in text parts become
    /// attachments numbered across the whole pass.
    pub fn render(&self, parts: &[Part]) -> Rendered {
        let mut attachments = Vec::new();
        let mut file_counter = 0;

        let lines: Vec<String> = parts
            .iter()
            .map(|part| self.render_part(part, &mut file_counter, &mut attachments))
            .collect();

        Rendered {
            text: lines.join("\n"),
            attachments,
        }
    }

    // Every Part variant must be handled here explicitly.
    #[deny(clippy::wildcard_enum_match_arm)]
    fn render_part(
        &self,
        part: &Part,
        file_counter: &mut usize,
        attachments: &mut Vec<Attachment>,
    ) -> String {
        match part {
            Part::Prompt { text } => format!("> {}", snip(text, self.config.prompt_snip_threshold)),
            Part::TextFragment { text } => {
                let (modified, extracted) =
                    extract_large_code_blocks(text, &self.config, file_counter);
                attachments.extend(extracted);
                modified
            }
            Part::ToolInvocation { tool_name } => format!("▷ {}", tool_label(tool_name)),
            Part::Failure { cause } => describe_failure(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::new(StreamConfig::default())
    }

    #[test]
    fn test_snip_boundary() {
        let exact = "a".repeat(100);
        assert_eq!(snip(&exact, 100), exact);

        let over = "a".repeat(101);
        let snipped = snip(&over, 100);
        assert_eq!(snipped, format!("{}…", "a".repeat(100)));
    }

    #[test]
    fn test_snip_counts_characters_not_bytes() {
        let text = "あ".repeat(101);
        let snipped = snip(&text, 100);
        assert_eq!(snipped.chars().count(), 101);
        assert!(snipped.ends_with('…'));
    }

    #[test]
    fn test_prompt_is_quoted_and_truncated() {
        let prompt = "x".repeat(101);
        let rendered = renderer().render(&[Part::prompt(prompt)]);
        assert_eq!(rendered.text, format!("> {}…", "x".repeat(100)));

        let rendered = renderer().render(&[Part::prompt("Explain recursion")]);
        assert_eq!(rendered.text, "> Explain recursion");
    }

    #[test]
    fn test_parts_joined_in_order() {
        let parts = vec![
            Part::prompt("q"),
            Part::text("first"),
            Part::tool("WebResearchTool"),
            Part::text("second"),
        ];
        let rendered = renderer().render(&parts);
        assert_eq!(rendered.text, "> q\nfirst\n▷ Web Research\nsecond");
        assert!(rendered.attachments.is_empty());
    }

    #[test]
    fn test_unknown_tool_passes_through() {
        assert_eq!(tool_label("SomethingNew"), "SomethingNew");
    }

    #[test]
    fn test_failure_categories_have_distinct_templates() {
        let causes = vec![
            FailureCause::Validation {
                message: "bad".into(),
            },
            FailureCause::UpstreamCall {
                message: "500".into(),
            },
            FailureCause::RetryExhausted {
                attempts: 3,
                message: "timeout".into(),
            },
            FailureCause::ToolExecution {
                tool: "MathTool".into(),
                message: "nan".into(),
            },
            FailureCause::Other("weird".into()),
        ];
        let texts: Vec<String> = causes.iter().map(describe_failure).collect();
        for (i, a) in texts.iter().enumerate() {
            assert!(!a.contains('\n'));
            for b in texts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(texts[3].contains("Math Tool"));
        assert!(!texts[1].contains("500"));
        assert!(!texts[4].contains("weird"));
    }

    #[test]
    fn test_attachments_numbered_across_parts() {
        let block = format!("```python\n{}\n```", vec!["x = 1"; 10].join("\n"));
        let parts = vec![Part::prompt("q"), Part::text(block.clone()), Part::text(block)];
        let rendered = renderer().render(&parts);
        let names: Vec<_> = rendered.attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["code_1.py", "code_2.py"]);
        assert_eq!(
            rendered.text,
            "> q\n📎 code_1.py attached\n📎 code_2.py attached"
        );
    }

    #[test]
    fn test_render_is_pure() {
        let block = format!("```js\n{}\n```", vec!["f()"; 12].join("\n"));
        let parts = vec![
            Part::prompt("q"),
            Part::text(format!("intro\n{}", block)),
            Part::failure(FailureCause::Other("x".into())),
        ];
        let r = renderer();
        assert_eq!(r.render(&parts), r.render(&parts));
    }
}
