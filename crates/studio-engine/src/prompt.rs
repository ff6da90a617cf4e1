//! Prompt assembly from user text and attachments.

use crate::attachments::Attachment;
use crate::constants::prompt::{FILE_LABEL_PREFIX, SEPARATOR};

/// Labelled blocks for every attachment, in order.
///
/// Each block is `[File: <name>]\n<content>\n`; blocks are joined with a
/// newline.
pub fn file_context(attachments: &[Attachment]) -> String {
    attachments
        .iter()
        .map(|a| {
            format!(
                "{}{}]\n{}\n",
                FILE_LABEL_PREFIX,
                a.name,
                a.content.as_prompt_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The prompt sent to the model: file context, a separator, then the
/// user's prompt. Without attachments the prompt is returned unchanged.
pub fn enhance_prompt(prompt: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return prompt.to_string();
    }
    format!("{}{}{}", file_context(attachments), SEPARATOR, prompt)
}

/// Inverse of [`enhance_prompt`] for the same attachments.
///
/// Returns `None` if `enhanced` was not built from `attachments`.
pub fn strip_file_context<'a>(enhanced: &'a str, attachments: &[Attachment]) -> Option<&'a str> {
    if attachments.is_empty() {
        return Some(enhanced);
    }
    enhanced
        .strip_prefix(file_context(attachments).as_str())?
        .strip_prefix(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::AttachmentContent;

    fn attachment(name: &str, content: AttachmentContent) -> Attachment {
        Attachment {
            name: name.to_string(),
            size: 0,
            mime_type: "text/plain".to_string(),
            content,
        }
    }

    #[test]
    fn test_no_attachments_leaves_prompt_unchanged() {
        assert_eq!(enhance_prompt("Write a haiku", &[]), "Write a haiku");
        assert_eq!(strip_file_context("Write a haiku", &[]), Some("Write a haiku"));
    }

    #[test]
    fn test_enhanced_layout() {
        let attachments = vec![
            attachment("notes.txt", AttachmentContent::Text("alpha".to_string())),
            attachment("scan.pdf", AttachmentContent::Unavailable),
        ];

        assert_eq!(
            enhance_prompt("Summarize", &attachments),
            "[File: notes.txt]\nalpha\n\n[File: scan.pdf]\nFile content not available\n\n---\nSummarize"
        );
    }

    #[test]
    fn test_strip_recovers_prompt() {
        let attachments = vec![attachment(
            "poem.md",
            AttachmentContent::Text("---\ntricky\n---".to_string()),
        )];
        let prompt = "Line one\n---\nLine two";

        let enhanced = enhance_prompt(prompt, &attachments);
        assert_eq!(strip_file_context(&enhanced, &attachments), Some(prompt));
    }

    #[test]
    fn test_strip_rejects_foreign_prompt() {
        let attachments = vec![attachment("a.txt", AttachmentContent::Text("a".to_string()))];
        assert_eq!(strip_file_context("just a prompt", &attachments), None);
    }
}
