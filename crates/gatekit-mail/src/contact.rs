//! Contact Message Rendering
//!
//! Turns a pending `ContactIntent` into an outbound email: fixed
//! recipient, reply-to pointing at the submitter, plain and HTML bodies,
//! and best-effort attachment resolution from the uploads directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use gatekit_core::ContactIntent;

use crate::message::{MailAttachment, OutgoingMail};

/// Addressing for contact mail, from server configuration.
#[derive(Clone, Debug)]
pub struct ContactAddressing {
    pub from: String,
    pub to: String,
}

/// Render the outbound message for a contact submission.
///
/// Returns the message plus the on-disk paths of every attachment that
/// was actually resolved, so the caller can delete them after a
/// successful send. A referenced upload that is missing is skipped with
/// a warning; the mail still goes out.
pub async fn render_contact(
    intent: &ContactIntent,
    addressing: &ContactAddressing,
    uploads_dir: &Path,
) -> (OutgoingMail, Vec<PathBuf>) {
    let (attachments, paths) = resolve_attachments(intent, uploads_dir).await;

    let mail = OutgoingMail {
        from: addressing.from.clone(),
        to: addressing.to.clone(),
        reply_to: intent.email.clone(),
        subject: intent
            .subject
            .clone()
            .unwrap_or_else(|| "Website Contact".to_string()),
        text: render_text(intent),
        html: render_html(intent),
        attachments,
    };

    (mail, paths)
}

async fn resolve_attachments(
    intent: &ContactIntent,
    uploads_dir: &Path,
) -> (Vec<MailAttachment>, Vec<PathBuf>) {
    let mut attachments = Vec::new();
    let mut paths = Vec::new();

    for reference in &intent.attachments {
        // stored names are bare file names minted by the upload route;
        // anything with path components cannot have come from there
        if Path::new(&reference.stored_name).file_name()
            != Some(OsStr::new(reference.stored_name.as_str()))
        {
            tracing::warn!(
                name = %reference.stored_name,
                "rejecting attachment reference with path components"
            );
            continue;
        }

        let path = uploads_dir.join(&reference.stored_name);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                attachments.push(MailAttachment::new(reference.display_name.clone(), data));
                paths.push(path);
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "referenced upload missing, sending without it"
                );
            }
        }
    }

    (attachments, paths)
}

fn field(value: Option<&str>) -> &str {
    value.unwrap_or("—")
}

fn render_text(intent: &ContactIntent) -> String {
    format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
        field(intent.name.as_deref()),
        field(intent.email.as_deref()),
        field(intent.subject.as_deref()),
        intent.message.as_deref().unwrap_or_default(),
    )
}

fn render_html(intent: &ContactIntent) -> String {
    let message = escape_html(intent.message.as_deref().unwrap_or_default()).replace('\n', "<br>");
    format!(
        "<p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Subject:</strong> {}</p>\
         <hr>\
         <p>{}</p>",
        escape_html(field(intent.name.as_deref())),
        escape_html(field(intent.email.as_deref())),
        escape_html(field(intent.subject.as_deref())),
        message,
    )
}

/// Entity-escape user-supplied text before embedding it in HTML.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekit_core::AttachmentRef;
    use uuid::Uuid;

    fn addressing() -> ContactAddressing {
        ContactAddressing {
            from: "Website Contact <contact@example.org>".to_string(),
            to: "inbox@example.org".to_string(),
        }
    }

    fn intent() -> ContactIntent {
        ContactIntent {
            name: Some("Jane".to_string()),
            email: Some("jane@example.com".to_string()),
            subject: Some("A question".to_string()),
            message: Some("line one\nline two".to_string()),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_render_fills_bodies_and_reply_to() {
        let (mail, paths) = render_contact(&intent(), &addressing(), Path::new("uploads")).await;

        assert_eq!(mail.to, "inbox@example.org");
        assert_eq!(mail.reply_to.as_deref(), Some("jane@example.com"));
        assert_eq!(mail.subject, "A question");
        assert!(mail.text.contains("Name: Jane"));
        assert!(mail.text.contains("line one\nline two"));
        assert!(mail.html.contains("line one<br>line two"));
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_render_as_dashes() {
        let empty = ContactIntent::default();
        let (mail, _) = render_contact(&empty, &addressing(), Path::new("uploads")).await;

        assert_eq!(mail.subject, "Website Contact");
        assert_eq!(mail.reply_to, None);
        assert!(mail.text.contains("Name: —"));
        assert!(mail.text.contains("Email: —"));
    }

    #[tokio::test]
    async fn test_html_is_escaped() {
        let mut sneaky = intent();
        sneaky.name = Some("<script>alert(1)</script>".to_string());
        sneaky.message = Some("a < b & c".to_string());

        let (mail, _) = render_contact(&sneaky, &addressing(), Path::new("uploads")).await;

        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;"));
        assert!(mail.html.contains("a &lt; b &amp; c"));
        // plain text body stays verbatim
        assert!(mail.text.contains("<script>alert(1)</script>"));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_skipped() {
        let mut with_ref = intent();
        with_ref.attachments.push(AttachmentRef {
            stored_name: "document-123-456.pdf".to_string(),
            display_name: "report.pdf".to_string(),
        });

        let dir = std::env::temp_dir().join(format!("gatekit-uploads-{}", Uuid::new_v4()));
        let (mail, paths) = render_contact(&with_ref, &addressing(), &dir).await;

        assert!(mail.attachments.is_empty());
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_present_attachment_is_read_and_named() {
        let dir = std::env::temp_dir().join(format!("gatekit-uploads-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("document-1-2.txt"), b"file body")
            .await
            .unwrap();

        let mut with_ref = intent();
        with_ref.attachments.push(AttachmentRef {
            stored_name: "document-1-2.txt".to_string(),
            display_name: "notes.txt".to_string(),
        });

        let (mail, paths) = render_contact(&with_ref, &addressing(), &dir).await;

        assert_eq!(mail.attachments.len(), 1);
        assert_eq!(mail.attachments[0].file_name, "notes.txt");
        assert_eq!(mail.attachments[0].data, b"file body");
        assert_eq!(paths, vec![dir.join("document-1-2.txt")]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_references_are_rejected() {
        let dir = std::env::temp_dir().join(format!("gatekit-uploads-{}", Uuid::new_v4()));
        let mut evil = intent();
        evil.attachments.push(AttachmentRef {
            stored_name: "../../etc/passwd".to_string(),
            display_name: "passwd".to_string(),
        });

        let (mail, paths) = render_contact(&evil, &addressing(), &dir).await;
        assert!(mail.attachments.is_empty());
        assert!(paths.is_empty());
    }
}
