//! Outbound Message Assembly
//!
//! Transport-independent representation of an email, turned into an RFC
//! 5322 message just before sending.

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use uuid::Uuid;

use crate::error::MailError;

/// A file attached to an outgoing message.
#[derive(Clone, Debug)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl MailAttachment {
    /// Attachment with the content type guessed from the file name.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            data,
        }
    }
}

/// An outbound email, ready for any transport.
#[derive(Clone, Debug, Default)]
pub struct OutgoingMail {
    /// Sender, either `addr@host` or `Display Name <addr@host>`
    pub from: String,
    pub to: String,
    /// Submitter address, so replies go to them and not to us
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub attachments: Vec<MailAttachment>,
}

impl OutgoingMail {
    /// Assemble the wire message. Returns it together with the generated
    /// Message-ID, angle brackets included.
    pub(crate) fn assemble(&self) -> Result<(Message, String), MailError> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|_| MailError::Address(self.from.clone()))?;
        let to: Mailbox = self
            .to
            .parse()
            .map_err(|_| MailError::Address(self.to.clone()))?;

        let message_id = format!("<{}@gatekit.local>", Uuid::new_v4());

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .message_id(Some(message_id.clone()));

        if let Some(reply_to) = &self.reply_to {
            // an unparsable reply address degrades to none instead of
            // failing the whole send
            if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
                builder = builder.reply_to(mailbox);
            } else {
                tracing::warn!(address = %reply_to, "ignoring unparsable reply-to address");
            }
        }

        let mut body = MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
            self.text.clone(),
            self.html.clone(),
        ));

        for attachment in &self.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|e| MailError::Message(e.to_string()))?;
            body = body.singlepart(
                Attachment::new(attachment.file_name.clone())
                    .body(attachment.data.clone(), content_type),
            );
        }

        let message = builder
            .multipart(body)
            .map_err(|e| MailError::Message(e.to_string()))?;

        Ok((message, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "Website Contact <contact@example.org>".to_string(),
            to: "inbox@example.org".to_string(),
            reply_to: Some("visitor@example.com".to_string()),
            subject: "Hello".to_string(),
            text: "plain body".to_string(),
            html: "<p>html body</p>".to_string(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_assemble_multipart_message() {
        let (message, message_id) = mail().assemble().unwrap();

        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@gatekit.local>"));

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("plain body"));
        assert!(formatted.contains("Reply-To"));
        assert!(formatted.contains("Subject: Hello"));
    }

    #[test]
    fn test_attachment_content_type_guessing() {
        let pdf = MailAttachment::new("document.pdf", vec![1, 2, 3]);
        assert_eq!(pdf.content_type, "application/pdf");

        let unknown = MailAttachment::new("blob.xyzzy", vec![1]);
        assert_eq!(unknown.content_type, "application/octet-stream");
    }

    #[test]
    fn test_attachments_are_embedded() {
        let mut with_file = mail();
        with_file.attachments.push(MailAttachment::new("note.txt", b"hi there".to_vec()));

        let (message, _) = with_file.assemble().unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("note.txt"));
    }

    #[test]
    fn test_invalid_from_address_is_rejected() {
        let mut bad = mail();
        bad.from = "not an address".to_string();
        assert!(matches!(bad.assemble(), Err(MailError::Address(_))));
    }

    #[test]
    fn test_bad_reply_to_is_dropped_not_fatal() {
        let mut bad_reply = mail();
        bad_reply.reply_to = Some("((".to_string());

        let (message, _) = bad_reply.assemble().unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(!formatted.contains("Reply-To"));
    }
}
