//! # gatekit-mail
//!
//! Outbound mail for gatekit: pluggable transports plus the rendering of
//! contact submissions into real emails.
//!
//! ## Transports
//!
//! | Transport      | Use                                        |
//! |----------------|--------------------------------------------|
//! | `SmtpMailer`   | Production, authenticated SMTP over lettre |
//! | `FileMailer`   | Development spool when SMTP is unset       |
//! | `MemoryMailer` | Tests, captures messages for assertions    |
//!
//! All three implement the `Mailer` trait, so the server picks one at
//! startup and the handlers never know the difference.

mod contact;
mod error;
mod message;
mod transport;

pub use contact::{ContactAddressing, render_contact};
pub use error::{MailError, Result};
pub use message::{MailAttachment, OutgoingMail};
pub use transport::{FileMailer, Mailer, MemoryMailer, SendReceipt, SmtpMailer, SmtpSettings};
