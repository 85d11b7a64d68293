//! Mail Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailError>;

#[derive(Error, Debug)]
pub enum MailError {
    /// Transport-level failure: connection, auth, protocol
    #[error("mail transport error: {0}")]
    Transport(String),

    /// Unparsable mailbox address
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The message itself could not be assembled
    #[error("mail message error: {0}")]
    Message(String),

    /// Spool or attachment IO failure
    #[error("mail io error: {0}")]
    Io(#[from] std::io::Error),
}
