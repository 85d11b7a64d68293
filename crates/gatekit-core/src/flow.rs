//! Flow Intents
//!
//! Payloads carried by capability tokens, one type per flow so a handler
//! can only ever reach the fields of its own flow.

use serde::{Deserialize, Serialize};

/// Donation flow payload. The gated action is revealing the receipt, so
/// there is nothing to carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationIntent;

/// Reference to a previously uploaded file, by stored name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// File name inside the uploads directory
    pub stored_name: String,
    /// Name shown to the mail recipient
    pub display_name: String,
}

/// Contact flow payload: the full pending message, held until payment
/// confirms or the token dies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactIntent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub attachments: Vec<AttachmentRef>,
}
