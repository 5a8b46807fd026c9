//! Test utilities and module declarations for storage tests.

use pixelpost_core::NewEmailMessage;

use crate::StorageBackend;

pub fn create_test_storage() -> StorageBackend {
    StorageBackend::new_memory()
}

pub fn new_email(recipient: &str, token: &str) -> NewEmailMessage {
    NewEmailMessage {
        recipient: recipient.to_owned(),
        subject: "Quarterly report".to_owned(),
        body_html: "<p>numbers</p>".to_owned(),
        tracking_token: token.to_owned(),
    }
}
