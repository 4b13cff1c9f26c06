pub mod domain;
pub mod services;
pub mod utils;

// Re-export important types at the crate root
pub use domain::{
    Email, EmailClient, EmailClientError, Message, MessagesResponse, Recipient, RecipientType,
    ResourceKind, Subaccount, Template,
};
pub use services::{MandrillEmailClient, MockEmailClient};
