pub mod email;
pub mod email_client;
pub mod error;
pub mod message;
pub mod subaccount;
pub mod template;

pub use email::Email;
pub use email_client::EmailClient;
pub use error::{EmailClientError, ResourceKind};
pub use message::{Message, MessagesResponse, Recipient, RecipientType};
pub use subaccount::Subaccount;
pub use template::Template;
