pub mod mandrill_email_client;
pub mod mock_email_client;

pub use mandrill_email_client::MandrillEmailClient;
pub use mock_email_client::MockEmailClient;
