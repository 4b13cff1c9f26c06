use async_trait::async_trait;
use serde_json::Value;

use super::{
    error::EmailClientError,
    message::{Message, MessagesResponse},
    subaccount::Subaccount,
    template::Template,
};

/// Operations offered by the email delivery service.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn ping(&self) -> Result<String, EmailClientError>;

    async fn send_message(
        &self,
        message: &Message,
    ) -> Result<Vec<MessagesResponse>, EmailClientError>;

    /// `contents` is forwarded as-is; its shape is up to the template.
    async fn send_templated_message(
        &self,
        message: &Message,
        template_name: &str,
        contents: Value,
    ) -> Result<Vec<MessagesResponse>, EmailClientError>;

    async fn get_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError>;
    async fn delete_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError>;
    async fn update_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError>;
    async fn add_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError>;

    async fn get_template(&self, name: &str) -> Result<Template, EmailClientError>;
    async fn delete_template(&self, name: &str) -> Result<Template, EmailClientError>;
    async fn update_template(&self, template: Template) -> Result<Template, EmailClientError>;
    async fn add_template(&self, template: Template) -> Result<Template, EmailClientError>;
}
