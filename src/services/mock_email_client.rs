use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::Secret;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::{
    email_client::EmailClient,
    error::{EmailClientError, ResourceKind},
    message::{Message, MessagesResponse},
    subaccount::Subaccount,
    template::Template,
};

const PONG: &str = "pong";

struct MockState {
    api_key: Secret<String>,
    available: bool,
    templates: HashMap<String, Template>,
    subaccounts: HashMap<String, Subaccount>,
    last_message: Option<Message>,
    last_template_name: Option<String>,
    last_template_contents: Option<Value>,
}

impl MockState {
    fn ensure_available(&self) -> Result<(), EmailClientError> {
        if self.available {
            Ok(())
        } else {
            tracing::warn!("Mock email service is unavailable");
            Err(EmailClientError::ServiceUnavailable)
        }
    }

    fn record_send(&mut self, message: &Message) -> Vec<MessagesResponse> {
        self.last_message = Some(message.clone());
        message
            .recipients()
            .cloned()
            .map(MessagesResponse::for_recipient)
            .collect()
    }
}

/// In-memory stand-in for the email service.
///
/// Clones share the same state, so a test can hand one clone to the code under
/// test and inspect the other afterwards. Separate instances never interact.
#[derive(Clone)]
pub struct MockEmailClient {
    state: Arc<RwLock<MockState>>,
}

impl MockEmailClient {
    pub fn new(api_key: Secret<String>) -> Self {
        let state = MockState {
            api_key,
            available: true,
            templates: HashMap::new(),
            subaccounts: HashMap::new(),
            last_message: None,
            last_template_name: None,
            last_template_contents: None,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn api_key(&self) -> Secret<String> {
        self.state.read().await.api_key.clone()
    }

    /// Simulates a total outage (`false`) or recovery (`true`).
    pub async fn set_available(&self, available: bool) {
        tracing::debug!(available, "Toggling mock email service availability");
        self.state.write().await.available = available;
    }

    pub async fn is_available(&self) -> bool {
        self.state.read().await.available
    }

    // Seeding bypasses the availability switch.
    pub async fn insert_template(&self, template: Template) {
        self.state
            .write()
            .await
            .templates
            .insert(template.key.clone(), template);
    }

    pub async fn insert_subaccount(&self, subaccount: Subaccount) {
        self.state
            .write()
            .await
            .subaccounts
            .insert(subaccount.id.clone(), subaccount);
    }

    pub async fn templates(&self) -> HashMap<String, Template> {
        self.state.read().await.templates.clone()
    }

    pub async fn subaccounts(&self) -> HashMap<String, Subaccount> {
        self.state.read().await.subaccounts.clone()
    }

    pub async fn last_message(&self) -> Option<Message> {
        self.state.read().await.last_message.clone()
    }

    pub async fn last_template_name(&self) -> Option<String> {
        self.state.read().await.last_template_name.clone()
    }

    pub async fn last_template_contents(&self) -> Option<Value> {
        self.state.read().await.last_template_contents.clone()
    }
}

impl Default for MockEmailClient {
    fn default() -> Self {
        Self::new(Secret::new(String::new()))
    }
}

#[async_trait]
impl EmailClient for MockEmailClient {
    #[tracing::instrument(name = "Mock ping", skip(self))]
    async fn ping(&self) -> Result<String, EmailClientError> {
        self.state.read().await.ensure_available()?;
        Ok(PONG.to_owned())
    }

    #[tracing::instrument(name = "Sending mock message", skip_all)]
    async fn send_message(
        &self,
        message: &Message,
    ) -> Result<Vec<MessagesResponse>, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        tracing::debug!(recipients = message.to.len(), "Recording mock message");
        Ok(state.record_send(message))
    }

    #[tracing::instrument(name = "Sending mock templated message", skip(self, message, contents))]
    async fn send_templated_message(
        &self,
        message: &Message,
        template_name: &str,
        contents: Value,
    ) -> Result<Vec<MessagesResponse>, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        if !state.templates.contains_key(template_name) {
            return Err(EmailClientError::not_found(
                ResourceKind::Template,
                template_name,
            ));
        }

        state.last_template_name = Some(template_name.to_owned());
        state.last_template_contents = Some(contents);

        tracing::debug!(recipients = message.to.len(), "Recording mock templated message");
        Ok(state.record_send(message))
    }

    #[tracing::instrument(name = "Mock subaccount info", skip(self))]
    async fn get_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError> {
        let state = self.state.read().await;
        state.ensure_available()?;

        state
            .subaccounts
            .get(id)
            .cloned()
            .ok_or_else(|| EmailClientError::not_found(ResourceKind::Subaccount, id))
    }

    #[tracing::instrument(name = "Mock delete subaccount", skip(self))]
    async fn delete_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        state
            .subaccounts
            .remove(id)
            .ok_or_else(|| EmailClientError::not_found(ResourceKind::Subaccount, id))
    }

    #[tracing::instrument(name = "Mock update subaccount", skip_all, fields(id = %subaccount.id))]
    async fn update_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        match state.subaccounts.get_mut(&subaccount.id) {
            Some(stored) => {
                *stored = subaccount.clone();
                Ok(subaccount)
            }
            None => Err(EmailClientError::not_found(
                ResourceKind::Subaccount,
                subaccount.id,
            )),
        }
    }

    #[tracing::instrument(name = "Mock add subaccount", skip_all, fields(id = %subaccount.id))]
    async fn add_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        if state.subaccounts.contains_key(&subaccount.id) {
            return Err(EmailClientError::already_exists(
                ResourceKind::Subaccount,
                subaccount.id,
            ));
        }
        state
            .subaccounts
            .insert(subaccount.id.clone(), subaccount.clone());
        Ok(subaccount)
    }

    #[tracing::instrument(name = "Mock template info", skip(self))]
    async fn get_template(&self, name: &str) -> Result<Template, EmailClientError> {
        let state = self.state.read().await;
        state.ensure_available()?;

        state
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| EmailClientError::not_found(ResourceKind::Template, name))
    }

    #[tracing::instrument(name = "Mock delete template", skip(self))]
    async fn delete_template(&self, name: &str) -> Result<Template, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        state
            .templates
            .remove(name)
            .ok_or_else(|| EmailClientError::not_found(ResourceKind::Template, name))
    }

    #[tracing::instrument(name = "Mock update template", skip_all, fields(key = %template.key))]
    async fn update_template(&self, template: Template) -> Result<Template, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        match state.templates.get_mut(&template.key) {
            Some(stored) => {
                *stored = template.clone();
                Ok(template)
            }
            None => Err(EmailClientError::not_found(
                ResourceKind::Template,
                template.key,
            )),
        }
    }

    #[tracing::instrument(name = "Mock add template", skip_all, fields(key = %template.key))]
    async fn add_template(&self, template: Template) -> Result<Template, EmailClientError> {
        let mut state = self.state.write().await;
        state.ensure_available()?;

        if state.templates.contains_key(&template.key) {
            return Err(EmailClientError::already_exists(
                ResourceKind::Template,
                template.key,
            ));
        }
        state
            .templates
            .insert(template.key.clone(), template.clone());
        Ok(template)
    }
}
