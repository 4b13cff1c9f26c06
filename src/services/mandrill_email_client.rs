use async_trait::async_trait;
use color_eyre::eyre::eyre;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    email_client::EmailClient,
    error::{EmailClientError, ResourceKind},
    message::{Message, MessagesResponse},
    subaccount::Subaccount,
    template::Template,
};
use crate::utils::constants::{prod, MANDRILL_API_KEY};

/// `EmailClient` backed by the Mandrill JSON API.
pub struct MandrillEmailClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl MandrillEmailClient {
    pub fn new(base_url: String, api_key: Secret<String>, http_client: Client) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    /// Builds a client for the production endpoint using `MANDRILL_API_KEY`.
    pub fn from_env() -> Result<Self, EmailClientError> {
        let http_client = Client::builder()
            .timeout(prod::email_client::TIMEOUT)
            .build()
            .map_err(EmailClientError::unexpected)?;

        Ok(Self::new(
            prod::email_client::BASE_URL.to_owned(),
            MANDRILL_API_KEY.clone(),
            http_client,
        ))
    }

    async fn call<B, R>(
        &self,
        endpoint: &str,
        body: B,
        targets: &[(ResourceKind, &str)],
    ) -> Result<R, EmailClientError>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let request = KeyedRequest {
            key: self.api_key.expose_secret(),
            body,
        };

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(EmailClientError::unexpected);
        }

        if matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        ) {
            tracing::warn!(%status, endpoint, "Email service unavailable");
            return Err(EmailClientError::ServiceUnavailable);
        }

        // Mandrill reports API errors as a JSON body, usually with a 500 status.
        match response.json::<ApiError>().await {
            Ok(error) => Err(error.into_client_error(status, targets)),
            Err(_) if status.is_server_error() => {
                tracing::warn!(%status, endpoint, "Email service returned an unreadable error");
                Err(EmailClientError::ServiceUnavailable)
            }
            Err(e) => Err(EmailClientError::unexpected(e)),
        }
    }
}

fn transport_error(error: reqwest::Error) -> EmailClientError {
    if error.is_connect() || error.is_timeout() {
        tracing::warn!(error = %error, "Email service unreachable");
        EmailClientError::ServiceUnavailable
    } else {
        EmailClientError::unexpected(error)
    }
}

#[derive(Serialize)]
struct KeyedRequest<'a, B> {
    key: &'a str,
    #[serde(flatten)]
    body: B,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a Message,
}

#[derive(Serialize)]
struct SendTemplateRequest<'a> {
    template_name: &'a str,
    template_content: Value,
    message: &'a Message,
}

#[derive(Serialize)]
struct IdRequest<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl ApiError {
    /// `targets` lists the resources the request referred to, the one being
    /// operated on first.
    fn into_client_error(
        self,
        status: StatusCode,
        targets: &[(ResourceKind, &str)],
    ) -> EmailClientError {
        tracing::warn!(%status, name = %self.name, message = %self.message, "Email service rejected request");

        let missing = match self.name.as_str() {
            "Unknown_Template" => Some(ResourceKind::Template),
            "Unknown_Subaccount" => Some(ResourceKind::Subaccount),
            _ => None,
        };
        if let Some((kind, id)) =
            missing.and_then(|missing| targets.iter().find(|(kind, _)| *kind == missing))
        {
            return EmailClientError::not_found(*kind, *id);
        }

        match targets.first() {
            Some((kind, id)) if missing.is_none() && self.message.contains("already exists") => {
                EmailClientError::already_exists(*kind, *id)
            }
            _ => EmailClientError::UnexpectedError(eyre!(
                "{} ({}): {}",
                self.name,
                status,
                self.message
            )),
        }
    }
}

fn subaccount_target(message: &Message) -> Option<(ResourceKind, &str)> {
    message
        .subaccount
        .as_deref()
        .map(|id| (ResourceKind::Subaccount, id))
}

#[async_trait]
impl EmailClient for MandrillEmailClient {
    #[tracing::instrument(name = "Ping email service", skip(self))]
    async fn ping(&self) -> Result<String, EmailClientError> {
        self.call("users/ping.json", serde_json::Map::new(), &[]).await
    }

    #[tracing::instrument(name = "Sending message", skip_all)]
    async fn send_message(
        &self,
        message: &Message,
    ) -> Result<Vec<MessagesResponse>, EmailClientError> {
        let targets: Vec<_> = subaccount_target(message).into_iter().collect();
        self.call("messages/send.json", SendRequest { message }, &targets)
            .await
    }

    #[tracing::instrument(name = "Sending templated message", skip(self, message, contents))]
    async fn send_templated_message(
        &self,
        message: &Message,
        template_name: &str,
        contents: Value,
    ) -> Result<Vec<MessagesResponse>, EmailClientError> {
        let body = SendTemplateRequest {
            template_name,
            template_content: contents,
            message,
        };
        let mut targets = vec![(ResourceKind::Template, template_name)];
        targets.extend(subaccount_target(message));
        self.call("messages/send-template.json", body, &targets)
            .await
    }

    #[tracing::instrument(name = "Subaccount info", skip(self))]
    async fn get_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError> {
        self.call(
            "subaccounts/info.json",
            IdRequest { id },
            &[(ResourceKind::Subaccount, id)],
        )
        .await
    }

    #[tracing::instrument(name = "Delete subaccount", skip(self))]
    async fn delete_subaccount(&self, id: &str) -> Result<Subaccount, EmailClientError> {
        self.call(
            "subaccounts/delete.json",
            IdRequest { id },
            &[(ResourceKind::Subaccount, id)],
        )
        .await
    }

    #[tracing::instrument(name = "Update subaccount", skip_all, fields(id = %subaccount.id))]
    async fn update_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError> {
        let target = [(ResourceKind::Subaccount, subaccount.id.as_str())];
        self.call("subaccounts/update.json", &subaccount, &target)
            .await
    }

    #[tracing::instrument(name = "Add subaccount", skip_all, fields(id = %subaccount.id))]
    async fn add_subaccount(&self, subaccount: Subaccount) -> Result<Subaccount, EmailClientError> {
        let target = [(ResourceKind::Subaccount, subaccount.id.as_str())];
        self.call("subaccounts/add.json", &subaccount, &target).await
    }

    #[tracing::instrument(name = "Template info", skip(self))]
    async fn get_template(&self, name: &str) -> Result<Template, EmailClientError> {
        self.call(
            "templates/info.json",
            NameRequest { name },
            &[(ResourceKind::Template, name)],
        )
        .await
    }

    #[tracing::instrument(name = "Delete template", skip(self))]
    async fn delete_template(&self, name: &str) -> Result<Template, EmailClientError> {
        self.call(
            "templates/delete.json",
            NameRequest { name },
            &[(ResourceKind::Template, name)],
        )
        .await
    }

    #[tracing::instrument(name = "Update template", skip_all, fields(key = %template.key))]
    async fn update_template(&self, template: Template) -> Result<Template, EmailClientError> {
        let target = [(ResourceKind::Template, template.key.as_str())];
        self.call("templates/update.json", &template, &target).await
    }

    #[tracing::instrument(name = "Add template", skip_all, fields(key = %template.key))]
    async fn add_template(&self, template: Template) -> Result<Template, EmailClientError> {
        let target = [(ResourceKind::Template, template.key.as_str())];
        self.call("templates/add.json", &template, &target).await
    }
}
