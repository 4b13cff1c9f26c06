use crate::helpers::{get_random_email, message_to, TestMandrill};
use mandrill_client::{
    utils::constants::test, EmailClient, EmailClientError, ResourceKind, Subaccount, Template,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, ResponseTemplate,
};

fn unknown_template(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(json!({
        "status": "error",
        "code": 5,
        "name": "Unknown_Template",
        "message": format!("No such template \"{}\"", name),
    }))
}

#[tokio::test]
async fn ping_sends_api_key() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/users/ping.json"))
        .and(body_partial_json(json!({ "key": test::API_KEY })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("PONG!")))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(app.email_client.ping().await.unwrap(), "PONG!");
}

#[tokio::test]
async fn send_message_returns_service_responses() {
    let app = TestMandrill::new().await;
    let recipient = get_random_email();

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(body_partial_json(json!({
            "message": { "to": [{ "email": recipient.as_ref(), "type": "to" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "email": recipient.as_ref(),
            "status": "sent",
            "_id": "abc123"
        }])))
        .expect(1)
        .mount(&app.server)
        .await;

    let responses = app
        .email_client
        .send_message(&message_to(&[recipient.clone()]))
        .await
        .unwrap();

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].email, recipient);
    assert_eq!(responses[0].status.as_deref(), Some("sent"));
}

#[tokio::test]
async fn send_templated_message_forwards_contents() {
    let app = TestMandrill::new().await;
    let recipient = get_random_email();
    let contents = json!([{ "name": "first_name", "content": "Alice" }]);

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .and(body_partial_json(json!({
            "template_name": "welcome",
            "template_content": contents.clone(),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "email": recipient.as_ref(),
            "status": "queued"
        }])))
        .expect(1)
        .mount(&app.server)
        .await;

    let responses = app
        .email_client
        .send_templated_message(&message_to(&[recipient.clone()]), "welcome", contents)
        .await
        .unwrap();

    assert_eq!(responses[0].email, recipient);
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/templates/info.json"))
        .and(body_partial_json(json!({ "name": "missing" })))
        .respond_with(unknown_template("missing"))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.get_template("missing").await,
        Err(EmailClientError::not_found(ResourceKind::Template, "missing"))
    );
}

#[tokio::test]
async fn unknown_subaccount_is_not_found() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/subaccounts/delete.json"))
        .and(body_partial_json(json!({ "id": "missing" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": 1,
            "name": "Unknown_Subaccount",
            "message": "No subaccount exists with the id 'missing'"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.delete_subaccount("missing").await,
        Err(EmailClientError::not_found(ResourceKind::Subaccount, "missing"))
    );
}

#[tokio::test]
async fn duplicate_template_already_exists() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/templates/add.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Template",
            "message": "A template with name \"welcome\" already exists"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.add_template(Template::new("welcome")).await,
        Err(EmailClientError::already_exists(ResourceKind::Template, "welcome"))
    );
}

#[tokio::test]
async fn unknown_subaccount_on_templated_send_names_the_subaccount() {
    let app = TestMandrill::new().await;
    let mut message = message_to(&[get_random_email()]);
    message.subaccount = Some("ghost".to_owned());

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .and(body_partial_json(json!({ "message": { "subaccount": "ghost" } })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": 1,
            "name": "Unknown_Subaccount",
            "message": "No subaccount exists with the id 'ghost'"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client
            .send_templated_message(&message, "welcome", json!({}))
            .await,
        Err(EmailClientError::not_found(ResourceKind::Subaccount, "ghost"))
    );
}

#[tokio::test]
async fn unknown_subaccount_on_send_is_not_found() {
    let app = TestMandrill::new().await;
    let mut message = message_to(&[get_random_email()]);
    message.subaccount = Some("ghost".to_owned());

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": 1,
            "name": "Unknown_Subaccount",
            "message": "No subaccount exists with the id 'ghost'"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.send_message(&message).await,
        Err(EmailClientError::not_found(ResourceKind::Subaccount, "ghost"))
    );
}

#[tokio::test]
async fn add_subaccount_returns_stored_value() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/subaccounts/add.json"))
        .and(body_partial_json(json!({ "id": "cust-1", "name": "Customer One" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cust-1",
            "name": "Customer One",
            "status": "active"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let subaccount = app
        .email_client
        .add_subaccount(Subaccount::new("cust-1").with_name("Customer One"))
        .await
        .unwrap();

    assert_eq!(subaccount.id, "cust-1");
    assert_eq!(subaccount.status.as_deref(), Some("active"));
}

#[tokio::test]
async fn gateway_errors_are_service_unavailable() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.ping().await,
        Err(EmailClientError::ServiceUnavailable)
    );
}

#[tokio::test]
async fn timeouts_are_service_unavailable() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!("PONG!"))
                .set_delay(test::email_client::TIMEOUT + Duration::from_secs(1)),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(
        app.email_client.ping().await,
        Err(EmailClientError::ServiceUnavailable)
    );
}

#[tokio::test]
async fn invalid_key_is_unexpected() {
    let app = TestMandrill::new().await;

    Mock::given(method("POST"))
        .and(path("/users/ping.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    assert!(matches!(
        app.email_client.ping().await,
        Err(EmailClientError::UnexpectedError(_))
    ));
}
