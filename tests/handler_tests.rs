mod common;

use std::sync::Arc;

use common::{
    MEDIA_URL, StaticDecryptor, VISION_KEY, caption_body, event_with_signature, media_message,
    ocr_body, signed_event, test_config, test_responder,
};
use lambda_runtime::{Context, LambdaEvent};
use serde_json::json;
use snapsight::ResponderError;
use snapsight::api::Responder;
use snapsight::api::handler::function_handler;
use snapsight::core::credentials::CredentialCache;
use snapsight::reply::NO_MEDIA_MESSAGE;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_vision(server: &MockServer, analyze: ResponseTemplate, ocr: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(query_param("visualFeatures", "Description"))
        .and(query_param("language", "en"))
        .and(header("Ocp-Apim-Subscription-Key", VISION_KEY))
        .and(body_json(json!({ "url": MEDIA_URL })))
        .respond_with(analyze)
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ocr"))
        .and(header("Ocp-Apim-Subscription-Key", VISION_KEY))
        .and(body_json(json!({ "url": MEDIA_URL })))
        .respond_with(ocr)
        .expect(1)
        .mount(server)
        .await;
}

async fn expect_no_vision_calls(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_media_message_gets_caption_and_text() {
    let server = MockServer::start().await;
    mount_vision(
        &server,
        ResponseTemplate::new(200).set_body_json(caption_body("a cat", 0.873)),
        ResponseTemplate::new(200).set_body_json(ocr_body(&[&[&["Hello", "World"]]])),
    )
    .await;
    let (responder, _) = test_responder(&server.uri());

    let reply = responder.process(&signed_event(&media_message())).await.unwrap();

    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.content_type, Some("text/xml"));
    assert!(reply.body.contains(
        "<Message>I am 87 percent confident that this image can be described as a cat</Message>"
    ));
    assert!(reply.body.contains("<Message>Image Text:\nHello World</Message>"));
}

#[tokio::test]
async fn test_vision_errors_degrade_to_apology() {
    let server = MockServer::start().await;
    mount_vision(
        &server,
        ResponseTemplate::new(500).set_body_string("boom"),
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;
    let (responder, _) = test_responder(&server.uri());

    let reply = responder.process(&signed_event(&media_message())).await.unwrap();

    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.body.matches("<Message>").count(), 1);
    assert!(reply.body.contains("Sorry. I was not able to analyze this media."));
}

#[tokio::test]
async fn test_messages_without_media_get_canned_reply() {
    let server = MockServer::start().await;
    expect_no_vision_calls(&server).await;
    let (responder, _) = test_responder(&server.uri());

    for num_media in [None, Some("0"), Some("abc")] {
        let mut pairs = vec![("MessageSid", "MM2"), ("Body", "hi")];
        if let Some(n) = num_media {
            pairs.push(("NumMedia", n));
        }
        let reply = responder.process(&signed_event(&pairs)).await.unwrap();
        assert_eq!(reply.status_code, 200);
        assert!(reply.body.contains(&format!("<Message>{NO_MEDIA_MESSAGE}</Message>")));
        assert_eq!(reply.body.matches("<Message>").count(), 1);
    }
}

#[tokio::test]
async fn test_bad_signature_is_rejected_before_analysis() {
    let server = MockServer::start().await;
    expect_no_vision_calls(&server).await;
    let (responder, _) = test_responder(&server.uri());

    let forged = event_with_signature(&media_message(), Some("Zm9yZ2VkIHNpZ25hdHVyZQ=="), "X-Signature");
    let err = responder.process(&forged).await.unwrap_err();
    assert!(matches!(err, ResponderError::AuthenticationFailure));

    let unsigned = event_with_signature(&media_message(), None, "X-Signature");
    let response = function_handler(&responder, LambdaEvent::new(unsigned, Context::default()))
        .await
        .unwrap();
    assert_eq!(response["statusCode"], 500);
    assert_eq!(response["body"], "");
}

#[tokio::test]
async fn test_provider_signature_header_is_accepted() {
    let server = MockServer::start().await;
    expect_no_vision_calls(&server).await;
    let (responder, _) = test_responder(&server.uri());

    let pairs = [("NumMedia", "0")];
    let signed = signed_event(&pairs);
    let signature = signed["headers"]["X-Signature"].as_str().unwrap().to_string();
    let event = event_with_signature(&pairs, Some(&signature), "x-twilio-signature");

    let reply = responder.process(&event).await.unwrap();
    assert_eq!(reply.status_code, 200);
}

#[tokio::test]
async fn test_lambda_payload_shape() {
    let server = MockServer::start().await;
    expect_no_vision_calls(&server).await;
    let (responder, decryptor) = test_responder(&server.uri());

    let event = LambdaEvent::new(signed_event(&[("NumMedia", "0")]), Context::default());
    let response = function_handler(&responder, event).await.unwrap();

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Content-Type"], "text/xml");
    assert!(response["body"].as_str().unwrap().starts_with("<?xml"));

    // Credentials are decrypted once and reused by later invocations.
    let again = LambdaEvent::new(signed_event(&[("NumMedia", "0")]), Context::default());
    function_handler(&responder, again).await.unwrap();
    assert_eq!(decryptor.calls(), 2);
}

#[tokio::test]
async fn test_credential_failure_fails_the_invocation() {
    let server = MockServer::start().await;
    expect_no_vision_calls(&server).await;

    let decryptor = Arc::new(StaticDecryptor::new(&[]));
    let config = test_config(&server.uri());
    let credentials = CredentialCache::from_config(decryptor, &config);
    let responder = Responder::new(config, credentials, reqwest::Client::new());

    let err = responder
        .process(&signed_event(&media_message()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResponderError::CredentialUnavailable(_)));

    let event = LambdaEvent::new(signed_event(&media_message()), Context::default());
    assert!(function_handler(&responder, event).await.is_err());
}
