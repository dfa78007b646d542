//! End-to-end flow: directory lookup through fetch over a scripted
//! transport double.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use serde_json::json;

use apikit::api::Payload;
use apikit::http::{RawResponse, Transport};
use apikit::{
    Api, ApiBase, CallOverride, EndpointDef, FetchError, FetchOptions, HttpService, Interceptors,
    RequestOptions,
};

struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RequestOptions>>>,
}

fn scripted(
    responses: impl IntoIterator<Item = (u16, String)>,
) -> (ScriptedTransport, Arc<AtomicUsize>, Arc<Mutex<Vec<RequestOptions>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let responses = responses
        .into_iter()
        .map(|(status, body)| RawResponse {
            status: StatusCode::from_u16(status).expect("valid status"),
            body,
        })
        .collect();
    let transport = ScriptedTransport {
        responses: Mutex::new(responses),
        calls: calls.clone(),
        requests: requests.clone(),
    };
    (transport, calls, requests)
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestOptions) -> Result<RawResponse, reqwest::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left"))
    }
}

fn admin_api() -> Api {
    Api::new(
        ApiBase {
            host: "http://192.168.1.1".to_string(),
            prefix: "api/admin".to_string(),
            version: "v1".to_string(),
            module: "user".to_string(),
            ..ApiBase::default()
        },
        [
            ("login", EndpointDef::at("login").method(Method::POST)),
            ("profile", EndpointDef::at("profile/:id")),
        ],
    )
}

#[tokio::test]
async fn it_fetches_a_registered_endpoint_end_to_end() {
    let body = json!({"code": 0, "data": {"token": "abc"}}).to_string();
    let (transport, calls, requests) = scripted([(200, body)]);
    let service = HttpService::with_transport(transport);

    let overrides = CallOverride::default()
        .body_field("user", "ada")
        .body_field("password", "lovelace");
    let options = admin_api()
        .get_with("login", Some(&overrides), &[])
        .unwrap();

    let response = service.fetch(options).await.unwrap();

    assert_eq!(response["data"]["token"], json!("abc"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let sent = requests.lock().unwrap();
    assert_eq!(sent[0].url(), "http://192.168.1.1/api/admin/v1/user/login");
    assert_eq!(sent[0].method(), &Method::POST);
    // The service default content type turns the body into a JSON payload.
    assert_eq!(
        sent[0].payload(),
        &Payload::Json(r#"{"password":"lovelace","user":"ada"}"#.to_string()),
    );
}

#[tokio::test]
async fn it_substitutes_path_parameters_before_sending() {
    let (transport, _, requests) = scripted([(200, json!({"code": 0}).to_string())]);
    let service = HttpService::with_transport(transport);

    let options = admin_api()
        .get_with("profile", None, &[("id", "42")])
        .unwrap();
    service.fetch(options).await.unwrap();

    assert_eq!(
        requests.lock().unwrap()[0].url(),
        "http://192.168.1.1/api/admin/v1/user/profile/42",
    );
}

#[tokio::test]
async fn it_serves_a_repeat_request_from_the_cache() {
    let (transport, calls, _) = scripted([(200, json!({"code": 0, "data": 7}).to_string())]);
    let service = HttpService::with_transport(transport);
    let api = admin_api();

    let first = service.fetch(api.get("login").unwrap()).await.unwrap();
    let second = service
        .fetch_with(api.get("login").unwrap(), FetchOptions::default().from_cache())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn it_routes_the_session_expiry_message_through_the_error_hook() {
    let (transport, _, _) = scripted([(401, String::new())]);
    let mut service = HttpService::with_transport(transport);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    service.config(Interceptors::default().on_error(move |message, _response| {
        sink.lock().unwrap().push(message.to_string());
    }));

    let err = service
        .fetch(admin_api().get("login").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { .. }));
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["session expired, please log in again".to_string()],
    );
}

#[tokio::test]
async fn it_surfaces_unknown_endpoints_as_errors() {
    let err = admin_api().get("logout").unwrap_err();
    assert_eq!(err.to_string(), "unknown endpoint: logout");
}
