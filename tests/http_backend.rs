use std::time::Duration;

use movers_console::{
    backend::{http_backend::HttpBackend, BackendApi, BearerToken, Resource},
    common::error::AppError,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn token() -> BearerToken {
    BearerToken("abc123".into())
}

async fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_sends_bearer_and_unwraps_results_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/surveys/"))
        .and(query_param("enquiry", "9"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{ "id": 55, "enquiry": 9 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = backend_for(&server).await;
    let rows = api
        .list(&token(), Resource::Surveys, &[("enquiry", "9".to_string())])
        .await
        .unwrap();
    assert_eq!(rows, vec![json!({ "id": 55, "enquiry": 9 })]);
}

#[tokio::test]
async fn test_list_accepts_plain_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rooms/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Kitchen" }])))
        .mount(&server)
        .await;

    let rows = backend_for(&server).await.list(&token(), Resource::Rooms, &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_error_detail_becomes_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/12/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .await
        .retrieve(&token(), Resource::Bookings, "12")
        .await
        .unwrap_err();
    match err {
        AppError::Upstream { status, detail, banner } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Not found.");
            assert!(banner.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_posts_json_body() {
    let server = MockServer::start().await;
    let body = json!({ "booking": 12, "truck": 3, "quantity": 2 });
    Mock::given(method("POST"))
        .and(path("/booking-trucks/"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 77, "booking": 12 })))
        .expect(1)
        .mount(&server)
        .await;

    let created = backend_for(&server)
        .await
        .create(&token(), Resource::BookingTrucks, &body)
        .await
        .unwrap();
    assert_eq!(created["id"], 77);
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/booking-labours/4/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .await
        .delete(&token(), Resource::BookingLabours, "4")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Porta sem ninguém escutando
    let api = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = api.fetch(&token(), Resource::Profile).await.unwrap_err();
    assert!(matches!(err, AppError::Transport { banner: None, .. }));
}
