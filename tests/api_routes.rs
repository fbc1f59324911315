mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use common::{send, setup_app, ADMIN, VIEWER};
use movers_console::backend::Resource;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_enquiry_list_filters_then_paginates() {
    let (app, _) = setup_app();

    let (status, page) = send(&app, "GET", "/api/enquiries?status=new&pageSize=2", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::OK, "{}", page);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["id"], 1);

    let (_, page) = send(&app, "GET", "/api/enquiries?search=yusuf&assigned=unassigned", Some(VIEWER), None).await;
    let ids: Vec<i64> = page["items"].as_array().unwrap().iter().map(|e| e["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 4]);

    let (_, page) = send(
        &app,
        "GET",
        "/api/enquiries?moveDateFrom=2026-11-05&moveDateTo=2026-11-30",
        Some(VIEWER),
        None,
    )
    .await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_enquiry_list_rejects_oversized_page() {
    let (app, _) = setup_app();
    let (status, body) = send(&app, "GET", "/api/enquiries?pageSize=500", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["page_size"].is_array());
}

#[tokio::test]
async fn test_enquiry_list_rejects_huge_page_number() {
    let (app, _) = setup_app();
    let (status, body) = send(&app, "GET", "/api/enquiries?page=18446744073709551615", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["page"].is_array());
}

#[tokio::test]
async fn test_enquiry_creation_requires_captcha_token() {
    let (app, backend) = setup_app();
    let mut form = json!({
        "fullName": "Karim Saleh",
        "email": "karim@example.com",
        "phone": "+971 55 987 6543",
        "serviceType": "local",
        "captchaToken": "  "
    });

    let (status, body) = send(&app, "POST", "/api/enquiries", Some(ADMIN), Some(form.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please complete the CAPTCHA challenge.");
    assert!(backend.writes().is_empty());

    form["captchaToken"] = json!("captcha-ok");
    let (status, body) = send(&app, "POST", "/api/enquiries", Some(ADMIN), Some(form)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["banner"]["message"], "Enquiry submitted successfully.");

    let stored = backend.rows(Resource::Enquiries);
    let created = stored.last().unwrap();
    assert_eq!(created["recaptcha_token"], "captcha-ok");
    assert_eq!(created["full_name"], "Karim Saleh");
}

#[tokio::test]
async fn test_viewer_cannot_add_enquiry() {
    let (app, backend) = setup_app();
    let form = json!({
        "fullName": "Karim Saleh",
        "email": "karim@example.com",
        "phone": "+971 55 987 6543",
        "serviceType": "local",
        "captchaToken": "captcha-ok"
    });

    let (status, _) = send(&app, "POST", "/api/enquiries", Some(VIEWER), Some(form)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn test_booking_detail_and_share_link() {
    let (app, _) = setup_app();

    let (status, booking) = send(&app, "GET", "/api/bookings/12", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::OK, "{}", booking);
    assert_eq!(booking["booking_id"], "BK-0012");

    let (status, share) = send(&app, "GET", "/api/bookings/12/share", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::OK);
    let link = share["link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/971501234567?text=Hello%20Amina%20Yusuf"));
    assert!(share["message"].as_str().unwrap().contains("confirmed for 20/11/2026"));

    let (status, _) = send(&app, "GET", "/api/bookings/99", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_delete_needs_delete_permission() {
    let (app, backend) = setup_app();

    let (status, _) = send(&app, "DELETE", "/api/bookings/12", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(backend.writes().is_empty());

    let (status, banner) = send(&app, "DELETE", "/api/bookings/12", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banner["message"], "Booking deleted successfully.");
    assert_eq!(backend.writes(), vec!["delete bookings 12".to_string()]);
}

#[tokio::test]
async fn test_booking_update_rejected_for_viewer() {
    let (app, backend) = setup_app();
    let payload = json!({ "booking": { "status": "completed" } });

    let (status, _) = send(&app, "PUT", "/api/bookings/12", Some(VIEWER), Some(payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn test_booking_update_with_assignments() {
    let (app, backend) = setup_app();
    let payload = json!({
        "booking": { "notes": "Fragile piano" },
        "trucks": [{ "truck": 3, "quantity": 2 }]
    });

    let (status, saved) = send(&app, "PUT", "/api/bookings/12", Some(ADMIN), Some(payload)).await;
    assert_eq!(status, StatusCode::OK, "{}", saved);
    assert_eq!(saved["banner"]["kind"], "success");
    assert_eq!(
        backend.writes(),
        vec!["update bookings 12".to_string(), "create booking-trucks".to_string()]
    );
    assert_eq!(backend.rows(Resource::BookingTrucks)[0]["booking"], 12);
}

#[tokio::test]
async fn test_raster_upload_rejects_non_image() {
    let (app, _) = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/bookings/12/confirmation/raster")
        .header("authorization", format!("Bearer {}", VIEWER))
        .header("content-type", "image/png")
        .body(Body::from("definitely not a png"))
        .unwrap();

    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "The page capture is not a valid PNG or JPEG image.");
}

#[tokio::test]
async fn test_raster_upload_returns_paged_pdf() {
    let (app, _) = setup_app();
    let capture = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_pixel(210, 298, image::Rgb([250, 250, 250])));
    let mut png = Vec::new();
    capture.write_to(&mut png, image::ImageOutputFormat::Png).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/bookings/12/confirmation/raster")
        .header("authorization", format!("Bearer {}", VIEWER))
        .header("content-type", "image/png")
        .body(Body::from(png))
        .unwrap();

    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"Booking_BK-0012.pdf\""
    );
    let bytes = to_bytes(resp.into_body(), 16 * 1024 * 1024).await.unwrap();
    let pages = regex::Regex::new(r"/Type\s*/Page\b").unwrap();
    assert_eq!(pages.find_iter(&String::from_utf8_lossy(&bytes)).count(), 2);
}

#[tokio::test]
async fn test_lookups_load_requested_lists() {
    let (app, _) = setup_app();

    let (status, lists) = send(&app, "GET", "/api/lookups?resources=rooms,items", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lists["rooms"][0]["name"], "Living room");
    assert_eq!(lists["items"][0]["name"], "Sofa");

    // Recursos sensíveis não são expostos como lista de apoio
    let (status, _) = send(&app, "GET", "/api/lookups?resources=rooms,roles", Some(VIEWER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
