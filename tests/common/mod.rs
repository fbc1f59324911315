#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use movers_console::{
    backend::{BackendApi, BearerToken, Resource},
    build_router,
    common::error::AppError,
    AppConfig, AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN: &str = "admin-token";
pub const VIEWER: &str = "viewer-token";

/// Initialize tracing for tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("movers_console=debug").try_init();
}

/// API REST em memória: uma lista de registros JSON por recurso.
#[derive(Default)]
pub struct FakeBackend {
    rows: Mutex<HashMap<Resource, Vec<Value>>>,
    writes: Mutex<Vec<String>>,
    next_id: Mutex<i64>,
}

impl FakeBackend {
    pub fn seeded() -> Self {
        let backend = FakeBackend { next_id: Mutex::new(1000), ..Default::default() };
        backend.seed(Resource::Roles, vec![json!({
            "id": 2,
            "name": "Viewer",
            "description": null,
            "permissions": [
                { "page": "survey", "can_view": true, "can_add": false, "can_edit": false, "can_delete": false },
                { "page": "enquiry", "can_view": true, "can_add": false, "can_edit": false, "can_delete": false },
                { "page": "booking", "can_view": true, "can_add": false, "can_edit": false, "can_delete": false }
            ]
        })]);
        backend.seed(Resource::Rooms, vec![json!({ "id": 1, "name": "Living room" })]);
        backend.seed(Resource::Items, vec![json!({
            "id": 5, "name": "Sofa", "room": 1, "volume": "2.5", "volume_unit": "cbm",
            "weight": "40", "weight_unit": "kg"
        })]);
        backend.seed(Resource::Materials, vec![json!({ "id": 1, "name": "Carton box" })]);
        backend.seed(Resource::Enquiries, vec![
            enquiry(1, "Amina Yusuf", "new", Some("2026-11-02"), None),
            enquiry(2, "Omar Haddad", "new", Some("2026-11-10"), Some(7)),
            enquiry(3, "Lena Fischer", "contacted", None, Some(7)),
            enquiry(4, "Yusuf Ali", "new", Some("2026-11-20"), None),
        ]);
        backend.seed(Resource::Bookings, vec![json!({
            "id": 12,
            "booking_id": "BK-0012",
            "customer_name": "Amina Yusuf",
            "customer_phone": "+971 50 123 4567",
            "customer_email": "amina@example.com",
            "move_date": "2026-11-20",
            "start_time": "08:30:00",
            "origin": "Dubai",
            "destination": "Lagos",
            "status": "scheduled",
            "estimated_volume": "32.5",
            "supervisor_name": null,
            "notes": null
        })]);
        backend
    }

    pub fn seed(&self, resource: Resource, rows: Vec<Value>) {
        self.rows.lock().unwrap().insert(resource, rows);
    }

    pub fn rows(&self, resource: Resource) -> Vec<Value> {
        self.rows.lock().unwrap().get(&resource).cloned().unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    fn profile_for(token: &BearerToken) -> Option<Value> {
        match token.as_str() {
            ADMIN => Some(json!({ "id": 1, "name": "Admin", "email": "admin@example.com", "role": null, "is_superuser": true })),
            VIEWER => Some(json!({ "id": 2, "name": "Viewer", "email": "viewer@example.com", "role": 2, "is_superuser": false })),
            _ => None,
        }
    }

    fn not_found(resource: Resource, id: &str) -> AppError {
        AppError::Upstream { status: 404, detail: format!("{} {} not found", resource, id), banner: None }
    }
}

pub fn enquiry(id: i64, name: &str, status: &str, move_date: Option<&str>, assigned: Option<i64>) -> Value {
    json!({
        "id": id,
        "full_name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "phone": format!("+97150000{:04}", id),
        "service_type": "international",
        "status": status,
        "move_date": move_date,
        "address": "12 Palm Street",
        "message": null,
        "assigned_user": assigned,
        "created_at": null
    })
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn list(&self, token: &BearerToken, resource: Resource, query: &[(&str, String)]) -> Result<Vec<Value>, AppError> {
        if Self::profile_for(token).is_none() {
            return Err(AppError::Upstream { status: 401, detail: "bad token".into(), banner: None });
        }
        let rows = self.rows(resource);
        // Único filtro que a API real aplica e o console usa: ?enquiry=
        Ok(match query.iter().find(|(key, _)| *key == "enquiry") {
            Some((_, enquiry)) => rows
                .into_iter()
                .filter(|row| row["enquiry"].to_string() == *enquiry)
                .collect(),
            None => rows,
        })
    }

    async fn retrieve(&self, _token: &BearerToken, resource: Resource, id: &str) -> Result<Value, AppError> {
        self.rows(resource)
            .into_iter()
            .find(|row| row["id"].to_string() == id)
            .ok_or_else(|| Self::not_found(resource, id))
    }

    async fn fetch(&self, token: &BearerToken, resource: Resource) -> Result<Value, AppError> {
        match resource {
            Resource::Profile => Self::profile_for(token)
                .ok_or_else(|| AppError::Upstream { status: 401, detail: "bad token".into(), banner: None }),
            other => Err(Self::not_found(other, "")),
        }
    }

    async fn create(&self, _token: &BearerToken, resource: Resource, body: &Value) -> Result<Value, AppError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let mut row = body.clone();
        row["id"] = json!(id);
        self.rows.lock().unwrap().entry(resource).or_default().push(row.clone());
        self.writes.lock().unwrap().push(format!("create {}", resource));
        Ok(row)
    }

    async fn update(&self, _token: &BearerToken, resource: Resource, id: &str, body: &Value) -> Result<Value, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&resource)
            .and_then(|rows| rows.iter_mut().find(|row| row["id"].to_string() == id))
            .ok_or_else(|| Self::not_found(resource, id))?;
        *row = body.clone();
        self.writes.lock().unwrap().push(format!("update {} {}", resource, id));
        Ok(body.clone())
    }

    async fn delete(&self, _token: &BearerToken, resource: Resource, id: &str) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let list = rows.entry(resource).or_default();
        let before = list.len();
        list.retain(|row| row["id"].to_string() != id);
        if list.len() == before {
            return Err(Self::not_found(resource, id));
        }
        self.writes.lock().unwrap().push(format!("delete {} {}", resource, id));
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        api_base_url: "http://upstream.invalid".into(),
        recaptcha_site_key: "site-key-123".into(),
        bind_addr: "127.0.0.1:0".into(),
        fonts_dir: "./fonts".into(),
        font_family: "Roboto".into(),
        company_name: "Relocation Services".into(),
        http_timeout: Duration::from_secs(5),
        auth_cache_ttl: Duration::from_secs(60),
        wizard_session_ttl: Duration::from_secs(600),
    }
}

pub fn setup_app() -> (Router, Arc<FakeBackend>) {
    init_tracing();
    let backend = Arc::new(FakeBackend::seeded());
    let state = AppState::with_backend(test_config(), backend.clone());
    (build_router(state), backend)
}

/// Dispara um request JSON e devolve status + corpo (Null quando vazio).
pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}
