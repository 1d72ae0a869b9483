//! In-process stand-in for the EMR backend.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use emr_client::{ClientConfig, EmrClient, RetryPolicy, SharedSession};
use emr_core::AuthStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const DOCTOR_EMAIL: &str = "bs.an@benhvien.vn";
pub const NURSE_EMAIL: &str = "yta.binh@benhvien.vn";
pub const PASSWORD: &str = "Matkhau@123";
pub const DOCTOR_TOKEN: &str = "doctor-token";
pub const NURSE_TOKEN: &str = "nurse-token";
pub const OBJECT_BYTES: &[u8] = b"%PDF-1.7 ket qua xet nghiem";

#[derive(Default)]
pub struct StubState {
    pub base_url: Mutex<String>,
    pub patients: Mutex<Vec<Value>>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub last_chat: Mutex<Option<Value>>,
}

impl StubState {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

pub struct Backend {
    pub base_url: String,
    pub state: Arc<StubState>,
}

fn patient(id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "fullName": name,
        "gender": "female",
        "dateOfBirth": "1980-05-04",
        "bloodType": "O+",
        "allergies": [],
        "createdAt": created_at,
    })
}

pub async fn spawn_backend() -> Backend {
    let state = Arc::new(StubState::default());
    {
        let mut patients = state.patients.lock().expect("lock");
        for i in 1..=25 {
            let month = if i <= 10 { 1 } else { 2 };
            patients.push(patient(
                &format!("p{i}"),
                &format!("Bệnh nhân {i:02}"),
                &format!("2024-{month:02}-{:02}T08:00:00Z", (i % 27) + 1),
            ));
        }
        patients.push(patient("p-an", "Nguyễn Thị An", "not a date"));
    }

    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"ok": true, "message": "up"})) }))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/patient", get(list_patients))
        .route("/patient/:id", get(patient_detail).patch(update_patient))
        .route("/patient/:id/medical-records", get(medical_records))
        .route("/patient/:id/files", get(patient_files))
        .route("/general-files", get(general_files))
        .route("/storage/presigned-url", get(presigned_url))
        .route("/objects/:key", get(object))
        .route("/chat", post(chat))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });

    let base_url = format!("http://{addr}");
    *state.base_url.lock().expect("lock") = base_url.clone();
    Backend { base_url, state }
}

/// A client against `backend` with its session file inside `dir`.
pub fn client_for(backend: &Backend, dir: &TempDir) -> (EmrClient, SharedSession) {
    let api_url = backend.base_url.parse().expect("api url");
    let chat_url = format!("{}/chat", backend.base_url).parse().expect("chat url");
    let config = ClientConfig::new(api_url, chat_url).with_retry(RetryPolicy::none());
    let session: SharedSession = Arc::new(tokio::sync::Mutex::new(AuthStore::load(
        dir.path().join("session.json"),
    )));
    let client = EmrClient::new(config, Arc::clone(&session)).expect("client");
    (client, session)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized", "statusCode": 401})),
    )
        .into_response()
}

fn require_token(headers: &HeaderMap) -> Result<(), Response> {
    match bearer(headers) {
        Some(DOCTOR_TOKEN) | Some(NURSE_TOKEN) => Ok(()),
        _ => Err(unauthorized()),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (email, password) {
        (DOCTOR_EMAIL, PASSWORD) => Json(json!({"accessToken": DOCTOR_TOKEN})).into_response(),
        (NURSE_EMAIL, PASSWORD) => Json(json!({"accessToken": NURSE_TOKEN})).into_response(),
        (DOCTOR_EMAIL, _) | (NURSE_EMAIL, _) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": ["Sai email hoặc mật khẩu"]})),
        )
            .into_response(),
        _ => unauthorized(),
    }
}

async fn logout(State(state): State<Arc<StubState>>) -> StatusCode {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn profile(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(DOCTOR_TOKEN) => Json(json!({
            "id": "u1",
            "email": DOCTOR_EMAIL,
            "fullName": "BS. Nguyễn Văn An",
            "role": "doctor",
            "status": "active",
        }))
        .into_response(),
        Some(NURSE_TOKEN) => Json(json!({
            "id": "u2",
            "email": NURSE_EMAIL,
            "role": ["nurse"],
            "status": "active",
        }))
        .into_response(),
        _ => unauthorized(),
    }
}

async fn forgot_password(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"message": format!("Đã gửi email tới {}", body["email"].as_str().unwrap_or_default())}))
}

async fn list_patients(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);

    let search = params.get("search").map(|s| s.to_lowercase());
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);

    let patients = state.patients.lock().expect("lock");
    let matching: Vec<Value> = patients
        .iter()
        .filter(|p| {
            search.as_deref().map_or(true, |s| {
                p["fullName"].as_str().unwrap_or_default().to_lowercase().contains(s)
            })
        })
        .cloned()
        .collect();
    let data: Vec<Value> = matching
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();

    Json(json!({"data": data, "total": matching.len(), "page": page, "limit": limit}))
        .into_response()
}

async fn patient_detail(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    state.detail_calls.fetch_add(1, Ordering::SeqCst);
    let patients = state.patients.lock().expect("lock");
    match patients.iter().find(|p| p["id"] == id.as_str()) {
        Some(p) => Json(p.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("Patient {id} not found")})),
        )
            .into_response(),
    }
}

async fn update_patient(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<Value>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    if update.get("phone").and_then(|p| p.as_str()) == Some("invalid") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Số điện thoại không hợp lệ"})),
        )
            .into_response();
    }
    let mut patients = state.patients.lock().expect("lock");
    match patients.iter_mut().find(|p| p["id"] == id.as_str()) {
        Some(p) => {
            if let (Some(target), Some(fields)) = (p.as_object_mut(), update.as_object()) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            p["updatedAt"] = json!("2024-03-01T00:00:00Z");
            Json(p.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn medical_records(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    Json(json!([{
        "id": format!("{id}-r1"),
        "visitDate": "2024-02-10",
        "doctorName": "BS. Nguyễn Văn An",
        "diagnosis": "Tăng huyết áp",
        "testResults": [{"name": "Glucose", "value": "7.2", "unit": "mmol/L", "isAbnormal": true}],
    }]))
    .into_response()
}

async fn patient_files(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    Json(json!([{
        "id": "f1",
        "name": "xet-nghiem.pdf",
        "storageKey": format!("patients/{id}/xet-nghiem.pdf"),
        "mimeType": "application/pdf",
        "size": OBJECT_BYTES.len(),
    }]))
    .into_response()
}

async fn general_files(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    let files = vec![
        json!({"id": "g1", "name": "Phác đồ tăng huyết áp.pdf", "folder": "Phác đồ", "storageKey": "general/g1.pdf"}),
        json!({"id": "g2", "name": "Phác đồ đái tháo đường.pdf", "folder": "Phác đồ", "storageKey": "general/g2.pdf"}),
        json!({"id": "g3", "name": "Mẫu giấy ra viện.docx", "folder": "Biểu mẫu", "storageKey": "general/g3.docx"}),
        json!({"id": "g4", "name": "Ghi chú.txt", "storageKey": "general/g4.txt"}),
    ];
    let folder = params.get("folder");
    let filtered: Vec<Value> = files
        .into_iter()
        .filter(|f| folder.map_or(true, |wanted| f["folder"].as_str() == Some(wanted.as_str())))
        .collect();
    Json(Value::Array(filtered)).into_response()
}

async fn presigned_url(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    let key = params.get("key").cloned().unwrap_or_default();
    let base = state.base_url.lock().expect("lock").clone();
    let object = key.replace('/', "_");
    Json(json!({"url": format!("{base}/objects/{object}?sig=abc"), "expiresIn": 300}))
        .into_response()
}

async fn object(headers: HeaderMap, Path(_key): Path<String>) -> Response {
    // Presigned links must be fetched without the dashboard token.
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, "unexpected Authorization header").into_response();
    }
    OBJECT_BYTES.to_vec().into_response()
}

async fn chat(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = require_token(&headers) {
        return denied;
    }
    *state.last_chat.lock().expect("lock") = Some(body);
    Json(json!({
        "message": {
            "id": "a1",
            "role": "assistant",
            "content": "",
            "parts": [
                {"type": "step-start"},
                {"type": "tool-invocation", "toolInvocation": {
                    "toolCallId": "c1",
                    "toolName": "searchPatients",
                    "args": {"query": "An"},
                    "state": "result",
                    "result": [{"id": "p-an", "fullName": "Nguyễn Thị An"}],
                }},
                {"type": "text", "text": "Tìm thấy 1 bệnh nhân."},
            ],
        }
    }))
    .into_response()
}
