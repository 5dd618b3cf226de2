#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use freeclub_application::ClubClient;
use freeclub_core::config::ClientConfig;
use freeclub_core::identity::Identity;
use freeclub_core::session::KeyValueStore;
use freeclub_interaction::{ApiRequest, ApiResponse, HttpTransport, Method};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN_DNI: &str = "12345678";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Clone)]
struct Route {
    status: u16,
    body: String,
    delay: Duration,
}

/// Scripted backend: answers by `(method, path)` and records every request.
///
/// Unknown routes answer 404.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<(Method, String), Route>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.route_delayed(method, path, status, body, Duration::ZERO);
    }

    pub fn route_delayed(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: impl Into<String>,
        delay: Duration,
    ) {
        self.routes.lock().unwrap().insert(
            (method, path.to_string()),
            Route {
                status,
                body: body.into(),
                delay,
            },
        );
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> freeclub_core::Result<ApiResponse> {
        self.sent.lock().unwrap().push(request.clone());
        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned();
        match route {
            Some(route) => {
                if !route.delay.is_zero() {
                    tokio::time::sleep(route.delay).await;
                }
                Ok(ApiResponse::new(route.status, route.body))
            }
            None => Ok(ApiResponse::new(404, r#"{"error":"not found"}"#)),
        }
    }
}

/// A JWT-shaped token whose payload carries `sub`.
pub fn token_for(sub: u64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}","fresh":false}}"#));
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2lnbmF0dXJl")
}

/// Routes for a successful administrator login as `ADMIN_DNI`.
pub fn script_admin_login(backend: &FakeBackend, permissions: &[&str]) {
    backend.route(
        Method::Post,
        "/users/login",
        200,
        serde_json::json!({ "access_token": token_for(1) }).to_string(),
    );
    backend.route(
        Method::Get,
        "/users/1",
        200,
        serde_json::json!({
            "id": 1,
            "username": ADMIN_DNI,
            "permissions": permissions,
        })
        .to_string(),
    );
    backend.route(
        Method::Get,
        &format!("/persons/{ADMIN_DNI}"),
        200,
        serde_json::json!({
            "dni": ADMIN_DNI,
            "name": "Ana",
            "lastname": "Paz",
            "email": "ana@club.test",
            "roles": ["Administrador"],
            "member": false,
        })
        .to_string(),
    );
}

pub fn identity(dni: &str, roles: &[&str], permissions: &[&str]) -> Identity {
    let account = serde_json::from_value(serde_json::json!({
        "id": 10,
        "username": dni,
        "permissions": permissions,
    }))
    .unwrap();
    let person = serde_json::from_value(serde_json::json!({
        "dni": dni,
        "name": "Test",
        "lastname": "User",
        "roles": roles,
    }))
    .unwrap();
    Identity::from_records(account, person)
}

pub fn assignment_json(id: u64, dni: &str, activity_id: u64, role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "dni": dni,
        "activity_id": activity_id,
        "role_id": 1,
        "day": "Lunes",
        "start_time": "18:00:00",
        "end_time": "19:00:00",
        "role": role,
        "person": "",
        "activity": "",
    })
}

pub fn client(backend: &Arc<FakeBackend>, storage: Arc<dyn KeyValueStore>) -> ClubClient {
    ClubClient::new(ClientConfig::default(), backend.clone(), storage).unwrap()
}
