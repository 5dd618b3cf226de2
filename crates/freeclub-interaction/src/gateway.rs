//! Resource Gateway: every backend call goes through here.
//!
//! Token attachment, per-endpoint encoding, the 401 contract and response
//! shape validation are implemented once, in this module. The gateway also
//! owns the assignment Read Cache, so every assignment write invalidates it.

use crate::read_cache::ReadCache;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use freeclub_core::config::DEFAULT_ASSIGNMENTS_TTL_SECS;
use freeclub_core::resource::{
    Account, AccountUpdate, Activity, ActivityId, ActivityUpdate, Assignment, AssignmentId,
    AttendanceRecord, AttendanceUpdate, Fields, FormFields, NewAccount, NewActivity,
    NewAssignment, NewAttendance, NewPerson, Person, PersonUpdate, RoleRecord,
};
use freeclub_core::session::SessionHandle;
use freeclub_core::{ClubError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Transport, session and timeout shared by the gateway and its cache fetcher.
struct Endpoint {
    transport: Arc<dyn HttpTransport>,
    session: SessionHandle,
    request_timeout: Option<Duration>,
}

/// Authenticated access to the club backend.
///
/// Cheap to clone; clones share the transport, the session handle and the
/// assignment cache.
#[derive(Clone)]
pub struct ResourceGateway {
    endpoint: Arc<Endpoint>,
    assignments: ReadCache<Assignment>,
}

impl ResourceGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionHandle) -> Self {
        let endpoint = Endpoint {
            transport,
            session,
            request_timeout: None,
        };
        Self::assemble(endpoint, Duration::from_secs(DEFAULT_ASSIGNMENTS_TTL_SECS))
    }

    /// Bounds every call made through this gateway.
    pub fn with_request_timeout(self, timeout: Option<Duration>) -> Self {
        let endpoint = Endpoint {
            transport: Arc::clone(&self.endpoint.transport),
            session: self.endpoint.session.clone(),
            request_timeout: timeout,
        };
        Self::assemble(endpoint, self.assignments.ttl())
    }

    /// How long a fetched assignment list is served without refetching.
    pub fn with_assignments_ttl(self, ttl: Duration) -> Self {
        let endpoint = Endpoint {
            transport: Arc::clone(&self.endpoint.transport),
            session: self.endpoint.session.clone(),
            request_timeout: self.endpoint.request_timeout,
        };
        Self::assemble(endpoint, ttl)
    }

    fn assemble(endpoint: Endpoint, ttl: Duration) -> Self {
        let endpoint = Arc::new(endpoint);
        let fetcher = Arc::clone(&endpoint);
        let assignments: ReadCache<Assignment> = ReadCache::new("assignments", ttl, move || {
            let endpoint = Arc::clone(&fetcher);
            async move {
                endpoint
                    .get_list("assignments", "/asignations".to_string())
                    .await
            }
        });
        Self {
            endpoint,
            assignments,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.endpoint.session
    }

    // ============================================================================
    // Authentication
    // ============================================================================

    /// `POST /users/login` with a multipart form. Returns the bearer token.
    ///
    /// No token is attached. A response without `access_token` is malformed.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        challenge_token: Option<&str>,
        timeout: Duration,
    ) -> Result<String> {
        let mut fields: Fields = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        if let Some(challenge) = challenge_token.filter(|c| !c.is_empty()) {
            fields.push(("recaptcha_token".to_string(), challenge.to_string()));
        }

        let request = ApiRequest::new(Method::Post, "/users/login")
            .with_multipart(fields)
            .with_timeout(Some(timeout));
        let response = self.execute(request).await?;

        #[derive(serde::Deserialize)]
        struct LoginResponse {
            #[serde(default)]
            access_token: Option<String>,
        }

        let login: LoginResponse = decode_one("login", &response)?;
        login
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ClubError::malformed("login", "response has no access_token"))
    }

    /// `GET /users/{id}` with an explicit token, before a session exists.
    pub async fn fetch_account_as(&self, id: u64, token: &str) -> Result<Account> {
        let request = ApiRequest::new(Method::Get, format!("/users/{id}"))
            .with_bearer(Some(token.to_string()));
        let response = self.execute(request).await?;
        decode_one("account", &response)
    }

    /// `GET /persons/{key}` with an explicit token, before a session exists.
    pub async fn fetch_person_as(&self, key: &str, token: &str) -> Result<Person> {
        let request = ApiRequest::new(Method::Get, format!("/persons/{}", segment(key)?))
            .with_bearer(Some(token.to_string()));
        let response = self.execute(request).await?;
        decode_one("person", &response)
    }

    // ============================================================================
    // Persons
    // ============================================================================

    pub async fn list_persons(&self) -> Result<Vec<Person>> {
        self.get_list("persons", "/persons".to_string()).await
    }

    pub async fn get_person(&self, dni: &str) -> Result<Person> {
        self.get_one("person", format!("/persons/{}", segment(dni)?)).await
    }

    pub async fn create_person(&self, person: &NewPerson) -> Result<Person> {
        let request = self
            .authed(Method::Post, "/persons/".to_string())
            .with_multipart(person.form_fields());
        let response = self.execute(request).await?;
        decode_one("person", &response)
    }

    pub async fn update_person(&self, dni: &str, update: &PersonUpdate) -> Result<Person> {
        let request = self
            .authed(Method::Put, format!("/persons/{}", segment(dni)?))
            .with_multipart(update.form_fields());
        let response = self.execute(request).await?;
        decode_one("person", &response)
    }

    pub async fn delete_person(&self, dni: &str) -> Result<()> {
        self.delete(format!("/persons/{}", segment(dni)?)).await
    }

    // ============================================================================
    // Accounts
    // ============================================================================

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.get_list("accounts", "/users".to_string()).await
    }

    pub async fn get_account(&self, id: u64) -> Result<Account> {
        self.get_one("account", format!("/users/{id}")).await
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let request = self
            .authed(Method::Post, "/users/".to_string())
            .with_multipart(account.form_fields());
        let response = self.execute(request).await?;
        decode_one("account", &response)
    }

    pub async fn update_account(&self, id: u64, update: &AccountUpdate) -> Result<Account> {
        let request = self
            .authed(Method::Put, format!("/users/{id}"))
            .with_multipart(update.form_fields());
        let response = self.execute(request).await?;
        decode_one("account", &response)
    }

    // ============================================================================
    // Activities
    // ============================================================================

    pub async fn list_activities(&self) -> Result<Vec<Activity>> {
        self.get_list("activities", "/activities".to_string()).await
    }

    pub async fn get_activity(&self, id: ActivityId) -> Result<Activity> {
        self.get_one("activity", format!("/activities/{id}")).await
    }

    pub async fn create_activity(&self, activity: &NewActivity) -> Result<Activity> {
        let request = self
            .authed(Method::Post, "/activities/".to_string())
            .with_multipart(activity.form_fields());
        let response = self.execute(request).await?;
        decode_one("activity", &response)
    }

    /// The backend reads PUT parameters from the query string here, unlike POST.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        update: &ActivityUpdate,
    ) -> Result<Activity> {
        let request = self
            .authed(Method::Put, format!("/activities/{id}"))
            .with_query(update.form_fields());
        let response = self.execute(request).await?;
        decode_one("activity", &response)
    }

    /// Logical delete on the backend side.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<()> {
        self.delete(format!("/activities/{id}")).await
    }

    // ============================================================================
    // Assignments
    // ============================================================================

    /// All assignments, served from the cache while fresh.
    pub async fn list_assignments(&self) -> Result<Arc<Vec<Assignment>>> {
        self.assignments.get().await
    }

    /// Drops the cached assignments so the next read refetches.
    pub fn invalidate_assignments(&self) {
        self.assignments.invalidate();
    }

    /// Whether a read right now would be served without a request.
    pub fn assignments_cached(&self) -> bool {
        self.assignments.is_fresh()
    }

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> Result<Assignment> {
        let request = self
            .authed(Method::Post, "/asignations/".to_string())
            .with_multipart(assignment.form_fields());
        let response = self.execute(request).await?;
        self.assignments.invalidate();
        decode_one("assignment", &response)
    }

    pub async fn delete_assignment(&self, id: AssignmentId) -> Result<()> {
        self.delete(format!("/asignations/{id}")).await?;
        self.assignments.invalidate();
        Ok(())
    }

    // ============================================================================
    // Attendance
    // ============================================================================

    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        self.get_list("attendance", "/attendancies".to_string()).await
    }

    pub async fn create_attendance(
        &self,
        attendance: &NewAttendance,
    ) -> Result<AttendanceRecord> {
        let request = self
            .authed(Method::Post, "/attendancies/".to_string())
            .with_multipart(attendance.form_fields());
        let response = self.execute(request).await?;
        decode_one("attendance", &response)
    }

    pub async fn update_attendance(
        &self,
        id: u64,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord> {
        let request = self
            .authed(Method::Put, format!("/attendancies/{id}"))
            .with_multipart(update.form_fields());
        let response = self.execute(request).await?;
        decode_one("attendance", &response)
    }

    // ============================================================================
    // Roles
    // ============================================================================

    pub async fn list_roles(&self) -> Result<Vec<RoleRecord>> {
        self.get_list("roles", "/roles".to_string()).await
    }

    // ============================================================================
    // Plumbing
    // ============================================================================

    fn authed(&self, method: Method, path: String) -> ApiRequest {
        self.endpoint.authed(method, path)
    }

    async fn get_one<T: DeserializeOwned>(&self, resource: &str, path: String) -> Result<T> {
        self.endpoint.get_one(resource, path).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        path: String,
    ) -> Result<Vec<T>> {
        self.endpoint.get_list(resource, path).await
    }

    async fn delete(&self, path: String) -> Result<()> {
        self.execute(self.authed(Method::Delete, path)).await?;
        Ok(())
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.endpoint.execute(request).await
    }
}

impl Endpoint {
    fn authed(&self, method: Method, path: String) -> ApiRequest {
        ApiRequest::new(method, path).with_bearer(self.session.token())
    }

    async fn get_one<T: DeserializeOwned>(&self, resource: &str, path: String) -> Result<T> {
        let response = self.execute(self.authed(Method::Get, path)).await?;
        decode_one(resource, &response)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        path: String,
    ) -> Result<Vec<T>> {
        let response = self.execute(self.authed(Method::Get, path)).await?;
        decode_list(resource, &response)
    }

    /// Sends one request and applies the status contract.
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if request.timeout.is_none() {
            request.timeout = self.request_timeout;
        }
        let method = request.method;
        let path = request.path.clone();
        let timeout = request.timeout;

        tracing::debug!(%method, path = %path, "backend request");

        let send = self.transport.send(request);
        let response = match timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| ClubError::timeout(format!("{method} {path}"), limit))??,
            None => send.await?,
        };

        if response.status == 401 {
            tracing::warn!(%method, path = %path, "backend rejected the session");
            return Err(ClubError::Unauthorized { status: 401 });
        }
        if !response.is_success() {
            let message = error_message(&response.body);
            tracing::warn!(
                %method,
                path = %path,
                status = response.status,
                message = ?message,
                "backend error"
            );
            return Err(ClubError::Http {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }
}

/// Human-readable message from an error body, if the backend supplied one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "msg"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn parse_body(resource: &str, response: &ApiResponse) -> Result<Value> {
    serde_json::from_str(&response.body)
        .map_err(|e| ClubError::malformed(resource, format!("body is not JSON: {e}")))
}

fn decode_one<T: DeserializeOwned>(resource: &str, response: &ApiResponse) -> Result<T> {
    let value = parse_body(resource, response)?;
    if !value.is_object() {
        return Err(ClubError::malformed(resource, "expected a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ClubError::malformed(resource, e.to_string()))
}

/// Decodes a list body. A non-array (e.g. an error object) is a contract
/// breach and never coerced to an empty list.
fn decode_list<T: DeserializeOwned>(resource: &str, response: &ApiResponse) -> Result<Vec<T>> {
    let value = parse_body(resource, response)?;
    let Value::Array(items) = value else {
        let detail = value
            .get("error")
            .and_then(Value::as_str)
            .map(|e| format!("expected a JSON array, got an object with error '{e}'"))
            .unwrap_or_else(|| "expected a JSON array".to_string());
        return Err(ClubError::malformed(resource, detail));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| ClubError::malformed(resource, format!("item {index}: {e}")))
        })
        .collect()
}

/// Rejects keys that would change the request path.
fn segment(key: &str) -> Result<&str> {
    let key = key.trim();
    if key.is_empty()
        || key.contains(['/', '?', '#', '%'])
        || key.chars().any(char::is_whitespace)
    {
        return Err(ClubError::internal(format!("invalid resource key '{key}'")));
    }
    Ok(key)
}
