mod common;

use common::{
    ADMIN_DNI, ADMIN_PASSWORD, FakeBackend, client, identity, script_admin_login, token_for,
};
use freeclub_application::{ClubClient, LoginFailure};
use freeclub_core::ClubError;
use freeclub_core::Result;
use freeclub_core::config::ClientConfig;
use freeclub_core::identity::permissions::{MANAGE_SYSTEM, VIEW_PERSONS};
use freeclub_core::session::{IDENTITY_KEY, KeyValueStore, MemoryKeyValueStore, TOKEN_KEY};
use freeclub_infrastructure::FileKeyValueStore;
use freeclub_interaction::Method;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_admin_login_grants_listed_permissions() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM, VIEW_PERSONS]);
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());

    let identity = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap();

    assert_eq!(identity.subject_id, 1);
    assert_eq!(identity.person_key, ADMIN_DNI);
    assert_eq!(identity.display_name, "Ana Paz");
    assert!(client.session().is_authenticated());
    assert!(client.session().has_permission("ADMINISTRAR_SISTEMA"));
    assert!(client.session().has_permission(VIEW_PERSONS));
    assert!(!client.session().has_permission("Eliminar personas"));

    // credentials, then account, then person; only the lookups carry the token
    let sent = backend.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].path, "/users/login");
    assert_eq!(sent[0].bearer, None);
    assert_eq!(sent[1].path, "/users/1");
    assert_eq!(sent[1].bearer.as_deref(), Some(token_for(1).as_str()));
    assert_eq!(sent[2].path, format!("/persons/{ADMIN_DNI}"));

    assert_eq!(storage.get(TOKEN_KEY).unwrap(), Some(token_for(1)));
    assert!(storage.get(IDENTITY_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_permission_absent_from_account_is_denied() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[VIEW_PERSONS]);
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));

    client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap();

    // roles say administrator, but permissions decide
    assert!(!client.session().has_permission(MANAGE_SYSTEM));
}

#[tokio::test]
async fn test_no_session_has_no_permissions() {
    let backend = FakeBackend::new();
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));

    assert!(!client.session().is_authenticated());
    assert!(!client.session().has_permission(MANAGE_SYSTEM));
    assert_eq!(client.session().current_identity(), None);
}

#[tokio::test]
async fn test_session_survives_reload() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);

    let first = client(&backend, Arc::new(FileKeyValueStore::new(temp_dir.path())));
    let identity = first
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, Some("challenge"))
        .await
        .unwrap();
    drop(first);

    // a fresh process with a backend that knows nothing
    let offline = FakeBackend::new();
    let second = client(&offline, Arc::new(FileKeyValueStore::new(temp_dir.path())));

    assert!(second.session().is_authenticated());
    assert_eq!(second.session().current_identity(), Some(identity.clone()));
    assert_eq!(second.session().token(), Some(token_for(1)));
    assert!(second.session().has_permission(MANAGE_SYSTEM));
    assert_eq!(offline.total(), 0);
}

#[tokio::test]
async fn test_corrupt_identity_restores_logged_out() {
    let storage = Arc::new(MemoryKeyValueStore::new());
    storage.set(IDENTITY_KEY, "{\"subject_id\": oops").unwrap();
    storage.set(TOKEN_KEY, "some-token").unwrap();

    let client = client(&FakeBackend::new(), storage.clone());

    assert!(!client.session().is_authenticated());
    assert!(!client.session().has_permission(MANAGE_SYSTEM));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_incomplete_state_restores_logged_out() {
    let storage = Arc::new(MemoryKeyValueStore::new());
    storage.set(TOKEN_KEY, "orphan-token").unwrap();

    let client = client(&FakeBackend::new(), storage.clone());

    assert!(!client.session().is_authenticated());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_rejected_credentials() {
    let backend = FakeBackend::new();
    backend.route(
        Method::Post,
        "/users/login",
        401,
        r#"{"error":"Credenciales inválidas"}"#,
    );
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());

    let failure = client
        .session()
        .login(ADMIN_DNI, "wrong", None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::InvalidCredentials);
    assert!(!client.session().is_authenticated());
    assert!(storage.is_empty());
    assert_eq!(backend.total(), 1);
}

#[tokio::test]
async fn test_empty_credentials_never_reach_backend() {
    let backend = FakeBackend::new();
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));

    let failure = client.session().login("  ", "x", None).await.unwrap_err();

    assert_eq!(failure, LoginFailure::InvalidCredentials);
    assert_eq!(backend.total(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_login_times_out() {
    let backend = FakeBackend::new();
    backend.route_delayed(
        Method::Post,
        "/users/login",
        200,
        serde_json::json!({ "access_token": token_for(1) }).to_string(),
        Duration::from_secs(30),
    );
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::TimedOut);
    assert_ne!(failure, LoginFailure::InvalidCredentials);
    assert!(storage.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_bounds_the_whole_exchange() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    // each step fits alone, together they exceed ten seconds
    backend.route_delayed(
        Method::Get,
        &format!("/persons/{ADMIN_DNI}"),
        200,
        serde_json::json!({ "dni": ADMIN_DNI, "name": "Ana", "lastname": "Paz" }).to_string(),
        Duration::from_secs(6),
    );
    backend.route_delayed(
        Method::Get,
        "/users/1",
        200,
        serde_json::json!({ "id": 1, "username": ADMIN_DNI, "permissions": [] }).to_string(),
        Duration::from_secs(6),
    );
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::TimedOut);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_undecodable_token_is_a_login_failure() {
    let backend = FakeBackend::new();
    backend.route(
        Method::Post,
        "/users/login",
        200,
        r#"{"access_token":"opaque-session-id"}"#,
    );
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::MalformedToken);
    assert!(storage.is_empty());
    assert_eq!(backend.total(), 1);
}

#[tokio::test]
async fn test_missing_person_persists_nothing() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    backend.route(
        Method::Get,
        &format!("/persons/{ADMIN_DNI}"),
        404,
        r#"{"error":"Persona no encontrada"}"#,
    );
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::PersonNotFound);
    assert!(!client.session().is_authenticated());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_server_error_during_login() {
    let backend = FakeBackend::new();
    backend.route(Method::Post, "/users/login", 500, "Internal Server Error");
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::ServerError { status: 500 });
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    let storage = Arc::new(MemoryKeyValueStore::new());
    let client = client(&backend, storage.clone());
    client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap();

    assert!(client.session().logout());
    assert!(!client.session().logout());
    assert!(!client.session().is_authenticated());
    assert!(!client.session().has_permission(MANAGE_SYSTEM));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_surfaced_and_session_kept_by_default() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    backend.route(Method::Get, "/persons", 401, r#"{"msg":"Token has expired"}"#);
    let client = client(&backend, Arc::new(MemoryKeyValueStore::new()));
    client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap();

    let err = client.gateway().list_persons().await.unwrap_err();

    assert_eq!(err, ClubError::Unauthorized { status: 401 });
    assert!(!client.session().observe(&err));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_ends_session_when_configured() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    backend.route(Method::Get, "/roles", 401, "");
    let storage = Arc::new(MemoryKeyValueStore::new());
    let config = ClientConfig {
        logout_on_unauthorized: true,
        ..ClientConfig::default()
    };
    let client = ClubClient::new(config, backend.clone(), storage.clone()).unwrap();
    client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap();

    let err = client.gateway().list_roles().await.unwrap_err();

    assert!(client.session().observe(&err));
    assert!(!client.session().is_authenticated());
    assert!(storage.is_empty());
    assert!(!client.session().observe(&ClubError::transport("refused")));
}

/// Accepts everything except writes of the identity key.
struct IdentityWriteFails(MemoryKeyValueStore);

impl KeyValueStore for IdentityWriteFails {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if key == IDENTITY_KEY {
            return Err(ClubError::storage("disk full"));
        }
        self.0.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.0.remove(key)
    }
}

#[tokio::test]
async fn test_failed_store_leaves_no_half_session_on_disk() {
    let backend = FakeBackend::new();
    script_admin_login(&backend, &[MANAGE_SYSTEM]);
    let previous = identity("30111222", &["Socio/a"], &[]);
    let inner = MemoryKeyValueStore::new();
    inner
        .set(IDENTITY_KEY, &serde_json::to_string(&previous).unwrap())
        .unwrap();
    inner.set(TOKEN_KEY, "previous-token").unwrap();
    let storage = Arc::new(IdentityWriteFails(inner));
    let client = client(&backend, storage.clone());
    assert_eq!(client.session().current_identity(), Some(previous.clone()));

    let failure = client
        .session()
        .login(ADMIN_DNI, ADMIN_PASSWORD, None)
        .await
        .unwrap_err();

    assert_eq!(failure, LoginFailure::Storage);
    // the running session stays, but neither key of it remains on disk
    assert_eq!(client.session().current_identity(), Some(previous));
    assert_eq!(storage.get(IDENTITY_KEY).unwrap(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert!(storage.0.is_empty());
}
