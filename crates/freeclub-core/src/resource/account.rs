use super::{Fields, FormFields, push, push_opt};
use serde::{Deserialize, Serialize};

/// A login account (`/users/{id}`), carrying the flat permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Key of the linked person; the backend falls back to the username.
    #[serde(default, rename = "personaDni", skip_serializing_if = "Option::is_none")]
    pub persona_dni: Option<String>,
}

impl Account {
    /// Key used to look up the person record behind this account.
    pub fn person_key(&self) -> &str {
        self.persona_dni
            .as_deref()
            .filter(|dni| !dni.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Form for `POST /users/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAccount {
    /// The person's dni.
    pub username: String,
    pub password: String,
    /// Permission ids.
    pub permissions: Vec<u64>,
}

impl FormFields for NewAccount {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push(&mut fields, "username", &self.username);
        push(&mut fields, "password", &self.password);
        append_permissions(&mut fields, &self.permissions);
        fields
    }
}

/// Form for `PUT /users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub permissions: Vec<u64>,
}

impl FormFields for AccountUpdate {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push_opt(&mut fields, "username", self.username.as_ref().filter(|s| !s.is_empty()));
        push_opt(&mut fields, "password", self.password.as_ref().filter(|s| !s.is_empty()));
        append_permissions(&mut fields, &self.permissions);
        fields
    }
}

// The backend expects one comma-separated field, not repeated ones.
fn append_permissions(fields: &mut Fields, permissions: &[u64]) {
    if permissions.is_empty() {
        return;
    }
    let joined = permissions
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    push(fields, "permissions", joined);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_key_falls_back_to_username() {
        let account: Account = serde_json::from_str(
            r#"{"id":3,"username":"12345678","permissions":["VER_ASISTENCIAS"]}"#,
        )
        .unwrap();
        assert_eq!(account.person_key(), "12345678");

        let linked: Account =
            serde_json::from_str(r#"{"id":3,"username":"admin","personaDni":"999"}"#).unwrap();
        assert_eq!(linked.person_key(), "999");
        assert!(linked.permissions.is_empty());
    }

    #[test]
    fn test_permissions_are_comma_joined() {
        let account = NewAccount {
            username: "1".to_string(),
            password: "secret".to_string(),
            permissions: vec![1, 13, 15],
        };
        let fields = account.form_fields();
        assert_eq!(fields.last(), Some(&("permissions".to_string(), "1,13,15".to_string())));

        let update = AccountUpdate {
            password: Some(String::new()),
            ..Default::default()
        };
        assert!(update.form_fields().is_empty());
    }
}
