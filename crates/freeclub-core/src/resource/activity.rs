use super::{Fields, FormFields, push};
use serde::{Deserialize, Serialize};

pub type ActivityId = u64;

/// A scheduled club activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub category: String,
}

/// Form for `POST /activities/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewActivity {
    pub name: String,
    pub category: String,
}

impl FormFields for NewActivity {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push(&mut fields, "name", &self.name);
        push(&mut fields, "category", &self.category);
        fields
    }
}

/// Changes for `PUT /activities/{id}`.
///
/// The backend reads these from the query string, not from a form body.
/// Empty values are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl FormFields for ActivityUpdate {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(name) = self.name.as_ref().filter(|s| !s.is_empty()) {
            push(&mut fields, "name", name);
        }
        if let Some(category) = self.category.as_ref().filter(|s| !s.is_empty()) {
            push(&mut fields, "category", category);
        }
        fields
    }
}
