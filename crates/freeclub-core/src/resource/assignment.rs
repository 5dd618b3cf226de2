use super::{ActivityId, Fields, FormFields, push};
use serde::{Deserialize, Serialize};

pub type AssignmentId = u64;

/// A person assigned to an activity slot under a role ("asignación").
///
/// `role`, `person` and `activity` are display names resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub dni: String,
    pub activity_id: ActivityId,
    pub role_id: u64,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub role: String,
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub activity: String,
}

/// Form for `POST /asignations/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAssignment {
    pub dni: String,
    pub activity_id: ActivityId,
    pub role_id: u64,
    pub day: String,
    /// `HH:MM` or `HH:MM:SS`.
    pub start_time: String,
    pub end_time: String,
}

impl FormFields for NewAssignment {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push(&mut fields, "dni", &self.dni);
        push(&mut fields, "activity_id", self.activity_id);
        push(&mut fields, "role_id", self.role_id);
        push(&mut fields, "day", &self.day);
        push(&mut fields, "start_time", normalize_time(&self.start_time));
        push(&mut fields, "end_time", normalize_time(&self.end_time));
        fields
    }
}

/// Expands `HH:MM` to `HH:MM:SS`; anything else is passed through untouched.
pub fn normalize_time(time: &str) -> String {
    let bytes = time.as_bytes();
    let is_hh_mm = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    if is_hh_mm {
        format!("{time}:00")
    } else {
        time.to_string()
    }
}
