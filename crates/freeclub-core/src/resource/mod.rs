//! Records exchanged with the club backend.
//!
//! Field names follow the backend's JSON exactly. Write payloads implement
//! [`FormFields`] because the backend reads them from multipart forms (or, for
//! activity updates, from the query string).

mod account;
mod activity;
mod assignment;
mod attendance;
mod person;
mod role;

pub use account::{Account, AccountUpdate, NewAccount};
pub use activity::{Activity, ActivityId, ActivityUpdate, NewActivity};
pub use assignment::{Assignment, AssignmentId, NewAssignment, normalize_time};
pub use attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceUpdate, NewAttendance, format_day,
};
pub use person::{NewPerson, Person, PersonProfile, PersonUpdate};
pub use role::RoleRecord;

/// Ordered `(name, value)` pairs of a form or query string.
///
/// Repeated names are allowed; the backend reads multi-valued fields such as
/// person roles that way.
pub type Fields = Vec<(String, String)>;

/// A write payload that knows how the backend expects it to be encoded.
pub trait FormFields {
    fn form_fields(&self) -> Fields;
}

pub(crate) fn push(fields: &mut Fields, name: &str, value: impl ToString) {
    fields.push((name.to_string(), value.to_string()));
}

pub(crate) fn push_opt(fields: &mut Fields, name: &str, value: Option<&String>) {
    if let Some(value) = value {
        push(fields, name, value);
    }
}
