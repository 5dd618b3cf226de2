use super::{AssignmentId, Fields, FormFields, push, push_opt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance outcome, encoded by the backend as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AttendanceStatus {
    Absent,
    Present,
    Justified,
}

impl From<AttendanceStatus> for u8 {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Absent => 0,
            AttendanceStatus::Present => 1,
            AttendanceStatus::Justified => 2,
        }
    }
}

impl TryFrom<u8> for AttendanceStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Absent),
            1 => Ok(Self::Present),
            2 => Ok(Self::Justified),
            other => Err(format!("unknown attendance status {other}")),
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// One attendance row ("asistencia").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    pub person_dni: String,
    pub supervisor_dni: String,
    pub assignation_id: AssignmentId,
    pub user_id: u64,
    pub status: AttendanceStatus,
    /// `DD/MM/YYYY`
    pub day: String,
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub supervisor: String,
}

/// Formats a date the way the backend stores attendance days.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Form for `POST /attendancies/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub person_dni: String,
    pub supervisor_dni: String,
    pub assignation_id: AssignmentId,
    pub user_id: u64,
    pub status: AttendanceStatus,
    pub day: String,
}

impl FormFields for NewAttendance {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push(&mut fields, "person_dni", &self.person_dni);
        push(&mut fields, "supervisor_dni", &self.supervisor_dni);
        push(&mut fields, "assignation_id", self.assignation_id);
        push(&mut fields, "user_id", self.user_id);
        push(&mut fields, "status", self.status);
        push(&mut fields, "day", &self.day);
        fields
    }
}

/// Form for `PUT /attendancies/{id}`. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceUpdate {
    pub person_dni: Option<String>,
    pub supervisor_dni: Option<String>,
    pub assignation_id: Option<AssignmentId>,
    pub user_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
}

impl FormFields for AttendanceUpdate {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push_opt(&mut fields, "person_dni", self.person_dni.as_ref());
        push_opt(&mut fields, "supervisor_dni", self.supervisor_dni.as_ref());
        if let Some(id) = self.assignation_id {
            push(&mut fields, "assignation_id", id);
        }
        if let Some(id) = self.user_id {
            push(&mut fields, "user_id", id);
        }
        if let Some(status) = self.status {
            push(&mut fields, "status", status);
        }
        fields
    }
}
