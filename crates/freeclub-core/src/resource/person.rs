use super::{Fields, FormFields, push, push_opt};
use serde::{Deserialize, Serialize};

/// Optional profile data shared by the person record and its write forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_coverage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
}

impl PersonProfile {
    fn append_to(&self, fields: &mut Fields) {
        push_opt(fields, "cuit", self.cuit.as_ref());
        push_opt(fields, "phone", self.phone.as_ref());
        push_opt(fields, "address", self.address.as_ref());
        push_opt(fields, "address_details", self.address_details.as_ref());
        push_opt(fields, "birthdate", self.birthdate.as_ref());
        push_opt(fields, "medical_coverage", self.medical_coverage.as_ref());
        push_opt(fields, "blood_type", self.blood_type.as_ref());
        push_opt(fields, "medical_conditions", self.medical_conditions.as_ref());
        push_opt(fields, "emergency_phone", self.emergency_phone.as_ref());
        push_opt(fields, "emergency_relation", self.emergency_relation.as_ref());
        push_opt(fields, "join_date", self.join_date.as_ref());
    }
}

/// A club person ("persona"), keyed by national id (`dni`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub dni: String,
    pub name: String,
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub profile: PersonProfile,
    /// Human-readable role labels, e.g. "Profesor/a".
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub member: bool,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname).trim().to_string()
    }
}

/// Form for `POST /persons/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
    pub dni: String,
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub profile: PersonProfile,
    /// Role ids, sent as repeated `roles` fields.
    pub roles: Vec<u64>,
    pub member: Option<bool>,
}

impl FormFields for NewPerson {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push(&mut fields, "dni", &self.dni);
        push(&mut fields, "name", &self.name);
        push(&mut fields, "lastname", &self.lastname);
        push(&mut fields, "email", &self.email);
        self.profile.append_to(&mut fields);
        for role in &self.roles {
            push(&mut fields, "roles", role);
        }
        if let Some(member) = self.member {
            push(&mut fields, "member", member);
        }
        fields
    }
}

/// Form for `PUT /persons/{dni}`. Only `Some` fields are sent; `Some("")` clears a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub profile: PersonProfile,
    pub roles: Option<Vec<u64>>,
    pub member: Option<bool>,
}

impl FormFields for PersonUpdate {
    fn form_fields(&self) -> Fields {
        let mut fields = Fields::new();
        push_opt(&mut fields, "name", self.name.as_ref());
        push_opt(&mut fields, "lastname", self.lastname.as_ref());
        push_opt(&mut fields, "email", self.email.as_ref());
        self.profile.append_to(&mut fields);
        if let Some(roles) = &self.roles {
            for role in roles {
                push(&mut fields, "roles", role);
            }
        }
        if let Some(member) = self.member {
            push(&mut fields, "member", member);
        }
        fields
    }
}
