use super::normalize::normalize_role_name;
use crate::identity::Identity;
use crate::resource::{Activity, ActivityId, Assignment, AttendanceRecord};
use std::collections::{BTreeSet, HashMap};

const ADMINISTRATOR_ROLES: &[&str] = &[
    "administrador",
    "administradora",
    "administrador/a",
    "administrator",
    "superadmin",
];

const STAFF_ROLES: &[&str] = &[
    "profesor",
    "profesora",
    "profesor/a",
    "ayudante",
    "coordinador",
    "coordinadora",
    "coordinador/a",
    "entrenador",
    "entrenadora",
    "entrenador/a",
    "instructor",
    "instructora",
    "instructor/a",
    "coach",
];

const MEMBER_ROLES: &[&str] = &[
    "socio",
    "socia",
    "socio/a",
    "no socio",
    "no socia",
    "no socio/a",
    "alumno",
    "alumna",
    "alumno/a",
];

/// Visibility class of an identity, in priority order.
///
/// `Ord` follows priority: `Administrator` < `Staff` < `Member` < `Unclassified`,
/// so the minimum over an identity's roles is its effective category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleCategory {
    Administrator,
    Staff,
    Member,
    Unclassified,
}

/// Classifies one role label against the fixed enumerations.
pub fn classify_role(label: &str) -> RoleCategory {
    let normalized = normalize_role_name(label);
    let name = normalized.as_str();
    if ADMINISTRATOR_ROLES.contains(&name) {
        RoleCategory::Administrator
    } else if STAFF_ROLES.contains(&name) {
        RoleCategory::Staff
    } else if MEMBER_ROLES.contains(&name) {
        RoleCategory::Member
    } else {
        RoleCategory::Unclassified
    }
}

/// Activity ids an identity may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    Only(BTreeSet<ActivityId>),
}

impl VisibilityScope {
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    pub fn contains(&self, activity_id: ActivityId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&activity_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(ids) if ids.is_empty())
    }
}

/// The one place that decides what an identity may do and see.
///
/// Two questions, never mixed:
/// - permissions come only from `Identity::granted_permissions`;
/// - visibility of activities and attendance comes only from role categories.
///
/// Nothing is cached: every answer is recomputed from the identity and the
/// records passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    pub fn new() -> Self {
        Self
    }

    /// `false` when nobody is signed in.
    pub fn has_permission(&self, identity: Option<&Identity>, permission: &str) -> bool {
        identity.is_some_and(|identity| identity.has_permission(permission))
    }

    /// Highest-priority category among the identity's roles.
    ///
    /// No roles, or only unknown ones, yields `Unclassified`.
    pub fn classify(&self, identity: &Identity) -> RoleCategory {
        identity
            .roles
            .iter()
            .map(|role| classify_role(role.as_str()))
            .min()
            .unwrap_or(RoleCategory::Unclassified)
    }

    /// Activities the identity may see, given the current assignments.
    pub fn activity_scope(
        &self,
        identity: &Identity,
        assignments: &[Assignment],
    ) -> VisibilityScope {
        match self.classify(identity) {
            RoleCategory::Administrator => VisibilityScope::All,
            RoleCategory::Staff => VisibilityScope::Only(staffed_activities(identity, assignments)),
            RoleCategory::Member | RoleCategory::Unclassified => VisibilityScope::none(),
        }
    }

    pub fn can_view_activity(
        &self,
        identity: &Identity,
        assignments: &[Assignment],
        activity_id: ActivityId,
    ) -> bool {
        self.activity_scope(identity, assignments).contains(activity_id)
    }

    pub fn filter_activities(
        &self,
        identity: &Identity,
        activities: Vec<Activity>,
        assignments: &[Assignment],
    ) -> Vec<Activity> {
        let scope = self.activity_scope(identity, assignments);
        activities
            .into_iter()
            .filter(|activity| scope.contains(activity.id))
            .collect()
    }

    /// Attendance rows the identity may see.
    ///
    /// Staff see rows whose assignment belongs to one of their activities;
    /// members see only their own rows. Rows pointing at an unknown assignment
    /// are hidden from staff.
    pub fn filter_attendance(
        &self,
        identity: &Identity,
        records: Vec<AttendanceRecord>,
        assignments: &[Assignment],
    ) -> Vec<AttendanceRecord> {
        match self.classify(identity) {
            RoleCategory::Administrator => records,
            RoleCategory::Staff => {
                let scope = staffed_activities(identity, assignments);
                let activity_of: HashMap<_, _> = assignments
                    .iter()
                    .map(|assignment| (assignment.id, assignment.activity_id))
                    .collect();
                records
                    .into_iter()
                    .filter(|record| {
                        activity_of
                            .get(&record.assignation_id)
                            .is_some_and(|activity_id| scope.contains(activity_id))
                    })
                    .collect()
            }
            RoleCategory::Member => records
                .into_iter()
                .filter(|record| record.person_dni == identity.person_key)
                .collect(),
            RoleCategory::Unclassified => Vec::new(),
        }
    }
}

fn staffed_activities(identity: &Identity, assignments: &[Assignment]) -> BTreeSet<ActivityId> {
    assignments
        .iter()
        .filter(|assignment| {
            assignment.dni == identity.person_key
                && classify_role(&assignment.role) == RoleCategory::Staff
        })
        .map(|assignment| assignment.activity_id)
        .collect()
}
