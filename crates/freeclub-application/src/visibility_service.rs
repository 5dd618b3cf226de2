//! Applies the authorization policy to freshly fetched records.

use crate::assignment_service::{AssignmentService, members_in};
use freeclub_core::Result;
use freeclub_core::authorization::{AuthorizationPolicy, RoleCategory};
use freeclub_core::identity::Identity;
use freeclub_core::resource::{Activity, ActivityId, Assignment, AttendanceRecord};
use freeclub_interaction::ResourceGateway;

/// Role-scoped reads. Records outside the identity's scope are dropped, never
/// reported as forbidden.
#[derive(Clone)]
pub struct VisibilityService {
    gateway: ResourceGateway,
    assignments: AssignmentService,
    policy: AuthorizationPolicy,
}

impl VisibilityService {
    pub fn new(gateway: ResourceGateway, assignments: AssignmentService) -> Self {
        Self {
            gateway,
            assignments,
            policy: AuthorizationPolicy::new(),
        }
    }

    /// Activities the identity may see.
    pub async fn visible_activities(&self, identity: &Identity) -> Result<Vec<Activity>> {
        if matches!(
            self.policy.classify(identity),
            RoleCategory::Member | RoleCategory::Unclassified
        ) {
            return Ok(Vec::new());
        }

        let (activities, assignments) = tokio::try_join!(
            self.gateway.list_activities(),
            self.assignments.assignments()
        )?;
        Ok(self
            .policy
            .filter_activities(identity, activities, &assignments))
    }

    /// Attendance rows the identity may see.
    pub async fn visible_attendance(&self, identity: &Identity) -> Result<Vec<AttendanceRecord>> {
        if self.policy.classify(identity) == RoleCategory::Unclassified {
            return Ok(Vec::new());
        }

        let (records, assignments) = tokio::try_join!(
            self.gateway.list_attendance(),
            self.assignments.assignments()
        )?;
        Ok(self
            .policy
            .filter_attendance(identity, records, &assignments))
    }

    /// Members of an activity, for taking attendance.
    ///
    /// Empty when the activity is outside the identity's scope.
    pub async fn attendance_roster(
        &self,
        identity: &Identity,
        activity_id: ActivityId,
    ) -> Result<Vec<Assignment>> {
        let assignments = self.assignments.assignments().await?;
        if !self
            .policy
            .can_view_activity(identity, &assignments, activity_id)
        {
            tracing::debug!(activity_id, "roster outside visibility scope");
            return Ok(Vec::new());
        }
        Ok(members_in(&assignments, activity_id))
    }
}
