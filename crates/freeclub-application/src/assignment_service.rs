//! Assignment queries over the gateway's Read Cache.
//!
//! The cache itself lives in [`ResourceGateway`]; every successful assignment
//! write through any gateway clone invalidates it.

use freeclub_core::Result;
use freeclub_core::authorization::{RoleCategory, classify_role};
use freeclub_core::resource::{ActivityId, Assignment, AssignmentId, NewAssignment};
use freeclub_interaction::ResourceGateway;
use std::sync::Arc;

/// Cached access to `/asignations`.
///
/// Clones share one cache, so every screen sees the same set.
#[derive(Clone)]
pub struct AssignmentService {
    gateway: ResourceGateway,
}

impl AssignmentService {
    pub fn new(gateway: ResourceGateway) -> Self {
        Self { gateway }
    }

    /// All assignments, served from the cache while fresh.
    pub async fn assignments(&self) -> Result<Arc<Vec<Assignment>>> {
        self.gateway.list_assignments().await
    }

    pub async fn assignments_for_person(&self, dni: &str) -> Result<Vec<Assignment>> {
        let all = self.assignments().await?;
        Ok(all.iter().filter(|a| a.dni == dni).cloned().collect())
    }

    pub async fn assignments_for_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<Assignment>> {
        let all = self.assignments().await?;
        Ok(all
            .iter()
            .filter(|a| a.activity_id == activity_id)
            .cloned()
            .collect())
    }

    /// Assignments of the activity held under a member-type role.
    pub async fn members_of_activity(&self, activity_id: ActivityId) -> Result<Vec<Assignment>> {
        let all = self.assignments().await?;
        Ok(members_in(&all, activity_id))
    }

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> Result<Assignment> {
        self.gateway.create_assignment(assignment).await
    }

    pub async fn delete_assignment(&self, id: AssignmentId) -> Result<()> {
        self.gateway.delete_assignment(id).await
    }

    /// Deletes every assignment of the activity.
    ///
    /// All deletes are attempted. Each one that goes through invalidates the
    /// cache; the first failure is then returned. Returns the number of
    /// deleted assignments.
    pub async fn delete_assignments_for_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<usize> {
        let targets = self.assignments_for_activity(activity_id).await?;

        let mut deleted = 0;
        let mut first_error = None;
        for assignment in &targets {
            match self.gateway.delete_assignment(assignment.id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        assignment_id = assignment.id,
                        error = %e,
                        "assignment delete failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    /// Forces the next read to refetch.
    pub fn invalidate(&self) {
        self.gateway.invalidate_assignments();
    }
}

pub(crate) fn members_in(
    assignments: &[Assignment],
    activity_id: ActivityId,
) -> Vec<Assignment> {
    assignments
        .iter()
        .filter(|a| {
            a.activity_id == activity_id && classify_role(&a.role) == RoleCategory::Member
        })
        .cloned()
        .collect()
}
