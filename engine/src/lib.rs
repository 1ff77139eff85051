//! Reviewer assignment for pull requests: who reviews a new pull request, who takes over when a
//! reviewer is swapped out, and what happens to open reviews when people or whole teams are
//! deactivated.
//!
//! Each operation is a free function generic over the narrowest set of store capabilities it
//! needs. [`Engine`] bundles them over a full [`Store`] for callers that don't care.

pub mod deactivation;
pub mod eligibility;
mod error;
pub mod lifecycle;
pub mod reassign;
pub mod selector;
pub mod stats;
pub mod teams;
#[cfg(test)]
mod test_support;
pub mod users;

use std::sync::Arc;

pub use error::{Error, ErrorKind, Result};
use pr_reviewers_db::{
    object_id::{PullRequestId, TeamName, UserId},
    DeactivatedUser, Store, UserStats,
};

use crate::{
    deactivation::{SetUserActive, TeamDeactivation},
    lifecycle::{CreatePullRequest, PullRequestWithReviewers},
    reassign::{ReassignReviewer, Reassigned},
    stats::GeneralStats,
    teams::TeamWithMembers,
    users::UserReviews,
};

#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn add_team(&self, team: TeamWithMembers) -> Result<TeamWithMembers> {
        teams::add_team(self.store.as_ref(), team).await
    }

    pub async fn get_team(&self, name: &TeamName) -> Result<TeamWithMembers> {
        teams::get_team(self.store.as_ref(), name).await
    }

    pub async fn deactivate_team(&self, name: &TeamName) -> Result<TeamDeactivation> {
        deactivation::deactivate_team(self.store.as_ref(), name).await
    }

    pub async fn set_user_active(&self, req: SetUserActive) -> Result<DeactivatedUser> {
        deactivation::set_user_active(self.store.as_ref(), req).await
    }

    pub async fn user_reviews(&self, id: &UserId) -> Result<UserReviews> {
        users::user_reviews(self.store.as_ref(), id).await
    }

    pub async fn create_pull_request(
        &self,
        req: CreatePullRequest,
    ) -> Result<PullRequestWithReviewers> {
        lifecycle::create_pull_request(self.store.as_ref(), req).await
    }

    pub async fn merge_pull_request(&self, id: &PullRequestId) -> Result<PullRequestWithReviewers> {
        lifecycle::merge_pull_request(self.store.as_ref(), id).await
    }

    pub async fn reassign_reviewer(&self, req: ReassignReviewer) -> Result<Reassigned> {
        reassign::reassign_reviewer(self.store.as_ref(), req).await
    }

    pub async fn general_stats(&self) -> Result<GeneralStats> {
        stats::general_stats(self.store.as_ref()).await
    }

    pub async fn user_stats(&self, id: &UserId) -> Result<UserStats> {
        stats::user_stats(self.store.as_ref(), id).await
    }

    /// Whether the store answers.
    pub async fn healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
