//! Capability traits for everything the reviewer engine reads or writes.
//!
//! Each trait covers one narrow concern so that engine components only depend on what they
//! actually use, and tests can stub a single capability without building a whole store.
//! [`PgStore`](crate::PgStore) and [`MemoryStore`](crate::MemoryStore) implement all of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use serde::Serialize;

use crate::{
    enums::PullRequestStatus,
    error::Result,
    object_id::{PullRequestId, TeamName, UserId},
    pull_requests::{NewPullRequest, PullRequest},
    teams::Team,
    users::{NewUser, User},
};

#[async_trait]
pub trait UserQueries: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Up to `limit` active members of `team` that are not listed in `exclude`, in random
    /// order.
    async fn find_active_teammates(
        &self,
        team: &TeamName,
        exclude: &[UserId],
        limit: usize,
    ) -> Result<Vec<UserId>>;

    /// One random active member of `team` not listed in `exclude`.
    async fn find_single_replacement(
        &self,
        team: &TeamName,
        exclude: &[UserId],
    ) -> Result<Option<UserId>> {
        let mut found = self.find_active_teammates(team, exclude, 1).await?;
        Ok(found.pop())
    }
}

#[async_trait]
pub trait TeamQueries: Send + Sync {
    async fn get_team(&self, name: &TeamName) -> Result<Option<Team>>;
    async fn list_team_members(&self, name: &TeamName) -> Result<Vec<User>>;
}

#[async_trait]
pub trait PullRequestQueries: Send + Sync {
    async fn get_pull_request(&self, id: &PullRequestId) -> Result<Option<PullRequest>>;
    async fn list_reviewer_ids(&self, id: &PullRequestId) -> Result<Vec<UserId>>;
    async fn is_reviewer(&self, id: &PullRequestId, reviewer: &UserId) -> Result<bool>;
    /// Open pull requests on which `reviewer` is assigned.
    async fn open_reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>>;
    /// Every pull request, open or merged, on which `reviewer` is assigned.
    async fn reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>>;
}

#[async_trait]
pub trait StatsQueries: Send + Sync {
    async fn reviewer_counts(&self) -> Result<Vec<ReviewerCount>>;
    async fn pull_request_counts(&self) -> Result<PullRequestCounts>;
    async fn user_stats(&self, id: &UserId) -> Result<Option<UserStats>>;
}

#[async_trait]
pub trait TeamMutations: Send + Sync {
    /// Create the team and upsert its members in one transaction. Fails with
    /// [`Error::Conflict`](crate::Error::Conflict) when the team already exists.
    async fn create_team(&self, name: &TeamName, members: Vec<NewUser>) -> Result<Team>;

    async fn activate_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Flip every member of the team to inactive and delete their assignments on open pull
    /// requests, in one transaction. Returns the affected users.
    async fn deactivate_team_members(&self, name: &TeamName) -> Result<Vec<User>>;
}

#[async_trait]
pub trait ReviewMutations: Send + Sync {
    /// Write the pull request and its reviewer rows together. Fails with
    /// [`Error::Conflict`](crate::Error::Conflict) when the id is taken.
    async fn create_pull_request_with_reviewers(
        &self,
        pr: NewPullRequest,
        reviewers: Vec<UserId>,
    ) -> Result<PullRequest>;

    /// Transition an open pull request. Returns `None` when no open pull request has this id.
    async fn update_pull_request_status(
        &self,
        id: &PullRequestId,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<Option<PullRequest>>;

    /// Replace `old` with `new` on an open pull request as a single write. Returns false when
    /// the pull request is no longer open or `old` is no longer assigned.
    async fn swap_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool>;

    /// Deactivate the user and apply `plan` to their open assignments in one transaction.
    /// Returns `None`, with nothing written, when the user does not exist.
    async fn deactivate_user(
        &self,
        id: &UserId,
        plan: Vec<ReviewerChange>,
    ) -> Result<Option<DeactivatedUser>>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// The full set of capabilities.
pub trait Store:
    UserQueries
    + TeamQueries
    + PullRequestQueries
    + StatsQueries
    + TeamMutations
    + ReviewMutations
    + StoreHealth
{
}

impl<T> Store for T where
    T: UserQueries
        + TeamQueries
        + PullRequestQueries
        + StatsQueries
        + TeamMutations
        + ReviewMutations
        + StoreHealth
{
}

/// What to do with one open assignment of a user being deactivated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewerChange {
    /// Hand the assignment to another reviewer. If the replacement is no longer eligible when
    /// the change is applied, the assignment is dropped instead.
    Replace {
        pull_request_id: PullRequestId,
        replacement: UserId,
    },
    /// Remove the assignment, leaving the pull request with one fewer reviewer.
    Drop { pull_request_id: PullRequestId },
}

impl ReviewerChange {
    pub fn pull_request_id(&self) -> &PullRequestId {
        match self {
            Self::Replace {
                pull_request_id, ..
            } => pull_request_id,
            Self::Drop { pull_request_id } => pull_request_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub pull_request_id: PullRequestId,
    pub replaced_by: UserId,
}

/// The result of a user deactivation, as actually written.
#[derive(Clone, Debug, Serialize)]
pub struct DeactivatedUser {
    pub user: User,
    pub reassigned: Vec<Replacement>,
    pub unassigned: Vec<PullRequestId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, QueryableByName)]
pub struct ReviewerCount {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub user_id: UserId,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub pr_count: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, QueryableByName)]
pub struct PullRequestCounts {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub open: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub merged: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, QueryableByName)]
pub struct UserStats {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub user_id: UserId,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub username: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub team_name: Option<TeamName>,
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub is_active: bool,
    /// Pull requests authored.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub pull_requests_count: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub reviews_count: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub merged_reviews_count: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub open_reviews_count: i64,
}
