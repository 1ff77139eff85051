use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::{
    enums::PullRequestStatus,
    object_id::{PullRequestId, UserId},
    schema::*,
};

pub use crate::schema::pull_requests::*;

#[derive(Clone, Debug, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = pull_requests, primary_key(pull_request_id))]
pub struct PullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    /// Set exactly when the status is `MERGED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = pull_requests)]
pub struct NewPullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
}

pub fn get(conn: &mut PgConnection, id: &PullRequestId) -> QueryResult<Option<PullRequest>> {
    pull_requests::table
        .find(id)
        .select(PullRequest::as_select())
        .first(conn)
        .optional()
}

/// Fetch the status and lock the row for the rest of the transaction, so that a concurrent
/// merge can not interleave with a reviewer change.
pub fn lock_status(
    conn: &mut PgConnection,
    id: &PullRequestId,
) -> QueryResult<Option<PullRequestStatus>> {
    pull_requests::table
        .find(id)
        .select(pull_requests::status)
        .for_update()
        .first(conn)
        .optional()
}

pub fn insert(conn: &mut PgConnection, pr: &NewPullRequest) -> QueryResult<PullRequest> {
    diesel::insert_into(pull_requests::table)
        .values(pr)
        .get_result::<PullRequest>(conn)
}

/// Move an open pull request to `new_status`. Rows that are not open are left alone, so merging
/// an already merged pull request updates nothing.
pub fn update_open_status(
    conn: &mut PgConnection,
    id: &PullRequestId,
    new_status: PullRequestStatus,
    new_merged_at: Option<DateTime<Utc>>,
) -> QueryResult<Option<PullRequest>> {
    diesel::update(
        pull_requests::table
            .filter(pull_requests::pull_request_id.eq(id))
            .filter(pull_requests::status.eq(PullRequestStatus::Open)),
    )
    .set((
        pull_requests::status.eq(new_status),
        pull_requests::merged_at.eq(new_merged_at),
    ))
    .get_result::<PullRequest>(conn)
    .optional()
}

/// Pull requests on which `reviewer` holds an assignment, oldest first.
pub fn reviewed_by(
    conn: &mut PgConnection,
    reviewer: &UserId,
    only_open: bool,
) -> QueryResult<Vec<PullRequest>> {
    let mut q = pull_requests::table
        .inner_join(pr_reviewers::table)
        .filter(pr_reviewers::reviewer_id.eq(reviewer))
        .select(PullRequest::as_select())
        .order((pull_requests::created_at, pull_requests::pull_request_id))
        .into_boxed();

    if only_open {
        q = q.filter(pull_requests::status.eq(PullRequestStatus::Open));
    }

    q.load(conn)
}
