use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    enums::PullRequestStatus,
    object_id::{PullRequestId, UserId},
    schema::*,
};

pub use crate::schema::pr_reviewers::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pr_reviewers, primary_key(pull_request_id, reviewer_id))]
pub struct ReviewAssignment {
    pub pull_request_id: PullRequestId,
    pub reviewer_id: UserId,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Insertable)]
#[diesel(table_name = pr_reviewers)]
pub struct NewReviewAssignment {
    pub pull_request_id: PullRequestId,
    pub reviewer_id: UserId,
}

pub fn insert(conn: &mut PgConnection, rows: &[NewReviewAssignment]) -> QueryResult<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(pr_reviewers::table)
        .values(rows)
        .execute(conn)
}

pub fn list_reviewer_ids(
    conn: &mut PgConnection,
    pull_request: &PullRequestId,
) -> QueryResult<Vec<UserId>> {
    pr_reviewers::table
        .filter(pr_reviewers::pull_request_id.eq(pull_request))
        .order((pr_reviewers::assigned_at, pr_reviewers::reviewer_id))
        .select(pr_reviewers::reviewer_id)
        .load(conn)
}

pub fn is_assigned(
    conn: &mut PgConnection,
    pull_request: &PullRequestId,
    reviewer: &UserId,
) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        pr_reviewers::table
            .filter(pr_reviewers::pull_request_id.eq(pull_request))
            .filter(pr_reviewers::reviewer_id.eq(reviewer)),
    ))
    .get_result(conn)
}

/// Point the `old` assignment at `new` in place. Returns the number of rows changed.
pub fn swap_reviewer(
    conn: &mut PgConnection,
    pull_request: &PullRequestId,
    old: &UserId,
    new: &UserId,
) -> QueryResult<usize> {
    diesel::update(
        pr_reviewers::table
            .filter(pr_reviewers::pull_request_id.eq(pull_request))
            .filter(pr_reviewers::reviewer_id.eq(old)),
    )
    .set((
        pr_reviewers::reviewer_id.eq(new),
        pr_reviewers::assigned_at.eq(Utc::now()),
    ))
    .execute(conn)
}

pub fn delete_reviewer_assignment(
    conn: &mut PgConnection,
    pull_request: &PullRequestId,
    reviewer: &UserId,
) -> QueryResult<usize> {
    diesel::delete(
        pr_reviewers::table
            .filter(pr_reviewers::pull_request_id.eq(pull_request))
            .filter(pr_reviewers::reviewer_id.eq(reviewer)),
    )
    .execute(conn)
}

/// Remove every assignment the given users hold on open pull requests. Assignments on merged
/// pull requests stay as history.
pub fn purge_open_review_assignments(
    conn: &mut PgConnection,
    reviewers: &[UserId],
) -> QueryResult<usize> {
    if reviewers.is_empty() {
        return Ok(0);
    }

    let open = pull_requests::table
        .filter(pull_requests::status.eq(PullRequestStatus::Open))
        .select(pull_requests::pull_request_id);

    diesel::delete(
        pr_reviewers::table
            .filter(pr_reviewers::reviewer_id.eq_any(reviewers))
            .filter(pr_reviewers::pull_request_id.eq_any(open)),
    )
    .execute(conn)
}
