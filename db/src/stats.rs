use diesel::{prelude::*, sql_types::Text};

use crate::{
    object_id::UserId,
    store::{PullRequestCounts, ReviewerCount, UserStats},
};

/// Number of assignments held by every user, including users with none.
pub fn reviewer_counts(conn: &mut PgConnection) -> QueryResult<Vec<ReviewerCount>> {
    diesel::sql_query(
        r##"SELECT u.user_id, count(r.reviewer_id) AS pr_count
        FROM users u
        LEFT JOIN pr_reviewers r ON r.reviewer_id = u.user_id
        GROUP BY u.user_id
        ORDER BY u.user_id"##,
    )
    .load(conn)
}

pub fn pull_request_counts(conn: &mut PgConnection) -> QueryResult<PullRequestCounts> {
    diesel::sql_query(
        r##"SELECT count(*) AS total,
            count(*) FILTER (WHERE status = 'OPEN') AS open,
            count(*) FILTER (WHERE status = 'MERGED') AS merged
        FROM pull_requests"##,
    )
    .get_result(conn)
}

pub fn user_stats(conn: &mut PgConnection, id: &UserId) -> QueryResult<Option<UserStats>> {
    diesel::sql_query(
        r##"SELECT u.user_id, u.username, u.team_name, u.is_active,
            (SELECT count(*) FROM pull_requests p WHERE p.author_id = u.user_id)
                AS pull_requests_count,
            (SELECT count(*) FROM pr_reviewers r WHERE r.reviewer_id = u.user_id)
                AS reviews_count,
            (SELECT count(*) FROM pr_reviewers r
                JOIN pull_requests p ON p.pull_request_id = r.pull_request_id
                WHERE r.reviewer_id = u.user_id AND p.status = 'MERGED')
                AS merged_reviews_count,
            (SELECT count(*) FROM pr_reviewers r
                JOIN pull_requests p ON p.pull_request_id = r.pull_request_id
                WHERE r.reviewer_id = u.user_id AND p.status = 'OPEN')
                AS open_reviews_count
        FROM users u
        WHERE u.user_id = $1"##,
    )
    .bind::<Text, _>(id)
    .get_result(conn)
    .optional()
}
