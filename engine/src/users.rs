use pr_reviewers_db::{object_id::UserId, pull_requests::PullRequest, PullRequestQueries};
use serde::Serialize;
use tracing::instrument;

use crate::{error::require_id, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReviews {
    pub user_id: UserId,
    pub pull_requests: Vec<PullRequest>,
}

/// Every pull request, open or merged, that `id` is assigned to review. Unknown users simply
/// have none.
#[instrument(skip(store))]
pub async fn user_reviews<S>(store: &S, id: &UserId) -> Result<UserReviews>
where
    S: PullRequestQueries + ?Sized,
{
    require_id(id)?;
    let pull_requests = store.reviews_for(id).await?;
    Ok(UserReviews {
        user_id: id.clone(),
        pull_requests,
    })
}
