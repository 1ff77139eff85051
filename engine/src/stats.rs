use pr_reviewers_db::{
    object_id::UserId, PullRequestCounts, ReviewerCount, StatsQueries, UserStats,
};
use serde::Serialize;
use tracing::instrument;

use crate::{error::require_id, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralStats {
    pub users_stat: Vec<ReviewerCount>,
    pub pr_stats: PullRequestCounts,
}

/// Per-reviewer assignment counts and global pull request counts, fetched concurrently.
#[instrument(skip(store))]
pub async fn general_stats<S: StatsQueries + ?Sized>(store: &S) -> Result<GeneralStats> {
    let (users_stat, pr_stats) =
        tokio::try_join!(store.reviewer_counts(), store.pull_request_counts())?;

    Ok(GeneralStats {
        users_stat,
        pr_stats,
    })
}

#[instrument(skip(store))]
pub async fn user_stats<S: StatsQueries + ?Sized>(store: &S, id: &UserId) -> Result<UserStats> {
    require_id(id)?;
    store
        .user_stats(id)
        .await?
        .ok_or(Error::NotFound("user"))
}
