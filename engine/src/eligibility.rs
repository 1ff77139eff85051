//! Candidate lookup. Only active members of the given team who are not excluded are ever
//! returned, in no particular order. An empty result is a normal outcome.

use pr_reviewers_db::{
    object_id::{TeamName, UserId},
    UserQueries,
};
use tracing::instrument;

use crate::Result;

/// Up to `limit` eligible reviewers from `team`. Users without a team have no teammates, so a
/// missing team yields no candidates.
#[instrument(level = "DEBUG", skip(users))]
pub async fn find_candidates<U: UserQueries + ?Sized>(
    users: &U,
    team: Option<&TeamName>,
    exclude: &[UserId],
    limit: usize,
) -> Result<Vec<UserId>> {
    let Some(team) = team.filter(|t| !t.is_blank()) else {
        return Ok(Vec::new());
    };

    if limit == 0 {
        return Ok(Vec::new());
    }

    let found = users.find_active_teammates(team, exclude, limit).await?;
    Ok(found)
}

#[instrument(level = "DEBUG", skip(users))]
pub async fn find_single_replacement<U: UserQueries + ?Sized>(
    users: &U,
    team: Option<&TeamName>,
    exclude: &[UserId],
) -> Result<Option<UserId>> {
    let Some(team) = team.filter(|t| !t.is_blank()) else {
        return Ok(None);
    };

    let found = users.find_single_replacement(team, exclude).await?;
    Ok(found)
}
