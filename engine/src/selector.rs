use pr_reviewers_db::{
    object_id::{TeamName, UserId},
    pull_requests::PullRequest,
    PullRequestQueries, UserQueries,
};

use crate::{eligibility, Result};

/// Number of reviewers assigned to a new pull request when the team has enough people.
pub const REVIEWER_QUOTA: usize = 2;

/// How many times a selection is retried when the store finds that a picked reviewer was
/// deactivated or taken before the write landed.
pub const MAX_SELECTION_ATTEMPTS: usize = 3;

/// Pick up to [`REVIEWER_QUOTA`] reviewers for a pull request by `author`. Returns fewer, or
/// none, when the team is short on active members.
pub async fn select_reviewers<U: UserQueries + ?Sized>(
    users: &U,
    team: Option<&TeamName>,
    author: &UserId,
) -> Result<Vec<UserId>> {
    eligibility::find_candidates(users, team, std::slice::from_ref(author), REVIEWER_QUOTA).await
}

/// Pick one reviewer to take over `outgoing`'s assignment on `pr`. Nobody who is the author or
/// already a reviewer of the pull request is considered.
///
/// Candidates come from the author's team. If the author no longer exists, the outgoing
/// reviewer's team is used instead.
pub async fn select_replacement<S>(
    store: &S,
    pr: &PullRequest,
    outgoing: &UserId,
) -> Result<Option<UserId>>
where
    S: UserQueries + PullRequestQueries + ?Sized,
{
    let team = match store.get_user(&pr.author_id).await? {
        Some(author) => author.team_name,
        None => store
            .get_user(outgoing)
            .await?
            .and_then(|reviewer| reviewer.team_name),
    };

    let mut exclude = store.list_reviewer_ids(&pr.pull_request_id).await?;
    exclude.push(pr.author_id.clone());
    if !exclude.contains(outgoing) {
        exclude.push(outgoing.clone());
    }

    eligibility::find_single_replacement(store, team.as_ref(), &exclude).await
}
