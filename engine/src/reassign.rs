use pr_reviewers_db::{
    object_id::{PullRequestId, UserId},
    pull_requests::PullRequest,
    PullRequestQueries, ReviewMutations, UserQueries,
};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::{error::require_id, lifecycle::PullRequestWithReviewers, selector, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ReassignReviewer {
    pub pull_request_id: PullRequestId,
    #[serde(alias = "old_user_id")]
    pub old_reviewer_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassigned {
    pub pr: PullRequestWithReviewers,
    pub replaced_by: UserId,
}

/// Check that `reviewer` can be swapped out of `id`: the pull request exists, is still open,
/// and has `reviewer` assigned. Checks run in that order and the first failure wins.
pub async fn validate_reassignment<S>(
    store: &S,
    id: &PullRequestId,
    reviewer: &UserId,
) -> Result<PullRequest>
where
    S: PullRequestQueries + ?Sized,
{
    let pr = store
        .get_pull_request(id)
        .await?
        .ok_or(Error::NotFound("pull request"))?;

    if pr.status.is_frozen() {
        return Err(Error::PullRequestMerged(id.clone()));
    }

    if !store.is_reviewer(id, reviewer).await? {
        return Err(Error::NotAssigned {
            pull_request_id: id.clone(),
            reviewer_id: reviewer.clone(),
        });
    }

    Ok(pr)
}

#[instrument(skip(store))]
pub async fn reassign_reviewer<S>(store: &S, req: ReassignReviewer) -> Result<Reassigned>
where
    S: UserQueries + PullRequestQueries + ReviewMutations + ?Sized,
{
    require_id(&req.pull_request_id)?;
    require_id(&req.old_reviewer_id)?;

    let id = &req.pull_request_id;
    let old = &req.old_reviewer_id;

    let mut pr = validate_reassignment(store, id, old)
        .await
        .map_err(log_rejection)?;

    let mut attempt = 1;
    let replacement = loop {
        let replacement = selector::select_replacement(store, &pr, old)
            .await?
            .ok_or_else(|| log_rejection(Error::NoCandidate(id.clone())))?;

        match store.swap_reviewer(id, old, &replacement).await {
            Ok(true) => break replacement,
            Ok(false) => {
                // The pull request changed under us. Report whichever precondition now fails.
                validate_reassignment(store, id, old)
                    .await
                    .map_err(log_rejection)?;
                return Err(log_rejection(Error::NotAssigned {
                    pull_request_id: id.clone(),
                    reviewer_id: old.clone(),
                }));
            }
            // The candidate was assigned elsewhere or deactivated after we picked it.
            Err(e) if e.is_conflict() || e.is_ineligible() => {
                if attempt >= selector::MAX_SELECTION_ATTEMPTS {
                    return Err(log_rejection(Error::NoCandidate(id.clone())));
                }
                event!(Level::DEBUG, attempt, error = %e, "Selecting a replacement again");
                attempt += 1;
                pr = validate_reassignment(store, id, old)
                    .await
                    .map_err(log_rejection)?;
            }
            Err(e) => return Err(e.into()),
        }
    };

    event!(Level::INFO, replaced_by = %replacement, "Reassigned reviewer");

    let assigned_reviewers = store.list_reviewer_ids(id).await?;
    let pr = store
        .get_pull_request(id)
        .await?
        .ok_or(Error::NotFound("pull request"))?;

    Ok(Reassigned {
        pr: PullRequestWithReviewers {
            pr,
            assigned_reviewers,
        },
        replaced_by: replacement,
    })
}

fn log_rejection(e: Error) -> Error {
    if !matches!(e, Error::Store(_)) {
        event!(Level::WARN, code = e.code(), "Reassignment rejected");
    }
    e
}
