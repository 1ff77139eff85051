//! Pull request creation and merging. A pull request starts `OPEN` with its reviewers and can
//! only move to `MERGED`, after which its reviewer set no longer changes.

use chrono::Utc;
use pr_reviewers_db::{
    object_id::{PullRequestId, UserId},
    pull_requests::{NewPullRequest, PullRequest},
    PullRequestQueries, PullRequestStatus, ReviewMutations, UserQueries,
};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::{error::require_id, selector, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
}

/// A pull request along with the reviewers currently assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestWithReviewers {
    #[serde(flatten)]
    pub pr: PullRequest,
    pub assigned_reviewers: Vec<UserId>,
}

#[instrument(skip(store), fields(pull_request_id = %req.pull_request_id))]
pub async fn create_pull_request<S>(
    store: &S,
    req: CreatePullRequest,
) -> Result<PullRequestWithReviewers>
where
    S: UserQueries + ReviewMutations + ?Sized,
{
    require_id(&req.pull_request_id)?;
    require_id(&req.author_id)?;
    if req.pull_request_name.trim().is_empty() {
        return Err(Error::InvalidName("pull_request_name"));
    }

    let author = store
        .get_user(&req.author_id)
        .await?
        .ok_or(Error::NotFound("author"))?;

    let new_pr = NewPullRequest {
        pull_request_id: req.pull_request_id.clone(),
        pull_request_name: req.pull_request_name,
        author_id: author.user_id.clone(),
        status: PullRequestStatus::Open,
    };

    let mut attempt = 1;
    let (pr, reviewers) = loop {
        let reviewers =
            selector::select_reviewers(store, author.team_name.as_ref(), &author.user_id).await?;

        match store
            .create_pull_request_with_reviewers(new_pr.clone(), reviewers.clone())
            .await
        {
            Ok(pr) => break (pr, reviewers),
            Err(e) if e.is_conflict() => {
                event!(Level::WARN, "Pull request already exists");
                return Err(Error::PullRequestExists(req.pull_request_id));
            }
            Err(e) if e.is_ineligible() && attempt < selector::MAX_SELECTION_ATTEMPTS => {
                event!(Level::DEBUG, attempt, error = %e, "Selecting reviewers again");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    if reviewers.len() < selector::REVIEWER_QUOTA {
        event!(
            Level::INFO,
            assigned = reviewers.len(),
            "Not enough active teammates to fill the reviewer quota"
        );
    }

    Ok(PullRequestWithReviewers {
        pr,
        assigned_reviewers: reviewers,
    })
}

/// Merge an open pull request. Ids that are unknown or already merged both fail with
/// `NOT_FOUND`, since neither matches an open pull request to update.
#[instrument(skip(store))]
pub async fn merge_pull_request<S>(
    store: &S,
    id: &PullRequestId,
) -> Result<PullRequestWithReviewers>
where
    S: PullRequestQueries + ReviewMutations + ?Sized,
{
    require_id(id)?;

    let pr = store
        .update_pull_request_status(id, PullRequestStatus::Merged, Some(Utc::now()))
        .await?
        .ok_or_else(|| {
            event!(Level::WARN, "No open pull request to merge");
            Error::NotFound("pull request")
        })?;

    let assigned_reviewers = store.list_reviewer_ids(id).await?;
    Ok(PullRequestWithReviewers {
        pr,
        assigned_reviewers,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use std::sync::atomic::Ordering;

    use pr_reviewers_db::{object_id::TeamName, users::NewUser, MemoryStore, TeamMutations};

    use super::*;
    use crate::test_support::{Race, Racing};

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let members = ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| NewUser {
                user_id: UserId::new(id),
                username: id.to_string(),
                team_name: Some(TeamName::new("core")),
                is_active: true,
            })
            .collect();
        store
            .create_team(&TeamName::new("core"), members)
            .await
            .unwrap();
        store
            .create_team(
                &TeamName::new("solo"),
                vec![NewUser {
                    user_id: UserId::new("s"),
                    username: "s".to_string(),
                    team_name: Some(TeamName::new("solo")),
                    is_active: true,
                }],
            )
            .await
            .unwrap();
        store
    }

    fn req(id: &str, author: &str) -> CreatePullRequest {
        CreatePullRequest {
            pull_request_id: PullRequestId::new(id),
            pull_request_name: format!("Change {id}"),
            author_id: UserId::new(author),
        }
    }

    #[tokio::test]
    async fn create_assigns_two_reviewers() {
        let store = store().await;
        let created = create_pull_request(&store, req("p1", "a")).await.unwrap();

        assert_eq!(created.pr.status, PullRequestStatus::Open);
        assert!(created.pr.merged_at.is_none());
        assert_eq!(created.assigned_reviewers.len(), 2);
        assert!(!created.assigned_reviewers.contains(&UserId::new("a")));
        assert_ne!(created.assigned_reviewers[0], created.assigned_reviewers[1]);

        let mut stored = store
            .list_reviewer_ids(&PullRequestId::new("p1"))
            .await
            .unwrap();
        let mut expected = created.assigned_reviewers.clone();
        stored.sort();
        expected.sort();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn create_without_teammates_has_no_reviewers() {
        let store = store().await;
        let created = create_pull_request(&store, req("p1", "s")).await.unwrap();
        assert!(created.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn create_validates_input() {
        let store = store().await;

        let mut blank_name = req("p1", "a");
        blank_name.pull_request_name = "   ".to_string();
        let err = create_pull_request(&store, blank_name).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_NAME");

        let err = create_pull_request(&store, req("", "a")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");

        let err = create_pull_request(&store, req("p1", "ghost"))
            .await
            .unwrap_err();
        assert_matches!(err, Error::NotFound(_));
    }

    #[tokio::test]
    async fn duplicate_id_is_pr_exists() {
        let store = store().await;
        create_pull_request(&store, req("p1", "a")).await.unwrap();
        let err = create_pull_request(&store, req("p1", "b"))
            .await
            .unwrap_err();
        assert_matches!(err, Error::PullRequestExists(id) if id == "p1");

        let pr = store
            .get_pull_request(&PullRequestId::new("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pr.author_id, UserId::new("a"));
    }

    #[tokio::test]
    async fn reviewer_deactivated_before_write_is_replaced() {
        let racing = Racing::new(store().await, Race::DeactivateFirstPick);
        let created = create_pull_request(&racing, req("p1", "a")).await.unwrap();
        assert_eq!(racing.creates.load(Ordering::SeqCst), 2);

        assert_eq!(created.assigned_reviewers.len(), 2);
        for reviewer in &created.assigned_reviewers {
            let user = racing.inner.get_user(reviewer).await.unwrap().unwrap();
            assert!(user.is_active, "{reviewer} is inactive");
        }

        let mut stored = racing
            .inner
            .list_reviewer_ids(&PullRequestId::new("p1"))
            .await
            .unwrap();
        let mut expected = created.assigned_reviewers.clone();
        stored.sort();
        expected.sort();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn merge_keeps_reviewers_and_is_not_repeatable() {
        let store = store().await;
        let created = create_pull_request(&store, req("p1", "a")).await.unwrap();
        let id = PullRequestId::new("p1");

        let merged = merge_pull_request(&store, &id).await.unwrap();
        assert_eq!(merged.pr.status, PullRequestStatus::Merged);
        assert!(merged.pr.merged_at.is_some());

        let mut before = created.assigned_reviewers.clone();
        let mut after = merged.assigned_reviewers.clone();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let err = merge_pull_request(&store, &id).await.unwrap_err();
        assert_matches!(err, Error::NotFound(_));

        let err = merge_pull_request(&store, &PullRequestId::new("nope"))
            .await
            .unwrap_err();
        assert_matches!(err, Error::NotFound(_));
    }

    #[test]
    fn serializes_flat() {
        let value = serde_json::to_value(PullRequestWithReviewers {
            pr: PullRequest {
                pull_request_id: "p1".into(),
                pull_request_name: "Change".to_string(),
                author_id: "a".into(),
                status: PullRequestStatus::Open,
                created_at: Utc::now(),
                merged_at: None,
            },
            assigned_reviewers: vec!["b".into()],
        })
        .unwrap();

        assert_eq!(value["pull_request_id"], "p1");
        assert_eq!(value["status"], "OPEN");
        assert_eq!(value["assigned_reviewers"][0], "b");
        assert!(value.get("merged_at").is_none());
    }
}
