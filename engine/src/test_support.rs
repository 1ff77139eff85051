use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pr_reviewers_db::{
    object_id::{PullRequestId, TeamName, UserId},
    pull_requests::{NewPullRequest, PullRequest},
    users::User,
    DeactivatedUser, Error as StoreError, MemoryStore, PullRequestQueries, PullRequestStatus,
    Result as StoreResult, ReviewMutations, ReviewerChange, UserQueries,
};

/// A concurrent write that lands between selection and the store write.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Race {
    /// The first picked reviewer is deactivated, once.
    DeactivateFirstPick,
    /// The pull request is merged right before the first swap.
    MergeBeforeSwap,
    /// The outgoing reviewer is deactivated right before the first swap.
    DeactivateOutgoing,
    /// Every swap finds its candidate already assigned.
    AlwaysTaken,
}

/// Delegates to a [`MemoryStore`], running `race` against it just before writes.
pub(crate) struct Racing {
    pub inner: MemoryStore,
    race: Race,
    fired: AtomicBool,
    pub swaps: AtomicUsize,
    pub creates: AtomicUsize,
}

impl Racing {
    pub fn new(inner: MemoryStore, race: Race) -> Self {
        Self {
            inner,
            race,
            fired: AtomicBool::new(false),
            swaps: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
        }
    }

    fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

#[async_trait]
impl UserQueries for Racing {
    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn find_active_teammates(
        &self,
        team: &TeamName,
        exclude: &[UserId],
        limit: usize,
    ) -> StoreResult<Vec<UserId>> {
        self.inner.find_active_teammates(team, exclude, limit).await
    }
}

#[async_trait]
impl PullRequestQueries for Racing {
    async fn get_pull_request(&self, id: &PullRequestId) -> StoreResult<Option<PullRequest>> {
        self.inner.get_pull_request(id).await
    }

    async fn list_reviewer_ids(&self, id: &PullRequestId) -> StoreResult<Vec<UserId>> {
        self.inner.list_reviewer_ids(id).await
    }

    async fn is_reviewer(&self, id: &PullRequestId, reviewer: &UserId) -> StoreResult<bool> {
        self.inner.is_reviewer(id, reviewer).await
    }

    async fn open_reviews_for(&self, reviewer: &UserId) -> StoreResult<Vec<PullRequest>> {
        self.inner.open_reviews_for(reviewer).await
    }

    async fn reviews_for(&self, reviewer: &UserId) -> StoreResult<Vec<PullRequest>> {
        self.inner.reviews_for(reviewer).await
    }
}

#[async_trait]
impl ReviewMutations for Racing {
    async fn create_pull_request_with_reviewers(
        &self,
        pr: NewPullRequest,
        reviewers: Vec<UserId>,
    ) -> StoreResult<PullRequest> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let (Race::DeactivateFirstPick, Some(first)) = (self.race, reviewers.first()) {
            if self.fire() {
                self.inner.deactivate_user(first, Vec::new()).await?;
            }
        }

        self.inner
            .create_pull_request_with_reviewers(pr, reviewers)
            .await
    }

    async fn update_pull_request_status(
        &self,
        id: &PullRequestId,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<PullRequest>> {
        self.inner
            .update_pull_request_status(id, status, merged_at)
            .await
    }

    async fn swap_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> StoreResult<bool> {
        self.swaps.fetch_add(1, Ordering::SeqCst);
        if let Race::AlwaysTaken = self.race {
            return Err(StoreError::Conflict("pr_reviewers_pkey".to_string()));
        }

        if self.fire() {
            match self.race {
                Race::DeactivateFirstPick => {
                    self.inner.deactivate_user(new, Vec::new()).await?;
                }
                Race::MergeBeforeSwap => {
                    self.inner
                        .update_pull_request_status(
                            id,
                            PullRequestStatus::Merged,
                            Some(Utc::now()),
                        )
                        .await?;
                }
                Race::DeactivateOutgoing => {
                    self.inner.deactivate_user(old, Vec::new()).await?;
                }
                Race::AlwaysTaken => {}
            }
        }

        self.inner.swap_reviewer(id, old, new).await
    }

    async fn deactivate_user(
        &self,
        id: &UserId,
        plan: Vec<ReviewerChange>,
    ) -> StoreResult<Option<DeactivatedUser>> {
        self.inner.deactivate_user(id, plan).await
    }
}
