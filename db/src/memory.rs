//! A store that keeps everything in process memory. Used by tests and for running the service
//! locally without a database. Every operation takes the lock once, so composite writes are
//! atomic with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::{
    enums::PullRequestStatus,
    error::{Error, Result},
    object_id::{PullRequestId, TeamName, UserId},
    pr_reviewers::ReviewAssignment,
    pull_requests::{NewPullRequest, PullRequest},
    store::*,
    teams::Team,
    users::{NewUser, User},
};

#[derive(Debug, Default)]
struct State {
    teams: HashMap<TeamName, Team>,
    users: HashMap<UserId, User>,
    pull_requests: HashMap<PullRequestId, PullRequest>,
    assignments: Vec<ReviewAssignment>,
}

impl State {
    fn is_open(&self, id: &PullRequestId) -> bool {
        self.pull_requests
            .get(id)
            .map(|pr| pr.status == PullRequestStatus::Open)
            .unwrap_or(false)
    }

    fn is_assigned(&self, id: &PullRequestId, reviewer: &UserId) -> bool {
        self.assignments
            .iter()
            .any(|a| &a.pull_request_id == id && &a.reviewer_id == reviewer)
    }

    fn reviewers_of(&self, id: &PullRequestId) -> Vec<UserId> {
        let mut rows = self
            .assignments
            .iter()
            .filter(|a| &a.pull_request_id == id)
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            a.assigned_at
                .cmp(&b.assigned_at)
                .then_with(|| a.reviewer_id.cmp(&b.reviewer_id))
        });
        rows.into_iter().map(|a| a.reviewer_id.clone()).collect()
    }

    fn reviewed_by(&self, reviewer: &UserId, only_open: bool) -> Vec<PullRequest> {
        let mut prs = self
            .assignments
            .iter()
            .filter(|a| &a.reviewer_id == reviewer)
            .filter_map(|a| self.pull_requests.get(&a.pull_request_id))
            .filter(|pr| !only_open || pr.status == PullRequestStatus::Open)
            .cloned()
            .collect::<Vec<_>>();
        prs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        prs
    }

    fn swap(&mut self, id: &PullRequestId, old: &UserId, new: &UserId) -> bool {
        if self.is_assigned(id, new) {
            return false;
        }

        match self
            .assignments
            .iter_mut()
            .find(|a| &a.pull_request_id == id && &a.reviewer_id == old)
        {
            Some(row) => {
                row.reviewer_id = new.clone();
                row.assigned_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn remove_assignment(&mut self, id: &PullRequestId, reviewer: &UserId) -> bool {
        let before = self.assignments.len();
        self.assignments
            .retain(|a| !(&a.pull_request_id == id && &a.reviewer_id == reviewer));
        self.assignments.len() != before
    }

    fn purge_open_assignments(&mut self, reviewers: &[UserId]) {
        let open = self
            .pull_requests
            .values()
            .filter(|pr| pr.status == PullRequestStatus::Open)
            .map(|pr| pr.pull_request_id.clone())
            .collect::<Vec<_>>();

        self.assignments.retain(|a| {
            !(reviewers.contains(&a.reviewer_id) && open.contains(&a.pull_request_id))
        });
    }

    fn set_active(&mut self, id: &UserId, active: bool) -> Option<User> {
        let user = self.users.get_mut(id)?;
        user.is_active = active;
        user.updated_at = Utc::now();
        Some(user.clone())
    }

    fn assignment_team(&self, author: &UserId, outgoing: Option<&UserId>) -> Option<TeamName> {
        match self.users.get(author) {
            Some(author) => author.team_name.clone(),
            None => outgoing
                .and_then(|o| self.users.get(o))
                .and_then(|u| u.team_name.clone()),
        }
    }

    fn check_reviewers(
        &self,
        author: &UserId,
        outgoing: Option<&UserId>,
        reviewers: &[UserId],
    ) -> Result<()> {
        if reviewers.is_empty() {
            return Ok(());
        }

        let team = self.assignment_team(author, outgoing);
        match reviewers.iter().find(|reviewer| {
            *reviewer == author
                || !self.users.get(*reviewer).map_or(false, |u| {
                    u.is_active && team.is_some() && u.team_name == team
                })
        }) {
            Some(reviewer) => Err(Error::Ineligible(reviewer.clone())),
            None => Ok(()),
        }
    }

    fn replacement_still_eligible(
        &self,
        pr: &PullRequest,
        outgoing: &UserId,
        replacement: &UserId,
    ) -> bool {
        replacement != outgoing
            && !self.is_assigned(&pr.pull_request_id, replacement)
            && self
                .check_reviewers(
                    &pr.author_id,
                    Some(outgoing),
                    std::slice::from_ref(replacement),
                )
                .is_ok()
    }
}

fn pick_random(mut candidates: Vec<UserId>, limit: usize) -> Vec<UserId> {
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(limit);
    candidates
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserQueries for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_active_teammates(
        &self,
        team: &TeamName,
        exclude: &[UserId],
        limit: usize,
    ) -> Result<Vec<UserId>> {
        let candidates = {
            let state = self.state.read().await;
            state
                .users
                .values()
                .filter(|u| u.is_active)
                .filter(|u| u.team_name.as_ref() == Some(team))
                .filter(|u| !exclude.contains(&u.user_id))
                .map(|u| u.user_id.clone())
                .collect::<Vec<_>>()
        };

        Ok(pick_random(candidates, limit))
    }
}

#[async_trait]
impl TeamQueries for MemoryStore {
    async fn get_team(&self, name: &TeamName) -> Result<Option<Team>> {
        Ok(self.state.read().await.teams.get(name).cloned())
    }

    async fn list_team_members(&self, name: &TeamName) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let mut members = state
            .users
            .values()
            .filter(|u| u.team_name.as_ref() == Some(name))
            .cloned()
            .collect::<Vec<_>>();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(members)
    }
}

#[async_trait]
impl PullRequestQueries for MemoryStore {
    async fn get_pull_request(&self, id: &PullRequestId) -> Result<Option<PullRequest>> {
        Ok(self.state.read().await.pull_requests.get(id).cloned())
    }

    async fn list_reviewer_ids(&self, id: &PullRequestId) -> Result<Vec<UserId>> {
        Ok(self.state.read().await.reviewers_of(id))
    }

    async fn is_reviewer(&self, id: &PullRequestId, reviewer: &UserId) -> Result<bool> {
        Ok(self.state.read().await.is_assigned(id, reviewer))
    }

    async fn open_reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>> {
        Ok(self.state.read().await.reviewed_by(reviewer, true))
    }

    async fn reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>> {
        Ok(self.state.read().await.reviewed_by(reviewer, false))
    }
}

#[async_trait]
impl StatsQueries for MemoryStore {
    async fn reviewer_counts(&self) -> Result<Vec<ReviewerCount>> {
        let state = self.state.read().await;
        let mut counts = state
            .users
            .keys()
            .map(|id| ReviewerCount {
                user_id: id.clone(),
                pr_count: state
                    .assignments
                    .iter()
                    .filter(|a| &a.reviewer_id == id)
                    .count() as i64,
            })
            .collect::<Vec<_>>();
        counts.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(counts)
    }

    async fn pull_request_counts(&self) -> Result<PullRequestCounts> {
        let state = self.state.read().await;
        let counts = state
            .pull_requests
            .values()
            .fold(PullRequestCounts::default(), |mut acc, pr| {
                acc.total += 1;
                match pr.status {
                    PullRequestStatus::Open => acc.open += 1,
                    PullRequestStatus::Merged => acc.merged += 1,
                }
                acc
            });
        Ok(counts)
    }

    async fn user_stats(&self, id: &UserId) -> Result<Option<UserStats>> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(id) else {
            return Ok(None);
        };

        let reviews = state.reviewed_by(id, false);
        let merged = reviews
            .iter()
            .filter(|pr| pr.status == PullRequestStatus::Merged)
            .count() as i64;

        Ok(Some(UserStats {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            team_name: user.team_name.clone(),
            is_active: user.is_active,
            pull_requests_count: state
                .pull_requests
                .values()
                .filter(|pr| &pr.author_id == id)
                .count() as i64,
            reviews_count: reviews.len() as i64,
            merged_reviews_count: merged,
            open_reviews_count: reviews.len() as i64 - merged,
        }))
    }
}

#[async_trait]
impl TeamMutations for MemoryStore {
    async fn create_team(&self, name: &TeamName, members: Vec<NewUser>) -> Result<Team> {
        let mut state = self.state.write().await;
        if state.teams.contains_key(name) {
            return Err(Error::Conflict("teams_pkey".to_string()));
        }

        let now = Utc::now();
        let team = Team {
            team_name: name.clone(),
            created_at: now,
        };
        state.teams.insert(name.clone(), team.clone());

        for member in members {
            let created_at = state
                .users
                .get(&member.user_id)
                .map(|u| u.created_at)
                .unwrap_or(now);
            state.users.insert(
                member.user_id.clone(),
                User {
                    user_id: member.user_id,
                    username: member.username,
                    team_name: member.team_name,
                    is_active: member.is_active,
                    created_at,
                    updated_at: now,
                },
            );
        }

        Ok(team)
    }

    async fn activate_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.state.write().await.set_active(id, true))
    }

    async fn deactivate_team_members(&self, name: &TeamName) -> Result<Vec<User>> {
        let mut state = self.state.write().await;
        let ids = state
            .users
            .values()
            .filter(|u| u.team_name.as_ref() == Some(name))
            .map(|u| u.user_id.clone())
            .collect::<Vec<_>>();

        let mut deactivated = ids
            .iter()
            .filter_map(|id| state.set_active(id, false))
            .collect::<Vec<_>>();
        deactivated.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        state.purge_open_assignments(&ids);
        Ok(deactivated)
    }
}

#[async_trait]
impl ReviewMutations for MemoryStore {
    async fn create_pull_request_with_reviewers(
        &self,
        pr: NewPullRequest,
        reviewers: Vec<UserId>,
    ) -> Result<PullRequest> {
        let mut state = self.state.write().await;
        if state.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(Error::Conflict("pull_requests_pkey".to_string()));
        }

        let mut unique = reviewers.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != reviewers.len() {
            return Err(Error::Conflict("pr_reviewers_pkey".to_string()));
        }
        state.check_reviewers(&pr.author_id, None, &reviewers)?;

        let now = Utc::now();
        let created = PullRequest {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status,
            created_at: now,
            merged_at: None,
        };

        state
            .pull_requests
            .insert(created.pull_request_id.clone(), created.clone());
        state
            .assignments
            .extend(reviewers.into_iter().map(|reviewer_id| ReviewAssignment {
                pull_request_id: created.pull_request_id.clone(),
                reviewer_id,
                assigned_at: now,
            }));

        Ok(created)
    }

    async fn update_pull_request_status(
        &self,
        id: &PullRequestId,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<Option<PullRequest>> {
        let mut state = self.state.write().await;
        let updated = state
            .pull_requests
            .get_mut(id)
            .filter(|pr| pr.status == PullRequestStatus::Open)
            .map(|pr| {
                pr.status = status;
                pr.merged_at = merged_at;
                pr.clone()
            });
        Ok(updated)
    }

    async fn swap_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.is_open(id) {
            return Ok(false);
        }

        if !state.is_assigned(id, old) {
            return Ok(false);
        }

        let author = match state.pull_requests.get(id) {
            Some(pr) => pr.author_id.clone(),
            None => return Ok(false),
        };
        state.check_reviewers(&author, Some(old), std::slice::from_ref(new))?;

        if state.is_assigned(id, new) {
            return Err(Error::Conflict("pr_reviewers_pkey".to_string()));
        }

        Ok(state.swap(id, old, new))
    }

    async fn deactivate_user(
        &self,
        id: &UserId,
        plan: Vec<ReviewerChange>,
    ) -> Result<Option<DeactivatedUser>> {
        let mut state = self.state.write().await;
        let Some(user) = state.set_active(id, false) else {
            return Ok(None);
        };

        let mut result = DeactivatedUser {
            user,
            reassigned: Vec::new(),
            unassigned: Vec::new(),
        };

        for change in plan {
            let pr_id = change.pull_request_id().clone();
            let Some(pr) = state.pull_requests.get(&pr_id).cloned() else {
                continue;
            };
            if pr.status != PullRequestStatus::Open {
                continue;
            }

            if let ReviewerChange::Replace { replacement, .. } = &change {
                if state.replacement_still_eligible(&pr, id, replacement)
                    && state.swap(&pr_id, id, replacement)
                {
                    result.reassigned.push(Replacement {
                        pull_request_id: pr_id,
                        replaced_by: replacement.clone(),
                    });
                    continue;
                }
            }

            if state.remove_assignment(&pr_id, id) {
                result.unassigned.push(pr_id);
            }
        }

        state.purge_open_assignments(std::slice::from_ref(id));
        Ok(Some(result))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn member(id: &str, team: &str, active: bool) -> NewUser {
        NewUser {
            user_id: UserId::new(id),
            username: format!("user {id}"),
            team_name: Some(TeamName::new(team)),
            is_active: active,
        }
    }

    fn new_pr(id: &str, author: &str) -> NewPullRequest {
        NewPullRequest {
            pull_request_id: PullRequestId::new(id),
            pull_request_name: format!("change {id}"),
            author_id: UserId::new(author),
            status: PullRequestStatus::Open,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_team(
                &TeamName::new("core"),
                vec![
                    member("a", "core", true),
                    member("b", "core", true),
                    member("c", "core", true),
                    member("d", "core", false),
                ],
            )
            .await
            .unwrap();
        store
            .create_team(&TeamName::new("other"), vec![member("x", "other", true)])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn teammates_respect_filters() {
        let store = seeded().await;
        for _ in 0..20 {
            let found = store
                .find_active_teammates(&TeamName::new("core"), &[UserId::new("a")], 5)
                .await
                .unwrap();
            let mut sorted = found.clone();
            sorted.sort();
            assert_eq!(sorted, vec![UserId::new("b"), UserId::new("c")]);
        }

        let limited = store
            .find_active_teammates(&TeamName::new("core"), &[], 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let none = store
            .find_single_replacement(
                &TeamName::new("core"),
                &[UserId::new("a"), UserId::new("b"), UserId::new("c")],
            )
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn duplicate_team_is_conflict() {
        let store = seeded().await;
        let err = store
            .create_team(&TeamName::new("core"), Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_team_moves_existing_users() {
        let store = seeded().await;
        store
            .create_team(&TeamName::new("new"), vec![member("x", "new", false)])
            .await
            .unwrap();

        let x = store.get_user(&UserId::new("x")).await.unwrap().unwrap();
        assert_eq!(x.team_name, Some(TeamName::new("new")));
        assert!(!x.is_active);
        assert!(store
            .list_team_members(&TeamName::new("other"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn duplicate_pull_request_leaves_state_untouched() {
        let store = seeded().await;
        store
            .create_pull_request_with_reviewers(new_pr("p1", "a"), vec![UserId::new("b")])
            .await
            .unwrap();

        let err = store
            .create_pull_request_with_reviewers(new_pr("p1", "c"), vec![UserId::new("a")])
            .await
            .unwrap_err();
        assert_matches!(err, Error::Conflict(_));

        let pr = store
            .get_pull_request(&PullRequestId::new("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pr.author_id, UserId::new("a"));
        assert_eq!(
            store
                .list_reviewer_ids(&PullRequestId::new("p1"))
                .await
                .unwrap(),
            vec![UserId::new("b")]
        );
    }

    #[tokio::test]
    async fn status_update_only_touches_open() {
        let store = seeded().await;
        store
            .create_pull_request_with_reviewers(new_pr("p1", "a"), vec![UserId::new("b")])
            .await
            .unwrap();

        let id = PullRequestId::new("p1");
        let merged = store
            .update_pull_request_status(&id, PullRequestStatus::Merged, Some(Utc::now()))
            .await
            .unwrap();
        assert_matches!(merged, Some(pr) if pr.merged_at.is_some());

        let again = store
            .update_pull_request_status(&id, PullRequestStatus::Merged, Some(Utc::now()))
            .await
            .unwrap();
        assert!(again.is_none());

        let missing = store
            .update_pull_request_status(
                &PullRequestId::new("nope"),
                PullRequestStatus::Merged,
                Some(Utc::now()),
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn swap_is_guarded() {
        let store = seeded().await;
        let id = PullRequestId::new("p1");
        store
            .create_pull_request_with_reviewers(
                new_pr("p1", "a"),
                vec![UserId::new("b"), UserId::new("c")],
            )
            .await
            .unwrap();

        let not_assigned = store
            .swap_reviewer(&id, &UserId::new("x"), &UserId::new("d"))
            .await
            .unwrap();
        assert!(!not_assigned);

        let duplicate = store
            .swap_reviewer(&id, &UserId::new("b"), &UserId::new("c"))
            .await
            .unwrap_err();
        assert!(duplicate.is_conflict());

        let swapped = store
            .swap_reviewer(&id, &UserId::new("b"), &UserId::new("d"))
            .await
            .unwrap_err();
        assert_matches!(swapped, Error::Ineligible(u) if u == "d");

        let swapped = store
            .swap_reviewer(&id, &UserId::new("b"), &UserId::new("x"))
            .await
            .unwrap_err();
        assert!(swapped.is_ineligible(), "x is on another team");

        store.activate_user(&UserId::new("d")).await.unwrap();
        let swapped = store
            .swap_reviewer(&id, &UserId::new("b"), &UserId::new("d"))
            .await
            .unwrap();
        assert!(swapped);
        let mut reviewers = store.list_reviewer_ids(&id).await.unwrap();
        reviewers.sort();
        assert_eq!(reviewers, vec![UserId::new("c"), UserId::new("d")]);
    }

    #[tokio::test]
    async fn reviewer_deactivated_after_selection_is_rejected() {
        let store = seeded().await;
        let picked = store
            .find_active_teammates(&TeamName::new("core"), &[UserId::new("a")], 2)
            .await
            .unwrap();
        assert_eq!(picked.len(), 2);

        store
            .deactivate_user(&picked[0], Vec::new())
            .await
            .unwrap()
            .unwrap();

        let err = store
            .create_pull_request_with_reviewers(new_pr("p1", "a"), picked.clone())
            .await
            .unwrap_err();
        assert_matches!(err, Error::Ineligible(ref u) if u == &picked[0]);
        assert!(store
            .get_pull_request(&PullRequestId::new("p1"))
            .await
            .unwrap()
            .is_none());

        let err = store
            .create_pull_request_with_reviewers(new_pr("p2", "a"), vec![UserId::new("a")])
            .await
            .unwrap_err();
        assert!(err.is_ineligible(), "the author can't review their own change");
    }

    #[tokio::test]
    async fn duplicate_reviewer_is_rejected() {
        let store = seeded().await;
        let err = store
            .create_pull_request_with_reviewers(
                new_pr("p1", "a"),
                vec![UserId::new("b"), UserId::new("b")],
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(store
            .get_pull_request(&PullRequestId::new("p1"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .list_reviewer_ids(&PullRequestId::new("p1"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deactivate_user_falls_back_to_drop() {
        let store = seeded().await;
        store
            .create_pull_request_with_reviewers(
                new_pr("p1", "a"),
                vec![UserId::new("b"), UserId::new("c")],
            )
            .await
            .unwrap();

        // c is already on p1, so the planned swap can't be applied.
        let result = store
            .deactivate_user(
                &UserId::new("b"),
                vec![ReviewerChange::Replace {
                    pull_request_id: PullRequestId::new("p1"),
                    replacement: UserId::new("c"),
                }],
            )
            .await
            .unwrap()
            .unwrap();

        assert!(result.reassigned.is_empty());
        assert_eq!(result.unassigned, vec![PullRequestId::new("p1")]);
        assert_eq!(
            store
                .list_reviewer_ids(&PullRequestId::new("p1"))
                .await
                .unwrap(),
            vec![UserId::new("c")]
        );
    }

    #[tokio::test]
    async fn deactivate_team_keeps_merged_history() {
        let store = seeded().await;
        store
            .create_pull_request_with_reviewers(new_pr("open", "a"), vec![UserId::new("b")])
            .await
            .unwrap();
        store
            .create_pull_request_with_reviewers(new_pr("done", "a"), vec![UserId::new("c")])
            .await
            .unwrap();
        store
            .update_pull_request_status(
                &PullRequestId::new("done"),
                PullRequestStatus::Merged,
                Some(Utc::now()),
            )
            .await
            .unwrap();

        let users = store
            .deactivate_team_members(&TeamName::new("core"))
            .await
            .unwrap();
        assert_eq!(users.len(), 4);
        assert!(users.iter().all(|u| !u.is_active));

        assert!(store
            .list_reviewer_ids(&PullRequestId::new("open"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .list_reviewer_ids(&PullRequestId::new("done"))
                .await
                .unwrap(),
            vec![UserId::new("c")]
        );

        let empty = store
            .deactivate_team_members(&TeamName::new("ghost"))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn stats_reflect_assignments() {
        let store = seeded().await;
        store
            .create_pull_request_with_reviewers(
                new_pr("p1", "a"),
                vec![UserId::new("b"), UserId::new("c")],
            )
            .await
            .unwrap();
        store
            .create_pull_request_with_reviewers(new_pr("p2", "a"), vec![UserId::new("b")])
            .await
            .unwrap();
        store
            .update_pull_request_status(
                &PullRequestId::new("p2"),
                PullRequestStatus::Merged,
                Some(Utc::now()),
            )
            .await
            .unwrap();

        assert_eq!(
            store.pull_request_counts().await.unwrap(),
            PullRequestCounts {
                total: 2,
                open: 1,
                merged: 1
            }
        );

        let counts = store.reviewer_counts().await.unwrap();
        let b = counts.iter().find(|c| c.user_id == "b").unwrap();
        assert_eq!(b.pr_count, 2);
        let x = counts.iter().find(|c| c.user_id == "x").unwrap();
        assert_eq!(x.pr_count, 0);

        let stats = store.user_stats(&UserId::new("b")).await.unwrap().unwrap();
        assert_eq!(stats.reviews_count, 2);
        assert_eq!(stats.merged_reviews_count, 1);
        assert_eq!(stats.open_reviews_count, 1);

        assert!(store.user_stats(&UserId::new("zz")).await.unwrap().is_none());
    }
}
