use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::instrument;

use crate::{
    enums::PullRequestStatus,
    error::{Error, Result},
    object_id::{PullRequestId, TeamName, UserId},
    pr_reviewers::{self, NewReviewAssignment},
    pull_requests::{self, NewPullRequest, PullRequest},
    stats,
    store::*,
    teams::{self, NewTeam, Team},
    users::{self, NewUser, User},
    Pool, PoolExt,
};

/// The Postgres-backed store. Every multi-row write runs inside a single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool", &self.pool.status())
            .finish()
    }
}

#[async_trait]
impl UserQueries for PgStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| users::get(conn, &id).map_err(Error::from))
            .await
    }

    #[instrument(level = "DEBUG", skip(self))]
    async fn find_active_teammates(
        &self,
        team: &TeamName,
        exclude: &[UserId],
        limit: usize,
    ) -> Result<Vec<UserId>> {
        let team = team.clone();
        let exclude = exclude.to_vec();
        self.pool
            .interact(move |conn| {
                users::find_active_teammates(conn, &team, &exclude, limit).map_err(Error::from)
            })
            .await
    }
}

#[async_trait]
impl TeamQueries for PgStore {
    async fn get_team(&self, name: &TeamName) -> Result<Option<Team>> {
        let name = name.clone();
        self.pool
            .interact(move |conn| teams::get(conn, &name).map_err(Error::from))
            .await
    }

    async fn list_team_members(&self, name: &TeamName) -> Result<Vec<User>> {
        let name = name.clone();
        self.pool
            .interact(move |conn| users::list_team(conn, &name).map_err(Error::from))
            .await
    }
}

#[async_trait]
impl PullRequestQueries for PgStore {
    async fn get_pull_request(&self, id: &PullRequestId) -> Result<Option<PullRequest>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| pull_requests::get(conn, &id).map_err(Error::from))
            .await
    }

    async fn list_reviewer_ids(&self, id: &PullRequestId) -> Result<Vec<UserId>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| pr_reviewers::list_reviewer_ids(conn, &id).map_err(Error::from))
            .await
    }

    async fn is_reviewer(&self, id: &PullRequestId, reviewer: &UserId) -> Result<bool> {
        let id = id.clone();
        let reviewer = reviewer.clone();
        self.pool
            .interact(move |conn| {
                pr_reviewers::is_assigned(conn, &id, &reviewer).map_err(Error::from)
            })
            .await
    }

    async fn open_reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>> {
        let reviewer = reviewer.clone();
        self.pool
            .interact(move |conn| {
                pull_requests::reviewed_by(conn, &reviewer, true).map_err(Error::from)
            })
            .await
    }

    async fn reviews_for(&self, reviewer: &UserId) -> Result<Vec<PullRequest>> {
        let reviewer = reviewer.clone();
        self.pool
            .interact(move |conn| {
                pull_requests::reviewed_by(conn, &reviewer, false).map_err(Error::from)
            })
            .await
    }
}

#[async_trait]
impl StatsQueries for PgStore {
    async fn reviewer_counts(&self) -> Result<Vec<ReviewerCount>> {
        self.pool
            .interact(|conn| stats::reviewer_counts(conn).map_err(Error::from))
            .await
    }

    async fn pull_request_counts(&self) -> Result<PullRequestCounts> {
        self.pool
            .interact(|conn| stats::pull_request_counts(conn).map_err(Error::from))
            .await
    }

    async fn user_stats(&self, id: &UserId) -> Result<Option<UserStats>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| stats::user_stats(conn, &id).map_err(Error::from))
            .await
    }
}

#[async_trait]
impl TeamMutations for PgStore {
    #[instrument(level = "DEBUG", skip(self, members), fields(members = members.len()))]
    async fn create_team(&self, name: &TeamName, members: Vec<NewUser>) -> Result<Team> {
        let name = name.clone();
        self.pool
            .transaction(move |conn| {
                let team = diesel::insert_into(teams::table)
                    .values(NewTeam { team_name: name })
                    .get_result::<Team>(conn)?;

                users::upsert(conn, &members)?;
                Ok::<_, Error>(team)
            })
            .await
    }

    async fn activate_user(&self, id: &UserId) -> Result<Option<User>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| users::set_active(conn, &id, true).map_err(Error::from))
            .await
    }

    #[instrument(level = "DEBUG", skip(self))]
    async fn deactivate_team_members(&self, name: &TeamName) -> Result<Vec<User>> {
        let name = name.clone();
        self.pool
            .transaction(move |conn| {
                let deactivated = users::deactivate_team(conn, &name)?;
                let ids = deactivated
                    .iter()
                    .map(|u| u.user_id.clone())
                    .collect::<Vec<_>>();
                pr_reviewers::purge_open_review_assignments(conn, &ids)?;
                Ok::<_, Error>(deactivated)
            })
            .await
    }
}

#[async_trait]
impl ReviewMutations for PgStore {
    #[instrument(level = "DEBUG", skip(self))]
    async fn create_pull_request_with_reviewers(
        &self,
        pr: NewPullRequest,
        reviewers: Vec<UserId>,
    ) -> Result<PullRequest> {
        self.pool
            .transaction(move |conn| {
                let created = pull_requests::insert(conn, &pr)?;
                lock_reviewers(conn, &created.author_id, None, &reviewers)?;
                let rows = reviewers
                    .into_iter()
                    .map(|reviewer_id| NewReviewAssignment {
                        pull_request_id: created.pull_request_id.clone(),
                        reviewer_id,
                    })
                    .collect::<Vec<_>>();
                pr_reviewers::insert(conn, &rows)?;
                Ok::<_, Error>(created)
            })
            .await
    }

    async fn update_pull_request_status(
        &self,
        id: &PullRequestId,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<Option<PullRequest>> {
        let id = id.clone();
        self.pool
            .interact(move |conn| {
                pull_requests::update_open_status(conn, &id, status, merged_at)
                    .map_err(Error::from)
            })
            .await
    }

    #[instrument(level = "DEBUG", skip(self))]
    async fn swap_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool> {
        let id = id.clone();
        let old = old.clone();
        let new = new.clone();
        self.pool
            .transaction(move |conn| {
                if pull_requests::lock_status(conn, &id)? != Some(PullRequestStatus::Open) {
                    return Ok(false);
                }

                let Some(pr) = pull_requests::get(conn, &id)? else {
                    return Ok(false);
                };
                if !pr_reviewers::is_assigned(conn, &id, &old)? {
                    return Ok(false);
                }

                lock_reviewers(conn, &pr.author_id, Some(&old), std::slice::from_ref(&new))?;
                let changed = pr_reviewers::swap_reviewer(conn, &id, &old, &new)?;
                Ok::<_, Error>(changed > 0)
            })
            .await
    }

    #[instrument(level = "DEBUG", skip(self, plan), fields(planned = plan.len()))]
    async fn deactivate_user(
        &self,
        id: &UserId,
        plan: Vec<ReviewerChange>,
    ) -> Result<Option<DeactivatedUser>> {
        let id = id.clone();
        self.pool
            .transaction(move |conn| {
                let Some(user) = users::set_active(conn, &id, false)? else {
                    return Ok(None);
                };

                let mut result = DeactivatedUser {
                    user,
                    reassigned: Vec::new(),
                    unassigned: Vec::new(),
                };

                for change in plan {
                    let pr_id = change.pull_request_id().clone();
                    let Some(pr) = pull_requests::get(conn, &pr_id)? else {
                        continue;
                    };

                    // Lock before touching the assignment so a merge can't slip in between.
                    if pull_requests::lock_status(conn, &pr_id)? != Some(PullRequestStatus::Open)
                    {
                        continue;
                    }

                    if let ReviewerChange::Replace { replacement, .. } = &change {
                        if replacement_still_eligible(conn, &pr, &id, replacement)?
                            && pr_reviewers::swap_reviewer(conn, &pr_id, &id, replacement)? > 0
                        {
                            result.reassigned.push(Replacement {
                                pull_request_id: pr_id,
                                replaced_by: replacement.clone(),
                            });
                            continue;
                        }
                    }

                    if pr_reviewers::delete_reviewer_assignment(conn, &pr_id, &id)? > 0 {
                        result.unassigned.push(pr_id);
                    }
                }

                // Anything assigned after the plan was computed.
                pr_reviewers::purge_open_review_assignments(conn, std::slice::from_ref(&id))?;

                Ok::<_, Error>(Some(result))
            })
            .await
    }
}

/// The team reviewers for a pull request by `author` are drawn from. When the author is gone,
/// the team of the reviewer being replaced stands in.
fn assignment_team(
    conn: &mut PgConnection,
    author: &UserId,
    outgoing: Option<&UserId>,
) -> Result<Option<TeamName>> {
    if let Some(author) = users::get(conn, author)? {
        return Ok(author.team_name);
    }

    match outgoing {
        Some(outgoing) => Ok(users::get(conn, outgoing)?.and_then(|u| u.team_name)),
        None => Ok(None),
    }
}

/// Lock every reviewer about to be written for `author`, failing with
/// [`Error::Ineligible`] on the first one that is no longer an active teammate. Reviewers are
/// picked before the write transaction starts, so this is the check that counts.
fn lock_reviewers(
    conn: &mut PgConnection,
    author: &UserId,
    outgoing: Option<&UserId>,
    reviewers: &[UserId],
) -> Result<()> {
    if reviewers.is_empty() {
        return Ok(());
    }

    let team = assignment_team(conn, author, outgoing)?;
    for reviewer in reviewers {
        let assignable = match &team {
            Some(team) if reviewer != author => users::lock_if_assignable(conn, reviewer, team)?,
            _ => false,
        };

        if !assignable {
            return Err(Error::Ineligible(reviewer.clone()));
        }
    }

    Ok(())
}

/// Check, inside the deactivation transaction, that the planned replacement can still take
/// the assignment.
fn replacement_still_eligible(
    conn: &mut PgConnection,
    pr: &PullRequest,
    outgoing: &UserId,
    replacement: &UserId,
) -> Result<bool> {
    if replacement == outgoing
        || pr_reviewers::is_assigned(conn, &pr.pull_request_id, replacement)?
    {
        return Ok(false);
    }

    match lock_reviewers(
        conn,
        &pr.author_id,
        Some(outgoing),
        std::slice::from_ref(replacement),
    ) {
        Ok(()) => Ok(true),
        Err(Error::Ineligible(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<()> {
        self.pool
            .interact(|conn| {
                diesel::sql_query("SELECT 1").execute(conn)?;
                Ok::<_, Error>(())
            })
            .await
    }
}
