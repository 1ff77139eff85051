//! Deactivating users and whole teams, and cleaning up the review assignments they leave
//! behind on open pull requests. Merged pull requests keep their reviewers.

use pr_reviewers_db::{
    object_id::{TeamName, UserId},
    users::User,
    DeactivatedUser, PullRequestQueries, ReviewMutations, ReviewerChange, TeamMutations,
    UserQueries,
};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::{error::require_id, selector, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct SetUserActive {
    pub user_id: UserId,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDeactivation {
    pub team_name: TeamName,
    pub deactivated_users: Vec<User>,
}

#[instrument(skip(store))]
pub async fn set_user_active<S>(store: &S, req: SetUserActive) -> Result<DeactivatedUser>
where
    S: UserQueries + PullRequestQueries + TeamMutations + ReviewMutations + ?Sized,
{
    require_id(&req.user_id)?;

    if req.is_active {
        let user = store
            .activate_user(&req.user_id)
            .await?
            .ok_or(Error::NotFound("user"))?;
        return Ok(DeactivatedUser {
            user,
            reassigned: Vec::new(),
            unassigned: Vec::new(),
        });
    }

    deactivate_user(store, &req.user_id).await
}

/// Deactivate one user. Each open review they hold goes to a replacement teammate if one is
/// available and is dropped otherwise.
pub async fn deactivate_user<S>(store: &S, id: &UserId) -> Result<DeactivatedUser>
where
    S: UserQueries + PullRequestQueries + ReviewMutations + ?Sized,
{
    if store.get_user(id).await?.is_none() {
        event!(Level::WARN, "Unknown user");
        return Err(Error::NotFound("user"));
    }

    let plan = plan_reviewer_changes(store, id).await?;
    let result = store
        .deactivate_user(id, plan)
        .await?
        .ok_or(Error::NotFound("user"))?;

    event!(
        Level::INFO,
        reassigned = result.reassigned.len(),
        unassigned = result.unassigned.len(),
        "Deactivated user"
    );
    Ok(result)
}

/// Work out a replacement, or a drop, for each open review held by `id`. The store rechecks
/// each replacement when it applies the plan.
pub async fn plan_reviewer_changes<S>(store: &S, id: &UserId) -> Result<Vec<ReviewerChange>>
where
    S: UserQueries + PullRequestQueries + ?Sized,
{
    let open = store.open_reviews_for(id).await?;
    let mut plan = Vec::with_capacity(open.len());

    for pr in open {
        let change = match selector::select_replacement(store, &pr, id).await? {
            Some(replacement) => ReviewerChange::Replace {
                pull_request_id: pr.pull_request_id,
                replacement,
            },
            None => ReviewerChange::Drop {
                pull_request_id: pr.pull_request_id,
            },
        };
        plan.push(change);
    }

    Ok(plan)
}

/// Deactivate every member of a team and strip their reviews on open pull requests. No
/// replacements are searched for.
#[instrument(skip(store))]
pub async fn deactivate_team<S>(store: &S, name: &TeamName) -> Result<TeamDeactivation>
where
    S: TeamMutations + ?Sized,
{
    if name.is_blank() {
        return Err(Error::InvalidTeamName);
    }

    let deactivated_users = store.deactivate_team_members(name).await?;
    if deactivated_users.is_empty() {
        event!(Level::WARN, "No members to deactivate");
        return Err(Error::NotFound("team"));
    }

    event!(
        Level::INFO,
        count = deactivated_users.len(),
        "Deactivated team"
    );
    Ok(TeamDeactivation {
        team_name: name.clone(),
        deactivated_users,
    })
}
