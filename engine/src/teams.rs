use pr_reviewers_db::{
    object_id::{TeamName, UserId},
    users::{NewUser, User},
    TeamMutations, TeamQueries,
};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::{error::require_id, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamMember {
    pub user_id: UserId,
    pub username: String,
    pub is_active: bool,
}

impl From<User> for TeamMember {
    fn from(user: User) -> Self {
        TeamMember {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamWithMembers {
    pub team_name: TeamName,
    pub members: Vec<TeamMember>,
}

/// Create a team. Members that already exist elsewhere are moved into it and take the name and
/// activity flag given here.
#[instrument(skip(store, team), fields(team_name = %team.team_name, members = team.members.len()))]
pub async fn add_team<S>(store: &S, team: TeamWithMembers) -> Result<TeamWithMembers>
where
    S: TeamMutations + ?Sized,
{
    if team.team_name.is_blank() {
        return Err(Error::InvalidTeamName);
    }

    let mut members: Vec<TeamMember> = Vec::with_capacity(team.members.len());
    for member in team.members {
        require_id(&member.user_id)?;
        if member.username.trim().is_empty() {
            return Err(Error::InvalidName("username"));
        }

        // A later entry for the same user wins.
        match members.iter_mut().find(|m| m.user_id == member.user_id) {
            Some(existing) => *existing = member,
            None => members.push(member),
        }
    }

    let rows = members
        .iter()
        .map(|m| NewUser {
            user_id: m.user_id.clone(),
            username: m.username.clone(),
            team_name: Some(team.team_name.clone()),
            is_active: m.is_active,
        })
        .collect();

    match store.create_team(&team.team_name, rows).await {
        Ok(_) => {}
        Err(e) if e.is_conflict() => {
            event!(Level::WARN, "Team already exists");
            return Err(Error::TeamExists(team.team_name));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(TeamWithMembers {
        team_name: team.team_name,
        members,
    })
}

/// Fetch a team and its members. The two lookups run concurrently and the first failure is
/// returned.
#[instrument(skip(store))]
pub async fn get_team<S>(store: &S, name: &TeamName) -> Result<TeamWithMembers>
where
    S: TeamQueries + ?Sized,
{
    if name.is_blank() {
        return Err(Error::InvalidTeamName);
    }

    let (team, members) = tokio::try_join!(store.get_team(name), store.list_team_members(name))?;
    let team = team.ok_or(Error::NotFound("team"))?;

    Ok(TeamWithMembers {
        team_name: team.team_name,
        members: members.into_iter().map(TeamMember::from).collect(),
    })
}
