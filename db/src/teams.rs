use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::{object_id::TeamName, schema::*};

pub use crate::schema::teams::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = teams, primary_key(team_name))]
pub struct Team {
    pub team_name: TeamName,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub team_name: TeamName,
}

pub fn get(conn: &mut PgConnection, name: &TeamName) -> QueryResult<Option<Team>> {
    teams::table
        .find(name)
        .select(Team::as_select())
        .first(conn)
        .optional()
}
