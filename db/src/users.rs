use chrono::{DateTime, Utc};
use diesel::{prelude::*, upsert::excluded};
use serde::{Deserialize, Serialize};

use crate::{
    object_id::{TeamName, UserId},
    random,
    schema::*,
};

pub use crate::schema::users::*;

#[derive(Clone, Debug, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users, primary_key(user_id))]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    /// Users without a team are never picked as reviewers.
    pub team_name: Option<TeamName>,
    pub is_active: bool,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: String,
    pub team_name: Option<TeamName>,
    pub is_active: bool,
}

pub fn get(conn: &mut PgConnection, id: &UserId) -> QueryResult<Option<User>> {
    users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Insert the users, or move existing ones into the new team with the supplied name and
/// activity flag.
pub fn upsert(conn: &mut PgConnection, members: &[NewUser]) -> QueryResult<usize> {
    if members.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(users::table)
        .values(members)
        .on_conflict(users::user_id)
        .do_update()
        .set((
            users::username.eq(excluded(users::username)),
            users::team_name.eq(excluded(users::team_name)),
            users::is_active.eq(excluded(users::is_active)),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
}

pub fn list_team(conn: &mut PgConnection, team: &TeamName) -> QueryResult<Vec<User>> {
    users::table
        .filter(users::team_name.eq(team))
        .order(users::user_id)
        .select(User::as_select())
        .load(conn)
}

/// Active members of `team` that are not in `exclude`, in random order.
pub fn find_active_teammates(
    conn: &mut PgConnection,
    team: &TeamName,
    exclude: &[UserId],
    limit: usize,
) -> QueryResult<Vec<UserId>> {
    users::table
        .select(users::user_id)
        .filter(users::is_active.eq(true))
        .filter(users::team_name.eq(team))
        .filter(users::user_id.ne_all(exclude))
        .order(random())
        .limit(limit as i64)
        .load(conn)
}

/// Whether `id` is an active member of `team`. A match is locked `FOR SHARE` until the end of
/// the transaction, so a concurrent deactivation waits for it.
pub fn lock_if_assignable(
    conn: &mut PgConnection,
    id: &UserId,
    team: &TeamName,
) -> QueryResult<bool> {
    users::table
        .find(id)
        .filter(users::is_active.eq(true))
        .filter(users::team_name.eq(team))
        .select(users::user_id)
        .for_share()
        .first::<UserId>(conn)
        .optional()
        .map(|found| found.is_some())
}

pub fn set_active(
    conn: &mut PgConnection,
    id: &UserId,
    active: bool,
) -> QueryResult<Option<User>> {
    diesel::update(users::table.find(id))
        .set((users::is_active.eq(active), users::updated_at.eq(Utc::now())))
        .get_result::<User>(conn)
        .optional()
}

pub fn deactivate_team(conn: &mut PgConnection, team: &TeamName) -> QueryResult<Vec<User>> {
    diesel::update(users::table.filter(users::team_name.eq(team)))
        .set((users::is_active.eq(false), users::updated_at.eq(Utc::now())))
        .get_results::<User>(conn)
}
