use std::{borrow::Borrow, ops::Deref, str::FromStr};

use diesel::{
    deserialize::FromSql,
    pg::Pg,
    serialize::{Output, ToSql},
    sql_types::Text,
    AsExpression, FromSqlRow,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectIdError {
    #[error("{0} must not be empty")]
    Blank(&'static str),
}

/// A caller-supplied identifier, stored as text. The const parameter only exists to keep
/// user ids, pull request ids and team names from being mixed up.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct ObjectId<const KIND: usize>(String);

pub type UserId = ObjectId<0>;
pub type PullRequestId = ObjectId<1>;
pub type TeamName = ObjectId<2>;

impl<const KIND: usize> ObjectId<KIND> {
    /// Once const generics supports strings, this can go away, but for now we
    /// do it this way.
    #[inline(always)]
    pub fn kind() -> &'static str {
        match KIND {
            0 => "user_id",
            1 => "pull_request_id",
            2 => "team_name",
            _ => "id",
        }
    }

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Parse an identifier, rejecting empty or whitespace-only values.
    pub fn parse(s: impl Into<String>) -> Result<Self, ObjectIdError> {
        let id = Self(s.into());
        if id.is_blank() {
            return Err(ObjectIdError::Blank(Self::kind()));
        }

        Ok(id)
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const KIND: usize> Deref for ObjectId<KIND> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const KIND: usize> Borrow<str> for ObjectId<KIND> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<const KIND: usize> PartialEq<str> for ObjectId<KIND> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<const KIND: usize> PartialEq<&str> for ObjectId<KIND> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<const KIND: usize> From<&str> for ObjectId<KIND> {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<const KIND: usize> From<String> for ObjectId<KIND> {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<const KIND: usize> std::fmt::Debug for ObjectId<KIND> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(Self::kind()).field(&self.0).finish()
    }
}

impl<const KIND: usize> std::fmt::Display for ObjectId<KIND> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const KIND: usize> FromStr for ObjectId<KIND> {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Serialized as the bare string.
impl<const KIND: usize> serde::Serialize for ObjectId<KIND> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Deserialization accepts any string, including blank ones. Blank values are rejected by the
/// operations that receive them so that the caller gets a proper error code instead of a
/// body parsing failure.
impl<'de, const KIND: usize> serde::Deserialize<'de> for ObjectId<KIND> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

impl<const KIND: usize> FromSql<Text, Pg> for ObjectId<KIND> {
    fn from_sql(bytes: diesel::backend::RawValue<'_, Pg>) -> diesel::deserialize::Result<Self> {
        <String as FromSql<Text, Pg>>::from_sql(bytes).map(Self)
    }
}

impl<const KIND: usize> ToSql<Text, Pg> for ObjectId<KIND> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        <String as ToSql<Text, Pg>>::to_sql(&self.0, out)
    }
}
