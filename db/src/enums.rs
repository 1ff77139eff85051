use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(PartialEq, Eq, Copy, Clone, Debug, DbEnum, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::PullRequestStatus"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    #[db_rename = "OPEN"]
    Open,
    #[db_rename = "MERGED"]
    Merged,
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        };

        f.write_str(desc)
    }
}

impl PullRequestStatus {
    /// Merged pull requests keep their reviewer set as a historical record.
    pub fn is_frozen(&self) -> bool {
        matches!(self, Self::Merged)
    }
}
