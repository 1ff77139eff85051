use pr_reviewers_db::object_id::{PullRequestId, TeamName, UserId};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad classes of failure, used by adapters to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something malformed.
    Validation,
    NotFound,
    Conflict,
    /// The store failed. Details stay in the logs.
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} must not be empty")]
    InvalidName(&'static str),

    #[error("team_name must not be empty")]
    InvalidTeamName,

    #[error("{0} must not be empty")]
    InvalidId(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("PR id already exists")]
    PullRequestExists(PullRequestId),

    #[error("team_name already exists")]
    TeamExists(TeamName),

    #[error("cannot reassign on merged PR")]
    PullRequestMerged(PullRequestId),

    #[error("reviewer is not assigned to this PR")]
    NotAssigned {
        pull_request_id: PullRequestId,
        reviewer_id: UserId,
    },

    #[error("no active replacement candidate in team")]
    NoCandidate(PullRequestId),

    #[error("Store error: {0}")]
    Store(#[from] pr_reviewers_db::Error),
}

impl Error {
    /// The stable code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidName(_) => "INVALID_NAME",
            Error::InvalidTeamName => "INVALID_TEAM_NAME",
            Error::InvalidId(_) => "INVALID_ID",
            Error::NotFound(_) => "NOT_FOUND",
            Error::PullRequestExists(_) => "PR_EXISTS",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::PullRequestMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::Store(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidName(_) | Error::InvalidTeamName | Error::InvalidId(_) => {
                ErrorKind::Validation
            }
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PullRequestExists(_)
            | Error::TeamExists(_)
            | Error::PullRequestMerged(_)
            | Error::NotAssigned { .. }
            | Error::NoCandidate(_) => ErrorKind::Conflict,
            Error::Store(_) => ErrorKind::Internal,
        }
    }

    /// The message that is safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Error::Store(_) => "internal error".to_string(),
            e => e.to_string(),
        }
    }
}

/// Reject blank identifiers with `INVALID_ID`.
pub(crate) fn require_id<const KIND: usize>(
    id: &pr_reviewers_db::object_id::ObjectId<KIND>,
) -> Result<()> {
    if id.is_blank() {
        return Err(Error::InvalidId(
            pr_reviewers_db::object_id::ObjectId::<KIND>::kind(),
        ));
    }

    Ok(())
}
