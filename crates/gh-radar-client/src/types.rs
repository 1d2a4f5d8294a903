//! GitHub API data transfer objects
//!
//! These types represent the data exchanged with the GitHub API and, for the
//! summary/detail types, the shapes the HTTP surface serves to its frontend.
//! They are intentionally separate from octocrab's models to keep consumers
//! independent of the client library.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A repository visible to the authenticated user.
///
/// `organization_url` records how the repository was discovered: `Some` when
/// it came from an organization listing, `None` for a personal repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Repository name (e.g., "radar")
    pub name: String,

    /// Owner-qualified name (e.g., "acme/radar")
    pub full_name: String,

    /// API URL of the owning organization; `None` for personal repositories
    pub organization_url: Option<String>,
}

impl RepositoryRef {
    /// Owner segment of `full_name`.
    pub fn owner(&self) -> &str {
        self.full_name.split('/').next().unwrap_or_default()
    }
}

/// Whether a pull request is known to touch test files.
///
/// Aggregation never inspects file lists, so summaries start out `Unknown`;
/// the content fetcher computes a `Known` value when it runs. Serialized as
/// `null` / `true` / `false` so the unenriched state is visible on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TestPresence {
    /// File-level inspection has not run for this pull request
    #[default]
    Unknown,
    /// Inspection ran; the flag says whether test files were found
    Known(bool),
}

impl TestPresence {
    /// `None` for `Unknown`, `Some` for `Known`.
    pub fn as_option(self) -> Option<bool> {
        match self {
            TestPresence::Unknown => None,
            TestPresence::Known(value) => Some(value),
        }
    }
}

impl Serialize for TestPresence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TestPresence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            None => TestPresence::Unknown,
            Some(value) => TestPresence::Known(value),
        })
    }
}

/// One open pull request as returned by a per-repository listing.
///
/// The aggregator attaches the owning [`RepositoryRef`] to build a
/// [`PullRequestSummary`]; the client deliberately has no say in that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestItem {
    /// Globally unique pull request id
    pub id: u64,

    /// Pull request number within its repository
    pub number: u64,

    pub title: String,

    pub html_url: String,

    /// Author's GitHub username
    pub author: String,
}

/// An open pull request in the aggregate listing served to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(rename = "author_login")]
    pub author: String,
    /// The repository this pull request was discovered in
    pub repository: RepositoryRef,
    /// Deferred test-file flag; `Unknown` until file inspection runs
    pub has_tests: TestPresence,
}

/// Full metadata for a single pull request, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    pub number: u64,
    pub html_url: String,
    pub title: String,
    pub body: Option<String>,
    #[serde(rename = "author_login")]
    pub author: String,
    /// HEAD commit SHA; file contents are resolved at this revision
    pub head_sha: String,
}

/// One entry of a pull request's changed-file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    /// Change status as reported upstream ("added", "modified", "removed", ...)
    pub status: String,
}

impl PullRequestFile {
    /// Removed files carry no content and are excluded from review.
    pub fn is_removed(&self) -> bool {
        self.status == "removed"
    }
}

/// A changed file with its decoded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// UTF-8 text decoded from the upstream base64 payload
    pub content: String,
}

/// Result of creating an issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedComment {
    pub html_url: String,
}
