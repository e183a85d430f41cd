//! CLA Gate Forge: GitHub and CLA authority integration
//!
//! This crate is the boundary between the validation core and the outside
//! world. It owns:
//!
//! - the webhook payload shapes (`webhook`)
//! - commit, status and comment shapes (`model`)
//! - the `Forge` and `ClaAuthority` traits (`traits`)
//! - reqwest-backed implementations (`github`, `cla`)
//! - in-memory fakes for tests (`fakes`)

pub mod cla;
mod error;
pub mod fakes;
pub mod github;
pub mod model;
pub mod traits;
pub mod webhook;

pub use cla::HttpClaAuthority;
pub use error::{ClaError, ForgeError};
pub use github::{GitHubClient, GitHubConfig};
pub use model::{
    statuses_url_for, Comment, Commit, CommitState, GitIdentity, StatusRecord, StatusReport,
};
pub use traits::{ClaAuthority, ClaStatus, Forge};
pub use webhook::{PullRequestAction, PullRequestEvent, StatusEvent};

/// Result type for forge operations
pub type ForgeResult<T> = std::result::Result<T, ForgeError>;
