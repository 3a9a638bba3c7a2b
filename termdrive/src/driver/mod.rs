//! Session layer: priming, mode transitions, commands and commits.
//!
//! [`Session`] is generic over the [`Channel`](crate::channel::Channel) it
//! talks through and is driven entirely by its
//! [`PlatformDefinition`](crate::platform::PlatformDefinition), so one state
//! machine serves every dialect.

mod builder;
mod commit;
mod config_set;
mod mode;
mod primer;
mod prompt;
pub(crate) mod response;
pub mod sanitize;
mod session;
mod shared;

#[cfg(test)]
pub(crate) mod sim;

pub use builder::SessionBuilder;
pub use commit::{
    CHECK_MARKER, COMMIT_MARKER, CONFIRMED_MARKER, CommitOptions, CommitRequest, CommitResult,
    CommitVariant,
};
pub use prompt::base_prompt_from_line;
pub use response::Response;
pub use session::{Mode, Session, SessionOptions};
pub use shared::SharedSession;
