//! # termdrive
//!
//! Async session automation for network device CLIs.
//!
//! termdrive drives an interactive shell on a switch or router the way an
//! operator would: it gets past login banners, learns the prompt, moves
//! between operational and configuration mode, commits candidate
//! configurations, and strips the vendor annotations that clutter output.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - Juniper JUNOS, HP Comware and Broadcom ICOS out of the box
//! - Vendor behaviour as data ([`PlatformDefinition`]), one generic session
//! - JUNOS-style `commit`, `commit check` and `commit confirmed`
//! - Tail-searched pattern buffer with terminal escape stripping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use termdrive::{CommitOptions, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), termdrive::Error> {
//!     let mut session = SessionBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .platform("juniper_junos")
//!         .connect()
//!         .await?;
//!
//!     session.enter_config(None, None).await?;
//!     session.send_command("set system host-name edge-1", None).await?;
//!     session.commit(CommitOptions::new().and_quit()).await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod platform;
pub mod transport;

pub use channel::{Channel, Clock, TokioClock};
pub use driver::{
    CommitOptions, CommitResult, CommitVariant, Mode, Response, Session, SessionBuilder,
    SessionOptions, SharedSession,
};
pub use error::{Error, Result};
pub use platform::{ModeSpec, PlatformDefinition, PlatformRegistry, PrimingSpec, PrivilegeTier};
pub use transport::{AuthMethod, SshChannel, SshConfig};
