//! Platform definitions for multi-vendor support.
//!
//! A platform bundles everything dialect-specific: prompt shapes, the config
//! mode transitions ([`ModeSpec`]), the priming recipe ([`PrimingSpec`]) and
//! the trailing annotations stripped from output.

mod definition;
mod mode_spec;
mod priming;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use mode_spec::{ModeSpec, PrivilegeTier};
pub use priming::{PrimingSpec, SetupCommand, ShellEscape};
pub use registry::PlatformRegistry;
