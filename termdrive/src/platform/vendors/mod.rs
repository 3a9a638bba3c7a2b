//! Built-in vendor platforms.

pub mod broadcom_icos;
pub mod hp_comware;
pub mod juniper;

use super::PlatformDefinition;

/// All built-in platforms, in registration order.
pub fn builtin() -> Vec<PlatformDefinition> {
    vec![
        juniper::platform(),
        juniper::telnet_platform(),
        hp_comware::platform(),
        hp_comware::telnet_platform(),
        broadcom_icos::platform(),
    ]
}
