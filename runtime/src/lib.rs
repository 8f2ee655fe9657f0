//! Waypoint Runtime - Resolving and Navigating Steppers
//!
//! * [`resolve_first_step`] picks the address a flow opens on.
//! * [`Navigator`] moves through the flattened sequence, re-asking
//!   `should_skip` on every move.

pub mod navigator;
pub mod resolver;
pub mod telemetry;

pub mod prelude {
    pub use crate::navigator::{Movement, Navigator};
    pub use crate::resolver::{resolve_first_step, resolve_first_step_from};
}

pub use navigator::{Movement, Navigator};
pub use resolver::{resolve_first_step, resolve_first_step_from};
