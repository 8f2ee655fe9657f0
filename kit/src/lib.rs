//! Waypoint facade crate.
//!
//! Re-exports the core and runtime crates with a single entry point.
//!
//! ```rust
//! use waypoint::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let graph = StepGraph::builder("account")
//!     .step(Step::new("account").next("plan"))
//!     .step(Step::new("plan").skip_when(predicate::constant(true)).next("done"))
//!     .step(Step::new("done"))
//!     .build();
//!
//! let bus = Bus::new();
//! let mut navigator = Navigator::start(&graph, &bus).await?;
//! navigator.next(&bus).await?;
//! assert_eq!(navigator.current(), "done");
//! # Ok(())
//! # }
//! ```

pub use waypoint_core as core;
pub use waypoint_runtime as runtime;

pub use waypoint_core::{Address, Bus, Predicate, Step, StepGraph, WaypointError, flatten};
pub use waypoint_runtime::{Movement, Navigator, resolve_first_step};

pub mod prelude {
    pub use waypoint_core::prelude::*;
    pub use waypoint_runtime::prelude::*;
}
