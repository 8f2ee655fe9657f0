use thiserror::Error;

use crate::address::Address;

pub type Result<T> = std::result::Result<T, WaypointError>;

#[derive(Error, Debug)]
pub enum WaypointError {
    /// `next`, `initial_step` or a start override names a step the graph
    /// does not contain. `scope` is the address of the container whose child
    /// graph was searched; it is `None` for the root graph.
    #[error("step `{name}` is not defined in {}", scope_label(.scope))]
    MissingStep {
        name: String,
        scope: Option<Address>,
    },
    /// An `is_done` / `should_skip` predicate failed. Passed through as-is.
    #[error(transparent)]
    Predicate(#[from] anyhow::Error),
    #[error("predicate `{0}` is not registered")]
    UnknownPredicate(String),
    #[error("invalid graph manifest: {0}")]
    Manifest(#[from] toml::de::Error),
}

impl WaypointError {
    pub fn missing_step(name: impl Into<String>, scope: Option<&Address>) -> Self {
        WaypointError::MissingStep {
            name: name.into(),
            scope: scope.cloned(),
        }
    }
}

fn scope_label(scope: &Option<Address>) -> String {
    match scope {
        Some(address) => format!("child graph of `{address}`"),
        None => "root graph".to_string(),
    }
}
