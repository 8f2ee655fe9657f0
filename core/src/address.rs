//! Address - Path of a Leaf Step
//!
//! An address joins step names from the root graph down to a leaf with
//! [`DELIMITER`], e.g. `"2/2.1/2.1.1"`. Addresses are the identifiers the
//! outside world stores and compares; everything else is derived from the
//! graph.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DELIMITER: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Address of a step in the root graph.
    pub fn root(name: impl Into<String>) -> Self {
        Address(name.into())
    }

    /// Address of `name` inside the child graph of the step at `self`.
    pub fn child(&self, name: &str) -> Self {
        Address(format!("{}{}{}", self.0, DELIMITER, name))
    }

    /// Prefix `self` with a container step name.
    pub fn nested_under(self, container: &str) -> Self {
        Address(format!("{}{}{}", container, DELIMITER, self.0))
    }

    /// Build an address from a scope (`None` at the root) and a step name.
    pub fn within(scope: Option<&Address>, name: &str) -> Self {
        match scope {
            Some(prefix) => prefix.child(name),
            None => Address::root(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(DELIMITER)
    }

    /// Number of graphs the address passes through (1 for a root step).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Name of the leaf step.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit_once(DELIMITER)
            .map(|(_, leaf)| leaf)
            .unwrap_or(&self.0)
    }

    /// Address of the enclosing container, `None` for a root step.
    pub fn parent(&self) -> Option<Address> {
        self.0
            .rsplit_once(DELIMITER)
            .map(|(parent, _)| Address(parent.to_string()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Address(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
