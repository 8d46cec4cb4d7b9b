use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque routable identifier for an actor or one of its channels.
///
/// Addresses are never synthesized by this library; they are only ever the
/// output of a descriptor query or a resolver step. The newtype exists so a
/// bare string cannot be passed where a discovered address is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Address(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address(value.to_string())
    }
}

impl FromStr for Address {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(s.to_string()))
    }
}

/// Namespaced identifier of an installable unit of actor behavior.
///
/// Presence on an actor is boolean; there is no version tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(String);

impl CapabilityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CapabilityId {
    fn from(value: String) -> Self {
        CapabilityId(value)
    }
}

impl From<&str> for CapabilityId {
    fn from(value: &str) -> Self {
        CapabilityId(value.to_string())
    }
}

impl FromStr for CapabilityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CapabilityId(s.to_string()))
    }
}
