//! Core types for API design definitions.

use std::fmt;

use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};

/// Suffix appended to synthesized payload type names.
pub const PAYLOAD_SUFFIX: &str = "Payload";

/// Action name used to compute the path of child resources by default.
pub const DEFAULT_CANONICAL_ACTION: &str = "show";

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    Patch,
    Options,
}

impl Verb {
    /// Returns the method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Trace => "TRACE",
            Verb::Connect => "CONNECT",
            Verb::Patch => "PATCH",
            Verb::Options => "OPTIONS",
        }
    }

    /// Parse a method name, case-insensitively.
    ///
    /// Returns `None` for unknown methods.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Verb::Get),
            "HEAD" => Some(Verb::Head),
            "POST" => Some(Verb::Post),
            "PUT" => Some(Verb::Put),
            "DELETE" => Some(Verb::Delete),
            "TRACE" => Some(Verb::Trace),
            "CONNECT" => Some(Verb::Connect),
            "PATCH" => Some(Verb::Patch),
            "OPTIONS" => Some(Verb::Options),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Kind of definition that can sit on the evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Resource,
    Action,
    Response,
    Attribute,
}

impl DefinitionKind {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DefinitionKind::Resource => "resource",
            DefinitionKind::Action => "action",
            DefinitionKind::Response => "response",
            DefinitionKind::Attribute => "attribute",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the payload type synthesized for an action.
///
/// Both names are converted to upper camel case, so `("update", "account")`
/// and `("Update", "Account")` both yield `UpdateAccountPayload`.
pub fn payload_type_name(action: &str, resource: &str) -> String {
    format!(
        "{}{}{}",
        action.to_upper_camel_case(),
        resource.to_upper_camel_case(),
        PAYLOAD_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_round_trips_through_name() {
        for verb in [Verb::Get, Verb::Put, Verb::Options, Verb::Connect] {
            assert_eq!(Verb::parse(verb.as_str()), Some(verb));
        }
        assert_eq!(Verb::parse("patch"), Some(Verb::Patch));
        assert_eq!(Verb::parse("FETCH"), None);
    }

    #[test]
    fn payload_name_is_camelized() {
        assert_eq!(payload_type_name("Update", "Account"), "UpdateAccountPayload");
        assert_eq!(payload_type_name("update", "account"), "UpdateAccountPayload");
        assert_eq!(
            payload_type_name("rate_bottle", "wine cellar"),
            "RateBottleWineCellarPayload"
        );
    }

    #[test]
    fn payload_name_is_stable() {
        let first = payload_type_name("create", "bottle");
        let second = payload_type_name("create", "bottle");
        assert_eq!(first, second);
    }
}
