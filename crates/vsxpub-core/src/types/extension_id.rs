//! Extension identifiers (`namespace.name`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace reserved for editor built-in extensions
pub const BUILTIN_NAMESPACE: &str = "vscode";

/// A registry extension identifier split into its namespace and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId {
    namespace: String,
    name: String,
}

impl ExtensionId {
    /// Parse an id of the form `namespace.name`
    ///
    /// The split happens on the first `.`, so names may themselves contain dots.
    pub fn parse(id: &str) -> Result<Self> {
        let (namespace, name) = id
            .split_once('.')
            .ok_or_else(|| Error::invalid_extension_id(id))?;

        if namespace.is_empty() || name.is_empty() || namespace.contains(char::is_whitespace) {
            return Err(Error::invalid_extension_id(id));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Publisher namespace (first segment)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Extension name (everything after the first `.`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive comparison against a manifest's publisher and name
    pub fn matches(&self, publisher: &str, name: &str) -> bool {
        self.namespace.eq_ignore_ascii_case(publisher) && self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this id refers to an editor built-in
    pub fn is_builtin(&self) -> bool {
        self.namespace.eq_ignore_ascii_case(BUILTIN_NAMESPACE)
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for ExtensionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_dot() {
        let id = ExtensionId::parse("ms-python.python.debug").unwrap();
        assert_eq!(id.namespace(), "ms-python");
        assert_eq!(id.name(), "python.debug");
        assert_eq!(id.to_string(), "ms-python.python.debug");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert!(ExtensionId::parse("no-dot").is_err());
        assert!(ExtensionId::parse(".name").is_err());
        assert!(ExtensionId::parse("namespace.").is_err());
        assert!(ExtensionId::parse("bad space.name").is_err());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let id = ExtensionId::parse("Redhat.Java").unwrap();
        assert!(id.matches("redhat", "java"));
        assert!(id.matches("REDHAT", "JAVA"));
        assert!(!id.matches("redhat", "vscode-yaml"));
        assert!(!id.matches("microsoft", "java"));
    }

    #[test]
    fn test_builtin_namespace() {
        assert!(ExtensionId::parse("vscode.git").unwrap().is_builtin());
        assert!(!ExtensionId::parse("vscodevim.vim").unwrap().is_builtin());
    }
}
