use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A concrete configuration tree claimed to satisfy a [`crate::Cfm`].
///
/// Stores `name` and `instance_index` as separate fields rather than the
/// `"<name>#<index>"` string form (§9 design notes): validation reads
/// them directly instead of re-splitting a string on every visit.
/// `value()`/`from_value` bridge to the string form at serialization
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationNode {
    pub name: String,
    pub instance_index: u32,
    pub children: Vec<ConfigurationNode>,
}

impl ConfigurationNode {
    pub fn new(
        name: impl Into<String>,
        instance_index: u32,
        children: Vec<ConfigurationNode>,
    ) -> Self {
        Self {
            name: name.into(),
            instance_index,
            children,
        }
    }

    pub fn leaf(name: impl Into<String>, instance_index: u32) -> Self {
        Self::new(name, instance_index, Vec::new())
    }

    /// Render the `"<name>#<index>"` form used by external formats.
    pub fn value(&self) -> String {
        format!("{}#{}", self.name, self.instance_index)
    }

    /// Parse a `"<name>#<index>"` value plus already-built children.
    pub fn from_value(value: &str, children: Vec<ConfigurationNode>) -> Result<Self> {
        let (name, index) = value
            .rsplit_once('#')
            .ok_or_else(|| Error::MalformedConfigurationValue(value.to_string()))?;
        let instance_index: u32 = index
            .parse()
            .map_err(|_| Error::MalformedConfigurationValue(value.to_string()))?;
        Ok(Self::new(name, instance_index, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_round_trips() {
        let node = ConfigurationNode::leaf("Sourdough", 0);
        assert_eq!(node.value(), "Sourdough#0");
        let parsed = ConfigurationNode::from_value("Sourdough#0", Vec::new()).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn malformed_value_is_rejected() {
        assert!(ConfigurationNode::from_value("NoHash", Vec::new()).is_err());
        assert!(ConfigurationNode::from_value("Name#notanumber", Vec::new()).is_err());
    }
}
