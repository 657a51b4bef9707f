use serde::{Deserialize, Serialize};

use crate::error::BlameError;

/// User settings that affect blame queries, as stored by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlameConfig {
    /// Follow the file across renames when walking history or blaming old commits.
    #[serde(rename = "blame_follow_rename")]
    pub follow_renames: bool,
}

impl Default for BlameConfig {
    fn default() -> Self {
        BlameConfig {
            follow_renames: true,
        }
    }
}

impl BlameConfig {
    /// Decode from the host's settings JSON. Unknown keys are ignored and
    /// missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, BlameError> {
        if json.trim().is_empty() {
            return Ok(BlameConfig::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(BlameConfig::default().follow_renames);
        assert_eq!(BlameConfig::from_json("").unwrap(), BlameConfig::default());
        assert_eq!(BlameConfig::from_json("{}").unwrap(), BlameConfig::default());
    }

    #[test]
    fn test_follow_rename_setting() {
        let config =
            BlameConfig::from_json(r#"{"blame_follow_rename": false, "other": 1}"#).unwrap();
        assert!(!config.follow_renames);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BlameConfig::from_json(r#"{"blame_follow_rename": "yes"}"#),
            Err(BlameError::InvalidConfig(_))
        ));
    }
}
