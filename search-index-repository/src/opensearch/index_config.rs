//! OpenSearch index creation settings.

use serde_json::{json, Value};

use crate::config::IndexSettingsConfig;

/// Build the create-index body for the given settings.
///
/// Only the replica count is always sent; the shard count is left to the
/// cluster default unless configured. No mappings are sent, documents are
/// indexed with dynamic mapping.
///
/// # Arguments
///
/// * `config` - Replica and shard counts
pub fn index_settings(config: &IndexSettingsConfig) -> Value {
    let mut settings = serde_json::Map::new();
    settings.insert(
        "number_of_replicas".to_string(),
        json!(config.number_of_replicas),
    );
    if let Some(shards) = config.number_of_shards {
        settings.insert("number_of_shards".to_string(), json!(shards));
    }

    json!({ "settings": settings })
}

/// Build the alias update body adding `alias` to `index`.
pub fn add_alias_actions(index: &str, alias: &str) -> Value {
    json!({
        "actions": [
            { "add": { "index": index, "alias": alias } }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = index_settings(&IndexSettingsConfig::default());

        assert_eq!(settings["settings"]["number_of_replicas"], 2);
        assert!(settings["settings"].get("number_of_shards").is_none());
        assert!(settings.get("mappings").is_none());
    }

    #[test]
    fn test_settings_with_shards() {
        let settings = index_settings(&IndexSettingsConfig {
            number_of_replicas: 0,
            number_of_shards: Some(3),
        });

        assert_eq!(settings["settings"]["number_of_replicas"], 0);
        assert_eq!(settings["settings"]["number_of_shards"], 3);
    }

    #[test]
    fn test_add_alias_actions() {
        let body = add_alias_actions("metrics_v1", "metrics");

        assert_eq!(body["actions"][0]["add"]["index"], "metrics_v1");
        assert_eq!(body["actions"][0]["add"]["alias"], "metrics");
    }
}
