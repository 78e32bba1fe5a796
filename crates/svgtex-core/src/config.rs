use crate::ExtractOptions;
use crate::error::{Error, Result};
use crate::transform::TransformPolicy;
use serde_json::{Map, Value, json};

/// User settings as a JSON object, addressed by dotted paths (`latex.escapeText`).
///
/// Unknown keys are kept so that layered config files can carry settings for other tools.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgTexConfig(Value);

impl Default for SvgTexConfig {
    fn default() -> Self {
        Self(json!({
            "transforms": { "strict": false },
            "extract": { "includeDefs": false },
            "latex": { "escapeText": false },
        }))
    }
}

impl SvgTexConfig {
    /// Defaults overlaid with the JSON object in `text`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|err| Error::Config {
            message: err.to_string(),
        })?;
        if !value.is_object() {
            return Err(Error::Config {
                message: "expected a JSON object at the top level".to_string(),
            });
        }
        let mut config = Self::default();
        config.deep_merge(&value);
        Ok(config)
    }

    fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    /// Sets `dotted_path`, replacing any non-object value found on the way with an object.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let (parents, key) = match dotted_path.rsplit_once('.') {
            Some((parents, key)) => (parents.split('.').collect(), key),
            None => (Vec::new(), dotted_path),
        };
        // Always an object: built from defaults or a checked JSON object.
        let Some(mut table) = self.0.as_object_mut() else {
            return;
        };
        for segment in parents {
            let slot = table
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(child) = slot.as_object_mut() else {
                return;
            };
            table = child;
        }
        table.insert(key.to_string(), value);
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn extract_options(&self) -> ExtractOptions {
        let transform_policy = if self.get_bool("transforms.strict").unwrap_or(false) {
            TransformPolicy::Strict
        } else {
            TransformPolicy::Lenient
        };
        ExtractOptions {
            transform_policy,
            include_defs: self.get_bool("extract.includeDefs").unwrap_or(false),
        }
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let config = SvgTexConfig::default();
        assert_eq!(config.get_bool("latex.escapeText"), Some(false));
        assert_eq!(config.get_str("latex.background"), None);
        assert_eq!(config.extract_options(), ExtractOptions::lenient());
    }

    #[test]
    fn json_overlays_defaults() {
        let config = SvgTexConfig::from_json_str(
            r#"{ "transforms": { "strict": true }, "latex": { "background": "drawing.pdf" } }"#,
        )
        .expect("config");
        assert_eq!(config.get_bool("latex.escapeText"), Some(false));
        assert_eq!(config.get_str("latex.background"), Some("drawing.pdf"));
        assert_eq!(
            config.extract_options().transform_policy,
            TransformPolicy::Strict
        );
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            SvgTexConfig::from_json_str("[1, 2]"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            SvgTexConfig::from_json_str("{ nope"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut config = SvgTexConfig::default();
        config.set_value("extract.includeDefs", Value::Bool(true));
        assert!(config.extract_options().include_defs);
        config.set_value("latex.background", Value::from("figure.pdf"));
        assert_eq!(config.get_str("latex.background"), Some("figure.pdf"));
        assert_eq!(config.get_bool("latex.escapeText"), Some(false));
        config.set_value("extract.includeDefs.nested", Value::Bool(true));
        assert_eq!(config.get_bool("extract.includeDefs.nested"), Some(true));
    }
}
