//! Module-level metadata stored in custom document properties

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PREFIX: &str = "module.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

impl ModuleMetadata {
    pub fn is_empty(&self) -> bool {
        *self == ModuleMetadata::default()
    }

    /// Property entries (`module.title`, ...). Lists are comma-separated.
    pub fn to_properties(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                out.push((format!("{PREFIX}{key}"), value));
            }
        };
        put("title", self.title.clone());
        put("summary", self.summary.clone());
        put("uid", self.uid.clone());
        put("level", self.level.clone());
        put("roles", Some(self.roles.join(",")));
        put("products", Some(self.products.join(",")));
        put("abstract", self.abstract_text.clone());
        out
    }

    pub fn from_properties(properties: &BTreeMap<String, String>) -> ModuleMetadata {
        let get = |key: &str| properties.get(&format!("{PREFIX}{key}")).cloned();
        let list = |key: &str| {
            get(key)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };
        ModuleMetadata {
            title: get("title"),
            summary: get("summary"),
            uid: get("uid"),
            level: get("level"),
            roles: list("roles"),
            products: list("products"),
            abstract_text: get("abstract"),
        }
    }
}
