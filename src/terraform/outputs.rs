use std::collections::BTreeMap;

use serde::Deserialize;

/// One entry of `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputValue {
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, rename = "type")]
    pub type_: serde_json::Value,
    #[serde(default)]
    pub value: serde_json::Value,
}

pub fn parse_outputs(json: &str) -> Result<BTreeMap<String, OutputValue>, serde_json::Error> {
    serde_json::from_str(json)
}
