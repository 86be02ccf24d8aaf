//! Parsed `terraform output -json`.
//!
//! Terraform prints every output as
//! `{"<name>": {"sensitive": bool, "type": <type>, "value": <value>}}`.
//! [`OutputSet`] keeps the raw JSON values and converts on access, so one
//! read serves string, list and map lookups alike.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::CoreError;

/// One declared output.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputValue {
    /// Whether the output is marked sensitive
    #[serde(default)]
    pub sensitive: bool,
    /// Terraform type expression, e.g. `"string"` or `["list", "string"]`
    #[serde(rename = "type", default)]
    pub output_type: Value,
    /// The value itself
    pub value: Value,
}

/// All outputs of a provisioned stack, read once after apply.
#[derive(Debug, Clone, Default)]
pub struct OutputSet {
    outputs: BTreeMap<String, OutputValue>,
}

impl OutputSet {
    /// Parse the stdout of `terraform output -json`.
    ///
    /// An empty document (no outputs declared) parses as an empty set.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let outputs = serde_json::from_str(json)?;
        Ok(Self { outputs })
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// True if the module declares no outputs.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Output names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    /// Raw output entry.
    pub fn get(&self, name: &str) -> Result<&OutputValue, CoreError> {
        self.outputs
            .get(name)
            .ok_or_else(|| CoreError::OutputNotFound(name.to_string()))
    }

    /// Read a scalar output as a string.
    ///
    /// Numbers and bools are rendered the way terraform prints them.
    pub fn string(&self, name: &str) -> Result<String, CoreError> {
        scalar_to_string(&self.get(name)?.value).ok_or_else(|| CoreError::OutputType {
            name: name.to_string(),
            expected: "string",
        })
    }

    /// Read a list (or tuple) output as strings.
    pub fn list(&self, name: &str) -> Result<Vec<String>, CoreError> {
        let type_err = || CoreError::OutputType {
            name: name.to_string(),
            expected: "list",
        };

        self.get(name)?
            .value
            .as_array()
            .ok_or_else(type_err)?
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(type_err))
            .collect()
    }

    /// Read a map (or object) output as string pairs.
    ///
    /// Only the outer value must be an object. Scalar entries render as in
    /// [`OutputSet::string`], `null` as an empty string, and nested lists or
    /// objects as compact JSON.
    pub fn map(&self, name: &str) -> Result<BTreeMap<String, String>, CoreError> {
        let entries = self.get(name)?.value.as_object().ok_or_else(|| CoreError::OutputType {
            name: name.to_string(),
            expected: "map",
        })?;

        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), render_entry(v)))
            .collect())
    }
}

fn render_entry(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_to_string(scalar).unwrap_or_default(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Typed snapshot of the outputs the k3s cluster module declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOutputs {
    /// Cluster name as applied.
    pub cluster_name: String,
    /// Public IP of the k3s server node.
    pub master_node_ip: String,
    /// DNS name of the ingress load balancer.
    pub load_balancer_dns: String,
    /// VPC identifier.
    pub vpc_id: String,
    /// Private subnet identifiers.
    pub private_subnet_ids: Vec<String>,
    /// Public subnet identifiers.
    pub public_subnet_ids: Vec<String>,
    /// Summary map (name, region, instance_type, ...).
    pub cluster_info: BTreeMap<String, String>,
}

impl TryFrom<&OutputSet> for ClusterOutputs {
    type Error = CoreError;

    fn try_from(outputs: &OutputSet) -> Result<Self, Self::Error> {
        Ok(Self {
            cluster_name: outputs.string("cluster_name")?,
            master_node_ip: outputs.string("master_node_ip")?,
            load_balancer_dns: outputs.string("load_balancer_dns")?,
            vpc_id: outputs.string("vpc_id")?,
            private_subnet_ids: outputs.list("private_subnet_ids")?,
            public_subnet_ids: outputs.list("public_subnet_ids")?,
            cluster_info: outputs.map("cluster_info")?,
        })
    }
}
