//! Terraform variable sets.
//!
//! A [`VarSet`] renders to `-var name=value` arguments. Scalars are passed
//! verbatim; lists and maps are rendered in HCL syntax so terraform parses
//! them as collections rather than strings.

use std::collections::BTreeMap;
use std::fmt;

/// Environment variables applied to every terraform invocation.
pub type EnvVars = BTreeMap<String, String>;

/// Env var terraform reads the `ssh_public_key` variable from.
pub const SSH_PUBLIC_KEY_TF_VAR: &str = "TF_VAR_ssh_public_key";

/// A single terraform variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
    /// List value, rendered as `["a", "b"]`
    List(Vec<VarValue>),
    /// Map value, rendered as `{k = "v"}`
    Map(BTreeMap<String, VarValue>),
}

impl VarValue {
    /// Render as an HCL expression (strings quoted).
    pub fn to_hcl(&self) -> String {
        match self {
            VarValue::String(s) => format!("\"{}\"", escape_hcl(s)),
            VarValue::Int(n) => n.to_string(),
            VarValue::Bool(b) => b.to_string(),
            VarValue::List(items) => {
                let inner: Vec<String> = items.iter().map(VarValue::to_hcl).collect();
                format!("[{}]", inner.join(", "))
            }
            VarValue::Map(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v.to_hcl()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

/// Top-level rendering as used on the `-var` command line: strings raw,
/// collections in HCL.
impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_hcl()),
        }
    }
}

fn escape_hcl(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::String(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::String(s)
    }
}

impl From<i64> for VarValue {
    fn from(n: i64) -> Self {
        VarValue::Int(n)
    }
}

impl From<u32> for VarValue {
    fn from(n: u32) -> Self {
        VarValue::Int(n.into())
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

impl<T: Into<VarValue>> From<Vec<T>> for VarValue {
    fn from(items: Vec<T>) -> Self {
        VarValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered set of terraform variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarSet {
    vars: BTreeMap<String, VarValue>,
}

impl VarSet {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn set(mut self, name: &str, value: impl Into<VarValue>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Insert a variable in place.
    pub fn insert(&mut self, name: &str, value: impl Into<VarValue>) {
        self.vars.insert(name.to_string(), value.into());
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.vars.get(name)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VarValue)> {
        self.vars.iter()
    }

    /// Build the command-line arguments: `-var name=value` per variable.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.vars.len() * 2);
        for (name, value) in &self.vars {
            args.push("-var".into());
            args.push(format!("{}={}", name, value));
        }
        args
    }
}

/// The variables the k3s cluster module consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterVars {
    /// Name of the cluster (also tags every resource).
    pub cluster_name: String,
    /// Project tag.
    pub project_name: String,
    /// Environment tag.
    pub environment: String,
    /// EC2 instance type for master and workers.
    pub instance_type: String,
    /// Desired number of workers.
    pub worker_count: u32,
    /// Autoscaling group minimum.
    pub worker_min_count: u32,
    /// Autoscaling group maximum.
    pub worker_max_count: u32,
    /// Install the monitoring stack.
    pub enable_monitoring: bool,
    /// Install ArgoCD.
    pub enable_argocd: bool,
}

impl ClusterVars {
    /// Variables for a minimal single-worker test cluster.
    pub fn new(cluster_name: &str, project_name: &str) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            project_name: project_name.to_string(),
            environment: "test".into(),
            instance_type: "t3.micro".into(),
            worker_count: 1,
            worker_min_count: 1,
            worker_max_count: 2,
            enable_monitoring: false,
            enable_argocd: false,
        }
    }

    /// Set the environment tag.
    pub fn environment(mut self, environment: &str) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the instance type.
    pub fn instance_type(mut self, instance_type: &str) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    /// Set worker count and autoscaling bounds.
    pub fn workers(mut self, count: u32, min: u32, max: u32) -> Self {
        self.worker_count = count;
        self.worker_min_count = min;
        self.worker_max_count = max;
        self
    }

    /// Toggle the monitoring stack.
    pub fn monitoring(mut self, enabled: bool) -> Self {
        self.enable_monitoring = enabled;
        self
    }

    /// Toggle ArgoCD.
    pub fn argocd(mut self, enabled: bool) -> Self {
        self.enable_argocd = enabled;
        self
    }
}

impl From<&ClusterVars> for VarSet {
    fn from(c: &ClusterVars) -> Self {
        VarSet::new()
            .set("cluster_name", c.cluster_name.as_str())
            .set("project_name", c.project_name.as_str())
            .set("environment", c.environment.as_str())
            .set("instance_type", c.instance_type.as_str())
            .set("worker_count", c.worker_count)
            .set("worker_min_count", c.worker_min_count)
            .set("worker_max_count", c.worker_max_count)
            .set("enable_monitoring", c.enable_monitoring)
            .set("enable_argocd", c.enable_argocd)
    }
}
