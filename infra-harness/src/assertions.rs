//! Assertion helpers for provisioned stacks.
//!
//! These are pure functions that check terraform outputs after apply. They
//! take values as input and return pass/fail with details, so a test can log
//! every check before failing on the first broken one.

use std::collections::BTreeMap;
use std::fmt;

use infra_core::validate::{has_aws_domain, is_subnet_id, is_valid_ipv4, is_vpc_id};
use infra_core::ClusterOutputs;

use crate::connectivity::ProbeResult;

/// Result of an assertion check.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Description of what was checked
    pub description: String,
    /// Details on failure
    pub failure_details: Option<String>,
}

impl AssertionResult {
    /// Create a passing result.
    pub fn pass(description: &str) -> Self {
        Self {
            passed: true,
            description: description.into(),
            failure_details: None,
        }
    }

    /// Create a failing result.
    pub fn fail(description: &str, details: &str) -> Self {
        Self {
            passed: false,
            description: description.into(),
            failure_details: Some(details.into()),
        }
    }
}

impl fmt::Display for AssertionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure_details {
            None => write!(f, "PASS {}", self.description),
            Some(details) => write!(f, "FAIL {}: {}", self.description, details),
        }
    }
}

/// What a freshly applied test cluster should report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedCluster {
    /// Cluster name passed in as a variable.
    pub name: String,
    /// Region the module deploys to.
    pub region: String,
    /// Instance type passed in as a variable.
    pub instance_type: String,
}

/// Collected results of several checks.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Every check, in the order it ran
    pub results: Vec<AssertionResult>,
}

impl Report {
    /// Add a result.
    pub fn push(&mut self, result: AssertionResult) {
        self.results.push(result);
    }

    /// True if every check passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Failed checks only.
    pub fn failures(&self) -> Vec<&AssertionResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{}", result)?;
        }
        write!(
            f,
            "{}/{} checks passed",
            self.results.len() - self.failures().len(),
            self.results.len()
        )
    }
}

/// Assert that an output equals an expected literal.
pub fn assert_equals(description: &str, expected: &str, actual: &str) -> AssertionResult {
    if expected == actual {
        AssertionResult::pass(description)
    } else {
        AssertionResult::fail(
            description,
            &format!("expected {:?}, got {:?}", expected, actual),
        )
    }
}

/// Assert that an output is not empty.
pub fn assert_not_empty(description: &str, value: &str) -> AssertionResult {
    if value.trim().is_empty() {
        AssertionResult::fail(description, "value is empty")
    } else {
        AssertionResult::pass(description)
    }
}

/// Assert that the master node IP is a real IPv4 address.
pub fn assert_master_ip(ip: &str) -> AssertionResult {
    let description = "master_node_ip is a valid IPv4 address";
    if ip.is_empty() {
        AssertionResult::fail(description, "master_node_ip is empty")
    } else if !is_valid_ipv4(ip) {
        AssertionResult::fail(description, &format!("{:?} is not a valid IPv4 address", ip))
    } else {
        AssertionResult::pass(description)
    }
}

/// Assert that the load balancer DNS name is an AWS name.
pub fn assert_load_balancer_dns(dns: &str) -> AssertionResult {
    let description = "load_balancer_dns is an AWS DNS name";
    if dns.is_empty() {
        AssertionResult::fail(description, "load_balancer_dns is empty")
    } else if !has_aws_domain(dns) {
        AssertionResult::fail(
            description,
            &format!("{:?} does not contain .amazonaws.com", dns),
        )
    } else {
        AssertionResult::pass(description)
    }
}

/// Assert that the VPC id follows the `vpc-` convention.
pub fn assert_vpc_id(id: &str) -> AssertionResult {
    let description = "vpc_id is a VPC identifier";
    if id.is_empty() {
        AssertionResult::fail(description, "vpc_id is empty")
    } else if !is_vpc_id(id) {
        AssertionResult::fail(description, &format!("{:?} does not start with vpc-", id))
    } else {
        AssertionResult::pass(description)
    }
}

/// Assert that a subnet list has at least one entry and every entry is a
/// subnet id.
pub fn assert_subnets(kind: &str, ids: &[String]) -> AssertionResult {
    let description = format!("{}_subnet_ids lists subnets", kind);
    if ids.is_empty() {
        return AssertionResult::fail(&description, "no subnets");
    }
    if let Some(bad) = ids.iter().find(|id| !is_subnet_id(id)) {
        return AssertionResult::fail(
            &description,
            &format!("{:?} does not start with subnet-", bad),
        );
    }
    AssertionResult::pass(&format!("{} ({} subnets)", description, ids.len()))
}

/// Assert that cluster_info carries the expected name, region and instance type.
pub fn assert_cluster_info(
    info: &BTreeMap<String, String>,
    expected: &ExpectedCluster,
) -> AssertionResult {
    let description = "cluster_info matches the applied variables";
    if info.is_empty() {
        return AssertionResult::fail(description, "cluster_info is empty");
    }

    let checks = [
        ("name", &expected.name),
        ("region", &expected.region),
        ("instance_type", &expected.instance_type),
    ];
    for (key, want) in checks {
        match info.get(key) {
            Some(got) if got == want => {}
            Some(got) => {
                return AssertionResult::fail(
                    description,
                    &format!("cluster_info[{:?}]: expected {:?}, got {:?}", key, want, got),
                )
            }
            None => {
                return AssertionResult::fail(
                    description,
                    &format!("cluster_info has no {:?} key", key),
                )
            }
        }
    }

    AssertionResult::pass(description)
}

/// Assert that a probed port accepted a connection.
pub fn assert_reachable(probe: &ProbeResult) -> AssertionResult {
    let description = format!("{} accepts TCP connections", probe.target);
    if probe.reachable {
        AssertionResult::pass(&description)
    } else {
        AssertionResult::fail(
            &description,
            &format!(
                "unreachable after {} attempts: {}",
                probe.attempts,
                probe.last_error.as_deref().unwrap_or("unknown error")
            ),
        )
    }
}

/// Run every output check for a test cluster.
pub fn verify_cluster_outputs(outputs: &ClusterOutputs, expected: &ExpectedCluster) -> Report {
    let mut report = Report::default();
    report.push(assert_equals(
        "cluster_name matches the applied variable",
        &expected.name,
        &outputs.cluster_name,
    ));
    report.push(assert_master_ip(&outputs.master_node_ip));
    report.push(assert_load_balancer_dns(&outputs.load_balancer_dns));
    report.push(assert_vpc_id(&outputs.vpc_id));
    report.push(assert_subnets("private", &outputs.private_subnet_ids));
    report.push(assert_subnets("public", &outputs.public_subnet_ids));
    report.push(assert_cluster_info(&outputs.cluster_info, expected));
    report
}
