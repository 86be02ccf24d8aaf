//! Predicates over terraform output values.
//!
//! These are pure functions; the assertion helpers in `infra-harness` wrap
//! them into pass/fail results with failure details.

use std::net::Ipv4Addr;

/// Domain suffix every AWS-managed DNS name carries.
pub const AWS_DOMAIN: &str = ".amazonaws.com";

/// Prefix of AWS VPC identifiers.
pub const VPC_ID_PREFIX: &str = "vpc-";

/// Prefix of AWS subnet identifiers.
pub const SUBNET_ID_PREFIX: &str = "subnet-";

/// Check that `ip` looks like a dotted quad: exactly four segments of 1-3
/// ASCII digits.
///
/// Octet range is not checked, so `999.999.999.999` passes. Use
/// [`is_valid_ipv4`] when the value must be a real address.
pub fn is_ipv4_shape(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    parts
        .iter()
        .all(|part| (1..=3).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Check that `ip` is a dotted quad whose octets are all in 0-255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    is_ipv4_shape(ip) && ip.parse::<Ipv4Addr>().is_ok()
}

/// Check that a DNS name is served from an AWS domain.
pub fn has_aws_domain(dns: &str) -> bool {
    dns.contains(AWS_DOMAIN)
}

/// Check that an identifier follows the `vpc-` convention.
pub fn is_vpc_id(id: &str) -> bool {
    id.starts_with(VPC_ID_PREFIX)
}

/// Check that an identifier follows the `subnet-` convention.
pub fn is_subnet_id(id: &str) -> bool {
    id.starts_with(SUBNET_ID_PREFIX)
}
