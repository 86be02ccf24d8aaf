//! Provision a cluster, check its headline outputs, and probe the master node.
//!
//! Run: `cargo test -p infra-tests cluster -- --ignored`

#[cfg(test)]
mod tests {
    use crate::{suite_config, test_cluster};
    use infra_harness::assertions::{
        assert_equals, assert_not_empty, assert_reachable, AssertionResult,
    };
    use infra_harness::connectivity::{probe_ports, ProbeConfig};
    use infra_harness::{logging, with_stack};

    fn check(result: AssertionResult) {
        tracing::info!("{}", result);
        assert!(result.passed, "{}", result);
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn k3s_cluster_provisions_and_accepts_connections() {
        logging::init_for_tests();
        let config = suite_config().expect("load suite config");
        let cluster = test_cluster(&config, "k3s-test").expect("prepare cluster stack");
        let expected_name = cluster.name.clone();
        let connectivity = config.connectivity.clone();

        with_stack(cluster.stack, |stack| async move {
            let outputs = stack.outputs().await.expect("read outputs");
            let name = outputs.string("cluster_name").expect("cluster_name output");
            let master_ip = outputs.string("master_node_ip").expect("master_node_ip output");
            let lb_dns = outputs
                .string("load_balancer_dns")
                .expect("load_balancer_dns output");

            check(assert_equals("cluster_name", &expected_name, &name));
            check(assert_not_empty("master_node_ip", &master_ip));
            check(assert_not_empty("load_balancer_dns", &lb_dns));

            tracing::info!("probing master node {}", master_ip);
            let probes = probe_ports(
                &master_ip,
                &connectivity.ports,
                ProbeConfig::from(&connectivity),
            )
            .await;
            for probe in &probes {
                check(assert_reachable(probe));
            }
        })
        .await
        .expect("provision or teardown failed");
    }
}
