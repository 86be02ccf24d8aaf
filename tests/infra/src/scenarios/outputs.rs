//! Provision a cluster and check every declared output.
//!
//! Run: `cargo test -p infra-tests outputs -- --ignored`

#[cfg(test)]
mod tests {
    use crate::{suite_config, test_cluster};
    use infra_harness::assertions::verify_cluster_outputs;
    use infra_harness::{logging, with_stack};

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn k3s_outputs_match_applied_variables() {
        logging::init_for_tests();
        let config = suite_config().expect("load suite config");
        let cluster = test_cluster(&config, "k3s-output-test").expect("prepare cluster stack");
        let expected = cluster.expected.clone();

        with_stack(cluster.stack, |stack| async move {
            let outputs = stack.cluster_outputs().await.expect("read cluster outputs");

            let report = verify_cluster_outputs(&outputs, &expected);
            tracing::info!("\n{}", report);
            assert!(report.passed(), "output checks failed:\n{}", report);

            assert_eq!(outputs.cluster_info.get("name"), Some(&expected.name));
            assert!(!outputs.private_subnet_ids.is_empty());
            assert!(!outputs.public_subnet_ids.is_empty());
        })
        .await
        .expect("provision or teardown failed");
    }
}
