//! Full lifecycle against `fixtures/static-outputs`, a resource-free module
//! declaring the same variables and outputs as the cluster module.
//!
//! Run: `cargo test -p infra-tests fixture -- --ignored` (needs `terraform` on PATH)

#[cfg(test)]
mod tests {
    use crate::{fixture_config, fixtures_dir, test_cluster};
    use infra_harness::assertions::verify_cluster_outputs;
    use infra_harness::workdir::copy_module_to_temp;
    use infra_harness::{logging, with_stack, HarnessError};

    #[test]
    fn fixture_module_copies_to_private_workdir() {
        let copy = copy_module_to_temp(&fixtures_dir(), "static-outputs")
            .expect("copy fixture module");

        assert!(copy.module_dir().join("main.tf").exists());
        assert!(copy.module_dir().starts_with(copy.root()));
        assert!(!copy.module_dir().join("terraform.tfstate").exists());
    }

    #[test]
    fn fixture_clusters_get_distinct_workdirs() {
        let config = fixture_config().expect("fixture config");
        let a = test_cluster(&config, "k3s-fixture").expect("first cluster");
        let b = test_cluster(&config, "k3s-fixture").expect("second cluster");

        assert_ne!(a.name, b.name);
        assert_ne!(a.stack.terraform_dir(), b.stack.terraform_dir());
        assert!(a.name.starts_with("k3s-fixture-"));
    }

    #[tokio::test]
    #[ignore = "requires terraform binary"]
    async fn fixture_lifecycle_passes_output_checks() {
        logging::init_for_tests();
        let config = fixture_config().expect("fixture config");
        let cluster = test_cluster(&config, "k3s-fixture").expect("prepare fixture stack");
        let expected = cluster.expected.clone();

        let report = with_stack(cluster.stack, |stack| async move {
            let outputs = stack.cluster_outputs().await.expect("read cluster outputs");
            verify_cluster_outputs(&outputs, &expected)
        })
        .await
        .expect("fixture lifecycle");

        assert!(report.passed(), "{}", report);
        assert_eq!(report.results.len(), 7);
    }

    #[tokio::test]
    #[ignore = "requires terraform binary"]
    async fn fixture_outputs_read_by_shape() {
        logging::init_for_tests();
        let config = fixture_config().expect("fixture config");
        let cluster = test_cluster(&config, "k3s-fixture").expect("prepare fixture stack");
        let name = cluster.name.clone();

        with_stack(cluster.stack, |stack| async move {
            assert_eq!(stack.output("cluster_name").await.expect("scalar"), name);
            assert_eq!(
                stack.output_list("private_subnet_ids").await.expect("list").len(),
                2
            );

            let info = stack.output_map("cluster_info").await.expect("map");
            assert_eq!(info.get("workers").map(String::as_str), Some("1"));
            assert_eq!(info.get("project").map(String::as_str), Some("k3s-fixture"));

            let missing = stack.output("kubeconfig").await.unwrap_err();
            assert!(matches!(missing, HarnessError::Core(_)));
        })
        .await
        .expect("fixture lifecycle");
    }

    #[tokio::test]
    #[ignore = "requires terraform binary"]
    async fn fixture_teardown_runs_after_failed_assertion() {
        logging::init_for_tests();
        let config = fixture_config().expect("fixture config");
        let cluster = test_cluster(&config, "k3s-fixture").expect("prepare fixture stack");
        let observer = cluster.stack.clone();

        let handle = tokio::spawn(with_stack(cluster.stack, |_stack| async move {
            panic!("assertion failed inside the test body");
        }));
        let joined = handle.await;
        assert!(joined.unwrap_err().is_panic());

        // Destroy leaves the state file with no outputs behind.
        let outputs = observer.outputs().await.expect("read outputs after destroy");
        assert!(outputs.is_empty());
    }
}
