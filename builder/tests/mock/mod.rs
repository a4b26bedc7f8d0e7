/*!

This test module provides mock implementations of the collaborators a synthesis depends on so that
node groups can be synthesized without any cloud account.

The [`MockRoles`] provisioner registers a role and an instance profile the way a real provisioner
would, [`MockLaunchTemplates`] serves launch templates from memory, and [`MockOcean`] stands in for
an alternate scaling provider.

Each test crate uses a different subset of these helpers.

!*/

#![allow(dead_code, unused_imports)]

pub(crate) mod launch_templates;
pub(crate) mod roles;

pub(crate) use launch_templates::MockLaunchTemplates;
pub(crate) use roles::{FailingRoles, MockRoles};

use nodegroup_builder::{
    AlternateScaling, AlternateScalingProvider, BootstrapProvider, BoxError, NodeGroupRef,
    Providers, Resource,
};
use nodegroup_model::{ClusterConfig, Configuration, ManagedNodeGroup, NodeGroup};
use serde_json::json;
use std::fs::read_to_string;
use std::path::PathBuf;

/// The name of the cluster stack used by the tests.
pub(crate) const CLUSTER_STACK: &str = "eksctl-sample-cluster-cluster";

/// Returns a fixed user data blob naming the cluster and node group it was requested for.
pub(crate) struct MockBootstrap {}

impl BootstrapProvider for MockBootstrap {
    fn user_data(
        &self,
        cluster: &ClusterConfig,
        node_group: NodeGroupRef<'_>,
    ) -> Result<String, BoxError> {
        Ok(format!(
            "bootstrap {} {}",
            cluster.name(),
            node_group.base().name
        ))
    }
}

/// Always fails, to check that bootstrap errors abort the synthesis.
pub(crate) struct FailingBootstrap {}

impl BootstrapProvider for FailingBootstrap {
    fn user_data(
        &self,
        _cluster: &ClusterConfig,
        _node_group: NodeGroupRef<'_>,
    ) -> Result<String, BoxError> {
        Err("no bootstrap data for this AMI family".into())
    }
}

/// Pretends to build a Spot Ocean virtual node group.
pub(crate) struct MockOcean {}

impl AlternateScalingProvider for MockOcean {
    fn scaling_resource(
        &self,
        cluster: &ClusterConfig,
        node_group: &NodeGroup,
        request: AlternateScaling<'_>,
    ) -> Result<Resource, BoxError> {
        Ok(Resource::new(
            "Custom::Ocean",
            json!({
                "ClusterName": cluster.name(),
                "Name": node_group.name(),
                "ImageId": request.launch_template_data.image_id,
                "SubnetIds": request.vpc_zone_identifier,
                "Tags": request.tags,
            }),
        ))
    }
}

/// Providers backed by the well-behaved mocks.
pub(crate) fn providers(launch_templates: MockLaunchTemplates) -> Providers {
    Providers::new(
        Box::new(MockRoles {}),
        Box::new(MockBootstrap {}),
        Box::new(launch_templates),
    )
}

fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("samples")
}

fn read_sample(filename: &str) -> String {
    let p = samples_dir().join(filename);
    read_to_string(&p).unwrap_or_else(|_| panic!("unable to open '{}'", p.display()))
}

pub(crate) fn sample_cluster() -> ClusterConfig {
    ClusterConfig::from_yaml_str(&read_sample("cluster.yaml")).unwrap()
}

pub(crate) fn sample_nodegroup() -> NodeGroup {
    NodeGroup::from_yaml_str(&read_sample("nodegroup.yaml")).unwrap()
}

pub(crate) fn sample_managed_nodegroup() -> ManagedNodeGroup {
    ManagedNodeGroup::from_yaml_str(&read_sample("managed-nodegroup.yaml")).unwrap()
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
