/*!

This library provides the declarative description of a cluster and of the node groups that
`nodegroup-builder` turns into resource graphs.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use cluster::{ClusterConfig, ClusterMeta, ClusterSubnets, ClusterVpc, SubnetSpec};
pub use configuration::Configuration;
pub use error::{Error, Result};
pub use managed::{LaunchTemplateRef, ManagedNodeGroup};
pub use nodegroup::{
    AddonPolicies, AmiFamily, InstancesDistribution, NodeGroup, NodeGroupBase, NodeGroupIam,
    NodeGroupSecurityGroups, NodeGroupSsh, VolumeType,
};

mod cluster;
mod configuration;
pub mod constants;
mod error;
mod managed;
mod nodegroup;

/// Implement `Display` using `serde_json` `to_string_pretty` for types that implement Serialize.
#[macro_export]
macro_rules! impl_display_as_json {
    ($i:ident) => {
        impl std::fmt::Display for $i {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = serde_json::to_string_pretty(self)
                    .unwrap_or_else(|e| format!("Serialization failed: {}", e));
                std::fmt::Display::fmt(&s, f)
            }
        }
    };
}

impl_display_as_json!(ClusterConfig);
impl_display_as_json!(NodeGroup);
impl_display_as_json!(ManagedNodeGroup);

#[cfg(test)]
mod test {
    use crate::{ClusterConfig, Configuration, ManagedNodeGroup, NodeGroup, VolumeType};
    use std::fs::read_to_string;
    use std::path::PathBuf;

    fn samples_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("samples")
    }

    fn read_sample(filename: &str) -> String {
        let p = samples_dir().join(filename);
        read_to_string(&p).unwrap_or_else(|_| panic!("unable to open '{}'", p.display()))
    }

    // These tests assert that the sample documents can be deserialized into the model structs.

    #[test]
    fn cluster_sample() {
        let cluster = ClusterConfig::from_yaml_str(&read_sample("cluster.yaml")).unwrap();
        assert_eq!(cluster.name(), "sample-cluster");
        assert_eq!(cluster.version(), "1.24");
        assert_eq!(cluster.subnet_pool(true).len(), 3);
        assert_eq!(
            cluster.subnet_pool(false).get("us-west-2b").unwrap().id,
            "subnet-0b000000000000002"
        );
    }

    #[test]
    fn nodegroup_sample() {
        let ng = NodeGroup::from_yaml_str(&read_sample("nodegroup.yaml")).unwrap();
        assert_eq!(ng.name(), "ng-mixed");
        assert!(ng.has_mixed_instances());
        assert_eq!(ng.base.min_size, Some(0));
        assert_eq!(ng.base.max_size, None);
        assert_eq!(ng.base.volume_type, Some(VolumeType::Io1));
        assert_eq!(ng.target_group_arns.len(), 1);
        assert!(ng.auto_scaler_enabled());
        assert!(!ng.security_groups.with_local());
    }

    #[test]
    fn managed_nodegroup_sample() {
        let ng =
            ManagedNodeGroup::from_yaml_str(&read_sample("managed-nodegroup.yaml")).unwrap();
        assert_eq!(ng.name(), "mng-1");
        assert_eq!(ng.launch_template.as_ref().unwrap().id, "lt-0123456789abcdef0");
        assert_eq!(ng.base.labels.get("role").unwrap(), "worker");
    }

    #[test]
    fn value_round_trip_keeps_unset_fields_unset() {
        let ng = NodeGroup::from_yaml_str(&read_sample("nodegroup.yaml")).unwrap();
        let value = ng.clone().into_value().unwrap();
        assert!(value.get("maxSize").unwrap().is_null());
        assert_eq!(NodeGroup::from_value(value).unwrap(), ng);
    }
}
