use maplit::btreemap;
use nodegroup_model::constants::{TAG_CLUSTER_NAME, TAG_NODEGROUP_NAME, TAG_NODEGROUP_TYPE};
use nodegroup_model::{ClusterConfig, ManagedNodeGroup};
use serde::Serialize;
use std::collections::BTreeMap;

/// An auto scaling group tag that is copied onto every instance the group launches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropagatedTag {
    pub key: String,
    pub value: String,
    pub propagate_at_launch: String,
}

impl PropagatedTag {
    pub fn new<S1, S2>(key: S1, value: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
            propagate_at_launch: "true".to_string(),
        }
    }
}

/// Tags of a self-managed node group: the node name and cluster ownership, plus the discovery
/// tags of the cluster autoscaler when its add-on policy is enabled.
pub fn auto_scaling_group_tags(
    cluster_name: &str,
    nodegroup_name: &str,
    auto_scaler: bool,
) -> Vec<PropagatedTag> {
    let mut tags = vec![
        PropagatedTag::new("Name", format!("{}-{}-Node", cluster_name, nodegroup_name)),
        PropagatedTag::new(format!("kubernetes.io/cluster/{}", cluster_name), "owned"),
    ];
    if auto_scaler {
        tags.push(PropagatedTag::new("k8s.io/cluster-autoscaler/enabled", "true"));
        tags.push(PropagatedTag::new(
            format!("k8s.io/cluster-autoscaler/{}", cluster_name),
            "owned",
        ));
    }
    tags
}

/// Tags of a managed node group. Node group tags override the cluster's shared tags and the
/// identity tags override both.
pub fn managed_nodegroup_tags(
    cluster: &ClusterConfig,
    node_group: &ManagedNodeGroup,
) -> BTreeMap<String, String> {
    let mut tags = cluster.metadata.tags.clone();
    tags.extend(node_group.base.tags.clone());
    tags.extend(btreemap! {
        TAG_CLUSTER_NAME.to_string() => cluster.name().to_string(),
        TAG_NODEGROUP_NAME.to_string() => node_group.name().to_string(),
        TAG_NODEGROUP_TYPE.to_string() => "managed".to_string(),
    });
    tags
}
