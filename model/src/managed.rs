use crate::nodegroup::NodeGroupBase;
use crate::Configuration;
use serde::{Deserialize, Serialize};

/// A node group whose scaling resource is owned by the cluster provider.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedNodeGroup {
    #[serde(flatten)]
    pub base: NodeGroupBase,

    /// A launch template created outside of this node group. When present, its data is fetched
    /// and validated instead of synthesizing a launch template.
    pub launch_template: Option<LaunchTemplateRef>,
}

impl Configuration for ManagedNodeGroup {}

impl ManagedNodeGroup {
    pub fn name(&self) -> &str {
        &self.base.name
    }
}

/// Identifies an existing launch template.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTemplateRef {
    pub id: String,
    /// The launch template version. The default version is used when absent.
    pub version: Option<String>,
}
