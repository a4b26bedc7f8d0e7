use crate::constants::{DEFAULT_INSTANCE_TYPE, DEFAULT_VOLUME_IOPS, DEFAULT_VOLUME_NAME};
use crate::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_plain::derive_display_from_serialize;
use std::collections::BTreeMap;

/// The image family node groups are built from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AmiFamily {
    AmazonLinux2,
    Ubuntu2004,
    Bottlerocket,
}

impl Default for AmiFamily {
    fn default() -> Self {
        Self::AmazonLinux2
    }
}

derive_display_from_serialize!(AmiFamily);
serde_plain::derive_fromstr_from_deserialize!(AmiFamily, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});

/// EBS volume types accepted for the root device of a node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeType {
    Gp2,
    Gp3,
    Io1,
    Sc1,
    St1,
}

impl Default for VolumeType {
    fn default() -> Self {
        Self::Gp3
    }
}

derive_display_from_serialize!(VolumeType);
serde_plain::derive_fromstr_from_deserialize!(VolumeType, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});

/// The fields shared by self-managed and managed node groups.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupBase {
    /// The name of the node group, unique within the cluster.
    pub name: String,

    #[serde(default)]
    pub ami_family: AmiFamily,

    /// The instance type of the nodes. `m5.large` is used when this is not provided.
    pub instance_type: Option<String>,

    /// The availability zones nodes are placed in. When empty, every subnet exported by the
    /// cluster stack is used.
    #[serde(default)]
    pub availability_zones: Vec<String>,

    /// Explicit subnet ids. These take precedence over `availability_zones`.
    #[serde(default)]
    pub subnets: Vec<String>,

    /// Place nodes in the private subnets of the cluster and do not associate public IPs.
    #[serde(default)]
    pub private_networking: bool,

    // Scaling bounds. Absent and zero are different things.
    pub desired_capacity: Option<i32>,
    pub min_size: Option<i32>,
    pub max_size: Option<i32>,

    // Root volume. No block device mapping is produced unless `volume_size` is positive.
    pub volume_size: Option<i32>,
    pub volume_type: Option<VolumeType>,
    pub volume_name: Option<String>,
    pub volume_encrypted: Option<bool>,
    #[serde(rename = "volumeKmsKeyID")]
    pub volume_kms_key_id: Option<String>,
    #[serde(rename = "volumeIOPS")]
    pub volume_iops: Option<i32>,

    pub ssh: Option<NodeGroupSsh>,

    #[serde(default)]
    pub iam: NodeGroupIam,

    /// A custom image id. When absent, an image matching the instance type is chosen.
    pub ami: Option<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl NodeGroupBase {
    pub fn instance_type(&self) -> &str {
        self.instance_type.as_deref().unwrap_or(DEFAULT_INSTANCE_TYPE)
    }

    pub fn volume_type(&self) -> VolumeType {
        self.volume_type.unwrap_or_default()
    }

    pub fn volume_name(&self) -> &str {
        self.volume_name.as_deref().unwrap_or(DEFAULT_VOLUME_NAME)
    }

    pub fn volume_iops(&self) -> i32 {
        self.volume_iops.unwrap_or(DEFAULT_VOLUME_IOPS)
    }

    pub fn ssh_allowed(&self) -> bool {
        self.ssh.as_ref().and_then(|ssh| ssh.allow).unwrap_or(false)
    }

    pub fn ssm_enabled(&self) -> bool {
        self.ssh
            .as_ref()
            .and_then(|ssh| ssh.enable_ssm)
            .unwrap_or(false)
    }

    /// The key pair name, if one was given and it is not empty.
    pub fn public_key_name(&self) -> Option<&str> {
        self.ssh
            .as_ref()
            .and_then(|ssh| ssh.public_key_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// The custom image id, if one was given and it is not empty.
    pub fn custom_ami(&self) -> Option<&str> {
        self.ami.as_deref().filter(|ami| !ami.is_empty())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSsh {
    pub allow: Option<bool>,
    pub public_key_name: Option<String>,
    #[serde(rename = "enableSsm")]
    pub enable_ssm: Option<bool>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupIam {
    #[serde(rename = "instanceProfileARN")]
    pub instance_profile_arn: Option<String>,
    #[serde(rename = "instanceRoleARN")]
    pub instance_role_arn: Option<String>,
    pub instance_role_name: Option<String>,
    #[serde(default)]
    pub attach_policy_arns: Vec<String>,
    #[serde(default)]
    pub with_addon_policies: AddonPolicies,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonPolicies {
    pub auto_scaler: Option<bool>,
    #[serde(rename = "externalDNS")]
    pub external_dns: Option<bool>,
    pub cert_manager: Option<bool>,
    pub ebs: Option<bool>,
    pub cloud_watch: Option<bool>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSecurityGroups {
    /// Existing security groups attached to every node.
    #[serde(rename = "attachIDs", default)]
    pub attach_ids: Vec<String>,
    /// Attach the shared node security group exported by the cluster stack (default `true`).
    pub with_shared: Option<bool>,
    /// Create a security group local to this node group (default `true`).
    pub with_local: Option<bool>,
}

impl NodeGroupSecurityGroups {
    pub fn with_shared(&self) -> bool {
        self.with_shared.unwrap_or(true)
    }

    pub fn with_local(&self) -> bool {
        self.with_local.unwrap_or(true)
    }
}

/// Spreads a node group over several instance types and pricing models. Every numeric field is
/// optional; unset fields are left for the provisioning engine to default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancesDistribution {
    #[serde(default)]
    pub instance_types: Vec<String>,
    pub max_price: Option<f64>,
    pub on_demand_base_capacity: Option<i32>,
    pub on_demand_percentage_above_base_capacity: Option<i32>,
    pub spot_instance_pools: Option<i32>,
}

/// A self-managed node group, backed by an auto scaling group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    #[serde(flatten)]
    pub base: NodeGroupBase,

    pub instances_distribution: Option<InstancesDistribution>,

    #[serde(rename = "ebsOptimized")]
    pub ebs_optimized: Option<bool>,

    #[serde(default)]
    pub security_groups: NodeGroupSecurityGroups,

    #[serde(rename = "targetGroupARNs", default)]
    pub target_group_arns: Vec<String>,

    /// Hands the scaling resource over to the Spot Ocean provider. The contents are passed to that
    /// provider untouched.
    pub spot_ocean: Option<Map<String, Value>>,
}

impl Configuration for NodeGroup {}

impl NodeGroup {
    pub fn name(&self) -> &str {
        &self.base.name
    }

    /// Whether the node group is spread over the instance types of an instances distribution.
    pub fn has_mixed_instances(&self) -> bool {
        self.instances_distribution
            .as_ref()
            .map(|distribution| !distribution.instance_types.is_empty())
            .unwrap_or(false)
    }

    /// The instance type placed in the launch template. With mixed instances this is the first
    /// type of the distribution; the others are supplied as overrides.
    pub fn launch_instance_type(&self) -> &str {
        self.instances_distribution
            .as_ref()
            .and_then(|distribution| distribution.instance_types.first())
            .map(String::as_str)
            .unwrap_or_else(|| self.base.instance_type())
    }

    pub fn auto_scaler_enabled(&self) -> bool {
        self.base
            .iam
            .with_addon_policies
            .auto_scaler
            .unwrap_or(false)
    }
}
