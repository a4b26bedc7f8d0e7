use crate::constants::{DEFAULT_K8S_VERSION, DEFAULT_VPC_CIDR};
use crate::Configuration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The cluster that node groups are attached to. This is owned by the caller and is never
/// modified during synthesis.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub metadata: ClusterMeta,

    #[serde(default)]
    pub vpc: ClusterVpc,
}

impl Configuration for ClusterConfig {}

impl ClusterConfig {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The Kubernetes version of the cluster, falling back to the default version.
    pub fn version(&self) -> &str {
        self.metadata
            .version
            .as_deref()
            .unwrap_or(DEFAULT_K8S_VERSION)
    }

    pub fn vpc_cidr(&self) -> &str {
        self.vpc.cidr.as_deref().unwrap_or(DEFAULT_VPC_CIDR)
    }

    /// The subnet pool nodes will be placed in, keyed by availability zone.
    pub fn subnet_pool(&self, private_networking: bool) -> &BTreeMap<String, SubnetSpec> {
        if private_networking {
            &self.vpc.subnets.private
        } else {
            &self.vpc.subnets.public
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMeta {
    /// The name of the cluster.
    pub name: String,

    /// The region the cluster is located in.
    pub region: Option<String>,

    /// The Kubernetes version of the control plane (e.g. "1.24"). Make sure this is quoted so that
    /// it is interpreted as a YAML string (not a number).
    pub version: Option<String>,

    /// Tags shared by every stack created for this cluster.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVpc {
    pub id: Option<String>,

    /// The IPv4 range of the VPC. Node SSH access with private networking is limited to it.
    pub cidr: Option<String>,

    #[serde(default)]
    pub subnets: ClusterSubnets,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubnets {
    /// Private subnets keyed by availability zone.
    #[serde(default)]
    pub private: BTreeMap<String, SubnetSpec>,

    /// Public subnets keyed by availability zone.
    #[serde(default)]
    pub public: BTreeMap<String, SubnetSpec>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub id: String,
    pub cidr: Option<String>,
}
