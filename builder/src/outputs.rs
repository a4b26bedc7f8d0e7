// Outputs exported by the cluster stack that node group graphs import.
pub const CLUSTER_VPC: &str = "VPC";
pub const CLUSTER_SECURITY_GROUP: &str = "SecurityGroup";
pub const CLUSTER_SHARED_NODE_SECURITY_GROUP: &str = "SharedNodeSecurityGroup";
pub const CLUSTER_SUBNETS_PRIVATE: &str = "SubnetsPrivate";
pub const CLUSTER_SUBNETS_PUBLIC: &str = "SubnetsPublic";

// Outputs declared by self-managed node group graphs.
pub const NODEGROUP_FEATURE_PRIVATE_NETWORKING: &str = "FeaturePrivateNetworking";
pub const NODEGROUP_FEATURE_SHARED_SECURITY_GROUP: &str = "FeatureSharedSecurityGroup";
pub const NODEGROUP_FEATURE_LOCAL_SECURITY_GROUP: &str = "FeatureLocalSecurityGroup";

/// Delimiter of the comma separated subnet lists exported by the cluster stack.
pub const SUBNET_LIST_DELIMITER: &str = ",";
