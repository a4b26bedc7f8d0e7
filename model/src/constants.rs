/// Helper macro to avoid retyping the domain-like prefix used for the identity tags that are
/// attached to synthesized node groups. When given no parameters, this returns the prefix. When
/// given a string literal parameter it adds `/parameter` to the end.
macro_rules! nodegroup_tag {
    () => {
        "alpha.nodegroup-builder.io"
    };
    ($s:literal) => {
        concat!(nodegroup_tag!(), "/", $s)
    };
}

// Identity tag keys
pub const TAG_CLUSTER_NAME: &str = nodegroup_tag!("cluster-name");
pub const TAG_NODEGROUP_NAME: &str = nodegroup_tag!("nodegroup-name");
pub const TAG_NODEGROUP_TYPE: &str = nodegroup_tag!("nodegroup-type");

/// Appended to every template description so that synthesized stacks can be recognized.
pub const TEMPLATE_DESCRIPTION_SUFFIX: &str = "[created by nodegroup-builder]";

// Node group defaults
pub const DEFAULT_NODE_COUNT: i32 = 2;
pub const DEFAULT_INSTANCE_TYPE: &str = "m5.large";
pub const DEFAULT_VOLUME_NAME: &str = "/dev/xvda";
pub const DEFAULT_VOLUME_IOPS: i32 = 3000;
pub const DEFAULT_K8S_VERSION: &str = "1.24";
pub const DEFAULT_VPC_CIDR: &str = "192.168.0.0/16";
