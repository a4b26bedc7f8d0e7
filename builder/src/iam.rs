use crate::error::{self, Result};
use crate::providers::{RoleOptions, RoleProvisioner};
use crate::template::ResourceGraph;
use log::debug;
use nodegroup_model::{ManagedNodeGroup, NodeGroup};
use serde_json::{json, Value};
use snafu::ResultExt;

/// Strip the IAM path from a role ARN: `arn:aws:iam::123:role/a/b/name` becomes
/// `arn:aws:iam::123:role/name`. Anything that is not a role ARN is returned as-is.
pub fn normalize_arn(arn: &str) -> String {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    match parts.as_slice() {
        [prefix @ .., resource] if prefix.len() == 5 && resource.starts_with("role/") => {
            let name = resource.rsplit('/').next().unwrap_or(*resource);
            format!("{}:role/{}", prefix.join(":"), name)
        }
        _ => arn.to_string(),
    }
}

/// The instance profile self-managed nodes are launched with. A supplied instance profile ARN is
/// used as-is, otherwise the role provisioner creates one.
pub fn instance_profile_arn(
    graph: &mut ResourceGraph,
    roles: &dyn RoleProvisioner,
    node_group: &NodeGroup,
) -> Result<Value> {
    let iam = &node_group.base.iam;
    if let Some(arn) = &iam.instance_profile_arn {
        debug!("Using existing instance profile '{}'", arn);
        return Ok(json!(arn));
    }
    let options = RoleOptions {
        nodegroup: node_group.name().to_string(),
        managed: false,
        enable_ssm: node_group.base.ssm_enabled(),
    };
    roles
        .create_role(graph, iam, &options)
        .context(error::RoleProvisioningSnafu {
            nodegroup: node_group.name(),
        })
        .map(|role| role.instance_profile_arn)
}

/// The role managed nodes run as. A supplied role ARN is normalized, otherwise the role
/// provisioner creates one.
pub fn node_role_arn(
    graph: &mut ResourceGraph,
    roles: &dyn RoleProvisioner,
    node_group: &ManagedNodeGroup,
) -> Result<Value> {
    let iam = &node_group.base.iam;
    if let Some(arn) = &iam.instance_role_arn {
        debug!("Using existing node role '{}'", arn);
        return Ok(json!(normalize_arn(arn)));
    }
    let options = RoleOptions {
        nodegroup: node_group.name().to_string(),
        managed: true,
        enable_ssm: node_group.base.ssm_enabled(),
    };
    roles
        .create_role(graph, iam, &options)
        .context(error::RoleProvisioningSnafu {
            nodegroup: node_group.name(),
        })
        .map(|role| role.role_arn)
}
