use nodegroup_builder::template::make_get_att;
use nodegroup_builder::{
    BoxError, Resource, ResourceGraph, RoleOptions, RoleProvisioner, RoleReference,
};
use nodegroup_model::NodeGroupIam;
use serde_json::json;

pub(crate) const ROLE_RESOURCE: &str = "NodeInstanceRole";
pub(crate) const PROFILE_RESOURCE: &str = "NodeInstanceProfile";

/// Registers a node role and an instance profile in the graph.
pub(crate) struct MockRoles {}

impl RoleProvisioner for MockRoles {
    fn create_role(
        &self,
        graph: &mut ResourceGraph,
        iam: &NodeGroupIam,
        options: &RoleOptions,
    ) -> Result<RoleReference, BoxError> {
        let mut managed_policies = iam.attach_policy_arns.clone();
        if options.enable_ssm {
            managed_policies
                .push("arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore".to_string());
        }
        let mut role = json!({ "ManagedPolicyArns": managed_policies });
        if let Some(name) = &iam.instance_role_name {
            role["RoleName"] = json!(name);
        }
        let role_ref = graph.add_resource(ROLE_RESOURCE, Resource::new("AWS::IAM::Role", role))?;
        if !options.managed {
            graph.add_resource(
                PROFILE_RESOURCE,
                Resource::new("AWS::IAM::InstanceProfile", json!({ "Roles": [role_ref] })),
            )?;
        }
        Ok(RoleReference {
            role_arn: make_get_att(ROLE_RESOURCE, "Arn"),
            instance_profile_arn: make_get_att(PROFILE_RESOURCE, "Arn"),
        })
    }
}

/// Always fails, to check that role errors abort the synthesis.
pub(crate) struct FailingRoles {}

impl RoleProvisioner for FailingRoles {
    fn create_role(
        &self,
        _graph: &mut ResourceGraph,
        _iam: &NodeGroupIam,
        _options: &RoleOptions,
    ) -> Result<RoleReference, BoxError> {
        Err("access denied".into())
    }
}
