/*!

The collaborators a synthesis call depends on. None of them are implemented here: IAM roles,
bootstrap scripts, launch-template lookups and alternate scaling resources are owned by the caller,
who bundles them into [`Providers`].

!*/

use crate::error::BoxError;
use crate::launch_template::LaunchTemplateData;
use crate::tags::PropagatedTag;
use crate::template::{make_import_value, Resource, ResourceGraph};
use nodegroup_model::{
    ClusterConfig, LaunchTemplateRef, ManagedNodeGroup, NodeGroup, NodeGroupBase, NodeGroupIam,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which kind of node group a role or bootstrap script is requested for.
#[derive(Clone, Copy, Debug)]
pub enum NodeGroupRef<'a> {
    SelfManaged(&'a NodeGroup),
    Managed(&'a ManagedNodeGroup),
}

impl<'a> NodeGroupRef<'a> {
    pub fn base(&self) -> &'a NodeGroupBase {
        match self {
            NodeGroupRef::SelfManaged(ng) => &ng.base,
            NodeGroupRef::Managed(ng) => &ng.base,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleOptions {
    pub nodegroup: String,
    pub managed: bool,
    pub enable_ssm: bool,
}

/// The identity nodes run as. Either value may be a deferred reference into the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleReference {
    pub role_arn: Value,
    pub instance_profile_arn: Value,
}

/// Creates the node IAM role, registering whatever resources it needs in `graph`.
pub trait RoleProvisioner: Send + Sync {
    fn create_role(
        &self,
        graph: &mut ResourceGraph,
        iam: &NodeGroupIam,
        options: &RoleOptions,
    ) -> Result<RoleReference, BoxError>;
}

/// Produces the user data nodes boot with. The returned blob is placed in the launch template
/// as-is.
pub trait BootstrapProvider: Send + Sync {
    fn user_data(
        &self,
        cluster: &ClusterConfig,
        node_group: NodeGroupRef<'_>,
    ) -> Result<String, BoxError>;
}

/// The subset of an existing launch template's data that synthesis inspects.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FetchedLaunchTemplate {
    pub instance_type: Option<String>,
    pub image_id: Option<String>,
    pub user_data: Option<String>,
    pub iam_instance_profile: Option<FetchedInstanceProfile>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FetchedInstanceProfile {
    pub arn: Option<String>,
    pub name: Option<String>,
}

/// Looks up the data of a launch template created outside of the node group. Retries and
/// timeouts, if any, belong to the implementation.
#[async_trait::async_trait]
pub trait LaunchTemplateFetcher: Send + Sync {
    async fn fetch(
        &self,
        launch_template: &LaunchTemplateRef,
    ) -> Result<FetchedLaunchTemplate, BoxError>;
}

/// Turns an output of another stack into a value usable inside the graph.
pub trait ValueImporter: Send + Sync {
    fn import_value(&self, stack_name: &str, output_key: &str) -> Value;
}

/// Imports outputs that were exported as `<stack>::<output>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackExports;

impl ValueImporter for StackExports {
    fn import_value(&self, stack_name: &str, output_key: &str) -> Value {
        make_import_value(stack_name, output_key)
    }
}

/// Everything an alternate scaling provider needs to build its own scaling resource.
#[derive(Clone, Copy, Debug)]
pub struct AlternateScaling<'a> {
    pub launch_template_data: &'a LaunchTemplateData,
    pub vpc_zone_identifier: &'a Value,
    pub tags: &'a [PropagatedTag],
}

/// Builds the scaling resource of node groups that opt out of the auto scaling group, such as
/// Spot Ocean node groups.
pub trait AlternateScalingProvider: Send + Sync {
    fn scaling_resource(
        &self,
        cluster: &ClusterConfig,
        node_group: &NodeGroup,
        request: AlternateScaling<'_>,
    ) -> Result<Resource, BoxError>;
}

/// The collaborators used by one synthesis call.
pub struct Providers {
    pub roles: Box<dyn RoleProvisioner>,
    pub bootstrap: Box<dyn BootstrapProvider>,
    pub launch_templates: Box<dyn LaunchTemplateFetcher>,
    pub importer: Box<dyn ValueImporter>,
    pub alternate_scaling: Option<Box<dyn AlternateScalingProvider>>,
}

impl Providers {
    pub fn new(
        roles: Box<dyn RoleProvisioner>,
        bootstrap: Box<dyn BootstrapProvider>,
        launch_templates: Box<dyn LaunchTemplateFetcher>,
    ) -> Self {
        Self {
            roles,
            bootstrap,
            launch_templates,
            importer: Box::new(StackExports),
            alternate_scaling: None,
        }
    }

    pub fn with_importer(mut self, importer: Box<dyn ValueImporter>) -> Self {
        self.importer = importer;
        self
    }

    pub fn with_alternate_scaling(mut self, provider: Box<dyn AlternateScalingProvider>) -> Self {
        self.alternate_scaling = Some(provider);
        self
    }
}
