use crate::ami::AmiType;
use crate::error::{self, Result};
use crate::iam;
use crate::launch_template::{
    managed_launch_template_data, validate_launch_template, LaunchTemplate,
};
use crate::providers::{NodeGroupRef, Providers};
use crate::scaling::{reconcile, ScalingNotice};
use crate::subnets::assign_subnets;
use crate::tags::managed_nodegroup_tags;
use crate::template::{Resource, ResourceGraph};
use log::{debug, info};
use nodegroup_model::constants::TEMPLATE_DESCRIPTION_SUFFIX;
use nodegroup_model::{ClusterConfig, ManagedNodeGroup};
use serde::Serialize;
use serde_json::{json, Value};
use snafu::ResultExt;
use std::collections::BTreeMap;

pub const MANAGED_NODEGROUP_RESOURCE_NAME: &str = "ManagedNodeGroup";
pub const MANAGED_LAUNCH_TEMPLATE_NAME: &str = "LaunchTemplate";
pub const MANAGED_NODEGROUP_TYPE: &str = "AWS::EKS::Nodegroup";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ManagedNodegroupProperties {
    cluster_name: String,
    nodegroup_name: String,
    scaling_config: ScalingConfig,
    subnets: Value,
    node_role: Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ami_type: Option<AmiType>,
    launch_template: LaunchTemplateSpecification,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ScalingConfig {
    min_size: i32,
    max_size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_size: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LaunchTemplateSpecification {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// The resources of a managed node group: the node group resource itself, its launch template
/// when none was supplied, and the node role (through the role provisioner) when no role ARN was
/// supplied.
pub struct ManagedNodeGroupResourceSet<'a> {
    cluster: &'a ClusterConfig,
    cluster_stack_name: String,
    spec: &'a ManagedNodeGroup,
    providers: &'a Providers,
    graph: ResourceGraph,
    notices: Vec<ScalingNotice>,
}

impl<'a> ManagedNodeGroupResourceSet<'a> {
    pub fn new<S: Into<String>>(
        cluster: &'a ClusterConfig,
        cluster_stack_name: S,
        spec: &'a ManagedNodeGroup,
        providers: &'a Providers,
    ) -> Self {
        Self {
            cluster,
            cluster_stack_name: cluster_stack_name.into(),
            spec,
            providers,
            graph: ResourceGraph::new(),
            notices: Vec::new(),
        }
    }

    /// Synthesize every resource of the managed node group. A referenced launch template is
    /// fetched and validated before anything is registered. On failure the resource set is left as
    /// it was.
    pub async fn add_all_resources(&mut self) -> Result<()> {
        let spec = self.spec;
        let base = &spec.base;
        debug!("Synthesizing managed nodegroup '{}': {}", spec.name(), spec);

        let reconciled = reconcile(
            spec.name(),
            base.min_size,
            base.max_size,
            base.desired_capacity,
        )?;
        // Managed nodes are always placed in the public pool.
        let subnets = assign_subnets(
            &base.availability_zones,
            &self.cluster_stack_name,
            self.cluster,
            false,
            &base.subnets,
        )?;

        let fetched = match &spec.launch_template {
            Some(launch_template) => {
                debug!(
                    "Fetching launch template '{}' for nodegroup '{}'",
                    launch_template.id,
                    spec.name()
                );
                let data = self
                    .providers
                    .launch_templates
                    .fetch(launch_template)
                    .await
                    .context(error::ExternalFetchSnafu {
                        template: &launch_template.id,
                    })?;
                validate_launch_template(&data, spec, &launch_template.id)?;
                Some((launch_template, data))
            }
            None => None,
        };

        let mut graph = ResourceGraph::new();
        graph.set_description(format!(
            "EKS Managed Nodes (SSH access: {}) {}",
            base.ssh_allowed(),
            TEMPLATE_DESCRIPTION_SUFFIX
        ));

        let node_role = iam::node_role_arn(&mut graph, self.providers.roles.as_ref(), spec)?;

        let (launch_template, ami_type) = match fetched {
            Some((reference, data)) => {
                // Validation guarantees an instance type.
                let ami_type = match (&data.image_id, &data.instance_type) {
                    (None, Some(instance_type)) if base.custom_ami().is_none() => {
                        Some(AmiType::for_instance_type(instance_type))
                    }
                    _ => None,
                };
                (
                    LaunchTemplateSpecification {
                        id: json!(reference.id),
                        version: reference.version.clone(),
                    },
                    ami_type,
                )
            }
            None => {
                let user_data = match base.custom_ami() {
                    Some(_) => Some(
                        self.providers
                            .bootstrap
                            .user_data(self.cluster, NodeGroupRef::Managed(spec))
                            .context(error::BootstrapSnafu {
                                nodegroup: spec.name(),
                            })?,
                    ),
                    None => None,
                };
                let data = managed_launch_template_data(spec, user_data);
                let ami_type = data
                    .image_id
                    .is_none()
                    .then(|| AmiType::for_instance_type(base.instance_type()));
                let id = graph.add_resource(
                    MANAGED_LAUNCH_TEMPLATE_NAME,
                    LaunchTemplate::new(data).to_resource()?,
                )?;
                (
                    LaunchTemplateSpecification { id, version: None },
                    ami_type,
                )
            }
        };

        let subnets = subnets.to_value(&mut graph, self.providers.importer.as_ref());
        let properties = ManagedNodegroupProperties {
            cluster_name: self.cluster.name().to_string(),
            nodegroup_name: spec.name().to_string(),
            scaling_config: ScalingConfig {
                min_size: reconciled.bounds.min,
                max_size: reconciled.bounds.max,
                desired_size: reconciled.bounds.desired,
            },
            subnets,
            node_role,
            labels: base.labels.clone(),
            tags: managed_nodegroup_tags(self.cluster, spec),
            ami_type,
            launch_template,
        };
        graph.add_resource(
            MANAGED_NODEGROUP_RESOURCE_NAME,
            Resource::from_properties(MANAGED_NODEGROUP_TYPE, &properties)?,
        )?;

        info!(
            "Synthesized {} resources for managed nodegroup '{}'",
            graph.resource_names().len(),
            spec.name()
        );
        self.graph = graph;
        self.notices = reconciled.notices;
        Ok(())
    }

    /// Managed node groups always need the IAM capability, since a supplied role ARN is not
    /// enough on its own.
    pub fn with_iam(&self) -> bool {
        true
    }

    pub fn with_named_iam(&self) -> bool {
        self.spec.base.iam.instance_role_name.is_some()
    }

    pub fn render_json(&self) -> Result<Vec<u8>> {
        self.graph.render_json()
    }

    pub fn template(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn into_template(self) -> ResourceGraph {
        self.graph
    }

    pub fn notices(&self) -> &[ScalingNotice] {
        &self.notices
    }
}
