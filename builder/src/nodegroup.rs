use crate::auto_scaling::{auto_scaling_group, SelfManagedScaling};
use crate::error::{self, Result};
use crate::launch_template::{self_managed_launch_template_data, LaunchTemplate};
use crate::outputs::{
    NODEGROUP_FEATURE_LOCAL_SECURITY_GROUP, NODEGROUP_FEATURE_PRIVATE_NETWORKING,
    NODEGROUP_FEATURE_SHARED_SECURITY_GROUP,
};
use crate::providers::{AlternateScaling, NodeGroupRef, Providers};
use crate::scaling::{reconcile, ScalingNotice};
use crate::subnets::assign_subnets;
use crate::tags::auto_scaling_group_tags;
use crate::template::ResourceGraph;
use crate::{iam, security_groups};
use log::{debug, info};
use nodegroup_model::constants::TEMPLATE_DESCRIPTION_SUFFIX;
use nodegroup_model::{ClusterConfig, NodeGroup};
use serde_json::json;
use snafu::ResultExt;

pub const NODEGROUP_RESOURCE_NAME: &str = "NodeGroup";
pub const NODEGROUP_LAUNCH_TEMPLATE_NAME: &str = "NodeGroupLaunchTemplate";

/// The resources of a self-managed node group: its launch template, security groups, IAM
/// resources (through the role provisioner) and the auto scaling group or its replacement.
pub struct NodeGroupResourceSet<'a> {
    cluster: &'a ClusterConfig,
    cluster_stack_name: String,
    spec: &'a NodeGroup,
    providers: &'a Providers,
    graph: ResourceGraph,
    notices: Vec<ScalingNotice>,
}

impl<'a> NodeGroupResourceSet<'a> {
    pub fn new<S: Into<String>>(
        cluster: &'a ClusterConfig,
        cluster_stack_name: S,
        spec: &'a NodeGroup,
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

    /// Synthesize every resource of the node group. On failure the resource set is left as it
    /// was.
    pub fn add_all_resources(&mut self) -> Result<()> {
        let spec = self.spec;
        let base = &spec.base;
        debug!("Synthesizing self-managed nodegroup '{}': {}", spec.name(), spec);

        let reconciled = reconcile(
            spec.name(),
            base.min_size,
            base.max_size,
            base.desired_capacity,
        )?;
        let subnets = assign_subnets(
            &base.availability_zones,
            &self.cluster_stack_name,
            self.cluster,
            base.private_networking,
            &base.subnets,
        )?;

        let mut graph = ResourceGraph::new();
        graph.set_description(format!(
            "EKS nodes (AMI family: {}, SSH access: {}, private networking: {}) {}",
            base.ami_family,
            base.ssh_allowed(),
            base.private_networking,
            TEMPLATE_DESCRIPTION_SUFFIX
        ));
        graph.define_output(
            NODEGROUP_FEATURE_PRIVATE_NETWORKING,
            json!(base.private_networking),
            false,
        )?;
        graph.define_output(
            NODEGROUP_FEATURE_SHARED_SECURITY_GROUP,
            json!(spec.security_groups.with_shared()),
            false,
        )?;
        graph.define_output(
            NODEGROUP_FEATURE_LOCAL_SECURITY_GROUP,
            json!(spec.security_groups.with_local()),
            false,
        )?;

        let user_data = self
            .providers
            .bootstrap
            .user_data(self.cluster, NodeGroupRef::SelfManaged(spec))
            .context(error::BootstrapSnafu {
                nodegroup: spec.name(),
            })?;

        let instance_profile_arn =
            iam::instance_profile_arn(&mut graph, self.providers.roles.as_ref(), spec)?;
        let security_groups = security_groups::add_security_groups(
            &mut graph,
            self.providers.importer.as_ref(),
            &self.cluster_stack_name,
            self.cluster,
            spec,
        )?;

        let launch_template = LaunchTemplate::new(self_managed_launch_template_data(
            self.cluster,
            spec,
            instance_profile_arn,
            user_data,
            security_groups,
        ));
        let scaling = SelfManagedScaling::for_node_group(spec);
        // The alternate provider owns the launch specification.
        if scaling != SelfManagedScaling::Alternate {
            graph.add_resource(
                NODEGROUP_LAUNCH_TEMPLATE_NAME,
                launch_template.to_resource()?,
            )?;
        }

        let importer = self.providers.importer.as_ref();
        let tags = auto_scaling_group_tags(
            self.cluster.name(),
            spec.name(),
            spec.auto_scaler_enabled(),
        );

        match &scaling {
            SelfManagedScaling::Alternate => match &self.providers.alternate_scaling {
                Some(provider) => {
                    let vpc_zone_identifier = subnets.to_value(&mut graph, importer);
                    let resource = provider
                        .scaling_resource(
                            self.cluster,
                            spec,
                            AlternateScaling {
                                launch_template_data: &launch_template.launch_template_data,
                                vpc_zone_identifier: &vpc_zone_identifier,
                                tags: &tags,
                            },
                        )
                        .context(error::AlternateProviderSnafu {
                            nodegroup: spec.name(),
                        })?;
                    graph.add_resource(NODEGROUP_RESOURCE_NAME, resource)?;
                }
                None => debug!(
                    "No alternate scaling provider, not creating a scaling resource for '{}'",
                    spec.name()
                ),
            },
            _ => {
                let vpc_zone_identifier = subnets.to_value(&mut graph, importer);
                let resource = auto_scaling_group(
                    spec,
                    &scaling,
                    &reconciled.bounds,
                    launch_template.launch_template_name.clone(),
                    NODEGROUP_LAUNCH_TEMPLATE_NAME,
                    vpc_zone_identifier,
                    tags,
                )?;
                graph.add_resource(NODEGROUP_RESOURCE_NAME, resource)?;
            }
        }

        info!(
            "Synthesized {} resources for nodegroup '{}'",
            graph.resource_names().len(),
            spec.name()
        );
        self.graph = graph;
        self.notices = reconciled.notices;
        Ok(())
    }

    /// Whether the graph contains IAM resources, which is the case unless an instance profile was
    /// supplied.
    pub fn with_iam(&self) -> bool {
        self.spec.base.iam.instance_profile_arn.is_none()
    }

    /// Whether the graph contains IAM resources with custom names.
    pub fn with_named_iam(&self) -> bool {
        self.with_iam() && self.spec.base.iam.instance_role_name.is_some()
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

    /// Scaling defaults that were applied automatically.
    pub fn notices(&self) -> &[ScalingNotice] {
        &self.notices
    }
}
