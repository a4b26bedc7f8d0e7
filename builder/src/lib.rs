/*!

This library turns the declarative description of a node group into the resource graph a cloud
provisioning engine creates the node group from.

Two kinds of node groups are supported. Self-managed node groups are backed by an auto scaling group
(optionally spread over several instance types and pricing models, or handed over to an alternate
scaling provider). Managed node groups are backed by a single provider-managed node group resource.
Either kind is synthesized with [`synthesize`], or directly with [`NodeGroupResourceSet`] and
[`ManagedNodeGroupResourceSet`].

IAM roles, bootstrap user data, existing launch templates and alternate scaling resources are
supplied by the caller through [`Providers`].

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use ami::AmiType;
pub use error::{BoxError, Error, Result};
pub use managed_nodegroup::ManagedNodeGroupResourceSet;
pub use nodegroup::NodeGroupResourceSet;
pub use providers::{
    AlternateScaling, AlternateScalingProvider, BootstrapProvider, FetchedInstanceProfile,
    FetchedLaunchTemplate, LaunchTemplateFetcher, NodeGroupRef, Providers, RoleOptions,
    RoleProvisioner, RoleReference, StackExports, ValueImporter,
};
pub use scaling::{ScalingBounds, ScalingNotice};
pub use subnets::SubnetSelection;
pub use template::{Resource, ResourceGraph};

use log::debug;
use nodegroup_model::{ClusterConfig, ManagedNodeGroup, NodeGroup};

pub mod ami;
mod auto_scaling;
mod error;
pub mod iam;
pub mod launch_template;
mod managed_nodegroup;
mod nodegroup;
pub mod outputs;
mod providers;
pub mod scaling;
mod security_groups;
pub mod subnets;
pub mod tags;
pub mod template;

/// The node group to synthesize.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeGroupKind {
    SelfManaged(NodeGroup),
    Managed(ManagedNodeGroup),
}

impl NodeGroupKind {
    pub fn name(&self) -> &str {
        match self {
            NodeGroupKind::SelfManaged(ng) => ng.name(),
            NodeGroupKind::Managed(ng) => ng.name(),
        }
    }
}

/// The outcome of a successful synthesis.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub graph: ResourceGraph,
    /// Scaling defaults that were applied automatically.
    pub notices: Vec<ScalingNotice>,
}

/// Synthesize the resource graph of one node group attached to `cluster`, whose stack is named
/// `cluster_stack_name`. Either the complete graph is returned or an error; a failed synthesis
/// leaves nothing behind.
pub async fn synthesize(
    cluster: &ClusterConfig,
    cluster_stack_name: &str,
    node_group: &NodeGroupKind,
    providers: &Providers,
) -> Result<Synthesis> {
    match node_group {
        NodeGroupKind::SelfManaged(spec) => {
            debug!("Nodegroup '{}' is self-managed", spec.name());
            let mut resource_set =
                NodeGroupResourceSet::new(cluster, cluster_stack_name, spec, providers);
            resource_set.add_all_resources()?;
            let notices = resource_set.notices().to_vec();
            Ok(Synthesis {
                graph: resource_set.into_template(),
                notices,
            })
        }
        NodeGroupKind::Managed(spec) => {
            debug!("Nodegroup '{}' is managed", spec.name());
            let mut resource_set =
                ManagedNodeGroupResourceSet::new(cluster, cluster_stack_name, spec, providers);
            resource_set.add_all_resources().await?;
            let notices = resource_set.notices().to_vec();
            Ok(Synthesis {
                graph: resource_set.into_template(),
                notices,
            })
        }
    }
}
