use crate::error::{self, Result};
use crate::outputs::{CLUSTER_SUBNETS_PRIVATE, CLUSTER_SUBNETS_PUBLIC, SUBNET_LIST_DELIMITER};
use crate::providers::ValueImporter;
use crate::template::{make_split, ResourceGraph};
use nodegroup_model::ClusterConfig;
use serde_json::{json, Value};
use snafu::{ensure, OptionExt};

/// Where the nodes of a node group are placed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubnetSelection {
    /// Concrete subnet ids, one per requested availability zone, in the requested order.
    Ids(Vec<String>),

    /// The comma separated subnet list exported by the cluster stack, split by the provisioning
    /// engine when the graph is executed.
    ClusterExport {
        stack_name: String,
        output_key: &'static str,
    },
}

impl SubnetSelection {
    /// Render the selection as a graph value, recording the cross-stack import if one is needed.
    pub fn to_value(&self, graph: &mut ResourceGraph, importer: &dyn ValueImporter) -> Value {
        match self {
            SubnetSelection::Ids(ids) => json!(ids),
            SubnetSelection::ClusterExport {
                stack_name,
                output_key,
            } => make_split(
                SUBNET_LIST_DELIMITER,
                graph.import_value(importer, stack_name, output_key),
            ),
        }
    }
}

/// Resolve the subnets of a node group.
///
/// Explicit subnet ids are used as given. Otherwise each requested availability zone is mapped to
/// the cluster subnet of that zone in the public or private pool. With no zones requested, the
/// whole pool exported by the cluster stack is used.
pub fn assign_subnets(
    availability_zones: &[String],
    cluster_stack_name: &str,
    cluster: &ClusterConfig,
    private_networking: bool,
    custom_subnets: &[String],
) -> Result<SubnetSelection> {
    if !custom_subnets.is_empty() {
        return Ok(SubnetSelection::Ids(custom_subnets.to_vec()));
    }

    if availability_zones.is_empty() {
        let output_key = if private_networking {
            CLUSTER_SUBNETS_PRIVATE
        } else {
            CLUSTER_SUBNETS_PUBLIC
        };
        return Ok(SubnetSelection::ClusterExport {
            stack_name: cluster_stack_name.to_string(),
            output_key,
        });
    }

    let pool = cluster.subnet_pool(private_networking);
    let pool_ids = || -> Vec<String> { pool.values().map(|subnet| subnet.id.clone()).collect() };
    ensure!(
        pool.len() >= availability_zones.len(),
        error::InsufficientSubnetsSnafu {
            subnets: pool_ids(),
            availability_zones: availability_zones.to_vec(),
        }
    );

    availability_zones
        .iter()
        .map(|az| {
            pool.get(az)
                .map(|subnet| subnet.id.clone())
                .with_context(|| error::UnresolvedSubnetSnafu {
                    availability_zone: az.clone(),
                    subnets: pool_ids(),
                    availability_zones: availability_zones.to_vec(),
                })
        })
        .collect::<Result<Vec<_>>>()
        .map(SubnetSelection::Ids)
}
