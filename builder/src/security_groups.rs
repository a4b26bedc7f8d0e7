use crate::error::Result;
use crate::outputs::{CLUSTER_SECURITY_GROUP, CLUSTER_SHARED_NODE_SECURITY_GROUP, CLUSTER_VPC};
use crate::providers::ValueImporter;
use crate::template::{Resource, ResourceGraph};
use log::debug;
use nodegroup_model::{ClusterConfig, NodeGroup};
use serde::Serialize;
use serde_json::{json, Value};

pub const LOCAL_SECURITY_GROUP: &str = "SG";

const SECURITY_GROUP_TYPE: &str = "AWS::EC2::SecurityGroup";
const INGRESS_TYPE: &str = "AWS::EC2::SecurityGroupIngress";
const EGRESS_TYPE: &str = "AWS::EC2::SecurityGroupEgress";

/// A single ingress or egress rule. Exactly one of the peer fields is set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SecurityGroupRule {
    group_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_security_group_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_security_group_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cidr_ip: Option<String>,
    description: String,
    ip_protocol: String,
    from_port: u16,
    to_port: u16,
}

impl SecurityGroupRule {
    fn tcp(group_id: &Value, description: String, ports: (u16, u16)) -> Self {
        Self {
            group_id: group_id.clone(),
            source_security_group_id: None,
            destination_security_group_id: None,
            cidr_ip: None,
            description,
            ip_protocol: "tcp".to_string(),
            from_port: ports.0,
            to_port: ports.1,
        }
    }

    fn source_group(mut self, source: &Value) -> Self {
        self.source_security_group_id = Some(source.clone());
        self
    }

    fn destination_group(mut self, destination: &Value) -> Self {
        self.destination_security_group_id = Some(destination.clone());
        self
    }

    fn source_cidr<S: Into<String>>(mut self, cidr: S) -> Self {
        self.cidr_ip = Some(cidr.into());
        self
    }
}

const KUBELET_AND_WORKLOAD_PORTS: (u16, u16) = (1025, 65535);
const HTTPS_PORTS: (u16, u16) = (443, 443);
const SSH_PORTS: (u16, u16) = (22, 22);

/// Collect the security groups nodes are placed in, creating the node group's local security group
/// and its control plane rules when requested. Attached ids come first, then the shared node
/// security group, then the local one.
pub fn add_security_groups(
    graph: &mut ResourceGraph,
    importer: &dyn ValueImporter,
    cluster_stack_name: &str,
    cluster: &ClusterConfig,
    node_group: &NodeGroup,
) -> Result<Vec<Value>> {
    let settings = &node_group.security_groups;
    let mut groups: Vec<Value> = settings.attach_ids.iter().map(|id| json!(id)).collect();

    if settings.with_shared() {
        groups.push(graph.import_value(
            importer,
            cluster_stack_name,
            CLUSTER_SHARED_NODE_SECURITY_GROUP,
        ));
    }

    if !settings.with_local() {
        debug!(
            "Not creating a local security group for nodegroup '{}'",
            node_group.name()
        );
        return Ok(groups);
    }

    let desc = format!("worker nodes in group {}", node_group.name());
    let control_plane = graph.import_value(importer, cluster_stack_name, CLUSTER_SECURITY_GROUP);
    let vpc = graph.import_value(importer, cluster_stack_name, CLUSTER_VPC);

    let local = graph.add_resource(
        LOCAL_SECURITY_GROUP,
        Resource::new(
            SECURITY_GROUP_TYPE,
            json!({
                "VpcId": vpc,
                "GroupDescription": format!("Communication between the control plane and {}", desc),
                "Tags": [{
                    "Key": format!("kubernetes.io/cluster/{}", cluster.name()),
                    "Value": "owned",
                }],
            }),
        ),
    )?;
    groups.push(local.clone());

    let rules = [
        (
            "IngressInterCluster",
            INGRESS_TYPE,
            SecurityGroupRule::tcp(
                &local,
                format!(
                    "Allow {} to communicate with control plane (kubelet and workload TCP ports)",
                    desc
                ),
                KUBELET_AND_WORKLOAD_PORTS,
            )
            .source_group(&control_plane),
        ),
        (
            "IngressInterClusterAPI",
            INGRESS_TYPE,
            SecurityGroupRule::tcp(
                &local,
                format!(
                    "Allow {} to communicate with control plane (workloads using HTTPS port, commonly used with extension API servers)",
                    desc
                ),
                HTTPS_PORTS,
            )
            .source_group(&control_plane),
        ),
        (
            "EgressInterCluster",
            EGRESS_TYPE,
            SecurityGroupRule::tcp(
                &control_plane,
                format!(
                    "Allow control plane to communicate with {} (kubelet and workload TCP ports)",
                    desc
                ),
                KUBELET_AND_WORKLOAD_PORTS,
            )
            .destination_group(&local),
        ),
        (
            "EgressInterClusterAPI",
            EGRESS_TYPE,
            SecurityGroupRule::tcp(
                &control_plane,
                format!(
                    "Allow control plane to communicate with {} (workloads using HTTPS port, commonly used with extension API servers)",
                    desc
                ),
                HTTPS_PORTS,
            )
            .destination_group(&local),
        ),
        (
            "IngressInterClusterCP",
            INGRESS_TYPE,
            SecurityGroupRule::tcp(
                &control_plane,
                format!("Allow control plane to receive API requests from {}", desc),
                HTTPS_PORTS,
            )
            .source_group(&local),
        ),
    ];
    for (name, resource_type, rule) in rules {
        graph.add_resource(name, Resource::from_properties(resource_type, &rule)?)?;
    }

    if node_group.base.ssh_allowed() {
        let rule = if node_group.base.private_networking {
            SecurityGroupRule::tcp(
                &local,
                format!("Allow SSH access to {} (private, only inside VPC)", desc),
                SSH_PORTS,
            )
            .source_cidr(cluster.vpc_cidr())
        } else {
            SecurityGroupRule::tcp(&local, format!("Allow SSH access to {}", desc), SSH_PORTS)
                .source_cidr("0.0.0.0/0")
        };
        graph.add_resource("SSHIPv4", Resource::from_properties(INGRESS_TYPE, &rule)?)?;
    }

    Ok(groups)
}
