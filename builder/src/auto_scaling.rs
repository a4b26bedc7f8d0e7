use crate::error::Result;
use crate::scaling::ScalingBounds;
use crate::tags::PropagatedTag;
use crate::template::{make_get_att, Resource};
use nodegroup_model::{InstancesDistribution, NodeGroup};
use serde::Serialize;
use serde_json::{json, Value};

pub const AUTO_SCALING_GROUP_TYPE: &str = "AWS::AutoScaling::AutoScalingGroup";

/// How the scaling resource of a self-managed node group is built.
#[derive(Clone, Debug, PartialEq)]
pub enum SelfManagedScaling<'a> {
    /// The auto scaling group is replaced by a resource from an alternate provider.
    Alternate,
    /// An auto scaling group launching a single instance type from the launch template.
    LaunchTemplate,
    /// An auto scaling group spreading nodes over the instance types of a distribution.
    MixedInstances(&'a InstancesDistribution),
}

impl<'a> SelfManagedScaling<'a> {
    pub fn for_node_group(node_group: &'a NodeGroup) -> Self {
        if node_group.spot_ocean.is_some() {
            return SelfManagedScaling::Alternate;
        }
        match &node_group.instances_distribution {
            Some(distribution) if node_group.has_mixed_instances() => {
                SelfManagedScaling::MixedInstances(distribution)
            }
            _ => SelfManagedScaling::LaunchTemplate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LaunchTemplateSpecification {
    launch_template_name: Value,
    version: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MixedInstancesPolicy {
    launch_template: MixedLaunchTemplate,
    instances_distribution: Distribution,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MixedLaunchTemplate {
    launch_template_specification: LaunchTemplateSpecification,
    overrides: Vec<InstanceTypeOverride>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceTypeOverride {
    instance_type: String,
}

/// Only the fields the caller set are rendered, the provisioning engine defaults the rest.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Distribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    spot_max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_demand_base_capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_demand_percentage_above_base_capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spot_instance_pools: Option<String>,
}

impl From<&InstancesDistribution> for Distribution {
    fn from(distribution: &InstancesDistribution) -> Self {
        Self {
            spot_max_price: distribution.max_price.map(|price| format!("{:.6}", price)),
            on_demand_base_capacity: distribution
                .on_demand_base_capacity
                .map(|value| value.to_string()),
            on_demand_percentage_above_base_capacity: distribution
                .on_demand_percentage_above_base_capacity
                .map(|value| value.to_string()),
            spot_instance_pools: distribution
                .spot_instance_pools
                .map(|value| value.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AutoScalingGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    launch_template: Option<LaunchTemplateSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mixed_instances_policy: Option<MixedInstancesPolicy>,
    #[serde(rename = "VPCZoneIdentifier")]
    vpc_zone_identifier: Value,
    tags: Vec<PropagatedTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_capacity: Option<String>,
    min_size: String,
    max_size: String,
    #[serde(rename = "TargetGroupARNs", skip_serializing_if = "Vec::is_empty")]
    target_group_arns: Vec<String>,
}

/// Build the auto scaling group of a self-managed node group on top of the launch template
/// registered as `launch_template_resource`. Nodes are replaced one at a time on update.
pub fn auto_scaling_group(
    node_group: &NodeGroup,
    scaling: &SelfManagedScaling<'_>,
    bounds: &ScalingBounds,
    launch_template_name: Value,
    launch_template_resource: &str,
    vpc_zone_identifier: Value,
    tags: Vec<PropagatedTag>,
) -> Result<Resource> {
    let specification = LaunchTemplateSpecification {
        launch_template_name,
        version: make_get_att(launch_template_resource, "LatestVersionNumber"),
    };

    let (launch_template, mixed_instances_policy) = match scaling {
        SelfManagedScaling::MixedInstances(distribution) => (
            None,
            Some(MixedInstancesPolicy {
                launch_template: MixedLaunchTemplate {
                    launch_template_specification: specification,
                    overrides: distribution
                        .instance_types
                        .iter()
                        .map(|instance_type| InstanceTypeOverride {
                            instance_type: instance_type.clone(),
                        })
                        .collect(),
                },
                instances_distribution: Distribution::from(*distribution),
            }),
        ),
        _ => (Some(specification), None),
    };

    let properties = AutoScalingGroupProperties {
        launch_template,
        mixed_instances_policy,
        vpc_zone_identifier,
        tags,
        desired_capacity: bounds.desired.map(|desired| desired.to_string()),
        min_size: bounds.min.to_string(),
        max_size: bounds.max.to_string(),
        target_group_arns: node_group.target_group_arns.clone(),
    };

    Ok(
        Resource::from_properties(AUTO_SCALING_GROUP_TYPE, &properties)?.with_update_policy(
            json!({
                "AutoScalingRollingUpdate": {
                    "MinInstancesInService": "0",
                    "MaxBatchSize": "1",
                }
            }),
        ),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::template::make_sub;
    use maplit::hashmap;

    fn bounds() -> ScalingBounds {
        ScalingBounds {
            min: 1,
            max: 3,
            desired: None,
        }
    }

    fn build(node_group: &NodeGroup) -> Value {
        let scaling = SelfManagedScaling::for_node_group(node_group);
        auto_scaling_group(
            node_group,
            &scaling,
            &bounds(),
            make_sub("${AWS::StackName}"),
            "NodeGroupLaunchTemplate",
            json!(["subnet-1"]),
            vec![PropagatedTag::new("Name", "c-ng-Node")],
        )
        .unwrap()
        .properties
    }

    #[test]
    fn variant_selection() {
        let mut ng = NodeGroup::default();
        assert_eq!(
            SelfManagedScaling::for_node_group(&ng),
            SelfManagedScaling::LaunchTemplate
        );

        ng.instances_distribution = Some(InstancesDistribution::default());
        assert_eq!(
            SelfManagedScaling::for_node_group(&ng),
            SelfManagedScaling::LaunchTemplate
        );

        ng.instances_distribution = Some(InstancesDistribution {
            instance_types: vec!["m5.large".to_string()],
            ..Default::default()
        });
        assert!(matches!(
            SelfManagedScaling::for_node_group(&ng),
            SelfManagedScaling::MixedInstances(_)
        ));

        ng.spot_ocean = Some(Default::default());
        assert_eq!(
            SelfManagedScaling::for_node_group(&ng),
            SelfManagedScaling::Alternate
        );
    }

    #[test]
    fn single_instance_type() {
        let properties = build(&NodeGroup::default());
        assert_eq!(
            properties["LaunchTemplate"],
            json!({
                "LaunchTemplateName": { "Fn::Sub": "${AWS::StackName}" },
                "Version": { "Fn::GetAtt": ["NodeGroupLaunchTemplate", "LatestVersionNumber"] },
            })
        );
        assert!(properties.get("MixedInstancesPolicy").is_none());
        assert!(properties.get("DesiredCapacity").is_none());
        assert!(properties.get("TargetGroupARNs").is_none());
        assert_eq!(properties["MinSize"], "1");
        assert_eq!(properties["MaxSize"], "3");
        assert_eq!(properties["VPCZoneIdentifier"], json!(["subnet-1"]));
    }

    #[test]
    fn mixed_instances_keep_order_and_set_fields() {
        let ng = NodeGroup {
            instances_distribution: Some(InstancesDistribution {
                instance_types: vec![
                    "t3.large".to_string(),
                    "m5.large".to_string(),
                    "c5.large".to_string(),
                ],
                max_price: Some(0.017),
                on_demand_percentage_above_base_capacity: Some(0),
                ..Default::default()
            }),
            target_group_arns: vec!["arn:tg".to_string()],
            ..Default::default()
        };
        let properties = build(&ng);
        let policy = &properties["MixedInstancesPolicy"];
        assert_eq!(
            policy["LaunchTemplate"]["Overrides"],
            json!([
                { "InstanceType": "t3.large" },
                { "InstanceType": "m5.large" },
                { "InstanceType": "c5.large" },
            ])
        );
        let distribution: std::collections::HashMap<String, String> =
            serde_json::from_value(policy["InstancesDistribution"].clone()).unwrap();
        assert_eq!(
            distribution,
            hashmap! {
                "SpotMaxPrice".to_string() => "0.017000".to_string(),
                "OnDemandPercentageAboveBaseCapacity".to_string() => "0".to_string(),
            }
        );
        assert!(properties.get("LaunchTemplate").is_none());
        assert_eq!(properties["TargetGroupARNs"], json!(["arn:tg"]));
    }
}
