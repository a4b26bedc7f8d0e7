use crate::ami::AmiType;
use crate::error::{self, Result};
use crate::providers::FetchedLaunchTemplate;
use crate::template::{make_sub, Resource, STACK_NAME};
use nodegroup_model::{ClusterConfig, ManagedNodeGroup, NodeGroup, NodeGroupBase, VolumeType};
use serde::Serialize;
use serde_json::Value;
use snafu::ensure;

pub const LAUNCH_TEMPLATE_RESOURCE_TYPE: &str = "AWS::EC2::LaunchTemplate";

/// The launch specification nodes are started from. Unset fields are left out of the rendered
/// resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<IamInstanceProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network_interfaces: Vec<NetworkInterface>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebs_optimized: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_device_mappings: Vec<BlockDeviceMapping>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_specifications: Vec<TagSpecification>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamInstanceProfile {
    pub arn: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub associate_public_ip_address: bool,
    pub device_index: i32,
    pub groups: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub ebs: Ebs,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ebs {
    pub volume_size: i32,
    pub volume_type: VolumeType,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagSpecification {
    pub resource_type: String,
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A launch template resource, named after the stack it is created in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplate {
    pub launch_template_name: Value,
    pub launch_template_data: LaunchTemplateData,
}

impl LaunchTemplate {
    pub fn new(launch_template_data: LaunchTemplateData) -> Self {
        Self {
            launch_template_name: make_sub(format!("${{{}}}", STACK_NAME)),
            launch_template_data,
        }
    }

    pub fn to_resource(&self) -> Result<Resource> {
        Resource::from_properties(LAUNCH_TEMPLATE_RESOURCE_TYPE, self)
    }
}

/// The root volume of a node. Nothing is mapped unless a positive volume size is set.
fn block_device_mapping(base: &NodeGroupBase) -> Option<BlockDeviceMapping> {
    let volume_size = base.volume_size.filter(|size| *size > 0)?;
    let volume_type = base.volume_type();
    Some(BlockDeviceMapping {
        device_name: base.volume_name().to_string(),
        ebs: Ebs {
            volume_size,
            volume_type,
            encrypted: base.volume_encrypted.unwrap_or(false),
            kms_key_id: base
                .volume_kms_key_id
                .as_ref()
                .filter(|key| !key.is_empty())
                .cloned(),
            iops: (volume_type == VolumeType::Io1).then(|| base.volume_iops()),
        },
    })
}

/// Build the launch specification of a self-managed node group.
///
/// The instance profile is always the one resolved by the builder. Without a custom image, the
/// recommended image of the inferred image family is resolved from its public SSM parameter.
pub fn self_managed_launch_template_data(
    cluster: &ClusterConfig,
    node_group: &NodeGroup,
    instance_profile_arn: Value,
    user_data: String,
    security_groups: Vec<Value>,
) -> LaunchTemplateData {
    let base = &node_group.base;
    let instance_type = node_group.launch_instance_type();
    let image_id = match base.custom_ami() {
        Some(ami) => ami.to_string(),
        None => AmiType::for_instance_type(instance_type).image_id_reference(cluster.version()),
    };

    LaunchTemplateData {
        iam_instance_profile: Some(IamInstanceProfile {
            arn: instance_profile_arn,
        }),
        image_id: Some(image_id),
        user_data: Some(user_data),
        network_interfaces: vec![NetworkInterface {
            associate_public_ip_address: !base.private_networking,
            device_index: 0,
            groups: security_groups,
        }],
        instance_type: Some(instance_type.to_string()),
        ebs_optimized: node_group.ebs_optimized,
        key_name: base.public_key_name().map(str::to_string),
        block_device_mappings: block_device_mapping(base).into_iter().collect(),
        tag_specifications: Vec::new(),
    }
}

/// Build the inline launch specification of a managed node group. The provider injects the
/// instance profile, so none is set here. `user_data` is only used together with a custom image.
pub fn managed_launch_template_data(
    node_group: &ManagedNodeGroup,
    user_data: Option<String>,
) -> LaunchTemplateData {
    let base = &node_group.base;
    let image_id = base.custom_ami().map(str::to_string);
    let user_data = image_id.as_ref().and(user_data);

    let tag_specifications = if base.tags.is_empty() {
        Vec::new()
    } else {
        vec![TagSpecification {
            resource_type: "instance".to_string(),
            tags: base
                .tags
                .iter()
                .map(|(key, value)| Tag {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }]
    };

    LaunchTemplateData {
        image_id,
        user_data,
        instance_type: Some(base.instance_type().to_string()),
        key_name: base.public_key_name().map(str::to_string),
        block_device_mappings: block_device_mapping(base).into_iter().collect(),
        tag_specifications,
        ..Default::default()
    }
}

/// Check that a launch template created outside of the builder can back a managed node group.
pub fn validate_launch_template(
    launch_template: &FetchedLaunchTemplate,
    node_group: &ManagedNodeGroup,
    template_id: &str,
) -> Result<()> {
    ensure!(
        launch_template.instance_type.is_some(),
        error::MissingInstanceTypeSnafu {
            template: template_id
        }
    );

    if launch_template.image_id.is_some() {
        ensure!(
            launch_template.user_data.is_some(),
            error::MissingUserDataSnafu {
                template: template_id
            }
        );
        ensure!(
            node_group.base.custom_ami().is_none(),
            error::ConflictingAmiSpecificationSnafu {
                nodegroup: node_group.name(),
                template: template_id,
            }
        );
    }

    let profile_arn = launch_template
        .iam_instance_profile
        .as_ref()
        .and_then(|profile| profile.arn.as_ref());
    ensure!(
        profile_arn.is_none(),
        error::ForbiddenInstanceProfileSnafu {
            template: template_id
        }
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::providers::FetchedInstanceProfile;
    use nodegroup_model::{InstancesDistribution, NodeGroupSsh};
    use serde_json::json;

    fn fetched() -> FetchedLaunchTemplate {
        FetchedLaunchTemplate {
            instance_type: Some("m5.xlarge".to_string()),
            ..Default::default()
        }
    }

    fn managed(ami: Option<&str>) -> ManagedNodeGroup {
        ManagedNodeGroup {
            base: NodeGroupBase {
                name: "mng".to_string(),
                ami: ami.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn validation_order() {
        let ng = managed(None);
        assert!(validate_launch_template(&fetched(), &ng, "lt-1").is_ok());

        let no_type = FetchedLaunchTemplate {
            instance_type: None,
            image_id: Some("ami-1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_launch_template(&no_type, &ng, "lt-1"),
            Err(crate::Error::MissingInstanceType { .. })
        ));

        let mut custom_image = fetched();
        custom_image.image_id = Some("ami-1".to_string());
        custom_image.iam_instance_profile = Some(FetchedInstanceProfile {
            arn: Some("arn:aws:iam::123456789012:instance-profile/p".to_string()),
            name: None,
        });
        assert!(matches!(
            validate_launch_template(&custom_image, &ng, "lt-1"),
            Err(crate::Error::MissingUserData { .. })
        ));

        custom_image.user_data = Some("IyEvYmluL2Jhc2g=".to_string());
        assert!(matches!(
            validate_launch_template(&custom_image, &managed(Some("ami-2")), "lt-1"),
            Err(crate::Error::ConflictingAmiSpecification { .. })
        ));
        assert!(matches!(
            validate_launch_template(&custom_image, &ng, "lt-1"),
            Err(crate::Error::ForbiddenInstanceProfile { .. })
        ));
    }

    #[test]
    fn profile_name_alone_is_allowed() {
        let mut template = fetched();
        template.iam_instance_profile = Some(FetchedInstanceProfile {
            arn: None,
            name: Some("profile".to_string()),
        });
        assert!(validate_launch_template(&template, &managed(None), "lt-1").is_ok());
    }

    #[test]
    fn block_device_only_with_positive_size() {
        let mut base = NodeGroupBase::default();
        assert!(block_device_mapping(&base).is_none());
        base.volume_size = Some(0);
        assert!(block_device_mapping(&base).is_none());

        base.volume_size = Some(80);
        base.volume_iops = Some(5000);
        let mapping = block_device_mapping(&base).unwrap();
        assert_eq!(
            serde_json::to_value(&mapping).unwrap(),
            json!({
                "DeviceName": "/dev/xvda",
                "Ebs": { "VolumeSize": 80, "VolumeType": "gp3", "Encrypted": false }
            })
        );

        base.volume_type = Some(VolumeType::Io1);
        base.volume_kms_key_id = Some("key-1".to_string());
        let mapping = block_device_mapping(&base).unwrap();
        assert_eq!(mapping.ebs.iops, Some(5000));
        assert_eq!(mapping.ebs.kms_key_id.as_deref(), Some("key-1"));
    }

    #[test]
    fn self_managed_data() {
        let cluster = ClusterConfig::default();
        let ng = NodeGroup {
            base: NodeGroupBase {
                name: "ng".to_string(),
                private_networking: true,
                ssh: Some(NodeGroupSsh {
                    allow: Some(true),
                    public_key_name: Some(String::new()),
                    enable_ssm: None,
                }),
                ..Default::default()
            },
            instances_distribution: Some(InstancesDistribution {
                instance_types: vec!["g4dn.xlarge".to_string(), "p3.2xlarge".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let data = self_managed_launch_template_data(
            &cluster,
            &ng,
            json!("arn:profile"),
            "dXNlcmRhdGE=".to_string(),
            vec![json!("sg-1")],
        );
        let rendered = serde_json::to_value(&data).unwrap();
        assert_eq!(rendered["InstanceType"], "g4dn.xlarge");
        assert_eq!(
            rendered["ImageId"],
            "{{resolve:ssm:/aws/service/eks/optimized-ami/1.24/amazon-linux-2-gpu/recommended/image_id}}"
        );
        assert_eq!(
            rendered["NetworkInterfaces"],
            json!([{ "AssociatePublicIpAddress": false, "DeviceIndex": 0, "Groups": ["sg-1"] }])
        );
        assert_eq!(rendered["IamInstanceProfile"], json!({ "Arn": "arn:profile" }));
        // empty key names are not set
        assert!(rendered.get("KeyName").is_none());
        assert!(rendered.get("EbsOptimized").is_none());
        assert!(rendered.get("BlockDeviceMappings").is_none());
    }

    #[test]
    fn managed_data_drops_user_data_without_image() {
        let data = managed_launch_template_data(&managed(None), Some("data".to_string()));
        assert!(data.image_id.is_none());
        assert!(data.user_data.is_none());
        assert!(data.iam_instance_profile.is_none());

        let data = managed_launch_template_data(&managed(Some("ami-1")), Some("data".to_string()));
        assert_eq!(data.image_id.as_deref(), Some("ami-1"));
        assert_eq!(data.user_data.as_deref(), Some("data"));
    }
}
