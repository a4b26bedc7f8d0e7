use serde::{Deserialize, Serialize};
use serde_plain::derive_display_from_serialize;

/// Instance series whose members carry GPUs or machine learning accelerators.
const ACCELERATED_SERIES: &[&str] = &["p", "g", "inf", "trn", "dl"];

/// The image families a managed node group can be launched from without a custom image.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AmiType {
    #[serde(rename = "AL2_x86_64")]
    Al2X86_64,
    #[serde(rename = "AL2_x86_64_GPU")]
    Al2X86_64Gpu,
    #[serde(rename = "AL2_ARM_64")]
    Al2Arm64,
}

derive_display_from_serialize!(AmiType);

impl AmiType {
    /// Pick the image family for an instance type. Accelerated types win over ARM types.
    pub fn for_instance_type(instance_type: &str) -> Self {
        if is_gpu_instance_type(instance_type) {
            AmiType::Al2X86_64Gpu
        } else if is_arm_instance_type(instance_type) {
            AmiType::Al2Arm64
        } else {
            AmiType::Al2X86_64
        }
    }

    /// The public SSM parameter holding the recommended image id of this family.
    pub fn ssm_parameter(&self, k8s_version: &str) -> String {
        let flavor = match self {
            AmiType::Al2X86_64 => "amazon-linux-2",
            AmiType::Al2X86_64Gpu => "amazon-linux-2-gpu",
            AmiType::Al2Arm64 => "amazon-linux-2-arm64",
        };
        format!(
            "/aws/service/eks/optimized-ami/{}/{}/recommended/image_id",
            k8s_version, flavor
        )
    }

    /// A dynamic reference that the provisioning engine resolves to the recommended image id.
    pub fn image_id_reference(&self, k8s_version: &str) -> String {
        format!("{{{{resolve:ssm:{}}}}}", self.ssm_parameter(k8s_version))
    }
}

/// Splits an instance family such as `m6gd` into its series (`m`), generation (`6`) and
/// attributes (`gd`).
fn family_parts(instance_type: &str) -> (&str, &str, &str) {
    let family = instance_type.split('.').next().unwrap_or(instance_type);
    let series_end = family
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(family.len());
    let (series, rest) = family.split_at(series_end);
    let generation_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (generation, attributes) = rest.split_at(generation_end);
    (series, generation, attributes)
}

pub fn is_gpu_instance_type(instance_type: &str) -> bool {
    let (series, generation, _) = family_parts(instance_type);
    !generation.is_empty() && ACCELERATED_SERIES.contains(&series)
}

pub fn is_arm_instance_type(instance_type: &str) -> bool {
    let (series, generation, attributes) = family_parts(instance_type);
    (series == "a" && generation == "1") || (!generation.is_empty() && attributes.starts_with('g'))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gpu_types() {
        for instance_type in [
            "p2.xlarge",
            "p3dn.24xlarge",
            "g4dn.xlarge",
            "inf1.xlarge",
            "g5g.xlarge",
        ] {
            assert_eq!(
                AmiType::for_instance_type(instance_type),
                AmiType::Al2X86_64Gpu,
                "{}",
                instance_type
            );
        }
    }

    #[test]
    fn arm_types() {
        for instance_type in [
            "a1.large",
            "m6g.large",
            "c6gn.xlarge",
            "t4g.micro",
            "r6gd.large",
            "im4gn.large",
        ] {
            assert_eq!(
                AmiType::for_instance_type(instance_type),
                AmiType::Al2Arm64,
                "{}",
                instance_type
            );
        }
    }

    #[test]
    fn standard_types() {
        for instance_type in ["m5.large", "c5n.2xlarge", "t3.micro", "mac1.metal", "x1e.xlarge"] {
            assert_eq!(
                AmiType::for_instance_type(instance_type),
                AmiType::Al2X86_64,
                "{}",
                instance_type
            );
        }
    }

    #[test]
    fn display_and_ssm_reference() {
        assert_eq!(AmiType::Al2Arm64.to_string(), "AL2_ARM_64");
        assert_eq!(AmiType::Al2X86_64Gpu.to_string(), "AL2_x86_64_GPU");
        assert_eq!(
            AmiType::Al2X86_64.image_id_reference("1.24"),
            "{{resolve:ssm:/aws/service/eks/optimized-ami/1.24/amazon-linux-2/recommended/image_id}}"
        );
    }
}
