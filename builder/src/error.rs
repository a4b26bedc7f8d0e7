use snafu::Snafu;

/// The error type returned by collaborators (role provisioning, bootstrap data, launch-template
/// fetching and alternate scaling providers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure aborts the synthesis of the node group; partial graphs are never returned.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "VPC doesn't have enough subnets for nodegroup AZs (subnets={:?} AZs={:?})",
        subnets,
        availability_zones
    ))]
    InsufficientSubnets {
        subnets: Vec<String>,
        availability_zones: Vec<String>,
    },

    #[snafu(display(
        "VPC doesn't have subnets in {} (subnets={:?} AZs={:?})",
        availability_zone,
        subnets,
        availability_zones
    ))]
    UnresolvedSubnet {
        availability_zone: String,
        subnets: Vec<String>,
        availability_zones: Vec<String>,
    },

    #[snafu(display(
        "cannot use {} and {} at the same time for nodegroup '{}'",
        first,
        second,
        nodegroup
    ))]
    InvalidScalingBounds {
        nodegroup: String,
        first: String,
        second: String,
    },

    #[snafu(display("instance type must be set in the launch template '{}'", template))]
    MissingInstanceType { template: String },

    #[snafu(display(
        "node bootstrapping script (UserData) must be set when using a custom AMI in launch template '{}'",
        template
    ))]
    MissingUserData { template: String },

    #[snafu(display(
        "cannot set the AMI of nodegroup '{}' when launch template '{}' sets an ImageId",
        nodegroup,
        template
    ))]
    ConflictingAmiSpecification { nodegroup: String, template: String },

    #[snafu(display(
        "IAM instance profile must not be set in the launch template '{}'",
        template
    ))]
    ForbiddenInstanceProfile { template: String },

    #[snafu(display("Unable to fetch launch template '{}': {}", template, source))]
    ExternalFetch { template: String, source: BoxError },

    #[snafu(display("A resource or output named '{}' already exists", name))]
    ResourceNameCollision { name: String },

    #[snafu(display("Unable to create IAM role for nodegroup '{}': {}", nodegroup, source))]
    RoleProvisioning { nodegroup: String, source: BoxError },

    #[snafu(display(
        "Unable to create bootstrap user data for nodegroup '{}': {}",
        nodegroup,
        source
    ))]
    Bootstrap { nodegroup: String, source: BoxError },

    #[snafu(display(
        "Alternate scaling provider failed for nodegroup '{}': {}",
        nodegroup,
        source
    ))]
    AlternateProvider { nodegroup: String, source: BoxError },

    #[snafu(display("Could not serialize resource graph: {}", source))]
    JsonSerialize { source: serde_json::Error },
}
