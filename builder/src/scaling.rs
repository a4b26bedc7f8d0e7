use crate::error::{self, Result};
use log::info;
use nodegroup_model::constants::DEFAULT_NODE_COUNT;
use snafu::ensure;
use std::fmt::{Display, Formatter};

/// Fully resolved scaling bounds. `min <= max` always holds, and `min <= desired <= max` holds
/// when a desired capacity is set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalingBounds {
    pub min: i32,
    pub max: i32,
    pub desired: Option<i32>,
}

/// An automatic default that was applied while reconciling scaling bounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScalingNotice {
    MinSizeDefaulted { nodegroup: String, min: i32 },
    MaxSizeDefaulted { nodegroup: String, max: i32 },
}

impl Display for ScalingNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalingNotice::MinSizeDefaulted { nodegroup, min } => write!(
                f,
                "minSize={} was set automatically for nodegroup {}",
                min, nodegroup
            ),
            ScalingNotice::MaxSizeDefaulted { nodegroup, max } => write!(
                f,
                "maxSize={} was set automatically for nodegroup {}",
                max, nodegroup
            ),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reconciled {
    pub bounds: ScalingBounds,
    pub notices: Vec<ScalingNotice>,
}

/// Derive the scaling bounds of `nodegroup` from partially specified input.
///
/// A missing minimum becomes the desired capacity (or the default node count) and a missing
/// maximum becomes the desired capacity (or the minimum). A desired capacity outside of explicitly
/// given bounds, or a maximum below the minimum, is an error.
pub fn reconcile(
    nodegroup: &str,
    min: Option<i32>,
    max: Option<i32>,
    desired: Option<i32>,
) -> Result<Reconciled> {
    let mut notices = Vec::new();

    let min = match (min, desired) {
        (None, _) => {
            let min = desired.unwrap_or(DEFAULT_NODE_COUNT);
            notices.push(ScalingNotice::MinSizeDefaulted {
                nodegroup: nodegroup.to_string(),
                min,
            });
            min
        }
        (Some(min), Some(desired)) => {
            ensure!(
                desired >= min,
                error::InvalidScalingBoundsSnafu {
                    nodegroup,
                    first: format!("minSize={}", min),
                    second: format!("desiredCapacity={}", desired),
                }
            );
            min
        }
        (Some(min), None) => min,
    };

    let max = match (max, desired) {
        (None, _) => {
            let max = desired.unwrap_or(min);
            notices.push(ScalingNotice::MaxSizeDefaulted {
                nodegroup: nodegroup.to_string(),
                max,
            });
            max
        }
        (Some(max), Some(desired)) if desired > max => {
            return error::InvalidScalingBoundsSnafu {
                nodegroup,
                first: format!("maxSize={}", max),
                second: format!("desiredCapacity={}", desired),
            }
            .fail();
        }
        (Some(max), _) => {
            ensure!(
                max >= min,
                error::InvalidScalingBoundsSnafu {
                    nodegroup,
                    first: format!("minSize={}", min),
                    second: format!("maxSize={}", max),
                }
            );
            max
        }
    };

    for notice in &notices {
        info!("{}", notice);
    }

    Ok(Reconciled {
        bounds: ScalingBounds { min, max, desired },
        notices,
    })
}
