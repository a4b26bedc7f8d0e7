use crate::error::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::Debug;

/// The `Configuration` trait is for the top-level documents that describe a cluster and its node
/// groups. These are typically written by hand as YAML or JSON, e.g.
///
/// ```yaml
/// name: ng-1
/// instanceType: m5.large
/// desiredCapacity: 3
/// privateNetworking: true
/// ```
///
/// The traits aggregated by `Configuration` are typical of "plain old data" types and give callers
/// a uniform way to move these documents in and out of untyped serde values.
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
    /// Convert the `Configuration` object to a serde `Map`.
    fn into_map(self) -> Result<Map<String, Value>> {
        match self.into_value()? {
            Value::Object(map) => Ok(map),
            _ => Err(error::ConfigWrongValueTypeSnafu {}.build().into()),
        }
    }

    /// Convert the `Configuration` object to a serde `Value`.
    fn into_value(self) -> Result<Value> {
        Ok(serde_json::to_value(self).context(error::ConfigSerializationSnafu)?)
    }

    /// Deserialize the `Configuration` object from a serde `Map`.
    fn from_map(map: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(map))
    }

    /// Deserialize the `Configuration` object from a serde `Value`.
    fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value).context(error::ConfigDeserializationSnafu)?)
    }

    /// Deserialize the `Configuration` object from a YAML document.
    fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s).context(error::YamlDeserializationSnafu)?)
    }
}
