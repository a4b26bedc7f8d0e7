use crate::error::{self, Result};
use crate::providers::ValueImporter;
use indexmap::{IndexMap, IndexSet};
use log::trace;
use serde::Serialize;
use serde_json::{json, Value};
use snafu::{ensure, ResultExt};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// The pseudo parameter holding the name of the stack the graph is submitted as.
pub const STACK_NAME: &str = "AWS::StackName";

/// `{"Ref": name}`
pub fn make_ref<S: AsRef<str>>(name: S) -> Value {
    json!({ "Ref": name.as_ref() })
}

/// `{"Fn::GetAtt": [resource, attribute]}`
pub fn make_get_att<S1, S2>(resource: S1, attribute: S2) -> Value
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    json!({ "Fn::GetAtt": [resource.as_ref(), attribute.as_ref()] })
}

/// `{"Fn::Sub": template}`
pub fn make_sub<S: AsRef<str>>(template: S) -> Value {
    json!({ "Fn::Sub": template.as_ref() })
}

/// `{"Fn::Split": [delimiter, source]}`
pub fn make_split<S: AsRef<str>>(delimiter: S, source: Value) -> Value {
    json!({ "Fn::Split": [delimiter.as_ref(), source] })
}

/// `{"Fn::ImportValue": "<stack>::<output>"}`
pub fn make_import_value<S1, S2>(stack_name: S1, output_key: S2) -> Value
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    json!({ "Fn::ImportValue": import_name(stack_name, output_key) })
}

/// The name under which a stack exports one of its outputs.
pub fn import_name<S1, S2>(stack_name: S1, output_key: S2) -> String
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    format!("{}::{}", stack_name.as_ref(), output_key.as_ref())
}

/// A single resource definition of the graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<Value>,
}

impl Resource {
    pub fn new<S: Into<String>>(resource_type: S, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            update_policy: None,
        }
    }

    /// Build a resource from any serializable properties struct.
    pub fn from_properties<S, P>(resource_type: S, properties: &P) -> Result<Self>
    where
        S: Into<String>,
        P: Serialize,
    {
        Ok(Self::new(
            resource_type,
            serde_json::to_value(properties).context(error::JsonSerializeSnafu)?,
        ))
    }

    pub fn with_update_policy(mut self, update_policy: Value) -> Self {
        self.update_policy = Some(update_policy);
        self
    }

    /// Look up a top level property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: Value,
}

/// An insertion-ordered collection of named resources together with the description and outputs
/// of the document they are rendered into. Names are unique across resources and across outputs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceGraph {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: String,

    description: String,

    resources: IndexMap<String, Resource>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    outputs: IndexMap<String, Output>,

    #[serde(skip)]
    imports: IndexSet<String>,
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: String::new(),
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
            imports: IndexSet::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description<S: Into<String>>(&mut self, description: S) {
        self.description = description.into();
    }

    /// Register a resource and return a `Ref` to it. Fails if the name is already taken.
    pub fn add_resource<S: Into<String>>(&mut self, name: S, resource: Resource) -> Result<Value> {
        let name = name.into();
        ensure!(
            !self.resources.contains_key(&name),
            error::ResourceNameCollisionSnafu { name }
        );
        trace!("Adding resource '{}' of type '{}'", name, resource.resource_type);
        let reference = make_ref(&name);
        self.resources.insert(name, resource);
        Ok(reference)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Resources in the order they were registered.
    pub fn resources(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources.iter()
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Declare an output. When `export` is set the output is exported as
    /// `${AWS::StackName}::<name>` so that other stacks can import it.
    pub fn define_output<S: Into<String>>(
        &mut self,
        name: S,
        value: Value,
        export: bool,
    ) -> Result<()> {
        let name = name.into();
        ensure!(
            !self.outputs.contains_key(&name),
            error::ResourceNameCollisionSnafu { name }
        );
        let export = export.then(|| Export {
            name: make_sub(format!("${{{}}}::{}", STACK_NAME, name)),
        });
        self.outputs.insert(name, Output { value, export });
        Ok(())
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    /// Produce a deferred reference to an output of another stack and remember that the graph
    /// depends on it.
    pub fn import_value(
        &mut self,
        importer: &dyn ValueImporter,
        stack_name: &str,
        output_key: &str,
    ) -> Value {
        self.imports.insert(import_name(stack_name, output_key));
        importer.import_value(stack_name, output_key)
    }

    /// Every `<stack>::<output>` the graph imports, in first-use order.
    pub fn imports(&self) -> impl Iterator<Item = &String> {
        self.imports.iter()
    }

    /// Render the graph as the provisioning engine's JSON document.
    pub fn render_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context(error::JsonSerializeSnafu)
    }
}
