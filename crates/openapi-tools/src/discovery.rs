//! Operation discovery: `OpenAPI` document to naming-engine operations plus tool inputs.

use crate::config::AutoDiscoverConfig;
use crate::error::{OpenApiToolsError, Result};
use crate::resolver::RefResolver;
use crate::schema::{object_properties, to_json_schema};
use openapi_mcp_naming::{HttpMethod, Operation, ParamLocation, Parameter, RequestBodySpec};
use openapiv3::{
    MediaType, OpenAPI, Operation as OpenApiOperation, Parameter as OpenApiParameter,
    ParameterSchemaOrContent, PathItem, ReferenceOr,
};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};

/// Where a tool argument is placed in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgLocation {
    Path,
    Query,
    Header,
    /// One property of a flattened JSON object body.
    BodyField,
    /// The whole request body.
    Body,
}

/// One argument of a generated tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArgument {
    pub name: String,
    pub location: ArgLocation,
    pub required: bool,
    pub schema: Value,
}

/// An operation ready for naming, with the arguments its tool will accept.
#[derive(Debug, Clone)]
pub struct DiscoveredOperation {
    pub operation: Operation,
    pub arguments: Vec<ToolArgument>,
    pub input_schema: Value,
}

impl DiscoveredOperation {
    /// Media type of the request body, if the operation takes one.
    #[must_use]
    pub fn body_content_type(&self) -> Option<&str> {
        self.operation
            .request_body
            .as_ref()
            .and_then(|b| b.content_type.as_deref())
    }
}

/// Methods a path item can carry, in the order used when declaration order is unknown.
const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Order in which methods are declared under each path in the source document.
///
/// `openapiv3::PathItem` has one field per method, so parsing into it loses declaration order.
/// This is read from the raw document instead. Paths it does not know (e.g. `$ref` path items)
/// use [`METHODS`] order.
#[derive(Debug, Clone, Default)]
pub struct MethodOrder {
    by_path: HashMap<String, Vec<String>>,
}

impl MethodOrder {
    /// Read method order from spec text (YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns the parse error if `text` is not YAML.
    pub fn from_text(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Self::from_document(&raw))
    }

    #[must_use]
    pub fn from_document(raw: &serde_yaml::Value) -> Self {
        let by_path = raw
            .get("paths")
            .and_then(serde_yaml::Value::as_mapping)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|(path, item)| {
                        let methods = item
                            .as_mapping()?
                            .keys()
                            .filter_map(serde_yaml::Value::as_str)
                            .map(str::to_ascii_lowercase)
                            .filter(|key| METHODS.contains(&key.as_str()))
                            .collect();
                        Some((path.as_str()?.to_string(), methods))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { by_path }
    }

    fn rank(&self, path: &str, method: &str) -> usize {
        self.by_path
            .get(path)
            .and_then(|methods| methods.iter().position(|m| m == method))
            .unwrap_or(usize::MAX)
    }
}

/// Walk `spec.paths` in document order and convert every admitted operation.
///
/// Within a path, methods are visited in the order `order` recorded for it. Operations that cannot be converted (bad refs, argument clashes) are skipped with a warning.
///
/// # Errors
///
/// Returns an error only if the document cannot be prepared for `$ref` resolution.
pub fn discover_operations(
    spec: &OpenAPI,
    order: &MethodOrder,
    filter: &AutoDiscoverConfig,
) -> Result<Vec<DiscoveredOperation>> {
    let resolver = RefResolver::new(spec)?;
    let mut discovered = Vec::new();

    for (path, item) in &spec.paths.paths {
        let item: PathItem = match resolver.resolve(item) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "skipping path");
                continue;
            }
        };

        for (method, op) in methods_in_order(&item, path, order) {
            if !filter.allows(method, path) {
                tracing::debug!(method, path = %path, "operation filtered out");
                continue;
            }

            match convert_operation(&resolver, path, method, &item.parameters, op) {
                Ok(d) => discovered.push(d),
                Err(e) => {
                    tracing::warn!(
                        method = %method.to_ascii_uppercase(),
                        path = %path,
                        error = %e,
                        "skipping operation"
                    );
                }
            }
        }
    }

    Ok(discovered)
}

fn methods_in_order<'a>(
    item: &'a PathItem,
    path: &str,
    order: &MethodOrder,
) -> Vec<(&'static str, &'a OpenApiOperation)> {
    let mut methods: Vec<_> = METHODS
        .into_iter()
        .zip([
            &item.get,
            &item.put,
            &item.post,
            &item.delete,
            &item.options,
            &item.head,
            &item.patch,
            &item.trace,
        ])
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect();
    methods.sort_by_key(|(method, _)| order.rank(path, method));
    methods
}

fn convert_operation(
    resolver: &RefResolver,
    path: &str,
    method: &str,
    path_item_params: &[ReferenceOr<OpenApiParameter>],
    op: &OpenApiOperation,
) -> Result<DiscoveredOperation> {
    let mut operation = Operation::new(HttpMethod::parse(method), path);
    operation.identifier = op.operation_id.clone().unwrap_or_default();
    operation.summary.clone_from(&op.summary);
    operation.description.clone_from(&op.description);

    let mut arguments = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();

    for param in merge_parameters(resolver, path_item_params, &op.parameters)? {
        let (parameter, arg_location) = convert_parameter(resolver, &param);
        operation.parameters.push(parameter.clone());

        let Some(location) = arg_location else {
            tracing::debug!(name = %parameter.name, path, "cookie parameter is not forwarded");
            continue;
        };
        claim(&mut taken, &parameter.name, method, path)?;
        arguments.push(ToolArgument {
            name: parameter.name,
            location,
            required: parameter.required,
            schema: parameter.schema,
        });
    }

    if let Some(body_ref) = &op.request_body {
        let body = resolver.resolve(body_ref)?;
        let (content_type, media) = pick_media_type(&body.content);
        let schema = media
            .and_then(|m| m.schema.as_ref())
            .map_or_else(|| json!({}), |s| to_json_schema(s, resolver));

        let flattened = content_type
            .as_deref()
            .is_some_and(is_json_media_type)
            .then(|| object_properties(&schema))
            .flatten();

        if let Some((properties, required)) = flattened {
            for (name, prop_schema) in properties {
                claim(&mut taken, name, method, path)?;
                arguments.push(ToolArgument {
                    name: name.clone(),
                    location: ArgLocation::BodyField,
                    required: body.required && required.contains(&name.as_str()),
                    schema: prop_schema.clone(),
                });
            }
        } else {
            claim(&mut taken, "body", method, path)?;
            arguments.push(ToolArgument {
                name: "body".to_string(),
                location: ArgLocation::Body,
                required: body.required,
                schema: schema.clone(),
            });
        }

        operation.request_body = Some(RequestBodySpec {
            required: body.required,
            content_type,
            schema,
        });
    }

    let input_schema = build_input_schema(&arguments);
    Ok(DiscoveredOperation {
        operation,
        arguments,
        input_schema,
    })
}

fn claim(taken: &mut HashSet<String>, name: &str, method: &str, path: &str) -> Result<()> {
    if taken.insert(name.to_string()) {
        return Ok(());
    }
    Err(OpenApiToolsError::OpenApi(format!(
        "argument '{name}' appears more than once in {} {path}",
        method.to_ascii_uppercase()
    )))
}

/// Path-item parameters first, then operation parameters; an operation parameter replaces a
/// path-item one with the same name and location.
fn merge_parameters(
    resolver: &RefResolver,
    path_item_params: &[ReferenceOr<OpenApiParameter>],
    operation_params: &[ReferenceOr<OpenApiParameter>],
) -> Result<Vec<OpenApiParameter>> {
    let mut merged: Vec<OpenApiParameter> = Vec::new();

    for p in path_item_params.iter().chain(operation_params) {
        let resolved = resolver.resolve(p)?;
        let key = parameter_key(&resolved);
        match merged.iter().position(|m| parameter_key(m) == key) {
            Some(i) => merged[i] = resolved,
            None => merged.push(resolved),
        }
    }

    Ok(merged)
}

fn parameter_key(p: &OpenApiParameter) -> (ParamLocation, &str) {
    (openapi_location(p), p.parameter_data_ref().name.as_str())
}

fn openapi_location(p: &OpenApiParameter) -> ParamLocation {
    match p {
        OpenApiParameter::Path { .. } => ParamLocation::Path,
        OpenApiParameter::Query { .. } => ParamLocation::Query,
        OpenApiParameter::Header { .. } => ParamLocation::Header,
        OpenApiParameter::Cookie { .. } => ParamLocation::Cookie,
    }
}

/// Naming-engine parameter, plus where it is forwarded (`None` for cookies).
fn convert_parameter(
    resolver: &RefResolver,
    param: &OpenApiParameter,
) -> (Parameter, Option<ArgLocation>) {
    let data = param.parameter_data_ref();
    let location = openapi_location(param);

    let mut schema = match &data.format {
        ParameterSchemaOrContent::Schema(s) => to_json_schema(s, resolver),
        ParameterSchemaOrContent::Content(content) => pick_media_type(content)
            .1
            .and_then(|m| m.schema.as_ref())
            .map_or_else(|| json!({ "type": "string" }), |s| to_json_schema(s, resolver)),
    };
    if let (Some(obj), Some(desc)) = (schema.as_object_mut(), &data.description)
        && !obj.contains_key("description")
    {
        obj.insert("description".to_string(), Value::String(desc.clone()));
    }

    let parameter = Parameter {
        name: data.name.clone(),
        location,
        // Path parameters are always required, whatever the document says.
        required: location == ParamLocation::Path || data.required,
        schema,
    };
    let arg_location = match location {
        ParamLocation::Path => Some(ArgLocation::Path),
        ParamLocation::Query => Some(ArgLocation::Query),
        ParamLocation::Header => Some(ArgLocation::Header),
        ParamLocation::Cookie => None,
    };
    (parameter, arg_location)
}

/// Prefer `application/json`, then any JSON-flavoured type, then the first declared one.
fn pick_media_type<'a, I>(content: I) -> (Option<String>, Option<&'a MediaType>)
where
    I: IntoIterator<Item = (&'a String, &'a MediaType)>,
{
    let entries: Vec<(&String, &MediaType)> = content.into_iter().collect();
    let chosen = entries
        .iter()
        .find(|(ct, _)| ct.eq_ignore_ascii_case("application/json"))
        .or_else(|| entries.iter().find(|(ct, _)| is_json_media_type(ct)))
        .or_else(|| entries.first());

    match chosen {
        Some((ct, media)) => (Some((*ct).clone()), Some(*media)),
        None => (None, None),
    }
}

pub(crate) fn is_json_media_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("json")
}

fn build_input_schema(arguments: &[ToolArgument]) -> Value {
    let properties: Map<String, Value> = arguments
        .iter()
        .map(|a| (a.name.clone(), a.schema.clone()))
        .collect();
    let required: Vec<&str> = arguments
        .iter()
        .filter(|a| a.required)
        .map(|a| a.name.as_str())
        .collect();

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}
