//! OpenAPI 3.0 document assembled from registered [`OperationSpec`]s.

use std::collections::BTreeMap;

use modkit::api::{OperationSpec, ParamLocation};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model::ComponentsRegistry;

#[derive(Serialize)]
pub struct OpenApi {
    pub openapi: &'static str,
    pub info: OpenApiInfo,
    pub paths: BTreeMap<String, BTreeMap<String, Value>>,
    pub components: OpenApiComponents,
}

#[derive(Serialize)]
pub struct OpenApiInfo {
    pub title: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Serialize, Default)]
pub struct OpenApiComponents {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
}

pub fn build_document<'a>(
    specs: impl IntoIterator<Item = &'a OperationSpec>,
    components: &ComponentsRegistry,
) -> anyhow::Result<OpenApi> {
    let mut paths: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for spec in specs {
        paths
            .entry(spec.path.clone())
            .or_default()
            .insert(spec.method.as_str().to_lowercase(), operation(spec, components));
    }

    let mut schemas = BTreeMap::new();
    for (name, schema) in &components.schemas {
        schemas.insert(name.clone(), serde_json::to_value(schema)?);
    }

    Ok(OpenApi {
        openapi: "3.0.3",
        info: OpenApiInfo {
            title: "Agenda API",
            version: env!("CARGO_PKG_VERSION"),
            description: Some("Todos, agenda and users endpoints"),
        },
        paths,
        components: OpenApiComponents { schemas },
    })
}

fn operation(spec: &OperationSpec, components: &ComponentsRegistry) -> Value {
    let mut op = Map::new();
    let op_id = spec
        .operation_id
        .clone()
        .unwrap_or_else(|| spec.handler_id.clone());
    op.insert("operationId".into(), Value::String(op_id));
    if let Some(summary) = &spec.summary {
        op.insert("summary".into(), Value::String(summary.clone()));
    }
    if let Some(description) = &spec.description {
        op.insert("description".into(), Value::String(description.clone()));
    }
    if !spec.tags.is_empty() {
        op.insert("tags".into(), json!(spec.tags));
    }

    if !spec.params.is_empty() {
        let params: Vec<Value> = spec
            .params
            .iter()
            .map(|p| {
                let (location, required) = match p.location {
                    // Path params are always required in OpenAPI.
                    ParamLocation::Path => ("path", true),
                    ParamLocation::Query => ("query", p.required),
                };
                let mut param = json!({
                    "name": p.name,
                    "in": location,
                    "required": required,
                    "schema": { "type": p.param_type },
                });
                if let Some(d) = &p.description {
                    param["description"] = Value::String(d.clone());
                }
                param
            })
            .collect();
        op.insert("parameters".into(), Value::Array(params));
    }

    if let Some(body) = &spec.request_body {
        let mut rb = Map::new();
        if let Some(d) = &body.description {
            rb.insert("description".into(), Value::String(d.clone()));
        }
        rb.insert("required".into(), Value::Bool(body.required));
        rb.insert(
            "content".into(),
            content(components, body.content_type, body.schema_name.as_deref(), false),
        );
        op.insert("requestBody".into(), Value::Object(rb));
    }

    let mut responses = Map::new();
    for r in &spec.responses {
        let mut resp = Map::new();
        resp.insert("description".into(), Value::String(r.description.clone()));
        if !r.content_type.is_empty() {
            resp.insert(
                "content".into(),
                content(components, r.content_type, r.schema_name.as_deref(), r.is_array),
            );
        }
        responses.insert(r.status.to_string(), Value::Object(resp));
    }
    op.insert("responses".into(), Value::Object(responses));

    Value::Object(op)
}

fn content(
    components: &ComponentsRegistry,
    content_type: &str,
    schema_name: Option<&str>,
    is_array: bool,
) -> Value {
    let schema = match schema_name.filter(|n| components.contains(n)) {
        Some(name) => json!({ "$ref": format!("#/components/schemas/{name}") }),
        None => match content_type {
            "application/json" => json!({ "type": "object" }),
            "text/plain" | "text/html" => json!({ "type": "string" }),
            _ => json!({}),
        },
    };
    let schema = if is_array {
        json!({ "type": "array", "items": schema })
    } else {
        schema
    };
    json!({ content_type: { "schema": schema } })
}
