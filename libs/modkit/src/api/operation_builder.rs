//! Type-state builder for REST operations.
//!
//! `register()` only exists once a handler and at least one response have been
//! declared, so a route can never be mounted without its OpenAPI description.

use std::marker::PhantomData;

use axum::{handler::Handler, routing::MethodRouter, Router};
use http::Method;
use utoipa::openapi::{schema::Schema, RefOr};

use crate::api::problem::{Problem, APPLICATION_PROBLEM_JSON};

type SchemaCollection = Vec<(String, RefOr<Schema>)>;

pub mod state {
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

pub use state::{Missing, Present};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Missing {}
    impl Sealed for super::Present {}
}

/// Maps the handler state to what the builder stores: nothing, or the route.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}

impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    /// JSON Schema type name (`string`, `integer`, ...).
    pub param_type: String,
}

#[derive(Clone, Debug)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    pub description: Option<String>,
    /// Registered component name, referenced with `$ref`.
    pub schema_name: Option<String>,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    pub content_type: &'static str,
    pub description: String,
    pub schema_name: Option<String>,
    /// Response body is a JSON array of `schema_name`.
    pub is_array: bool,
}

#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
    /// `method:path` identity used for duplicate detection.
    pub handler_id: String,
}

/// Sink for operation specs and component schemas, implemented by the REST host.
pub trait OpenApiRegistry {
    fn register_operation(&self, spec: &OperationSpec);

    /// Store `schemas` under components and return the name to reference.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;

    fn as_any(&self) -> &dyn std::any::Any;
}

/// Register `T` and everything it references; returns `T`'s component name.
pub fn ensure_schema<T: utoipa::ToSchema + 'static>(registry: &dyn OpenApiRegistry) -> String {
    let root = T::name().to_string();
    let mut collected: SchemaCollection = vec![(root.clone(), T::schema())];
    T::schemas(&mut collected);
    registry.ensure_schema_raw(&root, collected)
}

pub struct OperationBuilder<H, R, S = ()>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _marker: PhantomData<(H, R, fn() -> S)>,
}

impl<S> OperationBuilder<Missing, Missing, S> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let handler_id = format!("{}:{}", method.as_str().to_lowercase(), path);
        Self {
            spec: OperationSpec {
                method,
                path,
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                handler_id,
            },
            method_router: (),
            _marker: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

// Descriptive methods, available in every state.
impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: Some(description.into()),
            param_type: "string".to_string(),
        });
        self
    }

    pub fn query_param(
        mut self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Query,
            required,
            description: Some(description.into()),
            param_type: "string".to_string(),
        });
        self
    }

    /// Required JSON body whose schema is registered from `T`.
    pub fn json_request<T>(mut self, registry: &dyn OpenApiRegistry, desc: impl Into<String>) -> Self
    where
        T: utoipa::ToSchema + 'static,
    {
        self.spec.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: Some(desc.into()),
            schema_name: Some(ensure_schema::<T>(registry)),
            required: true,
        });
        self
    }

    fn push_response(mut self, resp: ResponseSpec) -> OperationBuilder<H, Present, S> {
        self.spec.responses.push(resp);
        OperationBuilder {
            spec: self.spec,
            method_router: self.method_router,
            _marker: PhantomData,
        }
    }

    /// Plain JSON response without a schema.
    pub fn json_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.push_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name: None,
            is_array: false,
        })
    }

    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name: Some(name),
            is_array: false,
        })
    }

    /// JSON array of `T`.
    pub fn json_list_response<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: "application/json",
            description: description.into(),
            schema_name: Some(name),
            is_array: true,
        })
    }

    /// Response without a body (e.g. 204).
    pub fn empty_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.push_response(ResponseSpec {
            status,
            content_type: "",
            description: description.into(),
            schema_name: None,
            is_array: false,
        })
    }

    pub fn text_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.push_response(ResponseSpec {
            status,
            content_type: "text/plain",
            description: description.into(),
            schema_name: None,
            is_array: false,
        })
    }

    pub fn html_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.push_response(ResponseSpec {
            status,
            content_type: "text/html",
            description: description.into(),
            schema_name: None,
            is_array: false,
        })
    }

    /// RFC 9457 `application/problem+json` response.
    pub fn problem_response(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        let name = ensure_schema::<Problem>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: APPLICATION_PROBLEM_JSON,
            description: description.into(),
            schema_name: Some(name),
            is_array: false,
        })
    }
}

impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::PATCH => axum::routing::patch(h),
            Method::DELETE => axum::routing::delete(h),
            _ => axum::routing::get(h),
        };
        OperationBuilder {
            spec: self.spec,
            method_router,
            _marker: PhantomData,
        }
    }
}

impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Describe the operation to `openapi` and mount it on `router`.
    ///
    /// Mounting the same path again with another method merges the method routers.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}
