//! Definition tree produced by a build pass.
//!
//! A [`Design`] owns committed resources, which own their actions, which own
//! their routes, attributes and responses. Back-references (action to
//! resource, route to action, response to parent) are names, not pointers.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::paths::{clean_path, extract_wildcards, is_absolute, join_paths};
use crate::types::{Verb, DEFAULT_CANONICAL_ACTION};

/// Fields of an object type, in declaration order.
pub type Object = IndexMap<String, AttributeDefinition>;

/// Shape of a piece of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Integer,
    Number,
    String,
    DateTime,
    Any,
    Object(Object),
    Array(Box<AttributeDefinition>),
    /// Reference to a type registered in the design by name.
    UserType(String),
}

impl DataType {
    /// An object type with no fields.
    pub fn object() -> Self {
        DataType::Object(Object::new())
    }

    pub fn array_of(elem: DataType) -> Self {
        DataType::Array(Box::new(AttributeDefinition::new(elem)))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            DataType::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            DataType::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Validation rules attached to an attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validations {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Validations {
    pub fn is_empty(&self) -> bool {
        self == &Validations::default()
    }

    /// Layer `other` on top of these validations.
    ///
    /// Required names are unioned; any other rule set in `other` wins.
    pub fn merge(&mut self, other: &Validations) {
        for name in &other.required {
            if !self.required.contains(name) {
                self.required.push(name.clone());
            }
        }
        if !other.enum_values.is_empty() {
            self.enum_values = other.enum_values.clone();
        }
        if other.minimum.is_some() {
            self.minimum = other.minimum;
        }
        if other.maximum.is_some() {
            self.maximum = other.maximum;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern.clone();
        }
    }
}

/// Structural description of headers, parameters or a body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// Base type whose fields are inherited by fields declared on this attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Validations::is_empty")]
    pub validations: Validations,
}

impl AttributeDefinition {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    /// Attribute with no type of its own, inheriting from `reference`.
    pub fn with_reference(reference: Option<DataType>) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    /// Field declared directly on this attribute.
    pub fn field(&self, name: &str) -> Option<&AttributeDefinition> {
        self.data_type.as_ref()?.as_object()?.get(name)
    }

    /// Field of the base type with the given name.
    pub fn base_field(&self, name: &str) -> Option<&AttributeDefinition> {
        self.reference.as_ref()?.as_object()?.get(name)
    }

    /// Take description and validations from `base` where this attribute
    /// does not override them.
    pub fn inherit_from(&mut self, base: &AttributeDefinition) {
        if self.description.is_none() {
            self.description = base.description.clone();
        }
        let mut validations = base.validations.clone();
        validations.merge(&self.validations);
        self.validations = validations;
    }

    /// Layer `other` on top of this attribute.
    ///
    /// When both are objects, fields of `other` replace fields with the same
    /// name and new fields are appended. Otherwise `other`'s type wins.
    pub fn merge(&mut self, other: &AttributeDefinition) {
        match (self.data_type.as_mut(), other.data_type.as_ref()) {
            (Some(DataType::Object(fields)), Some(DataType::Object(other_fields))) => {
                for (name, field) in other_fields {
                    fields.insert(name.clone(), field.clone());
                }
            }
            (_, Some(other_type)) => self.data_type = Some(other_type.clone()),
            (_, None) => {}
        }
        if other.reference.is_some() {
            self.reference = other.reference.clone();
        }
        if other.description.is_some() {
            self.description = other.description.clone();
        }
        self.validations.merge(&other.validations);
    }
}

/// A value that carries an attribute definition.
pub trait DataStructure {
    fn definition(&self) -> AttributeDefinition;
}

impl DataStructure for AttributeDefinition {
    fn definition(&self) -> AttributeDefinition {
        self.clone()
    }
}

/// Named, reusable type registered in the design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTypeDefinition {
    pub name: String,
    pub attribute: AttributeDefinition,
}

impl UserTypeDefinition {
    pub fn new(name: impl Into<String>, attribute: AttributeDefinition) -> Self {
        Self {
            name: name.into(),
            attribute,
        }
    }
}

impl DataStructure for UserTypeDefinition {
    fn definition(&self) -> AttributeDefinition {
        self.attribute.clone()
    }
}

/// Media type registered in the design, identified by its MIME identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaTypeDefinition {
    pub identifier: String,
    pub attribute: AttributeDefinition,
}

impl MediaTypeDefinition {
    pub fn new(identifier: impl Into<String>, attribute: AttributeDefinition) -> Self {
        Self {
            identifier: identifier.into(),
            attribute,
        }
    }
}

impl DataStructure for MediaTypeDefinition {
    fn definition(&self) -> AttributeDefinition {
        self.attribute.clone()
    }
}

/// HTTP route of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub verb: Verb,
    pub path: String,
    /// Name of the action the route is attached to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl RouteDefinition {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            action: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Verb::Head, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    pub fn trace(path: impl Into<String>) -> Self {
        Self::new(Verb::Trace, path)
    }

    pub fn connect(path: impl Into<String>) -> Self {
        Self::new(Verb::Connect, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    pub fn options(path: impl Into<String>) -> Self {
        Self::new(Verb::Options, path)
    }

    /// Wildcard names used in the route's own path.
    pub fn wildcards(&self) -> Vec<String> {
        extract_wildcards(&self.path)
    }
}

/// Owner of a response definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseParent {
    Resource(String),
    Action { resource: String, action: String },
}

/// Possible response of an action, or a default response of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<AttributeDefinition>,
    pub parent: ResponseParent,
}

impl ResponseDefinition {
    pub fn new(name: impl Into<String>, parent: ResponseParent) -> Self {
        Self {
            name: name.into(),
            status: None,
            description: None,
            media_type: None,
            headers: None,
            parent,
        }
    }
}

/// Endpoint of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    pub name: String,
    /// Name of the owning resource.
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub routes: Vec<RouteDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<AttributeDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<AttributeDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<UserTypeDefinition>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseDefinition>,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            description: None,
            routes: Vec::new(),
            headers: None,
            params: None,
            payload: None,
            responses: IndexMap::new(),
        }
    }

    /// Resource default headers overlaid with the action's own headers.
    pub fn effective_headers(&self, resource: &ResourceDefinition) -> Option<AttributeDefinition> {
        overlay(resource.headers.as_ref(), self.headers.as_ref())
    }

    /// Resource default params overlaid with the action's own params.
    pub fn effective_params(&self, resource: &ResourceDefinition) -> Option<AttributeDefinition> {
        overlay(resource.params.as_ref(), self.params.as_ref())
    }
}

fn overlay(
    base: Option<&AttributeDefinition>,
    top: Option<&AttributeDefinition>,
) -> Option<AttributeDefinition> {
    match (base, top) {
        (Some(base), Some(top)) => {
            let mut merged = base.clone();
            merged.merge(top);
            Some(merged)
        }
        (base, top) => top.or(base).cloned(),
    }
}

/// Collection of actions sharing a base path and media type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub base_path: String,
    /// Name of the parent resource, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Action whose first route prefixes the paths of child resources.
    pub canonical_action: String,
    /// Identifier of the default media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub actions: IndexMap<String, ActionDefinition>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<AttributeDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<AttributeDefinition>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            base_path: String::new(),
            parent: None,
            canonical_action: DEFAULT_CANONICAL_ACTION.to_string(),
            media_type: None,
            actions: IndexMap::new(),
            responses: IndexMap::new(),
            headers: None,
            params: None,
        }
    }

    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn canonical(&self) -> Option<&ActionDefinition> {
        self.actions.get(&self.canonical_action)
    }
}

/// Root of a design: committed resources plus the type registries they read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Design {
    pub name: String,
    pub base_path: String,
    pub resources: IndexMap<String, ResourceDefinition>,
    pub types: IndexMap<String, UserTypeDefinition>,
    pub media_types: IndexMap<String, MediaTypeDefinition>,
}

impl Design {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Register a named type that payloads can reference.
    pub fn with_type(mut self, user_type: UserTypeDefinition) -> Self {
        self.types.insert(user_type.name.clone(), user_type);
        self
    }

    /// Register a media type that resources can use as default.
    pub fn with_media_type(mut self, media_type: MediaTypeDefinition) -> Self {
        self.media_types
            .insert(media_type.identifier.clone(), media_type);
        self
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.get(name)
    }

    pub fn user_type(&self, name: &str) -> Option<&UserTypeDefinition> {
        self.types.get(name)
    }

    pub fn media_type(&self, identifier: &str) -> Option<&MediaTypeDefinition> {
        self.media_types.get(identifier)
    }

    /// Full base path of a resource.
    ///
    /// A base path starting with `//` is absolute. Otherwise it is appended
    /// to the path of the first route of the parent's canonical action, or to
    /// the design base path for top-level resources.
    pub fn resource_full_path(&self, resource: &ResourceDefinition) -> String {
        let mut visited = HashSet::new();
        self.resource_path_guarded(resource, &mut visited)
    }

    /// Full path of a route of `resource`.
    pub fn route_full_path(&self, resource: &ResourceDefinition, route: &RouteDefinition) -> String {
        let mut visited = HashSet::new();
        self.route_path_guarded(resource, route, &mut visited)
    }

    fn resource_path_guarded(
        &self,
        resource: &ResourceDefinition,
        visited: &mut HashSet<String>,
    ) -> String {
        if is_absolute(&resource.base_path) {
            return clean_path(&resource.base_path);
        }
        visited.insert(resource.name.clone());

        let base = match &resource.parent {
            None => self.base_path.clone(),
            Some(parent_name) if visited.contains(parent_name) => String::new(),
            Some(parent_name) => {
                let route = self
                    .resources
                    .get(parent_name)
                    .and_then(|parent| Some((parent, parent.canonical()?.routes.first()?)));
                match route {
                    Some((parent, route)) => self.route_path_guarded(parent, route, visited),
                    None => String::new(),
                }
            }
        };
        join_paths(&base, &resource.base_path)
    }

    fn route_path_guarded(
        &self,
        resource: &ResourceDefinition,
        route: &RouteDefinition,
        visited: &mut HashSet<String>,
    ) -> String {
        if is_absolute(&route.path) {
            return clean_path(&route.path);
        }
        let base = self.resource_path_guarded(resource, visited);
        join_paths(&base, &route.path)
    }
}
