//! API Design Builder
//!
//! Declarative construction of API surface definitions: resources, their
//! actions, routes, headers, parameters, payloads and responses.
//!
//! A design is built by evaluating nested configuration callbacks against a
//! [`BuildContext`]. Each callback runs with the definition it configures as
//! the innermost frame of the context, so operations such as
//! [`BuildContext::routing`] or [`BuildContext::params`] know which action or
//! resource they augment. Errors do not abort the pass: they are collected
//! and the offending definition is not committed, while sibling declarations
//! keep being evaluated.
//!
//! # Example
//!
//! ```
//! use api_design::{BuildContext, DataType, Design, RouteDefinition};
//!
//! let mut ctx = BuildContext::new(Design::new("cellar").with_base_path("/cellar"));
//!
//! let _ = ctx.resource("account", |ctx| {
//!     ctx.base_path("/accounts")?;
//!     ctx.action("update", |ctx| {
//!         ctx.routing([RouteDefinition::put("/:id")])?;
//!         ctx.params(|ctx| ctx.param("id", DataType::Integer))?;
//!         ctx.headers(|ctx| {
//!             ctx.header("Authorization", DataType::String)?;
//!             ctx.required(["Authorization"])
//!         })
//!     })
//! });
//!
//! let design = ctx.finish().unwrap();
//! let account = design.resource("account").unwrap();
//! let route = &account.actions["update"].routes[0];
//! assert_eq!(design.route_full_path(account, route), "/cellar/accounts/:id");
//! ```
//!
//! # Payloads
//!
//! | Source | Attribute used |
//! |--------|----------------|
//! | [`PayloadSource::Dsl`] | new object based on the resource media type |
//! | [`PayloadSource::Attribute`] | the attribute as given |
//! | [`PayloadSource::Typed`] | the value's definition |
//! | [`PayloadSource::Named`] | a copy of the registered type |
//!
//! Whatever the source, the committed payload is named
//! `{Action}{Resource}Payload`.

mod action;
mod attribute;
mod context;
mod design;
mod error;
mod paths;
mod payload;
mod resource;
mod types;

pub use context::{BuildContext, Dsl, Frame, Scoped};
pub use design::{
    ActionDefinition, AttributeDefinition, DataStructure, DataType, Design, MediaTypeDefinition,
    Object, ResourceDefinition, ResponseDefinition, ResponseParent, RouteDefinition,
    UserTypeDefinition, Validations,
};
pub use error::{DesignError, DslError, DslResult, ErrorCategory, ReportedError};
pub use paths::{clean_path, extract_wildcards, is_absolute, join_paths};
pub use payload::PayloadSource;
pub use types::{
    payload_type_name, DefinitionKind, Verb, DEFAULT_CANONICAL_ACTION, PAYLOAD_SUFFIX,
};
