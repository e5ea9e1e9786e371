//! Action routing and the headers / params attribute builders.

use tracing::trace;

use crate::context::BuildContext;
use crate::design::{
    ActionDefinition, AttributeDefinition, ResourceDefinition, ResponseDefinition, RouteDefinition,
};
use crate::error::{DslError, DslResult};
use crate::paths::extract_wildcards;
use crate::types::DefinitionKind;

impl BuildContext {
    /// Attach routes to the current action, in order.
    ///
    /// Every route is attached. A wildcard used both by the route and by
    /// the full base path of the owning resource is reported once per route
    /// and makes the call return the first such error.
    pub fn routing<I>(&mut self, routes: I) -> DslResult
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        self.require::<ActionDefinition>("routing")?;

        let resource_path = match self.enclosing_resource() {
            Some(resource) => self.design().resource_full_path(resource),
            None => String::new(),
        };
        let resource_wildcards = extract_wildcards(&resource_path);

        let mut conflicts = Vec::new();
        let routes: Vec<RouteDefinition> = routes.into_iter().collect();
        for route in &routes {
            for wildcard in route.wildcards() {
                if resource_wildcards.contains(&wildcard) {
                    conflicts.push(DslError::DuplicateWildcard {
                        wildcard,
                        resource_path: resource_path.clone(),
                        route_path: route.path.clone(),
                    });
                }
            }
        }

        let first_conflict = conflicts
            .into_iter()
            .map(|err| self.report(err))
            .reduce(|first, _| first);

        self.update::<ActionDefinition>("routing", |action| {
            for mut route in routes {
                trace!(action = %action.name, verb = %route.verb, path = %route.path, "route attached");
                route.action = Some(action.name.clone());
                action.routes.push(route);
            }
        })?;

        match first_conflict {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Describe request headers of the current action, default headers of
    /// the current resource, or headers of the current response.
    ///
    /// Response headers can only be defined once.
    pub fn headers<F>(&mut self, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        match self.current_kind() {
            Some(DefinitionKind::Action) => {
                let headers = self.execute(self.media_type_attribute(), dsl)?;
                self.update::<ActionDefinition>("headers", |a| a.headers = Some(headers))
            }
            Some(DefinitionKind::Resource) => {
                let headers = self.execute(self.media_type_attribute(), dsl)?;
                self.update::<ResourceDefinition>("headers", |r| r.headers = Some(headers))
            }
            Some(DefinitionKind::Response) => {
                let defined = self
                    .current::<ResponseDefinition>()
                    .is_some_and(|r| r.headers.is_some());
                if defined {
                    return Err(self.report(DslError::HeadersAlreadyDefined));
                }
                let headers = self.execute(self.media_type_attribute(), dsl)?;
                self.update::<ResponseDefinition>("headers", |r| r.headers = Some(headers))
            }
            _ => Err(self.context_error("headers", "an action, resource or response")),
        }
    }

    /// Describe path and query parameters of the current action, or default
    /// parameters of the current resource.
    pub fn params<F>(&mut self, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        match self.current_kind() {
            Some(DefinitionKind::Action) => {
                let params = self.execute(self.media_type_attribute(), dsl)?;
                self.update::<ActionDefinition>("params", |a| a.params = Some(params))
            }
            Some(DefinitionKind::Resource) => {
                let params = self.execute(self.media_type_attribute(), dsl)?;
                self.update::<ResourceDefinition>("params", |r| r.params = Some(params))
            }
            _ => Err(self.context_error("params", "an action or resource")),
        }
    }

    /// Empty attribute based on the default media type of the enclosing
    /// resource, so fields declared on it inherit from the media type.
    pub(crate) fn media_type_attribute(&self) -> AttributeDefinition {
        let reference = self
            .enclosing_resource()
            .and_then(|r| r.media_type.as_deref())
            .and_then(|id| self.design().media_type(id))
            .and_then(|mt| mt.attribute.data_type.clone());
        AttributeDefinition::with_reference(reference)
    }
}
