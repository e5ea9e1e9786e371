//! Resource, action and response declarations.
//!
//! Declarations are cumulative: declaring a resource, action or response
//! whose name is already known retrieves the existing definition and
//! evaluates the new callback against it.

use tracing::debug;

use crate::context::{BuildContext, Frame};
use crate::design::{ActionDefinition, ResourceDefinition, ResponseDefinition, ResponseParent};
use crate::error::DslResult;

impl BuildContext {
    /// Declare or augment a resource. Only valid at the top level.
    pub fn resource<F>(&mut self, name: &str, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        if self.depth() > 0 {
            return Err(self.context_error("resource", "the top level of a design"));
        }
        let resource = self
            .design()
            .resource(name)
            .cloned()
            .unwrap_or_else(|| ResourceDefinition::new(name));

        let resource = self.execute(resource, dsl)?;
        debug!(
            resource = %resource.name,
            actions = resource.actions.len(),
            "resource committed"
        );
        self.design_mut()
            .resources
            .insert(name.to_string(), resource);
        Ok(())
    }

    /// Set the base path of the current resource.
    pub fn base_path(&mut self, path: &str) -> DslResult {
        self.update::<ResourceDefinition>("base_path", |r| r.base_path = path.to_string())
    }

    /// Nest the current resource under another resource.
    pub fn parent(&mut self, resource: &str) -> DslResult {
        self.update::<ResourceDefinition>("parent", |r| r.parent = Some(resource.to_string()))
    }

    /// Set the action whose route prefixes child resource paths.
    pub fn canonical_action(&mut self, action: &str) -> DslResult {
        self.update::<ResourceDefinition>("canonical_action", |r| {
            r.canonical_action = action.to_string()
        })
    }

    /// Set the default media type of the current resource.
    pub fn default_media(&mut self, identifier: &str) -> DslResult {
        self.update::<ResourceDefinition>("default_media", |r| {
            r.media_type = Some(identifier.to_string())
        })
    }

    /// Declare or augment an action of the current resource.
    pub fn action<F>(&mut self, name: &str, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        let Some(resource) = self.current::<ResourceDefinition>() else {
            return Err(self.context_error("action", "a resource"));
        };
        let action = match resource.action(name) {
            Some(existing) => existing.clone(),
            None => ActionDefinition::new(name, resource.name.clone()),
        };

        let action = self.execute(action, dsl)?;
        debug!(
            resource = %action.resource,
            action = %action.name,
            routes = action.routes.len(),
            "action committed"
        );
        self.update::<ResourceDefinition>("action", |r| {
            r.actions.insert(name.to_string(), action);
        })
    }

    /// Declare or augment a response of the current action, or a default
    /// response of the current resource.
    pub fn response<F>(&mut self, name: &str, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        let (existing, parent) = if let Some(action) = self.current::<ActionDefinition>() {
            (
                action.responses.get(name).cloned(),
                ResponseParent::Action {
                    resource: action.resource.clone(),
                    action: action.name.clone(),
                },
            )
        } else if let Some(resource) = self.current::<ResourceDefinition>() {
            (
                resource.responses.get(name).cloned(),
                ResponseParent::Resource(resource.name.clone()),
            )
        } else {
            return Err(self.context_error("response", "an action or resource"));
        };

        let response = existing.unwrap_or_else(|| ResponseDefinition::new(name, parent));
        let response = self.execute(response, dsl)?;
        match self.frame_mut() {
            Some(Frame::Action(a)) => {
                a.responses.insert(name.to_string(), response);
            }
            Some(Frame::Resource(r)) => {
                r.responses.insert(name.to_string(), response);
            }
            _ => {}
        }
        Ok(())
    }

    /// Set the HTTP status of the current response.
    pub fn status(&mut self, code: u16) -> DslResult {
        self.update::<ResponseDefinition>("status", |r| r.status = Some(code))
    }

    /// Set the media type of the current response body.
    pub fn media(&mut self, identifier: &str) -> DslResult {
        self.update::<ResponseDefinition>("media", |r| {
            r.media_type = Some(identifier.to_string())
        })
    }

    /// Describe the current resource, action, response or attribute.
    pub fn description(&mut self, text: &str) -> DslResult {
        match self.frame_mut() {
            Some(frame) => {
                *frame.description_mut() = Some(text.to_string());
                Ok(())
            }
            None => Err(self.context_error(
                "description",
                "a resource, action, response or attribute",
            )),
        }
    }
}
