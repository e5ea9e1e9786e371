//! Action payload resolution.
//!
//! A payload can be given as an inline DSL, a prebuilt attribute, any value
//! carrying a definition, or the name of a registered type. Except for the
//! inline form, an additional DSL can be merged into the resolved attribute.
//! The committed payload is always named after its action and resource, see
//! [`payload_type_name`].

use tracing::debug;

use crate::context::{BuildContext, Dsl};
use crate::design::{
    ActionDefinition, AttributeDefinition, DataStructure, DataType, MediaTypeDefinition,
    UserTypeDefinition,
};
use crate::error::{DslError, DslResult};
use crate::types::payload_type_name;

/// Where the attribute of a payload comes from.
pub enum PayloadSource<'a> {
    /// Inline description of an object payload.
    Dsl(Dsl<'a>),
    /// Attribute used as-is.
    Attribute(AttributeDefinition),
    /// Value whose definition is extracted.
    Typed(Box<dyn DataStructure + 'a>),
    /// Name of a type registered in the design.
    Named(String),
}

impl<'a> PayloadSource<'a> {
    pub fn dsl<F>(dsl: F) -> Self
    where
        F: FnOnce(&mut BuildContext) -> DslResult + 'a,
    {
        PayloadSource::Dsl(Box::new(dsl))
    }

    pub fn typed<T>(value: T) -> Self
    where
        T: DataStructure + 'a,
    {
        PayloadSource::Typed(Box::new(value))
    }

    pub fn named(name: impl Into<String>) -> Self {
        PayloadSource::Named(name.into())
    }
}

impl std::fmt::Debug for PayloadSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSource::Dsl(_) => f.write_str("Dsl(..)"),
            PayloadSource::Attribute(attr) => f.debug_tuple("Attribute").field(attr).finish(),
            PayloadSource::Typed(value) => f
                .debug_tuple("Typed")
                .field(&value.definition())
                .finish(),
            PayloadSource::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<AttributeDefinition> for PayloadSource<'_> {
    fn from(attr: AttributeDefinition) -> Self {
        PayloadSource::Attribute(attr)
    }
}

impl From<UserTypeDefinition> for PayloadSource<'_> {
    fn from(user_type: UserTypeDefinition) -> Self {
        PayloadSource::typed(user_type)
    }
}

impl From<MediaTypeDefinition> for PayloadSource<'_> {
    fn from(media_type: MediaTypeDefinition) -> Self {
        PayloadSource::typed(media_type)
    }
}

impl From<&str> for PayloadSource<'_> {
    fn from(name: &str) -> Self {
        PayloadSource::Named(name.to_string())
    }
}

impl From<String> for PayloadSource<'_> {
    fn from(name: String) -> Self {
        PayloadSource::Named(name)
    }
}

impl BuildContext {
    /// Set the request payload of the current action.
    ///
    /// An inline DSL source extends the payload already set on the action,
    /// if any. Every other source replaces it.
    pub fn payload<'a>(&mut self, source: impl Into<PayloadSource<'a>>) -> DslResult {
        self.resolve_payload(source.into(), None)
    }

    /// Set the request payload of the current action, merging `dsl` into the
    /// attribute resolved from `source`.
    ///
    /// `source` must not itself be an inline DSL.
    pub fn payload_with<'a, F>(&mut self, source: impl Into<PayloadSource<'a>>, dsl: F) -> DslResult
    where
        F: FnOnce(&mut BuildContext) -> DslResult + 'a,
    {
        self.resolve_payload(source.into(), Some(Box::new(dsl)))
    }

    fn resolve_payload(
        &mut self,
        source: PayloadSource<'_>,
        override_dsl: Option<Dsl<'_>>,
    ) -> DslResult {
        if matches!(source, PayloadSource::Dsl(_)) && override_dsl.is_some() {
            return Err(self.report(DslError::InvalidPayloadArguments));
        }
        let Some(action) = self.current::<ActionDefinition>() else {
            return Err(self.context_error("payload", "an action"));
        };
        let name = payload_type_name(&action.name, &action.resource);
        let existing = action.payload.as_ref().map(|p| p.attribute.clone());

        let (attribute, dsl) = match source {
            PayloadSource::Dsl(dsl) => {
                let attribute = existing.unwrap_or_else(|| {
                    let mut attr = self.media_type_attribute();
                    attr.data_type = Some(DataType::object());
                    attr
                });
                (attribute, Some(dsl))
            }
            PayloadSource::Attribute(attr) => (attr, override_dsl),
            PayloadSource::Typed(value) => (value.definition(), override_dsl),
            PayloadSource::Named(type_name) => match self.design().user_type(&type_name) {
                Some(user_type) => (user_type.attribute.clone(), override_dsl),
                None => {
                    return Err(self.report(DslError::UnknownPayloadType { name: type_name }));
                }
            },
        };

        let attribute = match dsl {
            Some(dsl) => self.execute(attribute, dsl)?,
            None => attribute,
        };

        debug!(payload = %name, "payload committed");
        self.update::<ActionDefinition>("payload", |a| {
            a.payload = Some(UserTypeDefinition::new(name, attribute))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;

    fn design() -> Design {
        let mut attr = AttributeDefinition::new(DataType::object());
        if let Some(fields) = attr.data_type.as_mut().and_then(DataType::as_object_mut) {
            fields.insert("name".into(), AttributeDefinition::new(DataType::String));
        }
        Design::new("cellar").with_type(UserTypeDefinition::new("BottlePayload", attr))
    }

    fn payload_of(ctx: &BuildContext) -> Option<UserTypeDefinition> {
        ctx.current::<ActionDefinition>()
            .and_then(|a| a.payload.clone())
    }

    #[test]
    fn named_source_is_copied_from_registry() {
        let mut ctx = BuildContext::new(design());
        ctx.resource("bottle", |ctx| {
            ctx.action("create", |ctx| {
                ctx.payload_with("BottlePayload", |ctx| ctx.required(["name"]))
            })
        })
        .unwrap();

        let design = ctx.finish().unwrap();
        let payload = design.resource("bottle").unwrap().actions["create"]
            .payload
            .clone()
            .unwrap();
        assert_eq!(payload.name, "CreateBottlePayload");
        assert_eq!(payload.attribute.validations.required, vec!["name"]);
        assert!(design.types["BottlePayload"]
            .attribute
            .validations
            .required
            .is_empty());
    }

    #[test]
    fn inline_dsl_extends_existing_payload() {
        let mut ctx = BuildContext::new(design());
        ctx.resource("bottle", |ctx| {
            ctx.action("create", |ctx| {
                ctx.payload(PayloadSource::dsl(|ctx| ctx.member("name", DataType::String)))?;
                ctx.payload(PayloadSource::dsl(|ctx| ctx.member("vintage", DataType::Integer)))?;
                let payload = payload_of(ctx).unwrap();
                assert!(payload.attribute.field("name").is_some());
                assert!(payload.attribute.field("vintage").is_some());
                Ok(())
            })
        })
        .unwrap();
    }

    #[test]
    fn non_dsl_source_replaces_existing_payload() {
        let mut ctx = BuildContext::new(design());
        ctx.resource("bottle", |ctx| {
            ctx.action("create", |ctx| {
                ctx.payload(PayloadSource::dsl(|ctx| ctx.member("vintage", DataType::Integer)))?;
                ctx.payload("BottlePayload")?;
                let payload = payload_of(ctx).unwrap();
                assert!(payload.attribute.field("vintage").is_none());
                assert!(payload.attribute.field("name").is_some());
                Ok(())
            })
        })
        .unwrap();
    }

    #[test]
    fn payload_outside_action_fails() {
        let mut ctx = BuildContext::new(design());
        let _ = ctx.resource("bottle", |ctx| ctx.payload("BottlePayload"));
        assert_eq!(
            ctx.errors()[0].error.to_string(),
            "payload must be used inside an action"
        );
    }

    #[test]
    fn call_shape_is_checked_before_context() {
        let mut ctx = BuildContext::new(design());
        let err = ctx
            .payload_with(PayloadSource::dsl(|_| Ok(())), |_| Ok(()))
            .unwrap_err();
        assert_eq!(err, DslError::InvalidPayloadArguments);
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn source_debug_hides_callbacks() {
        let source = PayloadSource::dsl(|_| Ok(()));
        assert_eq!(format!("{:?}", source), "Dsl(..)");
        let source = PayloadSource::from("BottlePayload");
        assert_eq!(format!("{:?}", source), "Named(\"BottlePayload\")");
    }
}
