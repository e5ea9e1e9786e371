//! Attribute DSL: fields and validations declared inside attribute blocks.
//!
//! Fields whose name matches a field of the block's base type start from
//! that field's description and validations; object-typed base fields also
//! become the base of the new field, so nested declarations keep inheriting.

use serde_json::Value;

use crate::context::{BuildContext, Frame};
use crate::design::{AttributeDefinition, DataType};
use crate::error::{DslError, DslResult};

impl BuildContext {
    /// Declare a field of the current attribute.
    pub fn attribute(&mut self, name: &str, data_type: DataType) -> DslResult {
        let field = self.prepare_field(name, data_type)?;
        self.insert_field(name, field)
    }

    /// Declare a field of the current attribute and evaluate `dsl` against it.
    pub fn attribute_with<F>(&mut self, name: &str, data_type: DataType, dsl: F) -> DslResult
    where
        F: FnOnce(&mut Self) -> DslResult,
    {
        let field = self.prepare_field(name, data_type)?;
        let frame = Frame::Attribute {
            label: Some(name.to_string()),
            definition: field,
        };
        let field = self.execute_frame(frame, dsl)?;
        self.insert_field(name, field)
    }

    /// Declare a field copied from the base type of the current attribute.
    pub fn inherit(&mut self, name: &str) -> DslResult {
        let Some(parent) = self.current::<AttributeDefinition>() else {
            return Err(self.context_error("inherit", "an attribute"));
        };
        let Some(base) = parent.base_field(name) else {
            return Err(self.report(DslError::UnknownBaseAttribute {
                name: name.to_string(),
            }));
        };
        let data_type = base.data_type.clone().unwrap_or(DataType::Any);
        self.attribute(name, data_type)
    }

    pub fn header(&mut self, name: &str, data_type: DataType) -> DslResult {
        self.attribute(name, data_type)
    }

    pub fn param(&mut self, name: &str, data_type: DataType) -> DslResult {
        self.attribute(name, data_type)
    }

    pub fn member(&mut self, name: &str, data_type: DataType) -> DslResult {
        self.attribute(name, data_type)
    }

    /// Mark fields of the current attribute as required.
    pub fn required<I, S>(&mut self, names: I) -> DslResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update::<AttributeDefinition>("required", |attr| {
            for name in names {
                let name = name.into();
                if !attr.validations.required.contains(&name) {
                    attr.validations.required.push(name);
                }
            }
        })
    }

    /// Restrict the current attribute to the given values.
    pub fn enum_values<I, V>(&mut self, values: I) -> DslResult
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.update::<AttributeDefinition>("enum_values", |attr| {
            attr.validations.enum_values = values.into_iter().map(Into::into).collect();
        })
    }

    pub fn minimum(&mut self, min: f64) -> DslResult {
        self.update::<AttributeDefinition>("minimum", |attr| attr.validations.minimum = Some(min))
    }

    pub fn maximum(&mut self, max: f64) -> DslResult {
        self.update::<AttributeDefinition>("maximum", |attr| attr.validations.maximum = Some(max))
    }

    pub fn pattern(&mut self, pattern: &str) -> DslResult {
        self.update::<AttributeDefinition>("pattern", |attr| {
            attr.validations.pattern = Some(pattern.to_string())
        })
    }

    fn prepare_field(&mut self, name: &str, data_type: DataType) -> DslResult<AttributeDefinition> {
        let Some(parent) = self.current::<AttributeDefinition>() else {
            return Err(self.context_error("attribute", "an attribute"));
        };
        if parent
            .data_type
            .as_ref()
            .is_some_and(|t| t.as_object().is_none())
        {
            return Err(self.report(DslError::NotAnObject {
                name: name.to_string(),
            }));
        }

        let mut field = AttributeDefinition::new(data_type);
        if let Some(base) = parent.base_field(name) {
            field.inherit_from(base);
            if base.data_type.as_ref().is_some_and(|t| t.as_object().is_some()) {
                field.reference = base.data_type.clone();
            }
        }
        Ok(field)
    }

    fn insert_field(&mut self, name: &str, field: AttributeDefinition) -> DslResult {
        self.update::<AttributeDefinition>("attribute", |parent| {
            let data_type = parent.data_type.get_or_insert_with(DataType::object);
            if let Some(fields) = data_type.as_object_mut() {
                fields.insert(name.to_string(), field);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;
    use serde_json::json;

    fn evaluate<F>(base: Option<DataType>, dsl: F) -> (DslResult<AttributeDefinition>, BuildContext)
    where
        F: FnOnce(&mut BuildContext) -> DslResult,
    {
        let mut ctx = BuildContext::new(Design::new("test"));
        let result = ctx.execute(AttributeDefinition::with_reference(base), dsl);
        (result, ctx)
    }

    fn account_base() -> DataType {
        let mut name = AttributeDefinition::new(DataType::String);
        name.description = Some("account name".into());
        name.validations.minimum = Some(2.0);

        let mut address = AttributeDefinition::new(DataType::object());
        if let Some(fields) = address.data_type.as_mut().and_then(DataType::as_object_mut) {
            let mut city = AttributeDefinition::new(DataType::String);
            city.description = Some("city".into());
            fields.insert("city".into(), city);
        }

        let mut fields = crate::design::Object::new();
        fields.insert("name".into(), name);
        fields.insert("address".into(), address);
        DataType::Object(fields)
    }

    #[test]
    fn fields_are_declared_in_order() {
        let (attr, _) = evaluate(None, |ctx| {
            ctx.attribute("id", DataType::Integer)?;
            ctx.member("name", DataType::String)?;
            ctx.required(["id", "name", "id"])
        });
        let attr = attr.unwrap();
        let names: Vec<_> = attr
            .data_type
            .as_ref()
            .and_then(DataType::as_object)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(attr.validations.required, vec!["id", "name"]);
    }

    #[test]
    fn nested_validations_apply_to_the_field() {
        let (attr, _) = evaluate(None, |ctx| {
            ctx.attribute_with("sort", DataType::String, |ctx| {
                ctx.enum_values(["asc", "desc"])?;
                ctx.pattern("^[a-z]+$")
            })?;
            ctx.attribute_with("limit", DataType::Integer, |ctx| {
                ctx.minimum(1.0)?;
                ctx.maximum(100.0)
            })
        });
        let attr = attr.unwrap();
        let sort = attr.field("sort").unwrap();
        assert_eq!(sort.validations.enum_values, vec![json!("asc"), json!("desc")]);
        assert_eq!(sort.validations.pattern.as_deref(), Some("^[a-z]+$"));
        let limit = attr.field("limit").unwrap();
        assert_eq!(limit.validations.minimum, Some(1.0));
        assert_eq!(limit.validations.maximum, Some(100.0));
    }

    #[test]
    fn declared_field_inherits_from_base() {
        let (attr, _) = evaluate(Some(account_base()), |ctx| {
            ctx.attribute_with("name", DataType::String, |ctx| ctx.maximum(64.0))
        });
        let name = attr.unwrap().field("name").cloned().unwrap();
        assert_eq!(name.description.as_deref(), Some("account name"));
        assert_eq!(name.validations.minimum, Some(2.0));
        assert_eq!(name.validations.maximum, Some(64.0));
    }

    #[test]
    fn nested_object_fields_keep_inheriting() {
        let (attr, _) = evaluate(Some(account_base()), |ctx| {
            ctx.attribute_with("address", DataType::object(), |ctx| {
                ctx.inherit("city")
            })
        });
        let attr = attr.unwrap();
        let address = attr.field("address").unwrap();
        let city = address.field("city").unwrap();
        assert_eq!(city.data_type, Some(DataType::String));
        assert_eq!(city.description.as_deref(), Some("city"));
    }

    #[test]
    fn inherit_copies_base_type() {
        let (attr, _) = evaluate(Some(account_base()), |ctx| ctx.inherit("name"));
        let name = attr.unwrap().field("name").cloned().unwrap();
        assert_eq!(name.data_type, Some(DataType::String));
        assert_eq!(name.validations.minimum, Some(2.0));
    }

    #[test]
    fn inherit_unknown_field_is_a_reference_error() {
        let (attr, ctx) = evaluate(Some(account_base()), |ctx| ctx.inherit("email"));
        assert_eq!(
            attr.unwrap_err(),
            DslError::UnknownBaseAttribute {
                name: "email".into()
            }
        );
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn field_inside_primitive_attribute_fails() {
        let (attr, ctx) = evaluate(None, |ctx| {
            ctx.attribute_with("id", DataType::Integer, |ctx| {
                ctx.attribute("digits", DataType::Integer)
            })
        });
        assert!(attr.is_err());
        assert_eq!(
            ctx.errors()[0].to_string(),
            "attribute / attribute \"id\": cannot declare attribute \"digits\" inside a non-object attribute"
        );
    }

    #[test]
    fn attribute_outside_attribute_block_fails() {
        let mut ctx = BuildContext::new(Design::new("test"));
        let err = ctx.attribute("id", DataType::Integer).unwrap_err();
        assert_eq!(err.to_string(), "attribute must be used inside an attribute");
    }
}
