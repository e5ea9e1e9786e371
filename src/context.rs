//! Build context: evaluation stack, context resolution and error collection.
//!
//! A [`BuildContext`] owns the design being built and every definition that
//! is currently being evaluated. Evaluating a definition moves it onto the
//! stack for the duration of its callback; nested DSL operations address the
//! innermost frame. When the callback returns the definition is moved back
//! out and handed to the caller, which commits it only if evaluation
//! succeeded.

use tracing::{trace, warn};

use crate::design::{
    ActionDefinition, AttributeDefinition, Design, ResourceDefinition, ResponseDefinition,
};
use crate::error::{DesignError, DslError, DslResult, ReportedError};
use crate::types::DefinitionKind;

/// Configuration callback evaluated against the innermost definition.
pub type Dsl<'a> = Box<dyn FnOnce(&mut BuildContext) -> DslResult + 'a>;

/// Definition being evaluated.
#[derive(Debug)]
pub enum Frame {
    Resource(ResourceDefinition),
    Action(ActionDefinition),
    Response(ResponseDefinition),
    Attribute {
        /// Field name when the attribute is a named member of another attribute.
        label: Option<String>,
        definition: AttributeDefinition,
    },
}

impl Frame {
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Frame::Resource(_) => DefinitionKind::Resource,
            Frame::Action(_) => DefinitionKind::Action,
            Frame::Response(_) => DefinitionKind::Response,
            Frame::Attribute { .. } => DefinitionKind::Attribute,
        }
    }

    fn describe(&self) -> String {
        match self {
            Frame::Resource(r) => format!("resource \"{}\"", r.name),
            Frame::Action(a) => format!("action \"{}\"", a.name),
            Frame::Response(r) => format!("response \"{}\"", r.name),
            Frame::Attribute {
                label: Some(label), ..
            } => format!("attribute \"{}\"", label),
            Frame::Attribute { label: None, .. } => "attribute".to_string(),
        }
    }

    pub(crate) fn description_mut(&mut self) -> &mut Option<String> {
        match self {
            Frame::Resource(r) => &mut r.description,
            Frame::Action(a) => &mut a.description,
            Frame::Response(r) => &mut r.description,
            Frame::Attribute { definition, .. } => &mut definition.description,
        }
    }
}

/// Definition type that can be evaluated on the stack.
pub trait Scoped: Sized {
    const KIND: DefinitionKind;
    /// Phrase naming the required enclosing block, e.g. "an action".
    const EXPECTED: &'static str;

    fn into_frame(self) -> Frame;
    fn from_frame(frame: Frame) -> Option<Self>;
    fn in_frame(frame: &Frame) -> Option<&Self>;
    fn in_frame_mut(frame: &mut Frame) -> Option<&mut Self>;
}

macro_rules! scoped {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl Scoped for $ty {
            const KIND: DefinitionKind = DefinitionKind::$variant;
            const EXPECTED: &'static str = $expected;

            fn into_frame(self) -> Frame {
                Frame::$variant(self)
            }

            fn from_frame(frame: Frame) -> Option<Self> {
                match frame {
                    Frame::$variant(def) => Some(def),
                    _ => None,
                }
            }

            fn in_frame(frame: &Frame) -> Option<&Self> {
                match frame {
                    Frame::$variant(def) => Some(def),
                    _ => None,
                }
            }

            fn in_frame_mut(frame: &mut Frame) -> Option<&mut Self> {
                match frame {
                    Frame::$variant(def) => Some(def),
                    _ => None,
                }
            }
        }
    };
}

scoped!(ResourceDefinition, Resource, "a resource");
scoped!(ActionDefinition, Action, "an action");
scoped!(ResponseDefinition, Response, "a response");

impl Scoped for AttributeDefinition {
    const KIND: DefinitionKind = DefinitionKind::Attribute;
    const EXPECTED: &'static str = "an attribute";

    fn into_frame(self) -> Frame {
        Frame::Attribute {
            label: None,
            definition: self,
        }
    }

    fn from_frame(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Attribute { definition, .. } => Some(definition),
            _ => None,
        }
    }

    fn in_frame(frame: &Frame) -> Option<&Self> {
        match frame {
            Frame::Attribute { definition, .. } => Some(definition),
            _ => None,
        }
    }

    fn in_frame_mut(frame: &mut Frame) -> Option<&mut Self> {
        match frame {
            Frame::Attribute { definition, .. } => Some(definition),
            _ => None,
        }
    }
}

/// State of one build pass.
///
/// Not shareable across threads by construction: every operation takes
/// `&mut self`, so nested callbacks always see the most recently pushed
/// frame.
#[derive(Debug)]
pub struct BuildContext {
    design: Design,
    stack: Vec<Frame>,
    errors: Vec<ReportedError>,
}

impl BuildContext {
    /// Start a build pass over `design`, whose type registries are read by
    /// the DSL and whose resources receive committed declarations.
    pub fn new(design: Design) -> Self {
        Self {
            design,
            stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub(crate) fn design_mut(&mut self) -> &mut Design {
        &mut self.design
    }

    /// Errors collected so far, in reporting order.
    pub fn errors(&self) -> &[ReportedError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of definitions currently being evaluated.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// End the pass, failing if any error was collected.
    pub fn finish(self) -> Result<Design, DesignError> {
        if self.errors.is_empty() {
            Ok(self.design)
        } else {
            Err(DesignError::Invalid {
                errors: self.errors,
            })
        }
    }

    /// End the pass, returning the design and collected errors as-is.
    pub fn into_parts(self) -> (Design, Vec<ReportedError>) {
        (self.design, self.errors)
    }

    /// Innermost definition, if it is of kind `K`.
    pub fn current<K: Scoped>(&self) -> Option<&K> {
        self.stack.last().and_then(K::in_frame)
    }

    pub fn current_mut<K: Scoped>(&mut self) -> Option<&mut K> {
        self.stack.last_mut().and_then(K::in_frame_mut)
    }

    pub fn is_in<K: Scoped>(&self) -> bool {
        self.current::<K>().is_some()
    }

    /// Kind of the innermost definition, `None` at top level.
    pub fn current_kind(&self) -> Option<DefinitionKind> {
        self.stack.last().map(Frame::kind)
    }

    /// Fail with a context error unless the innermost definition is a `K`.
    pub fn require<K: Scoped>(&mut self, operation: &'static str) -> DslResult {
        if self.is_in::<K>() {
            Ok(())
        } else {
            Err(self.context_error(operation, K::EXPECTED))
        }
    }

    /// Apply `apply` to the innermost definition, which must be a `K`.
    pub(crate) fn update<K: Scoped>(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut K),
    ) -> DslResult {
        match self.current_mut::<K>() {
            Some(def) => {
                apply(def);
                Ok(())
            }
            None => Err(self.context_error(operation, K::EXPECTED)),
        }
    }

    /// Report that `operation` was used outside of `expected`.
    pub(crate) fn context_error(
        &mut self,
        operation: &'static str,
        expected: &'static str,
    ) -> DslError {
        self.report(DslError::Context {
            operation,
            expected,
        })
    }

    /// Nearest resource being evaluated, looking through enclosing frames.
    pub fn enclosing_resource(&self) -> Option<&ResourceDefinition> {
        self.stack.iter().rev().find_map(ResourceDefinition::in_frame)
    }

    pub(crate) fn frame_mut(&mut self) -> Option<&mut Frame> {
        self.stack.last_mut()
    }

    /// Record an error against the current evaluation context.
    ///
    /// Returns the error so operations can both collect and return it.
    pub fn report(&mut self, error: DslError) -> DslError {
        let context = self.frame_path();
        warn!(%context, %error, "design error");
        self.errors.push(ReportedError {
            context,
            error: error.clone(),
        });
        error
    }

    fn frame_path(&self) -> String {
        if self.stack.is_empty() {
            return "design".to_string();
        }
        self.stack
            .iter()
            .map(Frame::describe)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Evaluate `dsl` with `target` as the innermost definition.
    ///
    /// The target is returned only if the callback succeeded and collected
    /// no error; otherwise the first error of the evaluation is returned and
    /// the partially built target is dropped.
    pub fn execute<T, F>(&mut self, target: T, dsl: F) -> DslResult<T>
    where
        T: Scoped,
        F: FnOnce(&mut Self) -> DslResult,
    {
        self.execute_frame(target.into_frame(), dsl)
    }

    pub(crate) fn execute_frame<T, F>(&mut self, frame: Frame, dsl: F) -> DslResult<T>
    where
        T: Scoped,
        F: FnOnce(&mut Self) -> DslResult,
    {
        let before = self.errors.len();
        let depth = self.stack.len();
        trace!(kind = %frame.kind(), depth, "evaluating");
        self.stack.push(frame);

        let outcome = dsl(self);
        if let Err(err) = &outcome {
            // Errors returned by user callbacks have not gone through `report`.
            if !self.errors[before..].iter().any(|r| &r.error == err) {
                self.report(err.clone());
            }
        }

        self.stack.truncate(depth + 1);
        let target = self.stack.pop().and_then(T::from_frame);

        if let Some(first) = self.errors.get(before) {
            return Err(first.error.clone());
        }
        target.ok_or_else(|| {
            self.report(DslError::custom(format!(
                "evaluation stack does not hold the {} being evaluated",
                T::KIND
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DataType;

    fn ctx() -> BuildContext {
        BuildContext::new(Design::new("test"))
    }

    #[test]
    fn current_tracks_innermost_frame() {
        let mut ctx = ctx();
        assert!(ctx.current::<ResourceDefinition>().is_none());
        assert_eq!(ctx.current_kind(), None);

        let resource = ctx
            .execute(ResourceDefinition::new("account"), |ctx| {
                assert!(ctx.is_in::<ResourceDefinition>());
                let action = ctx.execute(ActionDefinition::new("show", "account"), |ctx| {
                    assert!(ctx.is_in::<ActionDefinition>());
                    assert!(!ctx.is_in::<ResourceDefinition>());
                    assert_eq!(ctx.depth(), 2);
                    assert_eq!(
                        ctx.enclosing_resource().map(|r| r.name.as_str()),
                        Some("account")
                    );
                    Ok(())
                })?;
                assert_eq!(action.name, "show");
                assert!(ctx.is_in::<ResourceDefinition>());
                Ok(())
            })
            .unwrap();

        assert_eq!(resource.name, "account");
        assert_eq!(ctx.depth(), 0);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn require_reports_context_error() {
        let mut ctx = ctx();
        let err = ctx.require::<ActionDefinition>("routing").unwrap_err();
        assert_eq!(err.to_string(), "routing must be used inside an action");
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].context, "design");
    }

    #[test]
    fn mutation_through_current_mut_is_kept() {
        let mut ctx = ctx();
        let attr = ctx
            .execute(AttributeDefinition::default(), |ctx| {
                if let Some(attr) = ctx.current_mut::<AttributeDefinition>() {
                    attr.data_type = Some(DataType::String);
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(attr.data_type, Some(DataType::String));
    }

    #[test]
    fn collected_error_fails_execution_and_pops_frame() {
        let mut ctx = ctx();
        let result = ctx.execute(ResourceDefinition::new("account"), |ctx| {
            ctx.report(DslError::custom("first"));
            ctx.report(DslError::custom("second"));
            Ok(())
        });

        assert_eq!(result.unwrap_err(), DslError::custom("first"));
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(ctx.errors()[0].context, "resource \"account\"");
    }

    #[test]
    fn returned_error_is_collected_once() {
        let mut ctx = ctx();
        let result = ctx.execute(ResourceDefinition::new("account"), |ctx| {
            ctx.require::<ActionDefinition>("payload")?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(ctx.errors().len(), 1);

        let result = ctx.execute(ResourceDefinition::new("bottle"), |_| {
            Err(DslError::custom("user failure"))
        });
        assert_eq!(result.unwrap_err(), DslError::custom("user failure"));
        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(
            ctx.errors()[1].to_string(),
            "resource \"bottle\": user failure"
        );
    }

    #[test]
    fn sibling_evaluations_continue_after_failure() {
        let mut ctx = ctx();
        let first = ctx.execute(ResourceDefinition::new("a"), |_| {
            Err(DslError::custom("broken"))
        });
        let second = ctx.execute(ResourceDefinition::new("b"), |_| Ok(()));
        assert!(first.is_err());
        assert_eq!(second.unwrap().name, "b");
        assert!(ctx.finish().is_err());
    }
}
