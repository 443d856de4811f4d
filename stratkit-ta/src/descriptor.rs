use crate::context::FeatureComputeContext;
use crate::value::FeatureValue;
use smol_str::SmolStr;
use std::sync::Arc;

/// Tagged kind carried alongside every [`FeatureDescriptor`], per `spec.md`
/// §9 ("Dynamic dispatch over features... a tagged variant carries the
/// kind"). No inheritance: a descriptor is a value holding a closure plus
/// metadata.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FeatureKind {
    Builtin,
    Indicator,
    Microstructure,
}

type Evaluator = Arc<dyn Fn(&FeatureComputeContext<'_>) -> FeatureValue + Send + Sync>;

/// A named, pure, dependency-declaring feature computation.
#[derive(Clone)]
pub struct FeatureDescriptor {
    pub name: SmolStr,
    pub kind: FeatureKind,
    pub dependencies: Vec<SmolStr>,
    evaluator: Evaluator,
}

impl FeatureDescriptor {
    pub fn new(
        name: impl Into<SmolStr>,
        kind: FeatureKind,
        dependencies: Vec<SmolStr>,
        evaluator: impl Fn(&FeatureComputeContext<'_>) -> FeatureValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            dependencies,
            evaluator: Arc::new(evaluator),
        }
    }

    pub fn evaluate(&self, ctx: &FeatureComputeContext<'_>) -> FeatureValue {
        (self.evaluator)(ctx)
    }
}

impl std::fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
