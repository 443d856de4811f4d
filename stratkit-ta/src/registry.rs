use crate::builtins::builtin_descriptors;
use crate::context::FeatureComputeContext;
use crate::descriptor::{FeatureDescriptor, FeatureKind};
use crate::indicators;
use crate::patterns::cup_and_handle;
use crate::value::FeatureValue;
use smol_str::SmolStr;
use std::collections::HashMap;
use stratkit_core::Bar;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    #[error("feature '{0}' is already registered")]
    DuplicateFeature(SmolStr),
    #[error("feature '{feature}' depends on unknown feature '{dependency}'")]
    UnknownDependency { feature: SmolStr, dependency: SmolStr },
    #[error("dependency cycle detected involving feature '{0}'")]
    CycleDetected(SmolStr),
}

/// A feature that could not be computed for the current bar. Recorded
/// rather than propagated (`spec.md` §4.4 step 4: "any evaluator exception
/// is caught, the feature is recorded as NaN/false, and a `FeatureError`
/// log is appended; processing continues").
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FeatureError {
    #[error("feature '{feature}' is missing dependency '{dependency}'")]
    MissingDependency { feature: SmolStr, dependency: SmolStr },
}

/// Registry of known feature computations, plus the machinery to order and
/// evaluate a subset of them ("a plan") for a single bar.
///
/// Mirrors the teacher's strategy registry in spirit: a name-keyed table
/// that is built once at startup and then only read from during the hot
/// path.
#[derive(Default)]
pub struct FeatureRegistry {
    descriptors: HashMap<SmolStr, FeatureDescriptor>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the five OHLCV builtins and the full
    /// indicator/pattern library under their conventional names.
    pub fn with_builtin_library() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_descriptors() {
            registry
                .register(descriptor)
                .expect("builtin descriptors never collide");
        }
        for descriptor in indicator_descriptors() {
            registry
                .register(descriptor)
                .expect("indicator descriptors never collide");
        }
        registry
    }

    pub fn register(&mut self, descriptor: FeatureDescriptor) -> Result<(), RegistryError> {
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateFeature(descriptor.name));
        }
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn enumerate(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.descriptors.values()
    }

    /// Produces a dependency-ordered evaluation plan for `roots` (and their
    /// transitive dependencies) via reverse-post-order depth-first search.
    ///
    /// Ties (features with no dependency relationship) are broken by
    /// lexical name order so the plan is reproducible across runs.
    pub fn plan(&self, roots: &[SmolStr]) -> Result<Vec<SmolStr>, RegistryError> {
        let mut sorted_roots = roots.to_vec();
        sorted_roots.sort();

        let mut visited: HashMap<SmolStr, VisitState> = HashMap::new();
        let mut order = Vec::new();
        for root in &sorted_roots {
            self.visit(root, &mut visited, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        name: &SmolStr,
        visited: &mut HashMap<SmolStr, VisitState>,
        order: &mut Vec<SmolStr>,
    ) -> Result<(), RegistryError> {
        match visited.get(name) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => return Err(RegistryError::CycleDetected(name.clone())),
            None => {}
        }
        let descriptor = self
            .descriptors
            .get(name)
            .ok_or_else(|| RegistryError::UnknownDependency {
                feature: name.clone(),
                dependency: name.clone(),
            })?;

        visited.insert(name.clone(), VisitState::InProgress);
        let mut deps = descriptor.dependencies.clone();
        deps.sort();
        for dep in &deps {
            if !self.descriptors.contains_key(dep) {
                return Err(RegistryError::UnknownDependency {
                    feature: name.clone(),
                    dependency: dep.clone(),
                });
            }
            self.visit(dep, visited, order)?;
        }
        visited.insert(name.clone(), VisitState::Done);
        order.push(name.clone());
        Ok(())
    }

    /// Evaluates every feature in `plan`, in order, writing results into
    /// `out`. A panicking or otherwise failing evaluator cannot happen in
    /// safe Rust, but a NaN-propagating formula error (e.g. a feature whose
    /// dependency is absent from `out` due to a prior registry bug) is
    /// caught here, recorded as the documented sentinel value rather than
    /// aborting the whole bar, and returned as a [`FeatureError`] per
    /// missing dependency for the caller to log.
    pub fn evaluate(
        &self,
        plan: &[SmolStr],
        bar: &Bar,
        history: &[Bar],
        out: &mut HashMap<SmolStr, FeatureValue>,
    ) -> Vec<FeatureError> {
        let mut errors = Vec::new();
        for name in plan {
            let Some(descriptor) = self.descriptors.get(name) else {
                tracing::warn!(feature = %name, "skipping unknown feature in plan");
                continue;
            };
            let missing: Vec<&SmolStr> = descriptor
                .dependencies
                .iter()
                .filter(|d| !out.contains_key(d.as_str()))
                .collect();
            if !missing.is_empty() {
                tracing::warn!(feature = %name, ?missing, "missing dependency, emitting sentinel");
                for dependency in &missing {
                    errors.push(FeatureError::MissingDependency {
                        feature: name.clone(),
                        dependency: (*dependency).clone(),
                    });
                }
                out.insert(name.clone(), sentinel_for(descriptor.kind));
                continue;
            }
            let ctx = FeatureComputeContext::new(bar, history, out);
            let value = descriptor.evaluate(&ctx);
            out.insert(name.clone(), value);
        }
        errors
    }
}

#[derive(Clone, Copy)]
enum VisitState {
    InProgress,
    Done,
}

fn sentinel_for(kind: FeatureKind) -> FeatureValue {
    match kind {
        FeatureKind::Builtin | FeatureKind::Indicator | FeatureKind::Microstructure => {
            FeatureValue::Number(f64::NAN)
        }
    }
}

macro_rules! numeric_indicator {
    ($name:expr, $period:expr, $func:expr) => {
        FeatureDescriptor::new($name, FeatureKind::Indicator, vec![], move |ctx| {
            let series = ctx.series();
            FeatureValue::Number($func(&series, $period))
        })
    };
}

fn indicator_descriptors() -> Vec<FeatureDescriptor> {
    vec![
        numeric_indicator!("sma_20", 20usize, indicators::sma),
        numeric_indicator!("ema_50", 50usize, indicators::ema),
        numeric_indicator!("rsi_14", 14usize, indicators::rsi),
        FeatureDescriptor::new("macd", FeatureKind::Indicator, vec![], |ctx| {
            let (line, _, _) = indicators::macd(&ctx.series());
            FeatureValue::Number(line)
        }),
        FeatureDescriptor::new("macd_signal", FeatureKind::Indicator, vec![], |ctx| {
            let (_, signal, _) = indicators::macd(&ctx.series());
            FeatureValue::Number(signal)
        }),
        FeatureDescriptor::new("macd_histogram", FeatureKind::Indicator, vec![], |ctx| {
            let (_, _, hist) = indicators::macd(&ctx.series());
            FeatureValue::Number(hist)
        }),
        FeatureDescriptor::new("bollinger_upper_20_2", FeatureKind::Indicator, vec![], |ctx| {
            let (upper, _, _) = indicators::bollinger(&ctx.series(), 20, 2.0);
            FeatureValue::Number(upper)
        }),
        FeatureDescriptor::new("bollinger_middle_20_2", FeatureKind::Indicator, vec![], |ctx| {
            let (_, middle, _) = indicators::bollinger(&ctx.series(), 20, 2.0);
            FeatureValue::Number(middle)
        }),
        FeatureDescriptor::new("bollinger_lower_20_2", FeatureKind::Indicator, vec![], |ctx| {
            let (_, _, lower) = indicators::bollinger(&ctx.series(), 20, 2.0);
            FeatureValue::Number(lower)
        }),
        numeric_indicator!("atr_14", 14usize, indicators::atr),
        numeric_indicator!("adx_14", 14usize, indicators::adx),
        FeatureDescriptor::new("stoch_k_14_3", FeatureKind::Indicator, vec![], |ctx| {
            let (k, _) = indicators::stochastic(&ctx.series(), 14, 3);
            FeatureValue::Number(k)
        }),
        FeatureDescriptor::new("stoch_d_14_3", FeatureKind::Indicator, vec![], |ctx| {
            let (_, d) = indicators::stochastic(&ctx.series(), 14, 3);
            FeatureValue::Number(d)
        }),
        numeric_indicator!("cci_20", 20usize, indicators::cci),
        numeric_indicator!("williams_r_14", 14usize, indicators::williams_r),
        FeatureDescriptor::new("obv", FeatureKind::Indicator, vec![], |ctx| {
            FeatureValue::Number(indicators::obv(&ctx.series()))
        }),
        FeatureDescriptor::new("vwap", FeatureKind::Indicator, vec![], |ctx| {
            FeatureValue::Number(indicators::vwap(&ctx.series()))
        }),
        numeric_indicator!("range_20", 20usize, indicators::rolling_range),
        FeatureDescriptor::new("sma_rising_20", FeatureKind::Indicator, vec![], |ctx| {
            FeatureValue::Boolean(indicators::sma_rising(&ctx.series(), 20))
        }),
        numeric_indicator!("high_252", 252usize, indicators::highest_high),
        numeric_indicator!("low_252", 252usize, indicators::lowest_low),
        FeatureDescriptor::new("cup_and_handle", FeatureKind::Microstructure, vec![], |ctx| {
            FeatureValue::Boolean(cup_and_handle(&ctx.series()).detected)
        }),
        FeatureDescriptor::new("cup_and_handle_confidence", FeatureKind::Microstructure, vec![], |ctx| {
            FeatureValue::Number(cup_and_handle(&ctx.series()).confidence)
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratkit_core::Bar;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 10.0).unwrap()
    }

    #[test]
    fn plan_orders_dependencies_before_dependents() {
        let mut registry = FeatureRegistry::new();
        registry
            .register(FeatureDescriptor::new("a", FeatureKind::Indicator, vec![], |_| {
                FeatureValue::Number(1.0)
            }))
            .unwrap();
        registry
            .register(FeatureDescriptor::new(
                "b",
                FeatureKind::Indicator,
                vec!["a".into()],
                |ctx| FeatureValue::Number(ctx.dependency("a").unwrap().as_number().unwrap() + 1.0),
            ))
            .unwrap();

        let plan = registry.plan(&["b".into()]).unwrap();
        assert_eq!(plan, vec![SmolStr::from("a"), SmolStr::from("b")]);
    }

    #[test]
    fn plan_rejects_cycles() {
        let mut registry = FeatureRegistry::new();
        registry
            .register(FeatureDescriptor::new(
                "a",
                FeatureKind::Indicator,
                vec!["b".into()],
                |_| FeatureValue::Number(1.0),
            ))
            .unwrap();
        registry
            .register(FeatureDescriptor::new(
                "b",
                FeatureKind::Indicator,
                vec!["a".into()],
                |_| FeatureValue::Number(1.0),
            ))
            .unwrap();

        let err = registry.plan(&["a".into()]).unwrap_err();
        assert!(matches!(err, RegistryError::CycleDetected(_)));
    }

    #[test]
    fn builtin_library_evaluates_a_known_feature() {
        let registry = FeatureRegistry::with_builtin_library();
        let plan = registry.plan(&["sma_20".into()]).unwrap();
        let series: Vec<Bar> = (0..25).map(|i| bar(i, 100.0 + i as f64)).collect();
        let (last, history) = series.split_last().unwrap();
        let mut out = HashMap::new();
        registry.evaluate(&plan, last, history, &mut out);
        assert!(out.contains_key("sma_20"));
    }
}
