use crate::value::FeatureValue;
use smol_str::SmolStr;
use std::collections::HashMap;
use stratkit_core::Bar;

/// Everything a [`crate::descriptor::FeatureDescriptor`] evaluator needs to
/// compute its value for the current bar.
#[derive(Debug)]
pub struct FeatureComputeContext<'a> {
    /// The bar currently being processed.
    pub bar: &'a Bar,
    /// Prior bars, oldest first, NOT including `bar`.
    pub history: &'a [Bar],
    /// Feature values already computed for this bar, in dependency order.
    pub computed: &'a HashMap<SmolStr, FeatureValue>,
    /// Resolves to `bar.timestamp` — evaluators must never read the wall
    /// clock, so this is the only notion of "now" available to them.
    pub reference_timestamp: i64,
}

impl<'a> FeatureComputeContext<'a> {
    pub fn new(
        bar: &'a Bar,
        history: &'a [Bar],
        computed: &'a HashMap<SmolStr, FeatureValue>,
    ) -> Self {
        Self {
            bar,
            history,
            computed,
            reference_timestamp: bar.timestamp,
        }
    }

    /// Look up an already-computed dependency by name.
    pub fn dependency(&self, name: &str) -> Option<FeatureValue> {
        self.computed.get(name).copied()
    }

    /// The full chronological series: `history` followed by `bar`.
    ///
    /// Indicators recompute from scratch every bar (`spec.md` §4.2:
    /// "no hidden state"), so this is the slice every indicator function
    /// operates over.
    pub fn series(&self) -> Vec<Bar> {
        let mut out = Vec::with_capacity(self.history.len() + 1);
        out.extend_from_slice(self.history);
        out.push(*self.bar);
        out
    }
}
