//! The five raw OHLCV fields, exposed as zero-dependency features so guard
//! expressions can reference `open`/`high`/`low`/`close`/`volume` the same
//! way they reference any computed indicator.

use crate::context::FeatureComputeContext;
use crate::descriptor::{FeatureDescriptor, FeatureKind};
use crate::value::FeatureValue;

pub fn builtin_descriptors() -> Vec<FeatureDescriptor> {
    vec![
        FeatureDescriptor::new("open", FeatureKind::Builtin, vec![], |ctx: &FeatureComputeContext<'_>| {
            FeatureValue::Number(ctx.bar.open)
        }),
        FeatureDescriptor::new("high", FeatureKind::Builtin, vec![], |ctx: &FeatureComputeContext<'_>| {
            FeatureValue::Number(ctx.bar.high)
        }),
        FeatureDescriptor::new("low", FeatureKind::Builtin, vec![], |ctx: &FeatureComputeContext<'_>| {
            FeatureValue::Number(ctx.bar.low)
        }),
        FeatureDescriptor::new("close", FeatureKind::Builtin, vec![], |ctx: &FeatureComputeContext<'_>| {
            FeatureValue::Number(ctx.bar.close)
        }),
        FeatureDescriptor::new("volume", FeatureKind::Builtin, vec![], |ctx: &FeatureComputeContext<'_>| {
            FeatureValue::Number(ctx.bar.volume)
        }),
    ]
}
