//! The bounded 13-parameter search space and its constraint-repair rules.

use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Float,
    Int,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub kind: ParamType,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// A parameter vector keyed by name, holding every gene as `f64`
/// (integer-typed genes are always integral-valued floats).
pub type ParamVec = BTreeMap<&'static str, f64>;

pub const PARAM_NAMES: [&str; 13] = [
    "g_ob_quality",
    "g_momentum",
    "g_volatility",
    "g_liquidity",
    "g_ml_confidence",
    "alpha_threshold",
    "adx_trend_threshold",
    "adx_sideways_threshold",
    "atr_high_mult",
    "atr_low_mult",
    "stop_loss_atr_mult",
    "take_profit_r_mult",
    "risk_per_trade_pct",
];

/// The 13-parameter space table, as specified.
pub struct ParamSpace {
    pub defs: BTreeMap<&'static str, ParamDef>,
}

impl Default for ParamSpace {
    fn default() -> Self {
        let mut defs = BTreeMap::new();
        let mut put = |name, kind, min, max, default| {
            defs.insert(
                name,
                ParamDef {
                    kind,
                    min,
                    max,
                    default,
                },
            );
        };
        put("g_ob_quality", ParamType::Float, 0.50, 2.00, 1.00);
        put("g_momentum", ParamType::Float, 0.50, 2.00, 1.00);
        put("g_volatility", ParamType::Float, 0.50, 2.00, 1.00);
        put("g_liquidity", ParamType::Float, 0.50, 2.00, 1.00);
        put("g_ml_confidence", ParamType::Float, 0.00, 1.50, 1.00);
        put("alpha_threshold", ParamType::Float, 0.45, 0.75, 0.60);
        put("adx_trend_threshold", ParamType::Int, 20.0, 35.0, 25.0);
        put("adx_sideways_threshold", ParamType::Int, 10.0, 22.0, 15.0);
        put("atr_high_mult", ParamType::Float, 1.20, 2.00, 1.50);
        put("atr_low_mult", ParamType::Float, 0.45, 0.85, 0.65);
        put("stop_loss_atr_mult", ParamType::Float, 1.00, 3.50, 2.00);
        put("take_profit_r_mult", ParamType::Float, 1.00, 4.00, 2.00);
        put("risk_per_trade_pct", ParamType::Float, 0.25, 1.25, 1.00);
        Self { defs }
    }
}

impl ParamSpace {
    pub fn get_defaults(&self) -> ParamVec {
        self.defs.iter().map(|(&name, def)| (name, def.default)).collect()
    }

    pub fn sample_random(&self, rng: &mut impl Rng) -> ParamVec {
        self.defs
            .iter()
            .map(|(&name, def)| {
                let value = match def.kind {
                    ParamType::Float => {
                        let v = rng.random_range(def.min..=def.max);
                        (v * 100.0).round() / 100.0
                    }
                    ParamType::Int => rng.random_range(def.min as i64..=def.max as i64) as f64,
                };
                (name, value)
            })
            .collect()
    }
}

/// Clips every value to `[min, max]`, coerces integer-typed genes to
/// integers, then repairs `adx_sideways_threshold < adx_trend_threshold`.
/// Idempotent: applying this twice yields the same vector.
pub fn project_constraints(space: &ParamSpace, params: &ParamVec) -> ParamVec {
    let mut out = ParamVec::new();
    for (&name, def) in &space.defs {
        let raw = *params.get(name).unwrap_or(&def.default);
        let clipped = raw.clamp(def.min, def.max);
        let value = match def.kind {
            ParamType::Float => clipped,
            ParamType::Int => clipped.round(),
        };
        out.insert(name, value);
    }

    if let (Some(&trend), Some(&sideways)) = (
        out.get("adx_trend_threshold"),
        out.get("adx_sideways_threshold"),
    ) {
        if sideways >= trend {
            out.insert("adx_sideways_threshold", trend - 1.0);
        }
    }

    out
}
