// Walk-forward optimization domain: candles, market state, indicators,
// regime classification, alphas, parameter space, metrics/fitness, the
// genetic algorithm, and the rolling window generator.
pub mod wfo;
