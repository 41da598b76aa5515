//! Synthetic directional bias per instrument.
//!
//! Bias values are pure noise: a coin flip for direction and an independent
//! uniform score. Callers pass the RNG in, so a seeded `StdRng` makes the
//! output reproducible.

use rand::Rng;
use std::collections::BTreeMap;

use crate::types::{BiasResult, Direction, Instrument};

/// Generate a bias for a single instrument
pub fn generate_bias<R: Rng + ?Sized>(rng: &mut R) -> BiasResult {
    let bias = if rng.gen_bool(0.5) {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    let score = round2(rng.gen_range(-1.0..=1.0));

    BiasResult {
        bias,
        score,
        reasons: bias.reasons(),
    }
}

/// Generate a fresh bias for every tracked instrument
///
/// The map is keyed by [`Instrument`], so it serializes in instrument order.
pub fn get_all_bias<R: Rng + ?Sized>(rng: &mut R) -> BTreeMap<Instrument, BiasResult> {
    Instrument::ALL
        .iter()
        .map(|instrument| (*instrument, generate_bias(rng)))
        .collect()
}

fn round2(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(-1.0, 1.0)
}
