//! Driving mixtures to equilibrium.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::mixture::Mixture;
use crate::reaction::{ResultKind, Token};

/// Simulation rate: one tick is a twentieth of a second.
pub const TICKS_PER_SECOND: f64 = 20.0;

/// Hard bound on how long a mixture may chase equilibrium in one run.
pub const MAX_EQUILIBRIUM_TICKS: u32 = 600;

/// W/K coupling between the mixture and its surroundings.
pub const VESSEL_CONDUCTANCE: f64 = 100.0;

/// Per-run environment a mixture reacts within: the solid tokens offered for
/// dissolution and the ultraviolet power reaching the vessel.
#[derive(Default)]
pub struct ReactionContext {
    pub tokens: Vec<Token>,
    pub uv_power: f64,
}

impl ReactionContext {
    pub fn new() -> Self {
        ReactionContext::default()
    }

    pub fn with_tokens(tokens: Vec<Token>) -> Self {
        ReactionContext {
            tokens,
            uv_power: 0.0,
        }
    }
}

/// Outcome of a [`Mixture::run_to_equilibrium`] call.
pub struct EquilibriumRun {
    /// Ticks actually simulated; equal to [`MAX_EQUILIBRIUM_TICKS`] when the
    /// mixture failed to settle.
    pub ticks: u32,
    /// Completed reaction results, by kind.
    pub results: FxHashMap<ResultKind, u32>,
    /// Volume in liters after renormalisation.
    pub new_volume: f64,
}

impl Mixture {
    /// Dissolves the offered tokens, then ticks the mixture until it reaches
    /// equilibrium or the tick bound, exchanging heat with the surroundings
    /// each tick. Finishes by renormalising the volume and collecting
    /// completed results.
    pub fn run_to_equilibrium(
        &mut self,
        volume: f64,
        context: &mut ReactionContext,
        heating_power: f64,
        ambient_temperature: f64,
    ) -> EquilibriumRun {
        self.dissolve_tokens(context, volume);
        let mut ticks = 0;
        while !self.is_at_equilibrium() && ticks < MAX_EQUILIBRIUM_TICKS {
            let energy = heating_power / TICKS_PER_SECOND
                + (ambient_temperature - self.temperature()) * VESSEL_CONDUCTANCE
                    / TICKS_PER_SECOND;
            if energy.abs() > 1e-4 {
                self.heat(energy / volume);
            }
            self.react_for_tick(context, 1);
            ticks += 1;
        }
        debug!(ticks, at_equilibrium = self.is_at_equilibrium(), "equilibrium run finished");
        if ticks == 0 {
            return EquilibriumRun {
                ticks,
                results: FxHashMap::default(),
                new_volume: volume,
            };
        }
        let new_volume = self.normalize_volume(volume);
        let results = self.completed_results(new_volume);
        EquilibriumRun {
            ticks,
            results,
            new_volume,
        }
    }

    /// Runs a batch of independent mixtures to equilibrium in parallel, each
    /// under the same conditions with its own copy of the token supply.
    pub fn run_all_to_equilibrium(
        mixtures: &mut [Mixture],
        volume: f64,
        tokens: &[Token],
        heating_power: f64,
        ambient_temperature: f64,
    ) -> Vec<EquilibriumRun> {
        mixtures
            .par_iter_mut()
            .map(|mixture| {
                let mut context = ReactionContext::with_tokens(tokens.to_vec());
                mixture.run_to_equilibrium(volume, &mut context, heating_power, ambient_temperature)
            })
            .collect()
    }
}

/// Free-function form of [`Mixture::run_all_to_equilibrium`].
pub fn run_all_to_equilibrium(
    mixtures: &mut [Mixture],
    volume: f64,
    tokens: &[Token],
    heating_power: f64,
    ambient_temperature: f64,
) -> Vec<EquilibriumRun> {
    Mixture::run_all_to_equilibrium(mixtures, volume, tokens, heating_power, ambient_temperature)
}
