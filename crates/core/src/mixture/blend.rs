//! Combining, splitting and renormalising mixtures.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::reaction::ReactionId;
use crate::registry::Registry;
use crate::structure::{Species, SpeciesId};

use super::{Mixture, MIN_TEMPERATURE};

/// The two mixtures produced by [`Mixture::separate_phases`]. The gas phase
/// is always expressed at a nominal volume of one liter.
pub struct Phases {
    pub gas_mixture: Mixture,
    pub gas_volume: f64,
    pub liquid_mixture: Mixture,
    pub liquid_volume: f64,
}

impl Mixture {
    /// Combines mixtures weighted by their volumes.
    ///
    /// Concentrations and result progress merge volume-weighted. The
    /// temperature and phase split of the result are reconstructed by
    /// summing every part's internal energy referenced to absolute zero
    /// (sensible heat plus the latent heat of whatever is vaporised),
    /// building the merged mixture cold, and heating it with the combined
    /// energy so each phase boundary is re-crossed consistently.
    pub fn mix(registry: &Arc<Registry>, mut parts: Vec<(Mixture, f64)>) -> Mixture {
        if parts.is_empty() {
            return Mixture::new(registry.clone());
        }
        if parts.len() == 1 {
            let (mixture, _) = parts.remove(0);
            return mixture;
        }

        let mut total_volume = 0.0;
        let mut total_energy = 0.0;
        let mut species_moles: FxHashMap<SpeciesId, (Arc<Species>, f64)> = FxHashMap::default();
        let mut result_moles: FxHashMap<ReactionId, f64> = FxHashMap::default();
        for (mixture, volume) in &parts {
            total_volume += volume;
            for content in mixture.contents.values() {
                let moles = content.concentration * volume;
                species_moles
                    .entry(content.species.id().clone())
                    .or_insert_with(|| (content.species.clone(), 0.0))
                    .1 += moles;
                total_energy += content.species.molar_heat_capacity()
                    * content.concentration
                    * mixture.temperature
                    * volume;
                total_energy += content.species.latent_heat()
                    * content.concentration
                    * content.gas_fraction
                    * volume;
            }
            for (reaction_id, progress) in &mixture.result_progress {
                *result_moles.entry(reaction_id.clone()).or_insert(0.0) += progress * volume;
            }
        }

        let mut result = Mixture::new(registry.clone());
        if total_volume <= 0.0 {
            return result;
        }
        result.temperature = MIN_TEMPERATURE;
        for (species, moles) in species_moles.into_values() {
            result.internal_add_species(species, moles / total_volume, false);
        }
        for (reaction_id, moles) in result_moles {
            result.result_progress.insert(reaction_id, moles / total_volume);
        }
        result.update_next_boiling_points(false);
        result.heat(total_energy / total_volume);
        result.refresh_possible_reactions();
        result.update_next_boiling_points(false);
        result
    }

    /// Splits the mixture into its gas and liquid parts.
    ///
    /// The liquid volume is computed from the pure concentrations of the
    /// dissolved species; the gas phase is expressed at a nominal volume of
    /// one liter. Result progress is shared between the phases in the
    /// original's volume ratio.
    pub fn separate_phases(&self, volume: f64) -> Phases {
        let gas_volume = 1.0;
        let mut liquid_volume = 0.0;
        let mut liquid_moles: Vec<(Arc<Species>, f64)> = Vec::new();
        let mut gas_moles: Vec<(Arc<Species>, f64)> = Vec::new();
        for content in self.contents.values() {
            let moles_gaseous = content.concentration * content.gas_fraction * volume;
            let moles_liquid = content.concentration * (1.0 - content.gas_fraction) * volume;
            liquid_volume += moles_liquid / content.species.pure_concentration();
            if moles_liquid > 0.0 {
                liquid_moles.push((content.species.clone(), moles_liquid));
            }
            if moles_gaseous > 0.0 {
                gas_moles.push((content.species.clone(), moles_gaseous));
            }
        }

        let mut liquid_mixture = Mixture::new(self.registry.clone());
        let mut gas_mixture = Mixture::new(self.registry.clone());
        liquid_mixture.temperature = self.temperature;
        gas_mixture.temperature = self.temperature;
        if liquid_volume > 0.0 {
            for (species, moles) in liquid_moles {
                liquid_mixture.internal_add_species(species, moles / liquid_volume, false);
            }
        }
        for (species, moles) in gas_moles {
            let id = species.id().clone();
            gas_mixture.internal_add_species(species, moles / gas_volume, false);
            if let Some(content) = gas_mixture.contents.get_mut(&id) {
                content.gas_fraction = 1.0;
            }
        }
        for (reaction_id, progress) in &self.result_progress {
            let result_moles = progress * volume;
            if liquid_volume > 0.0 {
                let share = result_moles / (liquid_volume * gas_volume);
                liquid_mixture
                    .result_progress
                    .insert(reaction_id.clone(), share);
                gas_mixture
                    .result_progress
                    .insert(reaction_id.clone(), share);
            } else {
                gas_mixture
                    .result_progress
                    .insert(reaction_id.clone(), result_moles / gas_volume);
            }
        }
        liquid_mixture.update_next_boiling_points(false);
        gas_mixture.update_next_boiling_points(false);
        liquid_mixture.refresh_possible_reactions();
        gas_mixture.refresh_possible_reactions();
        liquid_mixture.at_equilibrium = self.at_equilibrium;
        gas_mixture.at_equilibrium = self.at_equilibrium;

        Phases {
            gas_mixture,
            gas_volume,
            liquid_mixture,
            liquid_volume,
        }
    }

    /// Rescales the mixture to a multiple of its volume, isothermally:
    /// concentrations and result progress divide by the multiplier.
    pub fn scale(&mut self, volume_multiplier: f64) {
        for content in self.contents.values_mut() {
            content.concentration /= volume_multiplier;
        }
        for progress in self.result_progress.values_mut() {
            *progress /= volume_multiplier;
        }
    }

    /// Recomputes the volume from the pure concentrations of everything
    /// dissolved, so no mixture is denser than its pure components, and
    /// rescales concentrations accordingly. Returns the new volume in
    /// liters.
    pub fn normalize_volume(&mut self, initial_volume: f64) -> f64 {
        if self.contents.is_empty() {
            return 0.0;
        }
        let mut new_volume = 0.0;
        for content in self.contents.values() {
            new_volume +=
                content.concentration * initial_volume / content.species.pure_concentration();
        }
        if new_volume <= 0.0 {
            return 0.0;
        }
        let factor = initial_volume / new_volume;
        for content in self.contents.values_mut() {
            content.concentration *= factor;
        }
        for progress in self.result_progress.values_mut() {
            *progress *= factor;
        }
        new_volume
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::registry::RegistryBuilder;
    use crate::structure::Species;

    use super::*;

    #[test]
    fn scale_preserves_total_moles() {
        let mut builder = RegistryBuilder::new();
        let solute = builder.add_species(Species::builder("test:solute").build());
        let registry = builder.build();

        let mut mixture = Mixture::new(registry);
        mixture.add_species(&solute, 3.0);
        // 1 L at 3 mol/L rescaled to 1.5 L holds 2 mol/L.
        mixture.scale(1.5);
        assert_relative_eq!(mixture.concentration_of(solute.id()), 2.0);
    }

    #[test]
    fn normalize_volume_caps_density_at_the_pure_substance() {
        let mut builder = RegistryBuilder::new();
        let solute = builder.add_species(
            Species::builder("test:solute")
                .pure_concentration(10.0)
                .build(),
        );
        let registry = builder.build();

        let mut mixture = Mixture::new(registry);
        // 20 mol/L is twice as dense as the pure substance allows.
        mixture.add_species(&solute, 20.0);
        let new_volume = mixture.normalize_volume(1.0);
        assert_relative_eq!(new_volume, 2.0);
        assert_relative_eq!(mixture.concentration_of(solute.id()), 10.0);
    }
}
