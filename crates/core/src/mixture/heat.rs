//! Thermal behaviour: heating, boiling, condensing.

use crate::structure::SpeciesId;

use super::{Mixture, MIN_TEMPERATURE};

impl Mixture {
    /// Supplies (or removes, when negative) energy in joules per liter of
    /// mixture.
    ///
    /// Temperature moves by `energy / volumetric_heat_capacity` until it
    /// meets the nearest boiling point on the way; the remaining energy then
    /// goes into latent heat, vaporising (or condensing) that species
    /// partially or fully. Fully crossing a phase boundary recurses with the
    /// leftover energy. Temperature never drops below an epsilon above
    /// absolute zero.
    pub fn heat(&mut self, energy_density: f64) {
        let volumetric_heat_capacity = self.volumetric_heat_capacity();
        if volumetric_heat_capacity <= 0.0 {
            return;
        }
        let temperature_change = energy_density / volumetric_heat_capacity;
        if temperature_change == 0.0 {
            return;
        }
        if temperature_change > 0.0 {
            match self.next_higher_boiling_point.clone() {
                Some((boiling_point, id))
                    if self.temperature + temperature_change >= boiling_point =>
                {
                    let absorbed = (boiling_point - self.temperature) * volumetric_heat_capacity;
                    self.temperature = boiling_point;
                    let remaining = energy_density - absorbed;
                    let (latent_heat, concentration, gas_fraction) = {
                        let content = &self.contents[&id];
                        (
                            content.species.latent_heat(),
                            content.concentration,
                            content.gas_fraction,
                        )
                    };
                    let to_fully_vaporise = latent_heat * concentration * (1.0 - gas_fraction);
                    if remaining > to_fully_vaporise {
                        if let Some(content) = self.contents.get_mut(&id) {
                            content.gas_fraction = 1.0;
                        }
                        self.boiling = false;
                        self.at_equilibrium = false;
                        self.update_next_boiling_points(true);
                        self.heat(remaining - to_fully_vaporise);
                    } else if latent_heat > 0.0 && concentration > 0.0 {
                        let vaporised = remaining / (latent_heat * concentration);
                        if let Some(content) = self.contents.get_mut(&id) {
                            content.gas_fraction += vaporised;
                        }
                        self.boiling = true;
                        self.at_equilibrium = false;
                    }
                }
                _ => self.temperature += temperature_change,
            }
        } else {
            match self.next_lower_boiling_point.clone() {
                Some((boiling_point, id))
                    if self.temperature + temperature_change < boiling_point =>
                {
                    let released = (self.temperature - boiling_point) * volumetric_heat_capacity;
                    self.temperature = boiling_point;
                    let remaining = energy_density + released;
                    let (latent_heat, concentration, gas_fraction) = {
                        let content = &self.contents[&id];
                        (
                            content.species.latent_heat(),
                            content.concentration,
                            content.gas_fraction,
                        )
                    };
                    let to_fully_condense = latent_heat * concentration * gas_fraction;
                    if -remaining > to_fully_condense {
                        if let Some(content) = self.contents.get_mut(&id) {
                            content.gas_fraction = 0.0;
                        }
                        self.boiling = false;
                        self.at_equilibrium = false;
                        self.update_next_boiling_points(true);
                        self.heat(remaining + to_fully_condense);
                    } else if latent_heat > 0.0 && concentration > 0.0 {
                        let condensed = -remaining / (latent_heat * concentration);
                        if let Some(content) = self.contents.get_mut(&id) {
                            content.gas_fraction -= condensed;
                        }
                        self.boiling = true;
                        self.at_equilibrium = false;
                    }
                }
                _ => self.temperature += temperature_change,
            }
        }
        if self.temperature < MIN_TEMPERATURE {
            self.temperature = MIN_TEMPERATURE;
        }
    }

    /// Jumps straight to a temperature, snapping every species to the phase
    /// its boiling point dictates. Partial gas fractions are lost; use
    /// [`Mixture::heat`] for energy-conserving changes.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.max(MIN_TEMPERATURE);
        for content in self.contents.values_mut() {
            content.gas_fraction = if content.species.boiling_point() < self.temperature {
                1.0
            } else {
                0.0
            };
        }
        self.boiling = false;
        self.update_next_boiling_points(false);
        self.at_equilibrium = false;
    }

    /// Recomputes the cached nearest boiling points above and below the
    /// current temperature. With `ignore_current`, a boiling point exactly
    /// at the current temperature is skipped in both directions (used right
    /// after fully crossing it).
    pub(crate) fn update_next_boiling_points(&mut self, ignore_current: bool) {
        let mut higher: Option<(f64, SpeciesId)> = None;
        let mut lower: Option<(f64, SpeciesId)> = None;
        for (id, content) in &self.contents {
            let boiling_point = content.species.boiling_point();
            let is_above = boiling_point > self.temperature
                || (boiling_point == self.temperature && !ignore_current);
            let is_below = boiling_point < self.temperature
                || (boiling_point == self.temperature && !ignore_current);
            if is_above
                && higher
                    .as_ref()
                    .is_none_or(|(best, _)| boiling_point < *best)
            {
                higher = Some((boiling_point, id.clone()));
            }
            if is_below
                && lower
                    .as_ref()
                    .is_none_or(|(best, _)| boiling_point > *best)
            {
                lower = Some((boiling_point, id.clone()));
            }
        }
        self.next_higher_boiling_point = higher;
        self.next_lower_boiling_point = lower;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use crate::registry::{Registry, RegistryBuilder};
    use crate::structure::Species;

    use super::*;

    fn solvent_registry() -> (Arc<Registry>, Arc<Species>) {
        let mut builder = RegistryBuilder::new();
        let solvent = builder.add_species(
            Species::builder("test:solvent")
                .boiling_point(350.0)
                .molar_heat_capacity(100.0)
                .latent_heat(40_000.0)
                .pure_concentration(10.0)
                .build(),
        );
        (builder.build(), solvent)
    }

    fn solvent_mixture() -> (Mixture, Arc<Species>) {
        let (registry, solvent) = solvent_registry();
        let mut mixture = Mixture::new(registry);
        mixture.set_temperature(300.0);
        mixture.add_species(&solvent, 1.0);
        (mixture, solvent)
    }

    #[test]
    fn heating_below_the_boiling_point_only_warms() {
        let (mut mixture, solvent) = solvent_mixture();
        // 1 mol/L at 100 J/(mol K) absorbs 100 J/L per kelvin.
        mixture.heat(2000.0);
        assert_relative_eq!(mixture.temperature(), 320.0, epsilon = 1e-9);
        assert_relative_eq!(mixture.gas_fraction_of(solvent.id()), 0.0);
        assert!(!mixture.is_boiling());
    }

    #[test]
    fn crossing_the_boiling_point_vaporises_partially() {
        let (mut mixture, solvent) = solvent_mixture();
        // 5000 J/L warms to exactly 350 K; the excess 20 kJ/L is half the
        // latent heat of the mol/L present.
        mixture.heat(5000.0 + 20_000.0);
        assert_relative_eq!(mixture.temperature(), 350.0, epsilon = 1e-9);
        assert_relative_eq!(mixture.gas_fraction_of(solvent.id()), 0.5, epsilon = 1e-9);
        assert!(mixture.is_boiling());
    }

    #[test]
    fn excess_energy_finishes_the_boil_and_keeps_warming() {
        let (mut mixture, solvent) = solvent_mixture();
        // 5000 J/L to reach the boiling point, 40 kJ/L to boil everything,
        // then 1000 J/L of sensible heat on the far side.
        mixture.heat(5000.0 + 40_000.0 + 1000.0);
        assert_relative_eq!(mixture.gas_fraction_of(solvent.id()), 1.0);
        assert_relative_eq!(mixture.temperature(), 360.0, epsilon = 1e-9);
        assert!(!mixture.is_boiling());
    }

    #[test]
    fn cooling_condenses_symmetrically() {
        let (registry, solvent) = solvent_registry();
        let mut mixture = Mixture::new(registry);
        mixture.set_temperature(360.0);
        // Added above its boiling point, the solvent starts fully gaseous.
        mixture.add_species(&solvent, 1.0);
        assert_relative_eq!(mixture.gas_fraction_of(solvent.id()), 1.0);

        // 1000 J/L brings it down to 350 K; another 10 kJ/L condenses a
        // quarter of it.
        mixture.heat(-(1000.0 + 10_000.0));
        assert_relative_eq!(mixture.temperature(), 350.0, epsilon = 1e-9);
        assert_relative_eq!(mixture.gas_fraction_of(solvent.id()), 0.75, epsilon = 1e-9);
        assert!(mixture.is_boiling());
    }

    #[test]
    fn temperature_never_reaches_absolute_zero() {
        let (mut mixture, _) = solvent_mixture();
        mixture.heat(-1e12);
        assert!(mixture.temperature() >= MIN_TEMPERATURE);
    }

    #[test]
    fn heating_an_empty_mixture_is_a_no_op() {
        let (registry, _) = solvent_registry();
        let mut mixture = Mixture::new(registry);
        mixture.heat(1e6);
        assert_relative_eq!(mixture.temperature(), 298.15);
    }
}
