//! The mixture: concentrations, phases, temperature and the tick loop.

mod blend;
mod heat;
mod persistence;
mod tick;

pub use blend::Phases;
pub use persistence::{ContentRecord, MixtureRecord, PersistenceError, ResultProgressRecord};

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::generic::BoundGroup;
use crate::groups::GroupKind;
use crate::library;
use crate::reaction::{Reaction, ReactionId, ResultKind};
use crate::registry::Registry;
use crate::structure::{Species, SpeciesId};

/// Per-tick concentration changes at or below this threshold count as
/// stasis for equilibrium detection.
pub const CONCENTRATION_EPSILON: f64 = 1.0 / (512.0 * 512.0);

/// Ticks a species lingers at zero concentration before it is removed, so
/// oscillating reversible pairs don't thrash the possible-reaction set.
const REMOVAL_GRACE_TICKS: u32 = 10;

/// Temperatures are clamped above absolute zero to keep Arrhenius factors
/// finite.
pub(crate) const MIN_TEMPERATURE: f64 = 1e-4;

/// Per-species state held by a mixture.
pub(crate) struct Content {
    pub(crate) species: Arc<Species>,
    /// mol/L, relative to the whole mixture volume.
    pub(crate) concentration: f64,
    /// Fraction of this species currently vaporised, in `[0, 1]`.
    pub(crate) gas_fraction: f64,
}

/// A well-mixed volume of dissolved species simulated against a shared
/// registry. All state needed to resume simulation deterministically is
/// either held here or reconstructed from the registry on load.
pub struct Mixture {
    pub(crate) registry: Arc<Registry>,
    pub(crate) display_key: String,
    pub(crate) temperature: f64,
    pub(crate) contents: FxHashMap<SpeciesId, Content>,
    pub(crate) groups_present: FxHashMap<GroupKind, Vec<BoundGroup>>,
    pub(crate) possible_reactions: Vec<Arc<Reaction>>,
    pub(crate) result_progress: FxHashMap<ReactionId, f64>,
    pub(crate) pending_novel_results: Vec<SpeciesId>,
    pub(crate) pending_removal: FxHashMap<SpeciesId, u32>,
    pub(crate) next_higher_boiling_point: Option<(f64, SpeciesId)>,
    pub(crate) next_lower_boiling_point: Option<(f64, SpeciesId)>,
    pub(crate) at_equilibrium: bool,
    pub(crate) boiling: bool,
}

impl Mixture {
    pub fn new(registry: Arc<Registry>) -> Mixture {
        Mixture {
            registry,
            display_key: String::new(),
            temperature: 298.15,
            contents: FxHashMap::default(),
            groups_present: FxHashMap::default(),
            possible_reactions: Vec::new(),
            result_progress: FxHashMap::default(),
            pending_novel_results: Vec::new(),
            pending_removal: FxHashMap::default(),
            next_higher_boiling_point: None,
            next_lower_boiling_point: None,
            at_equilibrium: false,
            boiling: false,
        }
    }

    /// A mixture of the pure substance. Charged species are paired with a
    /// spectator counter-ion (sodium or chloride) and renormalised to unit
    /// volume so the result is electrically neutral.
    pub fn pure(species: &Arc<Species>, registry: &Arc<Registry>) -> Mixture {
        let mut mixture = Mixture::new(registry.clone());
        if species.charge() == 0 {
            mixture.add_species(species, species.pure_concentration());
        } else {
            let counter_id = if species.charge() < 0 {
                library::SODIUM_ION
            } else {
                library::CHLORIDE
            };
            mixture.add_species(species, 1.0);
            if let Some(counter_ion) = registry.species_named(counter_id) {
                mixture.add_species(&counter_ion, f64::from(species.charge().abs()));
            } else {
                warn!(species = %species.id(), "no counter-ion registered, mixture left charged");
            }
            mixture.normalize_volume(1.0);
        }
        mixture
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn display_key(&self) -> &str {
        &self.display_key
    }

    pub fn set_display_key(&mut self, key: &str) {
        self.display_key = key.to_owned();
    }

    /// Temperature in kelvins.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn is_at_equilibrium(&self) -> bool {
        self.at_equilibrium
    }

    /// True while some species is part-way through a phase change.
    pub fn is_boiling(&self) -> bool {
        self.boiling
    }

    /// Forces the next tick to re-evaluate reactions.
    pub fn disturb_equilibrium(&mut self) {
        self.at_equilibrium = false;
    }

    pub fn concentration_of(&self, id: &SpeciesId) -> f64 {
        self.contents.get(id).map_or(0.0, |content| content.concentration)
    }

    pub fn gas_fraction_of(&self, id: &SpeciesId) -> f64 {
        self.contents.get(id).map_or(0.0, |content| content.gas_fraction)
    }

    pub fn species_present(&self) -> impl Iterator<Item = &Arc<Species>> {
        self.contents.values().map(|content| &content.species)
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// The reactions that could currently proceed, as of the last refresh.
    pub fn possible_reactions(&self) -> &[Arc<Reaction>] {
        &self.possible_reactions
    }

    /// J/(K·L): how much energy one liter of this mixture absorbs per kelvin.
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.contents
            .values()
            .map(|content| content.species.molar_heat_capacity() * content.concentration)
            .sum()
    }

    /// Adds to the concentration of a species, inserting it if absent.
    pub fn add_species(&mut self, species: &Arc<Species>, concentration: f64) {
        self.change_concentration(species, concentration, true);
    }

    pub fn set_concentration(&mut self, species: &Arc<Species>, concentration: f64) {
        let change = concentration - self.concentration_of(species.id());
        if change != 0.0 {
            self.change_concentration(species, change, true);
        }
    }

    /// Removes a species immediately, bypassing the grace period.
    pub fn remove_species(&mut self, id: &SpeciesId) {
        self.pending_removal.remove(id);
        self.remove_species_internal(id);
        self.refresh_possible_reactions();
    }

    /// Pins the vaporised fraction of a present species.
    ///
    /// # Panics
    /// Panics when `fraction` lies outside `[0, 1]`.
    pub fn set_gas_fraction(&mut self, id: &SpeciesId, fraction: f64) {
        assert!(
            (0.0..=1.0).contains(&fraction),
            "gas fraction must lie in [0, 1], got {fraction}"
        );
        if let Some(content) = self.contents.get_mut(id) {
            content.gas_fraction = fraction;
            // Pinning to 0 or 1 can end a phase change, so recompute rather
            // than only ever setting the flag.
            self.boiling = self
                .contents
                .values()
                .any(|content| content.gas_fraction > 0.0 && content.gas_fraction < 1.0);
            self.at_equilibrium = false;
        }
    }

    /// Applies a signed concentration change.
    ///
    /// # Panics
    /// Panics when asked to decrease a species that is absent or already at
    /// zero; reactions guard against this by capping at the limiting
    /// reagent, so hitting it is a programming error.
    pub(crate) fn change_concentration(
        &mut self,
        species: &Arc<Species>,
        change: f64,
        refresh: bool,
    ) {
        let Some(content) = self.contents.get_mut(species.id()) else {
            assert!(
                change > 0.0,
                "attempted to change the concentration of {} which is not present",
                species.id()
            );
            self.internal_add_species(species.clone(), change, refresh);
            return;
        };
        assert!(
            content.concentration > 0.0 || change >= 0.0,
            "attempted to decrease the concentration of {} below zero",
            species.id()
        );
        content.concentration = (content.concentration + change).max(0.0);
        if content.concentration <= 0.0 {
            self.pending_removal
                .insert(species.id().clone(), REMOVAL_GRACE_TICKS);
        } else {
            self.pending_removal.remove(species.id());
        }
        if refresh {
            // External additions and removals must wake a settled mixture;
            // reaction-driven changes pass refresh = false and rely on the
            // tick loop's own equilibrium detection.
            self.at_equilibrium = false;
            self.refresh_possible_reactions();
        }
    }

    /// Inserts a species the mixture does not yet contain. Returns true when
    /// a new entry was created (novel products trigger a refresh on this).
    pub(crate) fn internal_add_species(
        &mut self,
        species: Arc<Species>,
        concentration: f64,
        refresh: bool,
    ) -> bool {
        if self.contents.contains_key(species.id()) {
            self.change_concentration(&species, concentration, refresh);
            return false;
        }
        let gas_fraction = if species.boiling_point() < self.temperature {
            1.0
        } else {
            0.0
        };
        for group in species.groups() {
            self.groups_present
                .entry(group.kind())
                .or_default()
                .push(BoundGroup {
                    species: species.clone(),
                    group: group.clone(),
                });
        }
        let id = species.id().clone();
        if species.is_novel() {
            self.pending_novel_results.push(id.clone());
        }
        self.contents.insert(
            id,
            Content {
                species,
                concentration,
                gas_fraction,
            },
        );
        self.update_next_boiling_points(false);
        self.at_equilibrium = false;
        if refresh {
            self.refresh_possible_reactions();
        }
        true
    }

    /// Drops a species and its group instances. Callers refresh the
    /// possible-reaction set afterwards.
    pub(crate) fn remove_species_internal(&mut self, id: &SpeciesId) {
        let Some(content) = self.contents.remove(id) else {
            return;
        };
        for group in content.species.groups() {
            let kind = group.kind();
            if let Some(instances) = self.groups_present.get_mut(&kind) {
                instances.retain(|bound| bound.species.id() != id);
                if instances.is_empty() {
                    self.groups_present.remove(&kind);
                }
            }
        }
        self.at_equilibrium = false;
        self.update_next_boiling_points(false);
    }

    /// Drains every result that has accumulated enough progress, counted in
    /// whole multiples at the given mixture volume. One-off results are
    /// reported once and forgotten.
    pub fn completed_results(&mut self, volume: f64) -> FxHashMap<ResultKind, u32> {
        let mut completed: FxHashMap<ResultKind, u32> = FxHashMap::default();
        for species_id in std::mem::take(&mut self.pending_novel_results) {
            *completed
                .entry(ResultKind::NovelCompound { species: species_id })
                .or_insert(0) += 1;
        }
        let registry = self.registry.clone();
        let reaction_ids: Vec<ReactionId> = self.result_progress.keys().cloned().collect();
        for reaction_id in reaction_ids {
            let Some(reaction) = registry.reaction(&reaction_id) else {
                continue;
            };
            let Some(result) = reaction.result() else {
                continue;
            };
            if result.is_one_off() {
                *completed.entry(result.kind().clone()).or_insert(0) += 1;
                self.result_progress.remove(&reaction_id);
                continue;
            }
            let Some(progress) = self.result_progress.get_mut(&reaction_id) else {
                continue;
            };
            let count = (volume * *progress / result.required_moles()) as u32;
            if count == 0 {
                continue;
            }
            *progress -= f64::from(count) * result.required_moles() / volume;
            // Distinct reactions may share a result kind; their counts add.
            *completed.entry(result.kind().clone()).or_insert(0) += count;
        }
        completed
    }

    pub(crate) fn concentrations_close(a: f64, b: f64) -> bool {
        (a - b).abs() <= CONCENTRATION_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::library::{self, default_registry};
    use crate::reaction::{ReactionBuilder, ReactionId};
    use crate::registry::RegistryBuilder;

    use super::*;

    #[test]
    fn pure_neutral_species_fills_to_its_pure_concentration() {
        let registry = default_registry();
        let water = registry.species_named(library::WATER).unwrap();
        let mixture = Mixture::pure(&water, &registry);
        assert_relative_eq!(mixture.concentration_of(water.id()), 55.5);
    }

    #[test]
    fn pure_charged_species_gets_a_counter_ion() {
        let registry = default_registry();
        let acetate = registry.species_named(library::ACETATE).unwrap();
        let sodium = registry.species_named(library::SODIUM_ION).unwrap();
        let mixture = Mixture::pure(&acetate, &registry);
        assert!(mixture.concentration_of(sodium.id()) > 0.0);
        // Equal parts of a -1 anion and a +1 counter-ion stay neutral.
        assert_relative_eq!(
            mixture.concentration_of(acetate.id()),
            mixture.concentration_of(sodium.id()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn completed_results_count_whole_multiples() {
        let registry = default_registry();
        let mut mixture = Mixture::new(registry);
        let reaction_id = ReactionId::new("chem:acetic_acid.dissociation");
        mixture.result_progress.insert(reaction_id.clone(), 0.0);
        // No result payload on this reaction: progress alone yields nothing.
        assert!(mixture.completed_results(1.0).is_empty());
        assert!(mixture.result_progress.contains_key(&reaction_id));
    }

    #[test]
    fn results_sharing_a_kind_accumulate() {
        let mut builder = RegistryBuilder::new();
        let a = builder.add_species(Species::builder("test:a").build());
        let b = builder.add_species(Species::builder("test:b").build());
        let c = builder.add_species(Species::builder("test:c").build());
        let kind = ResultKind::Custom {
            label: "crystal".to_owned(),
        };
        ReactionBuilder::new("test")
            .id("first")
            .reactant(&a)
            .product(&b)
            .preexponential_factor(1e4)
            .with_result(1.0, kind.clone())
            .build(&mut builder)
            .unwrap();
        ReactionBuilder::new("test")
            .id("second")
            .reactant(&b)
            .product(&c)
            .preexponential_factor(1e4)
            .with_result(1.0, kind.clone())
            .build(&mut builder)
            .unwrap();

        let mut mixture = Mixture::new(builder.build());
        mixture
            .result_progress
            .insert(ReactionId::new("test:first"), 1.0);
        mixture
            .result_progress
            .insert(ReactionId::new("test:second"), 2.0);
        let completed = mixture.completed_results(1.0);
        assert_eq!(completed[&kind], 3);
    }

    #[test]
    fn pinning_a_whole_gas_fraction_clears_the_boiling_flag() {
        let registry = default_registry();
        let water = registry.species_named(library::WATER).unwrap();
        let mut mixture = Mixture::new(registry);
        mixture.add_species(&water, 10.0);

        mixture.set_gas_fraction(water.id(), 0.5);
        assert!(mixture.is_boiling());
        mixture.set_gas_fraction(water.id(), 1.0);
        assert!(!mixture.is_boiling());
        mixture.set_gas_fraction(water.id(), 0.25);
        assert!(mixture.is_boiling());
        mixture.set_gas_fraction(water.id(), 0.0);
        assert!(!mixture.is_boiling());
    }
}
