//! The shared species and reaction registry.
//!
//! A registry is assembled once through [`RegistryBuilder`], then frozen
//! behind an `Arc` and shared by every mixture that simulates against it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::generic::GenericReaction;
use crate::library;
use crate::reaction::{Reaction, ReactionBuildError, ReactionBuilder, ReactionId};
use crate::structure::{Species, SpeciesId, Structure};

/// Scales the rate constants of the generated acid reactions. Large enough
/// that dissociation settles well inside the equilibrium tick bound, small
/// enough that it cannot overshoot within one tick.
const ACID_RATE_SCALE: f64 = 100.0;

/// Immutable lookup tables for species, reactions and reaction templates.
pub struct Registry {
    species: FxHashMap<SpeciesId, Arc<Species>>,
    by_signature: FxHashMap<String, Arc<Species>>,
    reactions: FxHashMap<ReactionId, Arc<Reaction>>,
    by_order_species: FxHashMap<SpeciesId, Vec<Arc<Reaction>>>,
    templates: Vec<GenericReaction>,
}

impl Registry {
    pub fn species(&self, id: &SpeciesId) -> Option<&Arc<Species>> {
        self.species.get(id)
    }

    pub fn species_named(&self, id: &str) -> Option<Arc<Species>> {
        self.species.get(&SpeciesId::new(id)).cloned()
    }

    /// Finds a registered species whose structure matches by signature, so
    /// templates can reuse registered products instead of minting novel ones.
    pub fn find_by_structure(&self, structure: &Structure) -> Option<Arc<Species>> {
        self.by_signature.get(&structure.signature()).cloned()
    }

    pub fn reaction(&self, id: &ReactionId) -> Option<&Arc<Reaction>> {
        self.reactions.get(id)
    }

    /// Registered reactions whose rate depends on the given species.
    pub fn reactions_involving(&self, id: &SpeciesId) -> &[Arc<Reaction>] {
        self.by_order_species.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn templates(&self) -> &[GenericReaction] {
        &self.templates
    }
}

/// Mutable accumulation stage of a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    species: FxHashMap<SpeciesId, Arc<Species>>,
    by_signature: FxHashMap<String, Arc<Species>>,
    reactions: FxHashMap<ReactionId, Arc<Reaction>>,
    by_order_species: FxHashMap<SpeciesId, Vec<Arc<Reaction>>>,
    templates: Vec<GenericReaction>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    pub fn add_species(&mut self, species: Species) -> Arc<Species> {
        let species = Arc::new(species);
        if let Some(structure) = species.structure() {
            self.by_signature
                .insert(structure.signature(), species.clone());
        }
        self.species.insert(species.id().clone(), species.clone());
        species
    }

    pub fn species_named(&self, id: &str) -> Option<Arc<Species>> {
        self.species.get(&SpeciesId::new(id)).cloned()
    }

    pub fn reaction(&self, id: &ReactionId) -> Option<&Arc<Reaction>> {
        self.reactions.get(id)
    }

    pub(crate) fn insert_reaction(&mut self, reaction: Reaction) -> Arc<Reaction> {
        let reaction = Arc::new(reaction);
        if let Some(id) = reaction.id() {
            self.reactions.insert(id.clone(), reaction.clone());
            for (species, _) in reaction.orders() {
                self.by_order_species
                    .entry(species.id().clone())
                    .or_default()
                    .push(reaction.clone());
            }
        }
        reaction
    }

    pub fn add_template(&mut self, template: GenericReaction) {
        self.templates.push(template);
    }

    /// Registers the three reactions an acid needs: dissociation
    /// (`HA → H+ + A−`, water-catalysed), neutralisation
    /// (`HA + OH− → A− + H2O`) and association (`A− + H+ → HA`).
    ///
    /// All three use a zero activation energy so the dissociation and
    /// association rate constants are temperature independent and their
    /// ratio pins the equilibrium `[H+][A−]/[HA]` to exactly `10^−pKa`.
    pub fn register_acid(
        &mut self,
        namespace: &str,
        acid: &Arc<Species>,
        conjugate_base: &Arc<Species>,
        p_ka: f64,
    ) -> Result<Arc<Reaction>, ReactionBuildError> {
        if conjugate_base.charge() + 1 != acid.charge() {
            return Err(ReactionBuildError::AcidChargeMismatch(
                acid.id().to_string(),
            ));
        }
        let water = self
            .species_named(library::WATER)
            .ok_or_else(|| ReactionBuildError::MissingCoreSpecies(library::WATER.to_owned()))?;
        let proton = self
            .species_named(library::PROTON)
            .ok_or_else(|| ReactionBuildError::MissingCoreSpecies(library::PROTON.to_owned()))?;
        let hydroxide = self
            .species_named(library::HYDROXIDE)
            .ok_or_else(|| ReactionBuildError::MissingCoreSpecies(library::HYDROXIDE.to_owned()))?;
        let name = acid.id().local_name().to_owned();

        let dissociation = ReactionBuilder::new(namespace)
            .id(&format!("{name}.dissociation"))
            .reactant(acid)
            .catalyst(&water, 0)
            .product(&proton)
            .product(conjugate_base)
            .activation_energy(0.0)
            .preexponential_factor(ACID_RATE_SCALE * 10f64.powf(-p_ka))
            .build(self)?;

        ReactionBuilder::new(namespace)
            .id(&format!("{name}.neutralization"))
            .reactant(acid)
            .reactant(&hydroxide)
            .product(conjugate_base)
            .product(&water)
            .activation_energy(0.0)
            .preexponential_factor(ACID_RATE_SCALE)
            .build(self)?;

        ReactionBuilder::new(namespace)
            .id(&format!("{name}.association"))
            .reactant(conjugate_base)
            .reactant(&proton)
            .product(acid)
            .activation_energy(0.0)
            .preexponential_factor(ACID_RATE_SCALE)
            .build(self)?;

        Ok(dissociation)
    }

    pub fn build(self) -> Arc<Registry> {
        Arc::new(Registry {
            species: self.species,
            by_signature: self.by_signature,
            reactions: self.reactions,
            by_order_species: self.by_order_species,
            templates: self.templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acid_charge_mismatch_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let acid = builder.add_species(Species::builder("test:ha").build());
        let bad_base = builder.add_species(Species::builder("test:a").build());
        let result = builder.register_acid("test", &acid, &bad_base, 4.0);
        assert!(matches!(
            result.unwrap_err(),
            ReactionBuildError::AcidChargeMismatch(_)
        ));
    }

    #[test]
    fn acid_registration_pins_the_equilibrium_constant() {
        let registry = crate::library::default_registry();
        let dissociation = registry
            .reaction(&ReactionId::new("chem:acetic_acid.dissociation"))
            .expect("registered");
        let association = registry
            .reaction(&ReactionId::new("chem:acetic_acid.association"))
            .expect("registered");
        let k_eq = dissociation.rate_constant(298.15) / association.rate_constant(298.15);
        approx::assert_relative_eq!(k_eq, 10f64.powf(-4.76), max_relative = 1e-12);
        // Temperature independent by construction.
        let k_eq_hot = dissociation.rate_constant(350.0) / association.rate_constant(350.0);
        approx::assert_relative_eq!(k_eq, k_eq_hot, max_relative = 1e-12);
    }

    #[test]
    fn structure_lookup_finds_registered_species() {
        let registry = crate::library::default_registry();
        let ethanol = registry.species_named(library::ETHANOL).expect("registered");
        let found = registry
            .find_by_structure(ethanol.structure().expect("has structure"))
            .expect("signature matches");
        assert_eq!(found.id(), ethanol.id());
    }
}
