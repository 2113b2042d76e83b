//! The reaction tick loop, token dissolution and possible-reaction refresh.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::generic::GenericReaction;
use crate::reaction::{Reaction, ReactionId};
use crate::sim::{ReactionContext, TICKS_PER_SECOND};
use crate::structure::SpeciesId;

use super::Mixture;

impl Mixture {
    /// Advances chemistry by one tick, split into `cycles` sub-steps for
    /// accuracy when rates are steep.
    ///
    /// Each cycle snapshots concentrations, evaluates every possible
    /// reaction's rate against that snapshot, then applies the reactions in
    /// descending rate order, each capped by its limiting reagent. The
    /// mixture is at equilibrium when no concentration moved by more than
    /// the detection epsilon. After all cycles, species that have sat at
    /// zero concentration through their grace period are removed.
    pub fn react_for_tick(&mut self, context: &ReactionContext, cycles: u32) {
        for _ in 0..cycles {
            if self.at_equilibrium {
                break;
            }
            self.at_equilibrium = true;
            let snapshot: Vec<(SpeciesId, f64)> = self
                .contents
                .iter()
                .map(|(id, content)| (id.clone(), content.concentration))
                .collect();

            let mut candidates: Vec<(Arc<Reaction>, f64)> = Vec::new();
            'reactions: for reaction in &self.possible_reactions {
                // Token-consuming reactions only run during dissolution.
                if reaction.consumes_tokens() {
                    continue;
                }
                for requirement in reaction.token_requirements() {
                    let fulfilled = context
                        .tokens
                        .iter()
                        .any(|token| !token.is_depleted() && requirement.matches(token));
                    if !fulfilled {
                        continue 'reactions;
                    }
                }
                let rate = self.reaction_rate(reaction, context) / f64::from(cycles);
                candidates.push((Arc::clone(reaction), rate));
            }
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

            let mut should_refresh = false;
            for (reaction, rate) in candidates {
                let mut moles = rate;
                for (species, ratio) in reaction.reactants() {
                    let available = self.concentration_of(species.id()) / f64::from(*ratio);
                    if available < moles {
                        moles = available;
                    }
                }
                if moles <= 0.0 {
                    continue;
                }
                should_refresh |= self.apply_reaction(&reaction, moles);
            }

            for (id, before) in &snapshot {
                if !Mixture::concentrations_close(*before, self.concentration_of(id)) {
                    self.at_equilibrium = false;
                    break;
                }
            }
            if should_refresh {
                self.refresh_possible_reactions();
            }
        }

        let mut expired: Vec<SpeciesId> = Vec::new();
        for (id, ticks_left) in &mut self.pending_removal {
            *ticks_left = ticks_left.saturating_sub(1);
            if *ticks_left == 0 {
                expired.push(id.clone());
            }
        }
        if !expired.is_empty() {
            for id in &expired {
                self.pending_removal.remove(id);
                self.remove_species_internal(id);
            }
            self.refresh_possible_reactions();
        }
    }

    /// Runs the token-consuming reactions against the offered tokens, in
    /// descending rate order. Each application consumes one token per
    /// consumed requirement (the first matching token wins) and effects
    /// `moles_per_token` moles of reaction; applications repeat while both
    /// tokens and the non-token reactants last. Token consumption is
    /// simulated against per-application bookkeeping first so one physical
    /// token is never allocated to two requirements at once.
    pub fn dissolve_tokens(&mut self, context: &mut ReactionContext, volume: f64) {
        let mut candidates: Vec<(Arc<Reaction>, f64)> = self
            .possible_reactions
            .iter()
            .filter(|reaction| reaction.consumes_tokens())
            .map(|reaction| (Arc::clone(reaction), self.reaction_rate(reaction, context)))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut dissolved_any = false;
        for (reaction, _) in candidates {
            'applications: loop {
                for (species, ratio) in reaction.reactants() {
                    let required = f64::from(*ratio) * reaction.moles_per_token() / volume;
                    if self.concentration_of(species.id()) < required {
                        break 'applications;
                    }
                }
                let mut consumed: Vec<usize> = Vec::new();
                for requirement in reaction.token_requirements() {
                    let mut fulfilled = false;
                    for (index, token) in context.tokens.iter().enumerate() {
                        let already_taken =
                            consumed.iter().filter(|&&taken| taken == index).count() as u32;
                        if token.count > already_taken && requirement.matches(token) {
                            if !requirement.is_catalyst() {
                                consumed.push(index);
                            }
                            fulfilled = true;
                            break;
                        }
                    }
                    if !fulfilled {
                        break 'applications;
                    }
                }
                for index in consumed {
                    context.tokens[index].count -= 1;
                }
                self.apply_reaction(&reaction, reaction.moles_per_token() / volume);
                dissolved_any = true;
            }
        }
        if dissolved_any {
            // A committed application changed concentrations even when no
            // new species entered, so a settled mixture must re-equilibrate.
            self.at_equilibrium = false;
            self.refresh_possible_reactions();
        }
    }

    /// Moles of reaction per liter this reaction would effect this tick:
    /// `k(T)/ticks-per-second × Π concentration^order`, scaled by the UV
    /// power when the reaction is photochemical.
    pub(crate) fn reaction_rate(&self, reaction: &Reaction, context: &ReactionContext) -> f64 {
        let mut rate = reaction.rate_constant(self.temperature) / TICKS_PER_SECOND;
        for (species, order) in reaction.orders() {
            rate *= self.concentration_of(species.id()).powi(*order);
        }
        if reaction.needs_uv() {
            rate *= context.uv_power;
        }
        rate
    }

    /// Consumes reactants, yields products (inserting novel ones), couples
    /// the enthalpy into heat and accumulates result progress. Returns true
    /// when a product species newly entered the mixture, which obliges the
    /// caller to refresh the possible-reaction set.
    pub(crate) fn apply_reaction(&mut self, reaction: &Arc<Reaction>, moles: f64) -> bool {
        let mut should_refresh = false;
        for (species, ratio) in reaction.reactants() {
            self.change_concentration(species, -(moles * f64::from(*ratio)), false);
        }
        for (species, ratio) in reaction.products() {
            let amount = moles * f64::from(*ratio);
            if self.contents.contains_key(species.id()) {
                self.change_concentration(species, amount, false);
            } else {
                should_refresh = true;
                self.internal_add_species(species.clone(), amount, false);
            }
        }
        self.heat(-reaction.enthalpy_change() * 1000.0 * moles);
        if reaction.result().is_some() {
            if let Some(id) = reaction.id() {
                *self.result_progress.entry(id.clone()).or_insert(0.0) += moles;
            }
        }
        should_refresh
    }

    /// Recomputes the possible-reaction set from scratch: generic templates
    /// applied to every present group instance (ordered cross pairs on
    /// distinct species for double templates), plus the registered reactions
    /// indexed under any present species, all filtered to those whose every
    /// rate-relevant species has nonzero concentration.
    pub(crate) fn refresh_possible_reactions(&mut self) {
        let registry = Arc::clone(&self.registry);
        let mut candidates: Vec<Arc<Reaction>> = Vec::new();

        for template in registry.templates() {
            match template {
                GenericReaction::Single { group, generate } => {
                    let Some(instances) = self.groups_present.get(group) else {
                        continue;
                    };
                    for bound in instances {
                        if let Some(reaction) = generate(bound, &registry) {
                            candidates.push(Arc::new(reaction));
                        }
                    }
                }
                GenericReaction::Double {
                    first,
                    second,
                    generate,
                } => {
                    let (Some(first_instances), Some(second_instances)) = (
                        self.groups_present.get(first),
                        self.groups_present.get(second),
                    ) else {
                        continue;
                    };
                    for a in first_instances {
                        for b in second_instances {
                            if a.species.id() == b.species.id() {
                                continue;
                            }
                            if let Some(reaction) = generate(a, b, &registry) {
                                candidates.push(Arc::new(reaction));
                            }
                        }
                    }
                }
            }
        }

        let mut seen: FxHashSet<ReactionId> = FxHashSet::default();
        for id in self.contents.keys() {
            for reaction in registry.reactions_involving(id) {
                if let Some(reaction_id) = reaction.id() {
                    if seen.insert(reaction_id.clone()) {
                        candidates.push(Arc::clone(reaction));
                    }
                }
            }
        }

        let possible: Vec<Arc<Reaction>> = candidates
            .into_iter()
            .filter(|reaction| reaction.is_possible(self))
            .collect();
        debug!(count = possible.len(), "refreshed possible reactions");
        self.possible_reactions = possible;
    }
}

#[cfg(test)]
mod tests {
    use crate::reaction::ReactionBuilder;
    use crate::registry::RegistryBuilder;
    use crate::structure::Species;

    use super::*;

    #[test]
    fn uv_reactions_wait_for_light() {
        let mut builder = RegistryBuilder::new();
        let a = builder.add_species(Species::builder("test:a").build());
        let b = builder.add_species(Species::builder("test:b").build());
        ReactionBuilder::new("test")
            .id("photolysis")
            .reactant(&a)
            .product(&b)
            .preexponential_factor(1e4)
            .activation_energy(10.0)
            .require_uv()
            .build(&mut builder)
            .unwrap();
        let registry = builder.build();

        let mut dark = Mixture::new(registry.clone());
        dark.add_species(&registry.species_named("test:a").unwrap(), 1.0);
        let dark_context = ReactionContext::new();
        dark.react_for_tick(&dark_context, 1);
        assert_eq!(dark.concentration_of(a.id()), 1.0);
        assert!(dark.is_at_equilibrium());

        let mut lit = Mixture::new(registry.clone());
        lit.add_species(&registry.species_named("test:a").unwrap(), 1.0);
        let mut lit_context = ReactionContext::new();
        lit_context.uv_power = 1.0;
        lit.react_for_tick(&lit_context, 1);
        assert!(lit.concentration_of(a.id()) < 1.0);
        assert!(lit.concentration_of(b.id()) > 0.0);
        assert!(!lit.is_at_equilibrium());
    }

    #[test]
    fn limiting_reagent_caps_the_step() {
        let mut builder = RegistryBuilder::new();
        let a = builder.add_species(Species::builder("test:a").build());
        let b = builder.add_species(Species::builder("test:b").build());
        let c = builder.add_species(Species::builder("test:c").build());
        // Deliberately explosive rate so the cap is what limits it.
        ReactionBuilder::new("test")
            .id("fast")
            .reactant_ratio(&a, 2)
            .reactant(&b)
            .product(&c)
            .preexponential_factor(1e12)
            .activation_energy(0.0)
            .build(&mut builder)
            .unwrap();
        let registry = builder.build();

        let mut mixture = Mixture::new(registry);
        mixture.add_species(&a, 0.1);
        mixture.add_species(&b, 10.0);
        let context = ReactionContext::new();
        mixture.react_for_tick(&context, 1);

        // a is limiting: at most 0.05 mol/L of reaction could run.
        assert_eq!(mixture.concentration_of(a.id()), 0.0);
        approx::assert_relative_eq!(mixture.concentration_of(b.id()), 9.95, epsilon = 1e-9);
        approx::assert_relative_eq!(mixture.concentration_of(c.id()), 0.05, epsilon = 1e-9);
    }

    #[test]
    fn refresh_is_idempotent() {
        let registry = crate::library::default_registry();
        let mut mixture = Mixture::new(registry.clone());
        mixture.add_species(&registry.species_named("chem:water").unwrap(), 10.0);
        mixture.add_species(&registry.species_named("chem:proton").unwrap(), 0.01);
        mixture.add_species(&registry.species_named("chem:ethene").unwrap(), 0.5);

        let first: Vec<_> = mixture
            .possible_reactions()
            .iter()
            .map(|r| r.id().cloned())
            .collect();
        mixture.refresh_possible_reactions();
        let second: Vec<_> = mixture
            .possible_reactions()
            .iter()
            .map(|r| r.id().cloned())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn depleted_species_leave_after_the_grace_period() {
        let mut builder = RegistryBuilder::new();
        let a = builder.add_species(Species::builder("test:a").build());
        let b = builder.add_species(Species::builder("test:b").build());
        ReactionBuilder::new("test")
            .id("consume")
            .reactant(&a)
            .product(&b)
            .preexponential_factor(1e12)
            .activation_energy(0.0)
            .build(&mut builder)
            .unwrap();
        let registry = builder.build();

        let mut mixture = Mixture::new(registry);
        mixture.add_species(&a, 1.0);
        let context = ReactionContext::new();
        mixture.react_for_tick(&context, 1);
        assert_eq!(mixture.concentration_of(a.id()), 0.0);
        assert!(mixture.species_present().any(|s| s.id() == a.id()));

        for _ in 0..10 {
            mixture.react_for_tick(&context, 1);
        }
        assert!(!mixture.species_present().any(|s| s.id() == a.id()));
    }
}
