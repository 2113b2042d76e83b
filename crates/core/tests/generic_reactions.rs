//! Template-generated reactions running inside a live mixture.

use chem_sim_core::library::{self, default_registry};
use chem_sim_core::{Mixture, ReactionContext, ResultKind, Token};

#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn every_alkene_instance_gets_its_own_hydration() {
    let registry = default_registry();
    let mut mixture = Mixture::new(registry.clone());
    mixture.add_species(&registry.species_named(library::WATER).unwrap(), 10.0);
    mixture.add_species(&registry.species_named(library::PROTON).unwrap(), 0.01);
    mixture.add_species(&registry.species_named(library::ETHENE).unwrap(), 0.5);
    mixture.add_species(&registry.species_named(library::PROPENE).unwrap(), 0.5);

    let generated: Vec<_> = mixture
        .possible_reactions()
        .iter()
        .filter(|reaction| reaction.id().is_none())
        .collect();
    // Symmetric ethene carries an alkene instance per end, propene one.
    assert_eq!(generated.len(), 3);
    for id in [library::ETHENE, library::PROPENE] {
        assert!(
            generated
                .iter()
                .any(|reaction| reaction.reactants().iter().any(|(s, _)| s.id().as_str() == id)),
            "no hydration generated for {id}"
        );
    }

    // And they actually run.
    let context = ReactionContext::new();
    let ethene = registry.species_named(library::ETHENE).unwrap();
    mixture.react_for_tick(&context, 1);
    assert!(mixture.concentration_of(ethene.id()) < 0.5);
}

#[test]
fn esterification_synthesises_a_novel_ester() {
    let registry = default_registry();
    let acyl = registry.species_named(library::ETHANOYL_CHLORIDE).unwrap();
    let ethanol = registry.species_named(library::ETHANOL).unwrap();
    let hydrogen_chloride = registry.species_named(library::HYDROGEN_CHLORIDE).unwrap();

    let mut mixture = Mixture::new(registry);
    mixture.add_species(&acyl, 1.0);
    mixture.add_species(&ethanol, 1.0);

    let context = ReactionContext::new();
    for _ in 0..20 {
        mixture.react_for_tick(&context, 1);
    }

    assert!(mixture.concentration_of(hydrogen_chloride.id()) > 0.0);
    let novel = mixture
        .species_present()
        .find(|species| species.is_novel())
        .cloned()
        .expect("ester synthesised");
    assert!(mixture.concentration_of(novel.id()) > 0.0);

    let results = mixture.completed_results(1.0);
    assert!(results.contains_key(&ResultKind::NovelCompound {
        species: novel.id().clone()
    }));
}

#[test]
fn hydrogenation_needs_its_nickel_surface() {
    let registry = default_registry();
    let ethyne = registry.species_named(library::ETHYNE).unwrap();
    let hydrogen = registry.species_named(library::HYDROGEN).unwrap();

    let mut without_catalyst = Mixture::new(registry.clone());
    without_catalyst.add_species(&ethyne, 1.0);
    without_catalyst.add_species(&hydrogen, 1.0);
    let bare_context = ReactionContext::new();
    without_catalyst.react_for_tick(&bare_context, 1);
    assert_eq!(without_catalyst.concentration_of(ethyne.id()), 1.0);
    assert!(without_catalyst.is_at_equilibrium());

    let mut with_catalyst = Mixture::new(registry.clone());
    with_catalyst.add_species(&ethyne, 1.0);
    with_catalyst.add_species(&hydrogen, 1.0);
    let nickel_context = ReactionContext::with_tokens(vec![Token::new(library::NICKEL_TOKEN, 1)]);
    with_catalyst.react_for_tick(&nickel_context, 1);
    assert!(with_catalyst.concentration_of(ethyne.id()) < 1.0);

    let ethene = registry.species_named(library::ETHENE).unwrap();
    assert!(with_catalyst.concentration_of(ethene.id()) > 0.0);
    // The surface catalyses; nothing is consumed.
    assert_eq!(nickel_context.tokens[0].count, 1);
}
