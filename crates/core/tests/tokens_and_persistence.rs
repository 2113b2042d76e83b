//! Token dissolution, batch runs and JSON persistence.

use approx::assert_relative_eq;

use chem_sim_core::library::{self, default_registry};
use chem_sim_core::{Mixture, ReactionContext, Token};

#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn rock_salt_dissolves_into_its_ions() {
    let registry = default_registry();
    let water = registry.species_named(library::WATER).unwrap();
    let sodium = registry.species_named(library::SODIUM_ION).unwrap();
    let chloride = registry.species_named(library::CHLORIDE).unwrap();

    let mut mixture = Mixture::new(registry);
    mixture.add_species(&water, 55.5);
    let mut context = ReactionContext::with_tokens(vec![Token::new(library::ROCK_SALT_TOKEN, 2)]);
    mixture.dissolve_tokens(&mut context, 1.0);

    // Each token yields half a mole of each ion per liter.
    assert_relative_eq!(mixture.concentration_of(sodium.id()), 1.0, epsilon = 1e-9);
    assert_relative_eq!(mixture.concentration_of(chloride.id()), 1.0, epsilon = 1e-9);
    assert!(context.tokens[0].is_depleted());
}

#[test]
fn dissolution_respects_the_mixture_volume() {
    let registry = default_registry();
    let water = registry.species_named(library::WATER).unwrap();
    let sodium = registry.species_named(library::SODIUM_ION).unwrap();

    let mut mixture = Mixture::new(registry);
    mixture.add_species(&water, 55.5);
    let mut context = ReactionContext::with_tokens(vec![Token::new(library::ROCK_SALT_TOKEN, 1)]);
    mixture.dissolve_tokens(&mut context, 4.0);

    // The same half mole spread over four liters.
    assert_relative_eq!(mixture.concentration_of(sodium.id()), 0.125, epsilon = 1e-9);
}

#[test]
fn dry_tokens_do_not_dissolve() {
    // No water, no dissolution: the reaction is catalysed by the solvent.
    let registry = default_registry();
    let ethanol = registry.species_named(library::ETHANOL).unwrap();
    let sodium = registry.species_named(library::SODIUM_ION).unwrap();

    let mut mixture = Mixture::new(registry);
    mixture.add_species(&ethanol, 10.0);
    let mut context = ReactionContext::with_tokens(vec![Token::new(library::ROCK_SALT_TOKEN, 1)]);
    mixture.dissolve_tokens(&mut context, 1.0);

    assert_relative_eq!(mixture.concentration_of(sodium.id()), 0.0);
    assert_eq!(context.tokens[0].count, 1);
}

#[test]
fn dissolution_wakes_a_settled_mixture() {
    let registry = default_registry();
    let water = registry.species_named(library::WATER).unwrap();
    let sodium = registry.species_named(library::SODIUM_ION).unwrap();

    let mut mixture = Mixture::new(registry);
    mixture.add_species(&water, 55.5);
    let mut first_context =
        ReactionContext::with_tokens(vec![Token::new(library::ROCK_SALT_TOKEN, 1)]);
    let first = mixture.run_to_equilibrium(1.0, &mut first_context, 0.0, 298.15);
    assert!(first.ticks > 0);
    assert!(mixture.is_at_equilibrium());

    // Both ions already exist, so this dissolution only raises their
    // concentrations; the run must still tick and renormalise.
    let before = mixture.concentration_of(sodium.id());
    let mut second_context =
        ReactionContext::with_tokens(vec![Token::new(library::ROCK_SALT_TOKEN, 1)]);
    let second = mixture.run_to_equilibrium(1.0, &mut second_context, 0.0, 298.15);
    assert!(second_context.tokens[0].is_depleted());
    assert!(second.ticks > 0, "a committed dissolution must wake the mixture");
    assert!(mixture.concentration_of(sodium.id()) > before);
}

#[test]
fn batch_runs_share_conditions_but_not_tokens() {
    let registry = default_registry();
    let water = registry.species_named(library::WATER).unwrap();
    let sodium = registry.species_named(library::SODIUM_ION).unwrap();

    let mut mixtures: Vec<Mixture> = (0..4)
        .map(|_| {
            let mut mixture = Mixture::new(registry.clone());
            mixture.add_species(&water, 55.5);
            mixture
        })
        .collect();
    let tokens = vec![Token::new(library::ROCK_SALT_TOKEN, 2)];
    let runs = Mixture::run_all_to_equilibrium(&mut mixtures, 1.0, &tokens, 0.0, 298.15);

    assert_eq!(runs.len(), 4);
    for mixture in &mixtures {
        // Every mixture got its own two tokens' worth of salt.
        assert!(mixture.concentration_of(sodium.id()) > 0.9);
        assert!(mixture.is_at_equilibrium());
    }
}

#[test]
fn save_and_load_round_trip_through_a_file() {
    let registry = default_registry();
    let water = registry.species_named(library::WATER).unwrap();
    let ethanol = registry.species_named(library::ETHANOL).unwrap();

    let mut mixture = Mixture::new(registry.clone());
    mixture.set_display_key("still");
    mixture.add_species(&water, 40.0);
    mixture.add_species(&ethanol, 5.0);
    mixture.set_temperature(330.0);

    let path = std::env::temp_dir().join("chem-sim-roundtrip.json");
    mixture.save_json(&path).expect("save");
    let restored = Mixture::load_json(&path, &registry).expect("load");
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.display_key(), "still");
    assert_relative_eq!(restored.temperature(), 330.0);
    assert_relative_eq!(restored.concentration_of(water.id()), 40.0);
    assert_relative_eq!(restored.concentration_of(ethanol.id()), 5.0);
}
