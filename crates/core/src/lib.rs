//! Deterministic chemical mixture simulation engine.
//!
//! Mixtures hold dissolved species at floating-point concentrations and are
//! advanced tick by tick: registered and template-generated reactions proceed
//! at Arrhenius rates, release or absorb heat, boil and condense their
//! contents, and settle into a detected equilibrium. All behaviour is
//! deterministic for a given registry, mixture state and context.

pub mod generic;
pub mod groups;
pub mod library;
pub mod mixture;
pub mod reaction;
pub mod registry;
pub mod sim;
pub mod structure;

pub use generic::{BoundGroup, GenericReaction};
pub use groups::{find_groups, FunctionalGroup, GroupKind};
pub use library::default_registry;
pub use mixture::{Mixture, MixtureRecord, PersistenceError, Phases};
pub use reaction::{
    Reaction, ReactionBuildError, ReactionBuilder, ReactionId, ReactionResult, ResultKind, Token,
    TokenMatcher, TokenRequirement,
};
pub use registry::{Registry, RegistryBuilder};
pub use sim::{run_all_to_equilibrium, EquilibriumRun, ReactionContext};
pub use structure::{
    Atom, AtomId, Bond, BondKind, Element, Species, SpeciesBuilder, SpeciesId, Structure,
};
