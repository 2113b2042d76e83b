//! Concrete reactions: stoichiometry, kinetics, thermodynamics and results.

mod builder;
mod result;
mod token;

pub use builder::{ReactionBuildError, ReactionBuilder};
pub use result::{ReactionResult, ResultKind};
pub use token::{Token, TokenMatcher, TokenRequirement};

use std::fmt;
use std::sync::Arc;

use crate::mixture::Mixture;
use crate::structure::{Species, SpeciesId};

/// Ideal gas constant in J/(mol K).
pub const GAS_CONSTANT: f64 = 8.3145;

/// Interned reaction identifier, e.g. `chem:acetic_acid.dissociation`.
/// Template-generated reactions carry no id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(Arc<str>);

impl ReactionId {
    pub fn new(id: &str) -> Self {
        ReactionId(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable reaction. Registered reactions are built through
/// [`ReactionBuilder::build`] and live in the registry; template-generated
/// reactions are built per mixture refresh and are never registered.
#[derive(Clone, Debug)]
pub struct Reaction {
    pub(crate) id: Option<ReactionId>,
    pub(crate) reactants: Vec<(Arc<Species>, u32)>,
    pub(crate) products: Vec<(Arc<Species>, u32)>,
    pub(crate) orders: Vec<(Arc<Species>, i32)>,
    pub(crate) token_requirements: Vec<TokenRequirement>,
    pub(crate) moles_per_token: f64,
    pub(crate) needs_uv: bool,
    /// Arrhenius preexponential factor, per second.
    pub(crate) preexponential_factor: f64,
    /// Activation energy in kJ/mol.
    pub(crate) activation_energy: f64,
    /// Enthalpy change in kJ/mol; negative is exothermic.
    pub(crate) enthalpy_change: f64,
    pub(crate) half_cell_potential: Option<f64>,
    pub(crate) electrons: i32,
    pub(crate) reverse: Option<ReactionId>,
    pub(crate) result: Option<ReactionResult>,
}

impl Reaction {
    pub fn id(&self) -> Option<&ReactionId> {
        self.id.as_ref()
    }

    pub fn reactants(&self) -> &[(Arc<Species>, u32)] {
        &self.reactants
    }

    pub fn products(&self) -> &[(Arc<Species>, u32)] {
        &self.products
    }

    /// Rate orders over reactants and catalysts.
    pub fn orders(&self) -> &[(Arc<Species>, i32)] {
        &self.orders
    }

    pub fn reactant_ratio(&self, id: &SpeciesId) -> u32 {
        self.reactants
            .iter()
            .find(|(species, _)| species.id() == id)
            .map_or(0, |(_, ratio)| *ratio)
    }

    pub fn product_ratio(&self, id: &SpeciesId) -> u32 {
        self.products
            .iter()
            .find(|(species, _)| species.id() == id)
            .map_or(0, |(_, ratio)| *ratio)
    }

    pub fn token_requirements(&self) -> &[TokenRequirement] {
        &self.token_requirements
    }

    /// Moles of reaction effected by one fulfilment of the consumed token
    /// requirements.
    pub fn moles_per_token(&self) -> f64 {
        self.moles_per_token
    }

    /// True when at least one token requirement is consumed rather than
    /// catalytic. Such reactions only run during dissolution.
    pub fn consumes_tokens(&self) -> bool {
        self.token_requirements
            .iter()
            .any(|requirement| !requirement.is_catalyst())
    }

    pub fn needs_uv(&self) -> bool {
        self.needs_uv
    }

    pub fn preexponential_factor(&self) -> f64 {
        self.preexponential_factor
    }

    pub fn activation_energy(&self) -> f64 {
        self.activation_energy
    }

    pub fn enthalpy_change(&self) -> f64 {
        self.enthalpy_change
    }

    pub fn half_cell_potential(&self) -> Option<f64> {
        self.half_cell_potential
    }

    /// Electrons released by one occurrence; negative when consumed.
    pub fn electrons(&self) -> i32 {
        self.electrons
    }

    pub fn reverse_id(&self) -> Option<&ReactionId> {
        self.reverse.as_ref()
    }

    pub fn result(&self) -> Option<&ReactionResult> {
        self.result.as_ref()
    }

    /// Arrhenius rate constant `k = A·exp(−Ea/RT)` at the given temperature.
    pub fn rate_constant(&self, temperature: f64) -> f64 {
        self.preexponential_factor
            * (-(self.activation_energy * 1000.0) / (GAS_CONSTANT * temperature)).exp()
    }

    /// A reaction is possible when every rate-relevant species is present.
    pub fn is_possible(&self, mixture: &Mixture) -> bool {
        self.orders
            .iter()
            .all(|(species, _)| mixture.concentration_of(species.id()) > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    #[test]
    fn rate_constant_follows_arrhenius() {
        let mut registry = RegistryBuilder::new();
        let a = registry.add_species(Species::builder("test:a").build());
        let b = registry.add_species(Species::builder("test:b").build());
        let reaction = ReactionBuilder::new("test")
            .id("a_to_b")
            .reactant(&a)
            .product(&b)
            .preexponential_factor(1e4)
            .activation_energy(25.0)
            .build(&mut registry)
            .unwrap();

        let cold = reaction.rate_constant(280.0);
        let warm = reaction.rate_constant(320.0);
        assert!(warm > cold);
        let expected = 1e4 * (-25_000.0 / (GAS_CONSTANT * 298.15)).exp();
        approx::assert_relative_eq!(reaction.rate_constant(298.15), expected);
    }
}
