use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::registry::RegistryBuilder;
use crate::structure::Species;

use super::{Reaction, ReactionId, ReactionResult, ResultKind, TokenRequirement};

/// Default activation energy in kJ/mol for reactions that declare none.
const DEFAULT_ACTIVATION_ENERGY: f64 = 25.0;
/// Default Arrhenius preexponential factor.
const DEFAULT_PREEXPONENTIAL_FACTOR: f64 = 1e4;

/// Validation failure raised when finishing a [`ReactionBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactionBuildError {
    /// Registered reactions must carry an id.
    MissingId,
    /// `order_of` names a species that is not a reactant.
    OrderOfNonReactant(String),
    /// A species appears in both the reactant and product lists.
    SpeciesOnBothSides(String),
    /// Net charge changes in the direction the reaction is declared.
    ChargeNotConserved(String),
    /// A half-cell potential was given but no charge is transferred.
    PotentialWithoutTransfer(String),
    /// Charge is transferred but no half-cell potential was given.
    MissingHalfCellPotential(String),
    /// Half reactions must be built as reversible pairs.
    HalfReactionNotReversible(String),
    /// Forward and reverse enthalpies disagree with Hess's law.
    InconsistentEnthalpy(String),
    /// Forward and reverse activation energies disagree with the declared
    /// enthalpy change.
    InconsistentActivationEnergy(String),
    /// Two token requirements declared different moles-per-token values.
    ConflictingMolesPerToken(String),
    /// A result payload was declared twice.
    DuplicateResult(String),
    /// Template-generated reactions cannot be reversible.
    GeneratedReversible,
    /// An acid registration whose conjugate base is not one electron short.
    AcidChargeMismatch(String),
    /// The registry is missing a species the convenience constructor needs.
    MissingCoreSpecies(String),
}

impl fmt::Display for ReactionBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionBuildError::MissingId => write!(f, "registered reaction has no id"),
            ReactionBuildError::OrderOfNonReactant(species) => {
                write!(f, "rate order set for non-reactant species {species}")
            }
            ReactionBuildError::SpeciesOnBothSides(species) => {
                write!(f, "species {species} is both a reactant and a product")
            }
            ReactionBuildError::ChargeNotConserved(id) => {
                write!(f, "reaction {id} does not conserve charge")
            }
            ReactionBuildError::PotentialWithoutTransfer(id) => {
                write!(f, "reaction {id} declares a half-cell potential but transfers no charge")
            }
            ReactionBuildError::MissingHalfCellPotential(id) => {
                write!(f, "half reaction {id} declares no half-cell potential")
            }
            ReactionBuildError::HalfReactionNotReversible(id) => {
                write!(f, "half reaction {id} must be reversible")
            }
            ReactionBuildError::InconsistentEnthalpy(id) => {
                write!(f, "reaction {id} and its reverse disagree on enthalpy change")
            }
            ReactionBuildError::InconsistentActivationEnergy(id) => {
                write!(
                    f,
                    "reaction {id} and its reverse declare activation energies inconsistent with the enthalpy change"
                )
            }
            ReactionBuildError::ConflictingMolesPerToken(id) => {
                write!(f, "reaction {id} declares conflicting moles-per-token values")
            }
            ReactionBuildError::DuplicateResult(id) => {
                write!(f, "reaction {id} declares more than one result")
            }
            ReactionBuildError::GeneratedReversible => {
                write!(f, "template-generated reactions cannot be reversible")
            }
            ReactionBuildError::AcidChargeMismatch(id) => {
                write!(f, "acid {id}: conjugate base charge must be one less than the acid's")
            }
            ReactionBuildError::MissingCoreSpecies(id) => {
                write!(f, "registry is missing required species {id}")
            }
        }
    }
}

impl Error for ReactionBuildError {}

/// Builder for [`Reaction`] values.
///
/// Registered reactions take a namespace and id and are inserted into a
/// [`RegistryBuilder`]; template-generated ones use [`ReactionBuilder::generated`]
/// and [`ReactionBuilder::build_generated`]. Declaring `reversible` (or
/// `reverse_reaction` with adjustments) derives the mirrored reaction,
/// applying Hess's law to whichever thermodynamic quantities were left free
/// and rejecting over-constrained declarations.
pub struct ReactionBuilder {
    namespace: String,
    id: Option<String>,
    generated: bool,
    declared_as_reverse: bool,
    reactants: Vec<(Arc<Species>, u32)>,
    products: Vec<(Arc<Species>, u32)>,
    orders: Vec<(Arc<Species>, i32)>,
    token_requirements: Vec<TokenRequirement>,
    moles_per_token: f64,
    needs_uv: bool,
    preexponential_factor: f64,
    activation_energy: f64,
    enthalpy_change: f64,
    half_cell_potential: Option<f64>,
    forced_preexponential_factor: bool,
    forced_activation_energy: bool,
    forced_enthalpy_change: bool,
    result: Option<ReactionResult>,
    reverse: Option<Box<ReactionBuilder>>,
    pending_error: Option<ReactionBuildError>,
}

impl ReactionBuilder {
    pub fn new(namespace: &str) -> Self {
        ReactionBuilder {
            namespace: namespace.to_owned(),
            id: None,
            generated: false,
            declared_as_reverse: false,
            reactants: Vec::new(),
            products: Vec::new(),
            orders: Vec::new(),
            token_requirements: Vec::new(),
            moles_per_token: 0.0,
            needs_uv: false,
            preexponential_factor: 0.0,
            activation_energy: 0.0,
            enthalpy_change: 0.0,
            half_cell_potential: None,
            forced_preexponential_factor: false,
            forced_activation_energy: false,
            forced_enthalpy_change: false,
            result: None,
            reverse: None,
            pending_error: None,
        }
    }

    /// Starts a builder for an anonymous, template-generated reaction.
    pub fn generated() -> Self {
        let mut builder = ReactionBuilder::new("generated");
        builder.generated = true;
        builder
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    fn fail(&mut self, error: ReactionBuildError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn set_order(&mut self, species: &Arc<Species>, order: i32) {
        if let Some(entry) = self
            .orders
            .iter_mut()
            .find(|(existing, _)| existing.id() == species.id())
        {
            entry.1 = order;
        } else {
            self.orders.push((species.clone(), order));
        }
    }

    /// Adds a reactant with stoichiometric ratio 1 and rate order 1.
    pub fn reactant(self, species: &Arc<Species>) -> Self {
        self.reactant_ratio(species, 1)
    }

    /// Adds a reactant; the rate order defaults to the ratio.
    pub fn reactant_ratio(self, species: &Arc<Species>, ratio: u32) -> Self {
        let order = ratio as i32;
        self.reactant_ordered(species, ratio, order)
    }

    pub fn reactant_ordered(mut self, species: &Arc<Species>, ratio: u32, order: i32) -> Self {
        self.reactants.push((species.clone(), ratio));
        self.set_order(species, order);
        self
    }

    /// Overrides the rate order of an already-declared reactant.
    pub fn order_of(mut self, species: &Arc<Species>, order: i32) -> Self {
        if self
            .reactants
            .iter()
            .any(|(existing, _)| existing.id() == species.id())
        {
            self.set_order(species, order);
        } else {
            self.fail(ReactionBuildError::OrderOfNonReactant(
                species.id().to_string(),
            ));
        }
        self
    }

    /// Adds a species that affects the rate without being consumed.
    pub fn catalyst(mut self, species: &Arc<Species>, order: i32) -> Self {
        self.set_order(species, order);
        self
    }

    pub fn product(self, species: &Arc<Species>) -> Self {
        self.product_ratio(species, 1)
    }

    pub fn product_ratio(mut self, species: &Arc<Species>, ratio: u32) -> Self {
        self.products.push((species.clone(), ratio));
        self
    }

    /// Adds a token requirement. `moles_per_token` is how many moles of
    /// reaction one fulfilment of the consumed requirements effects; every
    /// declaration on one reaction must agree.
    pub fn token(mut self, requirement: TokenRequirement, moles_per_token: f64) -> Self {
        if self.moles_per_token != 0.0 && self.moles_per_token != moles_per_token {
            let id = self.id.clone().unwrap_or_default();
            self.fail(ReactionBuildError::ConflictingMolesPerToken(id));
        } else {
            self.moles_per_token = moles_per_token;
        }
        self.token_requirements.push(requirement);
        self
    }

    pub fn require_uv(mut self) -> Self {
        self.needs_uv = true;
        self
    }

    pub fn preexponential_factor(mut self, factor: f64) -> Self {
        self.preexponential_factor = factor;
        self.forced_preexponential_factor = true;
        self
    }

    /// Activation energy in kJ/mol.
    pub fn activation_energy(mut self, kilojoules_per_mole: f64) -> Self {
        self.activation_energy = kilojoules_per_mole;
        self.forced_activation_energy = true;
        self
    }

    /// Enthalpy change in kJ/mol; negative is exothermic.
    pub fn enthalpy_change(mut self, kilojoules_per_mole: f64) -> Self {
        self.enthalpy_change = kilojoules_per_mole;
        self.forced_enthalpy_change = true;
        self
    }

    pub fn half_cell_potential(mut self, volts: f64) -> Self {
        self.half_cell_potential = Some(volts);
        self
    }

    pub fn with_result(mut self, required_moles: f64, kind: ResultKind) -> Self {
        if self.result.is_some() {
            let id = self.id.clone().unwrap_or_default();
            self.fail(ReactionBuildError::DuplicateResult(id));
        } else {
            self.result = Some(ReactionResult::new(required_moles, kind));
        }
        self
    }

    pub fn with_one_off_result(mut self, kind: ResultKind) -> Self {
        if self.result.is_some() {
            let id = self.id.clone().unwrap_or_default();
            self.fail(ReactionBuildError::DuplicateResult(id));
        } else {
            self.result = Some(ReactionResult::one_off(kind));
        }
        self
    }

    /// Declares the exact mirror of this reaction as its reverse.
    pub fn reversible(self) -> Self {
        self.reverse_reaction(|reverse| reverse)
    }

    /// Derives the reverse reaction (products and reactants swapped,
    /// catalysts carried over) and lets `adjust` amend it, then reconciles
    /// the thermodynamics of the pair: free quantities are filled in from
    /// Hess's law, conflicting forced quantities are an error.
    pub fn reverse_reaction(mut self, adjust: impl FnOnce(ReactionBuilder) -> ReactionBuilder) -> Self {
        if self.generated {
            self.fail(ReactionBuildError::GeneratedReversible);
            return self;
        }
        let mut reverse = ReactionBuilder::new(&self.namespace);
        reverse.declared_as_reverse = true;
        for (species, ratio) in &self.products {
            reverse = reverse.reactant_ratio(species, *ratio);
        }
        for (species, ratio) in &self.reactants {
            reverse = reverse.product_ratio(species, *ratio);
        }
        for (species, order) in &self.orders {
            let is_reactant = self
                .reactants
                .iter()
                .any(|(reactant, _)| reactant.id() == species.id());
            if !is_reactant {
                reverse = reverse.catalyst(species, *order);
            }
        }
        if self.needs_uv {
            reverse = reverse.require_uv();
        }
        if let Some(potential) = self.half_cell_potential {
            reverse = reverse.half_cell_potential(-potential);
        }
        let mut reverse = adjust(reverse);

        // Reconcile the pair's thermodynamics: ΔH_rev = −ΔH_fwd and
        // Ea_rev = Ea_fwd − ΔH_fwd. Free quantities are derived, conflicting
        // declared ones are an error.
        let id = self.id.clone().unwrap_or_default();
        match (self.forced_enthalpy_change, reverse.forced_enthalpy_change) {
            (true, true) => {
                if self.enthalpy_change != -reverse.enthalpy_change {
                    self.fail(ReactionBuildError::InconsistentEnthalpy(id.clone()));
                }
            }
            (true, false) => {
                reverse.enthalpy_change = -self.enthalpy_change;
                reverse.forced_enthalpy_change = true;
            }
            (false, true) => {
                self.enthalpy_change = -reverse.enthalpy_change;
                self.forced_enthalpy_change = true;
            }
            (false, false) => {
                if self.forced_activation_energy && reverse.forced_activation_energy {
                    self.enthalpy_change = self.activation_energy - reverse.activation_energy;
                    self.forced_enthalpy_change = true;
                    reverse.enthalpy_change = -self.enthalpy_change;
                    reverse.forced_enthalpy_change = true;
                }
                // Otherwise both default to zero, which is consistent.
            }
        }
        match (self.forced_activation_energy, reverse.forced_activation_energy) {
            (true, true) => {
                if self.activation_energy - self.enthalpy_change != reverse.activation_energy {
                    self.fail(ReactionBuildError::InconsistentActivationEnergy(id));
                }
            }
            (true, false) => {
                reverse.activation_energy = self.activation_energy - self.enthalpy_change;
                reverse.forced_activation_energy = true;
            }
            (false, true) => {
                self.activation_energy = reverse.activation_energy + self.enthalpy_change;
                self.forced_activation_energy = true;
            }
            (false, false) => {
                if self.enthalpy_change != 0.0 {
                    self.activation_energy = DEFAULT_ACTIVATION_ENERGY;
                    self.forced_activation_energy = true;
                    reverse.activation_energy = DEFAULT_ACTIVATION_ENERGY - self.enthalpy_change;
                    reverse.forced_activation_energy = true;
                }
            }
        }
        if let Some(error) = reverse.pending_error.take() {
            self.fail(error);
        }
        self.reverse = Some(Box::new(reverse));
        self
    }

    /// Finishes a registered reaction, inserting it (and its reverse, when
    /// declared) into the registry.
    pub fn build(
        mut self,
        registry: &mut RegistryBuilder,
    ) -> Result<Arc<Reaction>, ReactionBuildError> {
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }
        let local = self.id.clone().ok_or(ReactionBuildError::MissingId)?;
        let id = ReactionId::new(&format!("{}:{}", self.namespace, local));
        let reverse_builder = self.reverse.take();
        let reverse_id = reverse_builder
            .as_ref()
            .map(|_| ReactionId::new(&format!("{}:{}.reverse", self.namespace, local)));
        if let Some(reverse) = reverse_builder {
            let reverse_reaction =
                reverse.finalize(reverse_id.clone(), Some(id.clone()))?;
            registry.insert_reaction(reverse_reaction);
        }
        let reaction = self.finalize(Some(id), reverse_id)?;
        Ok(registry.insert_reaction(reaction))
    }

    /// Finishes an anonymous template-generated reaction.
    pub fn build_generated(mut self) -> Result<Reaction, ReactionBuildError> {
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }
        self.finalize(None, None)
    }

    fn finalize(
        mut self,
        id: Option<ReactionId>,
        reverse: Option<ReactionId>,
    ) -> Result<Reaction, ReactionBuildError> {
        let display_id = id
            .as_ref()
            .map_or_else(|| "<generated>".to_owned(), ToString::to_string);

        for (species, _) in &self.reactants {
            if self
                .products
                .iter()
                .any(|(product, _)| product.id() == species.id())
            {
                return Err(ReactionBuildError::SpeciesOnBothSides(
                    species.id().to_string(),
                ));
            }
        }

        let reactant_charge: i32 = self
            .reactants
            .iter()
            .map(|(species, ratio)| species.charge() * *ratio as i32)
            .sum();
        let product_charge: i32 = self
            .products
            .iter()
            .map(|(species, ratio)| species.charge() * *ratio as i32)
            .sum();
        let charge_decrease = reactant_charge - product_charge;
        let mut electrons = 0;
        if charge_decrease == 0 {
            if self.half_cell_potential.is_some() {
                return Err(ReactionBuildError::PotentialWithoutTransfer(display_id));
            }
        } else {
            // A reduction releases positive charge in its forward direction;
            // the declared-as-reverse (oxidation) mirror absorbs it.
            if (charge_decrease < 0) != self.declared_as_reverse {
                return Err(ReactionBuildError::ChargeNotConserved(display_id));
            }
            if self.half_cell_potential.is_none() {
                return Err(ReactionBuildError::MissingHalfCellPotential(display_id));
            }
            if reverse.is_none() {
                return Err(ReactionBuildError::HalfReactionNotReversible(display_id));
            }
            electrons = charge_decrease;
        }

        if !self.forced_activation_energy {
            self.activation_energy = DEFAULT_ACTIVATION_ENERGY;
        }
        if !self.forced_preexponential_factor || self.preexponential_factor <= 0.0 {
            if !self.generated {
                warn!(reaction = %display_id, "no preexponential factor declared, using default");
            }
            self.preexponential_factor = DEFAULT_PREEXPONENTIAL_FACTOR;
        }
        if !self.forced_enthalpy_change {
            self.enthalpy_change = 0.0;
        }
        if self.moles_per_token == 0.0 && self.token_requirements.iter().any(|r| !r.is_catalyst()) {
            warn!(reaction = %display_id, "token-consuming reaction declares no moles per token");
        }

        Ok(Reaction {
            id,
            reactants: self.reactants,
            products: self.products,
            orders: self.orders,
            token_requirements: self.token_requirements,
            moles_per_token: self.moles_per_token,
            needs_uv: self.needs_uv,
            preexponential_factor: self.preexponential_factor,
            activation_energy: self.activation_energy,
            enthalpy_change: self.enthalpy_change,
            half_cell_potential: self.half_cell_potential,
            electrons,
            reverse,
            result: self.result,
        })
    }
}
