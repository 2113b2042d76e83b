use crate::structure::SpeciesId;

/// What a completed reaction yields beyond its chemical products, reported
/// once enough moles have accumulated (or immediately for one-off results).
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionResult {
    required_moles: f64,
    one_off: bool,
    kind: ResultKind,
}

impl ReactionResult {
    pub fn new(required_moles: f64, kind: ResultKind) -> Self {
        ReactionResult {
            required_moles,
            one_off: false,
            kind,
        }
    }

    /// A result reported exactly once, as soon as any progress accumulates.
    pub fn one_off(kind: ResultKind) -> Self {
        ReactionResult {
            required_moles: f64::INFINITY,
            one_off: true,
            kind,
        }
    }

    pub fn required_moles(&self) -> f64 {
        self.required_moles
    }

    pub fn is_one_off(&self) -> bool {
        self.one_off
    }

    pub fn kind(&self) -> &ResultKind {
        &self.kind
    }
}

/// The payload of a reaction result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// Emit an external token, e.g. a precipitated solid.
    Precipitate { token_id: String },
    /// A previously unregistered compound was synthesised.
    NovelCompound { species: SpeciesId },
    /// Domain-specific result identified by label.
    Custom { label: String },
}
