//! Generic reaction templates keyed by functional group.
//!
//! A template turns a functional-group instance found in a mixture (or an
//! ordered pair of instances on two different species) into a concrete
//! [`Reaction`] tailored to the bearing molecule, synthesising the product
//! structure by graph surgery. Generation is pure; returning `None` means
//! the template declines that instance.

mod templates;

pub use templates::standard_templates;

use std::sync::Arc;

use crate::groups::{FunctionalGroup, GroupKind};
use crate::reaction::Reaction;
use crate::registry::Registry;
use crate::structure::Species;

/// A functional-group instance together with the species bearing it.
#[derive(Clone, Debug)]
pub struct BoundGroup {
    pub species: Arc<Species>,
    pub group: FunctionalGroup,
}

pub type SingleGenerator = fn(&BoundGroup, &Registry) -> Option<Reaction>;
pub type DoubleGenerator = fn(&BoundGroup, &BoundGroup, &Registry) -> Option<Reaction>;

/// A reaction template, applied by the mixture to every matching group
/// instance (single) or every ordered cross pair on distinct species
/// (double) whenever its possible-reaction set is refreshed.
pub enum GenericReaction {
    Single {
        group: GroupKind,
        generate: SingleGenerator,
    },
    Double {
        first: GroupKind,
        second: GroupKind,
        generate: DoubleGenerator,
    },
}
