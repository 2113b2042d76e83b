//! Molecular structure: elements, atoms, bonds, graphs and species.

mod element;
mod graph;
mod species;

pub use element::Element;
pub use graph::{Atom, AtomId, Bond, BondKind, Structure};
pub use species::{Species, SpeciesBuilder, SpeciesId};
