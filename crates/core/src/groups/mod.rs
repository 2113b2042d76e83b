//! Functional-group perception over molecular structures.

mod finder;

pub use finder::find_groups;

use crate::structure::AtomId;

/// A perceived functional group, binding the atoms that play each role so
/// reaction templates can perform graph surgery without re-searching the
/// structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FunctionalGroup {
    AcidAnhydride {
        carbon: AtomId,
        bridging_oxygen: AtomId,
    },
    AcylChloride {
        carbon: AtomId,
        chlorine: AtomId,
    },
    Alcohol {
        carbon: AtomId,
        oxygen: AtomId,
        hydrogen: AtomId,
        /// Carbon substituents on the bearing carbon.
        degree: usize,
    },
    Alkoxide {
        carbon: AtomId,
        oxygen: AtomId,
    },
    /// `high_carbon` is the more substituted end; templates use it for
    /// Markovnikov addition.
    Alkene {
        high_carbon: AtomId,
        low_carbon: AtomId,
    },
    Alkyne {
        high_carbon: AtomId,
        low_carbon: AtomId,
    },
    Borane {
        carbon: AtomId,
        boron: AtomId,
    },
    NonTertiaryBorane {
        carbon: AtomId,
        boron: AtomId,
        hydrogen: AtomId,
    },
    BorateEster {
        carbon: AtomId,
        oxygen: AtomId,
        boron: AtomId,
    },
    BoricAcid {
        boron: AtomId,
        oxygen: AtomId,
        hydrogen: AtomId,
    },
    CarboxylicAcid {
        carbon: AtomId,
        carbonyl_oxygen: AtomId,
        hydroxyl_oxygen: AtomId,
        hydrogen: AtomId,
    },
    Carbonyl {
        carbon: AtomId,
        oxygen: AtomId,
        ketone: bool,
    },
    Ester {
        carbonyl_carbon: AtomId,
        alkoxy_oxygen: AtomId,
        alkoxy_carbon: AtomId,
    },
    Halide {
        carbon: AtomId,
        halogen: AtomId,
        /// Carbon substituents on the bearing carbon.
        degree: usize,
    },
    Isocyanate {
        carbon: AtomId,
        nitrogen: AtomId,
    },
    Nitrile {
        carbon: AtomId,
        nitrogen: AtomId,
    },
    Nitro {
        carbon: AtomId,
        nitrogen: AtomId,
    },
    NonTertiaryAmine {
        carbon: AtomId,
        nitrogen: AtomId,
        hydrogen: AtomId,
    },
    PrimaryAmine {
        carbon: AtomId,
        nitrogen: AtomId,
    },
    UnsubstitutedAmide {
        carbon: AtomId,
        nitrogen: AtomId,
    },
}

/// Discriminant of [`FunctionalGroup`], used to key reaction templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    AcidAnhydride,
    AcylChloride,
    Alcohol,
    Alkoxide,
    Alkene,
    Alkyne,
    Borane,
    NonTertiaryBorane,
    BorateEster,
    BoricAcid,
    CarboxylicAcid,
    Carbonyl,
    Ester,
    Halide,
    Isocyanate,
    Nitrile,
    Nitro,
    NonTertiaryAmine,
    PrimaryAmine,
    UnsubstitutedAmide,
}

impl FunctionalGroup {
    pub fn kind(&self) -> GroupKind {
        match self {
            FunctionalGroup::AcidAnhydride { .. } => GroupKind::AcidAnhydride,
            FunctionalGroup::AcylChloride { .. } => GroupKind::AcylChloride,
            FunctionalGroup::Alcohol { .. } => GroupKind::Alcohol,
            FunctionalGroup::Alkoxide { .. } => GroupKind::Alkoxide,
            FunctionalGroup::Alkene { .. } => GroupKind::Alkene,
            FunctionalGroup::Alkyne { .. } => GroupKind::Alkyne,
            FunctionalGroup::Borane { .. } => GroupKind::Borane,
            FunctionalGroup::NonTertiaryBorane { .. } => GroupKind::NonTertiaryBorane,
            FunctionalGroup::BorateEster { .. } => GroupKind::BorateEster,
            FunctionalGroup::BoricAcid { .. } => GroupKind::BoricAcid,
            FunctionalGroup::CarboxylicAcid { .. } => GroupKind::CarboxylicAcid,
            FunctionalGroup::Carbonyl { .. } => GroupKind::Carbonyl,
            FunctionalGroup::Ester { .. } => GroupKind::Ester,
            FunctionalGroup::Halide { .. } => GroupKind::Halide,
            FunctionalGroup::Isocyanate { .. } => GroupKind::Isocyanate,
            FunctionalGroup::Nitrile { .. } => GroupKind::Nitrile,
            FunctionalGroup::Nitro { .. } => GroupKind::Nitro,
            FunctionalGroup::NonTertiaryAmine { .. } => GroupKind::NonTertiaryAmine,
            FunctionalGroup::PrimaryAmine { .. } => GroupKind::PrimaryAmine,
            FunctionalGroup::UnsubstitutedAmide { .. } => GroupKind::UnsubstitutedAmide,
        }
    }
}
