use std::fmt;
use std::sync::Arc;

use crate::groups::{find_groups, FunctionalGroup};

use super::{Element, Structure};

/// Interned species identifier, e.g. `chem:water` or `novel:<signature>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(Arc<str>);

impl SpeciesId {
    pub fn new(id: &str) -> Self {
        SpeciesId(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the namespace separator, used to derive reaction ids.
    pub fn local_name(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable chemical species: identity, optional molecular structure and
/// the physical properties the simulation needs. Functional groups are
/// perceived once at construction.
#[derive(Clone, Debug)]
pub struct Species {
    id: SpeciesId,
    structure: Option<Structure>,
    boiling_point: f64,
    molar_heat_capacity: f64,
    latent_heat: f64,
    charge: i32,
    pure_concentration: f64,
    groups: Vec<FunctionalGroup>,
    novel: bool,
}

impl Species {
    pub fn builder(id: &str) -> SpeciesBuilder {
        SpeciesBuilder::new(id)
    }

    /// Synthesises an unregistered species for a structure produced at
    /// runtime by a reaction template. The id is derived from the structural
    /// signature so equal products always collide, and physical properties
    /// are estimated from atomic composition.
    pub fn novel(structure: Structure) -> Species {
        let signature = structure.signature();
        let id = SpeciesId::new(&format!("novel:{signature}"));
        let heavy_atoms = structure.atom_count() - structure.count_of(Element::Hydrogen);
        let heavy = heavy_atoms.max(1) as f64;
        let total = structure.atom_count() as f64;
        let oxygens = structure.count_of(Element::Oxygen) as f64;
        // Crude additive property estimates; good enough to place novel
        // compounds sensibly between the registered ones.
        let boiling_point = 198.0 + 22.0 * heavy + 8.0 * oxygens;
        let molar_heat_capacity = 30.0 + 9.0 * total;
        let latent_heat = 28_000.0 + 2_500.0 * heavy;
        let molar_volume_ml = 18.0 + 15.0 * (heavy - 1.0);
        let charge = structure.net_charge();
        let groups = find_groups(&structure);
        Species {
            id,
            structure: Some(structure),
            boiling_point,
            molar_heat_capacity,
            latent_heat,
            charge,
            pure_concentration: 1000.0 / molar_volume_ml,
            groups,
            novel: true,
        }
    }

    pub fn id(&self) -> &SpeciesId {
        &self.id
    }

    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    /// Boiling point in kelvins.
    pub fn boiling_point(&self) -> f64 {
        self.boiling_point
    }

    /// Molar heat capacity in J/(mol K).
    pub fn molar_heat_capacity(&self) -> f64 {
        self.molar_heat_capacity
    }

    /// Latent heat of vaporisation in J/mol.
    pub fn latent_heat(&self) -> f64 {
        self.latent_heat
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Concentration of the pure substance in mol/L; bounds how concentrated
    /// any mixture containing this species can get.
    pub fn pure_concentration(&self) -> f64 {
        self.pure_concentration
    }

    pub fn groups(&self) -> &[FunctionalGroup] {
        &self.groups
    }

    pub fn is_novel(&self) -> bool {
        self.novel
    }
}

/// Builder for registered species.
pub struct SpeciesBuilder {
    id: String,
    structure: Option<Structure>,
    boiling_point: f64,
    molar_heat_capacity: f64,
    latent_heat: f64,
    charge: i32,
    pure_concentration: f64,
}

impl SpeciesBuilder {
    pub fn new(id: &str) -> Self {
        SpeciesBuilder {
            id: id.to_owned(),
            structure: None,
            // Defaults suit involatile solutes such as bare ions.
            boiling_point: 5000.0,
            molar_heat_capacity: 75.0,
            latent_heat: 40_000.0,
            charge: 0,
            pure_concentration: 20.0,
        }
    }

    pub fn structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn boiling_point(mut self, kelvins: f64) -> Self {
        self.boiling_point = kelvins;
        self
    }

    pub fn molar_heat_capacity(mut self, joules_per_mol_kelvin: f64) -> Self {
        self.molar_heat_capacity = joules_per_mol_kelvin;
        self
    }

    pub fn latent_heat(mut self, joules_per_mol: f64) -> Self {
        self.latent_heat = joules_per_mol;
        self
    }

    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn pure_concentration(mut self, moles_per_liter: f64) -> Self {
        self.pure_concentration = moles_per_liter;
        self
    }

    pub fn build(self) -> Species {
        let groups = self.structure.as_ref().map_or_else(Vec::new, find_groups);
        Species {
            id: SpeciesId::new(&self.id),
            structure: self.structure,
            boiling_point: self.boiling_point,
            molar_heat_capacity: self.molar_heat_capacity,
            latent_heat: self.latent_heat,
            charge: self.charge,
            pure_concentration: self.pure_concentration,
            groups,
            novel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Atom, BondKind};

    fn ethene() -> Structure {
        let mut s = Structure::new();
        let c1 = s.add_atom(Atom::new(Element::Carbon));
        let c2 = s.add_atom(Atom::new(Element::Carbon));
        s.add_bond(c1, c2, BondKind::Double);
        for carbon in [c1, c2] {
            for _ in 0..2 {
                let h = s.add_atom(Atom::new(Element::Hydrogen));
                s.add_bond(carbon, h, BondKind::Single);
            }
        }
        s
    }

    #[test]
    fn novel_species_share_an_id_for_equal_structures() {
        let a = Species::novel(ethene());
        let b = Species::novel(ethene());
        assert_eq!(a.id(), b.id());
        assert!(a.id().as_str().starts_with("novel:"));
        assert!(a.is_novel());
    }

    #[test]
    fn builder_perceives_groups_from_structure() {
        let species = Species::builder("chem:ethene")
            .structure(ethene())
            .boiling_point(169.4)
            .build();
        assert!(!species.groups().is_empty());
        assert!(!species.is_novel());
        assert_eq!(species.id().local_name(), "ethene");
    }
}
