//! The built-in chemical library: core species every simulation needs,
//! the standard reaction templates and the default acid registrations.

use std::sync::Arc;

use crate::generic::standard_templates;
use crate::reaction::{ReactionBuilder, TokenMatcher, TokenRequirement};
use crate::registry::{Registry, RegistryBuilder};
use crate::structure::{Atom, AtomId, BondKind, Element, Species, Structure};

pub const WATER: &str = "chem:water";
pub const PROTON: &str = "chem:proton";
pub const HYDROXIDE: &str = "chem:hydroxide";
pub const SODIUM_ION: &str = "chem:sodium_ion";
pub const CHLORIDE: &str = "chem:chloride";
pub const HYDROGEN: &str = "chem:hydrogen";
pub const HYDROGEN_CHLORIDE: &str = "chem:hydrogen_chloride";
pub const ETHENE: &str = "chem:ethene";
pub const PROPENE: &str = "chem:propene";
pub const ETHYNE: &str = "chem:ethyne";
pub const ETHANOL: &str = "chem:ethanol";
pub const ACETIC_ACID: &str = "chem:acetic_acid";
pub const ACETATE: &str = "chem:acetate";
pub const ETHANOYL_CHLORIDE: &str = "chem:ethanoyl_chloride";

/// Token id for solid rock salt, which dissolves into its ions.
pub const ROCK_SALT_TOKEN: &str = "chem:rock_salt";
/// Token id for the nickel hydrogenation catalyst.
pub const NICKEL_TOKEN: &str = "chem:nickel";

fn hydrogenate(structure: &mut Structure, atom: AtomId, count: u32) {
    for _ in 0..count {
        let hydrogen = structure.add_atom(Atom::new(Element::Hydrogen));
        structure.add_bond(atom, hydrogen, BondKind::Single);
    }
}

fn water_structure() -> Structure {
    let mut s = Structure::new();
    let oxygen = s.add_atom(Atom::new(Element::Oxygen));
    hydrogenate(&mut s, oxygen, 2);
    s
}

fn proton_structure() -> Structure {
    let mut s = Structure::new();
    s.add_atom(Atom::charged(Element::Hydrogen, 1.0));
    s
}

fn hydroxide_structure() -> Structure {
    let mut s = Structure::new();
    let oxygen = s.add_atom(Atom::charged(Element::Oxygen, -1.0));
    hydrogenate(&mut s, oxygen, 1);
    s
}

fn sodium_ion_structure() -> Structure {
    let mut s = Structure::new();
    s.add_atom(Atom::charged(Element::Sodium, 1.0));
    s
}

fn chloride_structure() -> Structure {
    let mut s = Structure::new();
    s.add_atom(Atom::charged(Element::Chlorine, -1.0));
    s
}

fn hydrogen_structure() -> Structure {
    let mut s = Structure::new();
    let a = s.add_atom(Atom::new(Element::Hydrogen));
    let b = s.add_atom(Atom::new(Element::Hydrogen));
    s.add_bond(a, b, BondKind::Single);
    s
}

fn hydrogen_chloride_structure() -> Structure {
    let mut s = Structure::new();
    let hydrogen = s.add_atom(Atom::new(Element::Hydrogen));
    let chlorine = s.add_atom(Atom::new(Element::Chlorine));
    s.add_bond(hydrogen, chlorine, BondKind::Single);
    s
}

fn ethene_structure() -> Structure {
    let mut s = Structure::new();
    let c1 = s.add_atom(Atom::new(Element::Carbon));
    let c2 = s.add_atom(Atom::new(Element::Carbon));
    s.add_bond(c1, c2, BondKind::Double);
    hydrogenate(&mut s, c1, 2);
    hydrogenate(&mut s, c2, 2);
    s
}

fn propene_structure() -> Structure {
    let mut s = Structure::new();
    let c1 = s.add_atom(Atom::new(Element::Carbon));
    let c2 = s.add_atom(Atom::new(Element::Carbon));
    let c3 = s.add_atom(Atom::new(Element::Carbon));
    s.add_bond(c1, c2, BondKind::Double);
    s.add_bond(c2, c3, BondKind::Single);
    hydrogenate(&mut s, c1, 2);
    hydrogenate(&mut s, c2, 1);
    hydrogenate(&mut s, c3, 3);
    s
}

fn ethyne_structure() -> Structure {
    let mut s = Structure::new();
    let c1 = s.add_atom(Atom::new(Element::Carbon));
    let c2 = s.add_atom(Atom::new(Element::Carbon));
    s.add_bond(c1, c2, BondKind::Triple);
    hydrogenate(&mut s, c1, 1);
    hydrogenate(&mut s, c2, 1);
    s
}

fn ethanol_structure() -> Structure {
    let mut s = Structure::new();
    let c1 = s.add_atom(Atom::new(Element::Carbon));
    let c2 = s.add_atom(Atom::new(Element::Carbon));
    let oxygen = s.add_atom(Atom::new(Element::Oxygen));
    s.add_bond(c1, c2, BondKind::Single);
    s.add_bond(c2, oxygen, BondKind::Single);
    hydrogenate(&mut s, c1, 3);
    hydrogenate(&mut s, c2, 2);
    hydrogenate(&mut s, oxygen, 1);
    s
}

fn acetic_acid_structure() -> Structure {
    let mut s = Structure::new();
    let methyl = s.add_atom(Atom::new(Element::Carbon));
    let carbonyl = s.add_atom(Atom::new(Element::Carbon));
    let carbonyl_oxygen = s.add_atom(Atom::new(Element::Oxygen));
    let hydroxyl_oxygen = s.add_atom(Atom::new(Element::Oxygen));
    s.add_bond(methyl, carbonyl, BondKind::Single);
    s.add_bond(carbonyl, carbonyl_oxygen, BondKind::Double);
    s.add_bond(carbonyl, hydroxyl_oxygen, BondKind::Single);
    hydrogenate(&mut s, methyl, 3);
    hydrogenate(&mut s, hydroxyl_oxygen, 1);
    s
}

fn acetate_structure() -> Structure {
    let mut s = Structure::new();
    let methyl = s.add_atom(Atom::new(Element::Carbon));
    let carbonyl = s.add_atom(Atom::new(Element::Carbon));
    let carbonyl_oxygen = s.add_atom(Atom::new(Element::Oxygen));
    let carboxylate_oxygen = s.add_atom(Atom::charged(Element::Oxygen, -1.0));
    s.add_bond(methyl, carbonyl, BondKind::Single);
    s.add_bond(carbonyl, carbonyl_oxygen, BondKind::Double);
    s.add_bond(carbonyl, carboxylate_oxygen, BondKind::Single);
    hydrogenate(&mut s, methyl, 3);
    s
}

fn ethanoyl_chloride_structure() -> Structure {
    let mut s = Structure::new();
    let methyl = s.add_atom(Atom::new(Element::Carbon));
    let carbonyl = s.add_atom(Atom::new(Element::Carbon));
    let oxygen = s.add_atom(Atom::new(Element::Oxygen));
    let chlorine = s.add_atom(Atom::new(Element::Chlorine));
    s.add_bond(methyl, carbonyl, BondKind::Single);
    s.add_bond(carbonyl, oxygen, BondKind::Double);
    s.add_bond(carbonyl, chlorine, BondKind::Single);
    hydrogenate(&mut s, methyl, 3);
    s
}

/// Builds the default registry: the core species, the standard reaction
/// templates, the acetic acid equilibrium and rock salt dissolution.
///
/// # Panics
/// Panics only if the built-in definitions are inconsistent, which a unit
/// test pins down.
#[must_use]
pub fn default_registry() -> Arc<Registry> {
    let mut builder = RegistryBuilder::new();

    let water = builder.add_species(
        Species::builder(WATER)
            .structure(water_structure())
            .boiling_point(373.15)
            .molar_heat_capacity(75.3)
            .latent_heat(40_660.0)
            .pure_concentration(55.5)
            .build(),
    );
    builder.add_species(
        Species::builder(PROTON)
            .structure(proton_structure())
            .charge(1)
            .build(),
    );
    builder.add_species(
        Species::builder(HYDROXIDE)
            .structure(hydroxide_structure())
            .charge(-1)
            .build(),
    );
    let sodium_ion = builder.add_species(
        Species::builder(SODIUM_ION)
            .structure(sodium_ion_structure())
            .charge(1)
            .build(),
    );
    let chloride = builder.add_species(
        Species::builder(CHLORIDE)
            .structure(chloride_structure())
            .charge(-1)
            .build(),
    );
    builder.add_species(
        Species::builder(HYDROGEN)
            .structure(hydrogen_structure())
            .boiling_point(20.3)
            .molar_heat_capacity(28.8)
            .latent_heat(900.0)
            .pure_concentration(35.0)
            .build(),
    );
    builder.add_species(
        Species::builder(HYDROGEN_CHLORIDE)
            .structure(hydrogen_chloride_structure())
            .boiling_point(188.0)
            .molar_heat_capacity(29.1)
            .latent_heat(16_150.0)
            .pure_concentration(40.0)
            .build(),
    );
    builder.add_species(
        Species::builder(ETHENE)
            .structure(ethene_structure())
            .boiling_point(169.4)
            .molar_heat_capacity(42.9)
            .latent_heat(13_500.0)
            .pure_concentration(20.0)
            .build(),
    );
    builder.add_species(
        Species::builder(PROPENE)
            .structure(propene_structure())
            .boiling_point(225.5)
            .molar_heat_capacity(64.3)
            .latent_heat(18_400.0)
            .pure_concentration(14.5)
            .build(),
    );
    builder.add_species(
        Species::builder(ETHYNE)
            .structure(ethyne_structure())
            .boiling_point(189.1)
            .molar_heat_capacity(44.0)
            .latent_heat(16_900.0)
            .pure_concentration(24.0)
            .build(),
    );
    builder.add_species(
        Species::builder(ETHANOL)
            .structure(ethanol_structure())
            .boiling_point(351.4)
            .molar_heat_capacity(112.0)
            .latent_heat(38_600.0)
            .pure_concentration(17.1)
            .build(),
    );
    let acetic_acid = builder.add_species(
        Species::builder(ACETIC_ACID)
            .structure(acetic_acid_structure())
            .boiling_point(391.0)
            .molar_heat_capacity(123.0)
            .latent_heat(23_700.0)
            .pure_concentration(17.4)
            .build(),
    );
    let acetate = builder.add_species(
        Species::builder(ACETATE)
            .structure(acetate_structure())
            .charge(-1)
            .build(),
    );
    builder.add_species(
        Species::builder(ETHANOYL_CHLORIDE)
            .structure(ethanoyl_chloride_structure())
            .boiling_point(324.0)
            .molar_heat_capacity(117.0)
            .latent_heat(28_300.0)
            .pure_concentration(14.0)
            .build(),
    );

    builder
        .register_acid("chem", &acetic_acid, &acetate, 4.76)
        .expect("acetic acid registration is well-formed");

    ReactionBuilder::new("chem")
        .id("rock_salt_dissolution")
        .token(
            TokenRequirement::consumed(TokenMatcher::Id(ROCK_SALT_TOKEN.to_owned())),
            0.5,
        )
        .catalyst(&water, 0)
        .product(&sodium_ion)
        .product(&chloride)
        .preexponential_factor(1e4)
        .activation_energy(0.0)
        .build(&mut builder)
        .expect("rock salt dissolution is well-formed");

    for template in standard_templates() {
        builder.add_template(template);
    }

    builder.build()
}
