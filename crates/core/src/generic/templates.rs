use std::sync::Arc;

use crate::groups::{FunctionalGroup, GroupKind};
use crate::library;
use crate::reaction::{Reaction, ReactionBuilder, TokenMatcher, TokenRequirement};
use crate::registry::Registry;
use crate::structure::{Atom, BondKind, Element, Species, Structure};

use super::{BoundGroup, GenericReaction};

/// The built-in template library: acid-catalysed alkene hydration,
/// nickel-catalysed alkyne hydrogenation and acyl chloride + alcohol
/// esterification.
pub fn standard_templates() -> Vec<GenericReaction> {
    vec![
        GenericReaction::Single {
            group: GroupKind::Alkene,
            generate: alkene_hydration,
        },
        GenericReaction::Single {
            group: GroupKind::Alkyne,
            generate: alkyne_hydrogenation,
        },
        GenericReaction::Double {
            first: GroupKind::AcylChloride,
            second: GroupKind::Alcohol,
            generate: acyl_chloride_esterification,
        },
    ]
}

/// Looks the synthesised product up by structure, falling back to a novel
/// species when nothing registered matches.
fn product_species(registry: &Registry, structure: Structure) -> Arc<Species> {
    registry
        .find_by_structure(&structure)
        .unwrap_or_else(|| Arc::new(Species::novel(structure)))
}

/// Markovnikov hydration: water adds across the double bond, the hydroxyl
/// landing on the more substituted carbon. Acid catalysed.
fn alkene_hydration(bound: &BoundGroup, registry: &Registry) -> Option<Reaction> {
    let FunctionalGroup::Alkene {
        high_carbon,
        low_carbon,
    } = &bound.group
    else {
        return None;
    };
    let source = bound.species.structure()?;
    let mut product = source.clone();
    if !product.set_bond_kind(*high_carbon, *low_carbon, BondKind::Single) {
        return None;
    }
    let oxygen = product.add_atom(Atom::new(Element::Oxygen));
    let hydroxyl_hydrogen = product.add_atom(Atom::new(Element::Hydrogen));
    let added_hydrogen = product.add_atom(Atom::new(Element::Hydrogen));
    product.add_bond(*high_carbon, oxygen, BondKind::Single);
    product.add_bond(oxygen, hydroxyl_hydrogen, BondKind::Single);
    product.add_bond(*low_carbon, added_hydrogen, BondKind::Single);

    let alcohol = product_species(registry, product);
    let water = registry.species_named(library::WATER)?;
    let proton = registry.species_named(library::PROTON)?;
    ReactionBuilder::generated()
        .reactant(&bound.species)
        .reactant(&water)
        .catalyst(&proton, 1)
        .product(&alcohol)
        .preexponential_factor(2e3)
        .activation_energy(25.0)
        .enthalpy_change(-44.0)
        .build_generated()
        .ok()
}

/// Partial hydrogenation of an alkyne to the corresponding alkene over a
/// nickel surface.
fn alkyne_hydrogenation(bound: &BoundGroup, registry: &Registry) -> Option<Reaction> {
    let FunctionalGroup::Alkyne {
        high_carbon,
        low_carbon,
    } = &bound.group
    else {
        return None;
    };
    let source = bound.species.structure()?;
    let mut product = source.clone();
    if !product.set_bond_kind(*high_carbon, *low_carbon, BondKind::Double) {
        return None;
    }
    for carbon in [*high_carbon, *low_carbon] {
        let hydrogen = product.add_atom(Atom::new(Element::Hydrogen));
        product.add_bond(carbon, hydrogen, BondKind::Single);
    }

    let alkene = product_species(registry, product);
    let hydrogen = registry.species_named(library::HYDROGEN)?;
    ReactionBuilder::generated()
        .reactant(&bound.species)
        .reactant(&hydrogen)
        .token(
            TokenRequirement::catalyst(TokenMatcher::Id(library::NICKEL_TOKEN.to_owned())),
            1.0,
        )
        .product(&alkene)
        .preexponential_factor(5e3)
        .activation_energy(25.0)
        .enthalpy_change(-40.0)
        .build_generated()
        .ok()
}

/// Acyl substitution: the alcohol oxygen bonds to the carbonyl carbon,
/// expelling hydrogen chloride. Declines charged alcohols.
fn acyl_chloride_esterification(
    acyl: &BoundGroup,
    alcohol: &BoundGroup,
    registry: &Registry,
) -> Option<Reaction> {
    let FunctionalGroup::AcylChloride { carbon, chlorine } = &acyl.group else {
        return None;
    };
    let FunctionalGroup::Alcohol {
        oxygen, hydrogen, ..
    } = &alcohol.group
    else {
        return None;
    };
    if alcohol.species.charge() != 0 {
        return None;
    }
    let acyl_structure = acyl.species.structure()?;
    let alcohol_structure = alcohol.species.structure()?;

    let mut ester = acyl_structure.clone();
    let offset = ester.merge(alcohol_structure);
    let alkoxy_oxygen = oxygen.offset(offset);
    let lost_hydrogen = hydrogen.offset(offset);
    ester.add_bond(*carbon, alkoxy_oxygen, BondKind::Single);
    // The merged hydrogen always indexes above the chlorine; remove it first
    // so the chlorine's id stays valid.
    ester.remove_atom(lost_hydrogen);
    ester.remove_atom(*chlorine);

    let ester_species = product_species(registry, ester);
    let hydrogen_chloride = registry.species_named(library::HYDROGEN_CHLORIDE)?;
    ReactionBuilder::generated()
        .reactant(&acyl.species)
        .reactant(&alcohol.species)
        .product(&ester_species)
        .product(&hydrogen_chloride)
        .preexponential_factor(1e4)
        .activation_energy(30.0)
        .enthalpy_change(-60.0)
        .build_generated()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::find_groups;
    use crate::library::default_registry;

    fn bound_groups(species: &Arc<Species>) -> Vec<BoundGroup> {
        species
            .groups()
            .iter()
            .map(|group| BoundGroup {
                species: species.clone(),
                group: group.clone(),
            })
            .collect()
    }

    #[test]
    fn hydration_of_ethene_yields_registered_ethanol() {
        let registry = default_registry();
        let ethene = registry.species_named(library::ETHENE).unwrap();
        let bound = &bound_groups(&ethene)[0];
        let reaction = alkene_hydration(bound, &registry).expect("applicable");

        assert_eq!(reaction.reactant_ratio(ethene.id()), 1);
        let product = &reaction.products()[0].0;
        assert_eq!(product.id().as_str(), library::ETHANOL);
        assert!(!product.is_novel());
    }

    #[test]
    fn hydration_of_propene_is_markovnikov_and_novel() {
        let registry = default_registry();
        let propene = registry.species_named(library::PROPENE).unwrap();
        let bound = &bound_groups(&propene)[0];
        let reaction = alkene_hydration(bound, &registry).expect("applicable");

        let product = &reaction.products()[0].0;
        assert!(product.is_novel());
        // Propan-2-ol: the alcohol sits on the secondary carbon.
        let structure = product.structure().unwrap();
        let has_secondary_alcohol = find_groups(structure).iter().any(|group| {
            matches!(group, FunctionalGroup::Alcohol { degree, .. } if *degree == 2)
        });
        assert!(has_secondary_alcohol);
    }

    #[test]
    fn hydrogenation_of_ethyne_yields_ethene() {
        let registry = default_registry();
        let ethyne = registry.species_named(library::ETHYNE).unwrap();
        let bound = &bound_groups(&ethyne)[0];
        let reaction = alkyne_hydrogenation(bound, &registry).expect("applicable");

        assert!(!reaction.consumes_tokens());
        assert_eq!(reaction.token_requirements().len(), 1);
        let product = &reaction.products()[0].0;
        assert_eq!(product.id().as_str(), library::ETHENE);
    }

    #[test]
    fn esterification_builds_the_ester_and_hydrogen_chloride() {
        let registry = default_registry();
        let acyl = registry
            .species_named(library::ETHANOYL_CHLORIDE)
            .unwrap();
        let ethanol = registry.species_named(library::ETHANOL).unwrap();

        let acyl_bound = bound_groups(&acyl)
            .into_iter()
            .find(|b| b.group.kind() == GroupKind::AcylChloride)
            .unwrap();
        let alcohol_bound = bound_groups(&ethanol)
            .into_iter()
            .find(|b| b.group.kind() == GroupKind::Alcohol)
            .unwrap();

        let reaction =
            acyl_chloride_esterification(&acyl_bound, &alcohol_bound, &registry).expect("applies");
        let ester = &reaction.products()[0].0;
        assert!(ester.is_novel());
        let structure = ester.structure().unwrap();
        assert_eq!(structure.count_of(Element::Chlorine), 0);
        assert!(find_groups(structure)
            .iter()
            .any(|group| group.kind() == GroupKind::Ester));
        assert_eq!(
            reaction.products()[1].0.id().as_str(),
            library::HYDROGEN_CHLORIDE
        );
    }
}
