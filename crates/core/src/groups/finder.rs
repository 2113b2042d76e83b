use crate::structure::{AtomId, BondKind, Element, Structure};

use super::FunctionalGroup;

/// Walks every carbon of a structure and collects its functional groups.
///
/// Detection order per carbon is fixed: a carbonyl oxygen routes the carbon
/// through the acyl discrimination chain (ester / anhydride / carboxylic
/// acid / amide / acyl chloride / ketone / aldehyde) and claims it; otherwise
/// single-bonded substituents are scanned independently, then double and
/// triple carbon-carbon bonds. A symmetric alkene or alkyne yields one
/// instance per end. Pure and idempotent.
pub fn find_groups(structure: &Structure) -> Vec<FunctionalGroup> {
    let mut groups = Vec::new();
    let mut claimed_carbons: Vec<AtomId> = Vec::new();
    let mut seen_alkene_carbons: Vec<AtomId> = Vec::new();
    let mut seen_alkyne_carbons: Vec<AtomId> = Vec::new();

    for carbon in structure.atom_ids() {
        if structure.atom(carbon).element != Element::Carbon {
            continue;
        }
        if claimed_carbons.contains(&carbon) {
            continue;
        }

        let carbonyl_oxygens =
            structure.bonded_of_element(carbon, Element::Oxygen, Some(BondKind::Double));
        let single_oxygens =
            structure.bonded_of_element(carbon, Element::Oxygen, Some(BondKind::Single));
        let chlorines =
            structure.bonded_of_element(carbon, Element::Chlorine, Some(BondKind::Single));
        let iodines = structure.bonded_of_element(carbon, Element::Iodine, Some(BondKind::Single));
        let carbons = structure.bonded_of_element(carbon, Element::Carbon, Some(BondKind::Single));
        let hydrogens =
            structure.bonded_of_element(carbon, Element::Hydrogen, Some(BondKind::Single));
        let r_groups = structure.bonded_of_element(carbon, Element::RGroup, Some(BondKind::Single));
        let single_nitrogens =
            structure.bonded_of_element(carbon, Element::Nitrogen, Some(BondKind::Single));
        let triple_nitrogens =
            structure.bonded_of_element(carbon, Element::Nitrogen, Some(BondKind::Triple));

        if carbonyl_oxygens.len() == 1 {
            let carbonyl_oxygen = carbonyl_oxygens[0];
            let double_nitrogens =
                structure.bonded_of_element(carbon, Element::Nitrogen, Some(BondKind::Double));
            if double_nitrogens.len() == 1 {
                // Central isocyanate carbon; the group is claimed from the
                // nitrogen-bearing carbon instead.
                continue;
            }
            if single_oxygens.len() == 1 {
                let alkoxy_oxygen = single_oxygens[0];
                let carbons_of_oxygen = structure.bonded_of_element(
                    alkoxy_oxygen,
                    Element::Carbon,
                    Some(BondKind::Single),
                );
                let hydrogens_of_oxygen = structure.bonded_of_element(
                    alkoxy_oxygen,
                    Element::Hydrogen,
                    Some(BondKind::Single),
                );
                if carbons_of_oxygen.len() == 2 {
                    let other_carbon = if carbons_of_oxygen[0] == carbon {
                        carbons_of_oxygen[1]
                    } else {
                        carbons_of_oxygen[0]
                    };
                    let other_is_acyl = !structure
                        .bonded_of_element(other_carbon, Element::Oxygen, Some(BondKind::Double))
                        .is_empty();
                    if other_is_acyl {
                        groups.push(FunctionalGroup::AcidAnhydride {
                            carbon,
                            bridging_oxygen: alkoxy_oxygen,
                        });
                    } else {
                        groups.push(FunctionalGroup::Ester {
                            carbonyl_carbon: carbon,
                            alkoxy_oxygen,
                            alkoxy_carbon: other_carbon,
                        });
                    }
                    claimed_carbons.push(other_carbon);
                } else if hydrogens_of_oxygen.len() == 1 {
                    groups.push(FunctionalGroup::CarboxylicAcid {
                        carbon,
                        carbonyl_oxygen,
                        hydroxyl_oxygen: alkoxy_oxygen,
                        hydrogen: hydrogens_of_oxygen[0],
                    });
                }
            } else if single_nitrogens.len() == 1 {
                let nitrogen = single_nitrogens[0];
                let amide_hydrogens =
                    structure.bonded_of_element(nitrogen, Element::Hydrogen, Some(BondKind::Single));
                if amide_hydrogens.len() == 2 {
                    groups.push(FunctionalGroup::UnsubstitutedAmide { carbon, nitrogen });
                }
            } else if chlorines.len() == 1 {
                groups.push(FunctionalGroup::AcylChloride {
                    carbon,
                    chlorine: chlorines[0],
                });
            } else if carbons.len() == 2 {
                groups.push(FunctionalGroup::Carbonyl {
                    carbon,
                    oxygen: carbonyl_oxygen,
                    ketone: true,
                });
            } else if carbons.len() + hydrogens.len() + r_groups.len() == 2 {
                groups.push(FunctionalGroup::Carbonyl {
                    carbon,
                    oxygen: carbonyl_oxygen,
                    ketone: false,
                });
            }
            continue;
        }

        let degree = carbons.len();

        for halogen in chlorines.iter().chain(iodines.iter()) {
            groups.push(FunctionalGroup::Halide {
                carbon,
                halogen: *halogen,
                degree,
            });
        }

        for &oxygen in &single_oxygens {
            let hydrogens_of_oxygen =
                structure.bonded_of_element(oxygen, Element::Hydrogen, Some(BondKind::Single));
            let borons_of_oxygen = structure.bonded_of_element(oxygen, Element::Boron, None);
            if hydrogens_of_oxygen.len() == 1 {
                groups.push(FunctionalGroup::Alcohol {
                    carbon,
                    oxygen,
                    hydrogen: hydrogens_of_oxygen[0],
                    degree,
                });
            } else if structure.atom(oxygen).formal_charge == -1.0 {
                groups.push(FunctionalGroup::Alkoxide { carbon, oxygen });
            } else if borons_of_oxygen.len() == 1 {
                groups.push(FunctionalGroup::BorateEster {
                    carbon,
                    oxygen,
                    boron: borons_of_oxygen[0],
                });
            }
        }

        for &nitrogen in &single_nitrogens {
            let double_carbons_of_nitrogen =
                structure.bonded_of_element(nitrogen, Element::Carbon, Some(BondKind::Double));
            if double_carbons_of_nitrogen.len() == 1
                && !structure
                    .bonded_of_element(
                        double_carbons_of_nitrogen[0],
                        Element::Oxygen,
                        Some(BondKind::Double),
                    )
                    .is_empty()
            {
                groups.push(FunctionalGroup::Isocyanate { carbon, nitrogen });
                continue;
            }
            let aromatic_oxygens =
                structure.bonded_of_element(nitrogen, Element::Oxygen, Some(BondKind::Aromatic));
            if aromatic_oxygens.len() == 2 {
                groups.push(FunctionalGroup::Nitro { carbon, nitrogen });
                continue;
            }
            if triple_nitrogens.len() == 1 {
                // Nitrile carbon; its nitrogen substituents are not amines.
                continue;
            }
            let amine_hydrogens =
                structure.bonded_of_element(nitrogen, Element::Hydrogen, Some(BondKind::Single));
            for &hydrogen in &amine_hydrogens {
                groups.push(FunctionalGroup::NonTertiaryAmine {
                    carbon,
                    nitrogen,
                    hydrogen,
                });
            }
            if amine_hydrogens.len() == 2 {
                groups.push(FunctionalGroup::PrimaryAmine { carbon, nitrogen });
            }
        }

        if triple_nitrogens.len() == 1 && carbons.len() == 1 {
            groups.push(FunctionalGroup::Nitrile {
                carbon,
                nitrogen: triple_nitrogens[0],
            });
        }

        for &boron in &structure.bonded_of_element(carbon, Element::Boron, Some(BondKind::Single)) {
            for &hydrogen in
                &structure.bonded_of_element(boron, Element::Hydrogen, Some(BondKind::Single))
            {
                groups.push(FunctionalGroup::NonTertiaryBorane {
                    carbon,
                    boron,
                    hydrogen,
                });
            }
            groups.push(FunctionalGroup::Borane { carbon, boron });
        }

        for &partner in
            &structure.bonded_of_element(carbon, Element::Carbon, Some(BondKind::Double))
        {
            if seen_alkene_carbons.contains(&partner) {
                continue;
            }
            let own_degree = structure.carbon_neighbour_count(carbon) - 1;
            let partner_degree = structure.carbon_neighbour_count(partner) - 1;
            if own_degree >= partner_degree {
                groups.push(FunctionalGroup::Alkene {
                    high_carbon: carbon,
                    low_carbon: partner,
                });
            }
            if partner_degree >= own_degree {
                groups.push(FunctionalGroup::Alkene {
                    high_carbon: partner,
                    low_carbon: carbon,
                });
            }
            seen_alkene_carbons.push(carbon);
        }

        for &partner in
            &structure.bonded_of_element(carbon, Element::Carbon, Some(BondKind::Triple))
        {
            if seen_alkyne_carbons.contains(&partner) {
                continue;
            }
            let own_degree = structure.carbon_neighbour_count(carbon) - 1;
            let partner_degree = structure.carbon_neighbour_count(partner) - 1;
            if own_degree >= partner_degree {
                groups.push(FunctionalGroup::Alkyne {
                    high_carbon: carbon,
                    low_carbon: partner,
                });
            }
            if partner_degree >= own_degree {
                groups.push(FunctionalGroup::Alkyne {
                    high_carbon: partner,
                    low_carbon: carbon,
                });
            }
            seen_alkyne_carbons.push(carbon);
        }
    }

    // Boric acid is perceived from the boron side so it needs no carbon.
    for boron in structure.atom_ids() {
        if structure.atom(boron).element != Element::Boron {
            continue;
        }
        for oxygen in structure.bonded_of_element(boron, Element::Oxygen, None) {
            let hydrogens_of_oxygen =
                structure.bonded_of_element(oxygen, Element::Hydrogen, Some(BondKind::Single));
            if hydrogens_of_oxygen.len() == 1 {
                groups.push(FunctionalGroup::BoricAcid {
                    boron,
                    oxygen,
                    hydrogen: hydrogens_of_oxygen[0],
                });
            }
        }
    }

    groups
}
