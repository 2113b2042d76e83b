use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Element;

/// Index of an atom within one [`Structure`].
///
/// Ids are only meaningful relative to the structure that issued them;
/// `remove_atom` invalidates ids above the removed index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomId(usize);

impl AtomId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Translates an id from a merged-in structure by the merge offset.
    pub fn offset(self, offset: usize) -> AtomId {
        AtomId(self.0 + offset)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondKind {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondKind {
    fn glyph(self) -> char {
        match self {
            BondKind::Single => '-',
            BondKind::Double => '=',
            BondKind::Triple => '#',
            BondKind::Aromatic => '~',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: f64,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Atom {
            element,
            formal_charge: 0.0,
        }
    }

    pub fn charged(element: Element, formal_charge: f64) -> Self {
        Atom {
            element,
            formal_charge,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub a: AtomId,
    pub b: AtomId,
    pub kind: BondKind,
}

impl Bond {
    /// The atom on the far side of this bond from `from`, if `from` is one
    /// of its ends.
    pub fn other(&self, from: AtomId) -> Option<AtomId> {
        if self.a == from {
            Some(self.b)
        } else if self.b == from {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A molecular graph: atoms indexed by insertion order, bonds as an edge
/// list. Small molecules only, so queries scan the edge list directly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Structure {
    pub fn new() -> Self {
        Structure::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        self.atoms.push(atom);
        AtomId(self.atoms.len() - 1)
    }

    pub fn add_bond(&mut self, a: AtomId, b: AtomId, kind: BondKind) {
        debug_assert!(a.0 < self.atoms.len() && b.0 < self.atoms.len());
        self.bonds.push(Bond { a, b, kind });
    }

    pub fn atom(&self, id: AtomId) -> &Atom {
        &self.atoms[id.0]
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atom_ids(&self) -> impl Iterator<Item = AtomId> {
        (0..self.atoms.len()).map(AtomId)
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Neighbours of `id` together with the connecting bond kind.
    pub fn bonded(&self, id: AtomId) -> impl Iterator<Item = (AtomId, BondKind)> + '_ {
        self.bonds
            .iter()
            .filter_map(move |bond| bond.other(id).map(|other| (other, bond.kind)))
    }

    /// Neighbours of `id` of the given element, optionally restricted to one
    /// bond kind.
    pub fn bonded_of_element(
        &self,
        id: AtomId,
        element: Element,
        kind: Option<BondKind>,
    ) -> Vec<AtomId> {
        self.bonded(id)
            .filter(|(other, bond_kind)| {
                self.atoms[other.0].element == element && kind.is_none_or(|k| k == *bond_kind)
            })
            .map(|(other, _)| other)
            .collect()
    }

    /// Number of carbon neighbours over any bond kind.
    pub fn carbon_neighbour_count(&self, id: AtomId) -> usize {
        self.bonded(id)
            .filter(|(other, _)| self.atoms[other.0].element == Element::Carbon)
            .count()
    }

    /// Rewrites the kind of the bond between `a` and `b`. Returns false when
    /// no such bond exists.
    pub fn set_bond_kind(&mut self, a: AtomId, b: AtomId, kind: BondKind) -> bool {
        for bond in &mut self.bonds {
            if (bond.a == a && bond.b == b) || (bond.a == b && bond.b == a) {
                bond.kind = kind;
                return true;
            }
        }
        false
    }

    /// Removes an atom and every bond touching it. Ids above the removed
    /// index shift down by one; remove higher-indexed atoms first when
    /// removing several.
    pub fn remove_atom(&mut self, id: AtomId) {
        debug_assert!(id.0 < self.atoms.len());
        self.atoms.remove(id.0);
        self.bonds.retain(|bond| bond.a != id && bond.b != id);
        for bond in &mut self.bonds {
            if bond.a.0 > id.0 {
                bond.a.0 -= 1;
            }
            if bond.b.0 > id.0 {
                bond.b.0 -= 1;
            }
        }
    }

    /// Grafts a copy of `other` into this structure as a disconnected
    /// component. Returns the offset to add to `other`'s atom ids to address
    /// the copied atoms.
    pub fn merge(&mut self, other: &Structure) -> usize {
        let offset = self.atoms.len();
        self.atoms.extend(other.atoms.iter().copied());
        self.bonds.extend(other.bonds.iter().map(|bond| Bond {
            a: bond.a.offset(offset),
            b: bond.b.offset(offset),
            kind: bond.kind,
        }));
        offset
    }

    pub fn count_of(&self, element: Element) -> usize {
        self.atoms
            .iter()
            .filter(|atom| atom.element == element)
            .count()
    }

    /// Net charge, rounded from the summed formal charges.
    pub fn net_charge(&self) -> i32 {
        let total: f64 = self.atoms.iter().map(|atom| atom.formal_charge).sum();
        total.round() as i32
    }

    pub fn molar_mass(&self) -> f64 {
        self.atoms.iter().map(|atom| atom.element.atomic_mass()).sum()
    }

    /// Deterministic, atom-order-independent structural signature: sorted
    /// element counts, a sorted (element pair, bond kind) multiset and the
    /// net charge. Structures built by different routes from the same
    /// template compare equal; distinguishing true isomers is out of scope.
    pub fn signature(&self) -> String {
        let mut element_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for atom in &self.atoms {
            *element_counts.entry(atom.element.symbol()).or_insert(0) += 1;
        }
        let mut bond_counts: BTreeMap<String, usize> = BTreeMap::new();
        for bond in &self.bonds {
            let mut ends = [
                self.atoms[bond.a.0].element.symbol(),
                self.atoms[bond.b.0].element.symbol(),
            ];
            ends.sort_unstable();
            let key = format!("{}{}{}", ends[0], bond.kind.glyph(), ends[1]);
            *bond_counts.entry(key).or_insert(0) += 1;
        }
        let atoms_part: Vec<String> = element_counts
            .iter()
            .map(|(symbol, count)| format!("{symbol}{count}"))
            .collect();
        let bonds_part: Vec<String> = bond_counts
            .iter()
            .map(|(key, count)| format!("{key}x{count}"))
            .collect();
        format!(
            "{}|{}|q{}",
            atoms_part.join(""),
            bonds_part.join(","),
            self.net_charge()
        )
    }
}
