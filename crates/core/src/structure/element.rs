use serde::{Deserialize, Serialize};

/// Chemical elements the engine knows about, plus the R-group placeholder
/// used by abstract structures in group perception.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Hydrogen,
    Boron,
    Carbon,
    Nitrogen,
    Oxygen,
    Fluorine,
    Sodium,
    Sulfur,
    Chlorine,
    Potassium,
    Iodine,
    /// Placeholder for an arbitrary carbon substituent.
    RGroup,
}

impl Element {
    pub fn symbol(self) -> &'static str {
        match self {
            Element::Hydrogen => "H",
            Element::Boron => "B",
            Element::Carbon => "C",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Fluorine => "F",
            Element::Sodium => "Na",
            Element::Sulfur => "S",
            Element::Chlorine => "Cl",
            Element::Potassium => "K",
            Element::Iodine => "I",
            Element::RGroup => "R",
        }
    }

    /// Standard atomic mass in g/mol. R-groups weigh nothing.
    pub fn atomic_mass(self) -> f64 {
        match self {
            Element::Hydrogen => 1.008,
            Element::Boron => 10.81,
            Element::Carbon => 12.011,
            Element::Nitrogen => 14.007,
            Element::Oxygen => 15.999,
            Element::Fluorine => 18.998,
            Element::Sodium => 22.990,
            Element::Sulfur => 32.06,
            Element::Chlorine => 35.45,
            Element::Potassium => 39.098,
            Element::Iodine => 126.904,
            Element::RGroup => 0.0,
        }
    }
}
