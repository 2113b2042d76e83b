//! Saving and restoring mixtures as JSON.
//!
//! Only identity and quantity are stored; groups, possible reactions and
//! boiling-point caches are reconstructed from the registry on load, so a
//! record stays valid across registry upgrades as long as the ids survive.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::reaction::ReactionId;
use crate::registry::Registry;
use crate::structure::SpeciesId;

use super::Mixture;

#[derive(Debug)]
pub enum PersistenceError {
    LoadFailed(String),
    ParseFailed(String),
    SerializeFailed(String),
    SaveFailed(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::LoadFailed(message) => {
                write!(f, "failed to read mixture file: {message}")
            }
            PersistenceError::ParseFailed(message) => {
                write!(f, "failed to parse mixture record: {message}")
            }
            PersistenceError::SerializeFailed(message) => {
                write!(f, "failed to serialize mixture record: {message}")
            }
            PersistenceError::SaveFailed(message) => {
                write!(f, "failed to write mixture file: {message}")
            }
        }
    }
}

impl Error for PersistenceError {}

/// Serialisable snapshot of a [`Mixture`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixtureRecord {
    #[serde(default)]
    pub display_key: String,
    pub temperature: f64,
    pub contents: Vec<ContentRecord>,
    #[serde(default)]
    pub at_equilibrium: bool,
    #[serde(default)]
    pub results: Vec<ResultProgressRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub species: String,
    pub concentration: f64,
    /// Stored only when it differs from what the boiling point alone would
    /// predict at the recorded temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_fraction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultProgressRecord {
    pub reaction: String,
    pub moles_per_liter: f64,
}

impl Mixture {
    pub fn to_record(&self) -> MixtureRecord {
        let mut contents: Vec<ContentRecord> = self
            .contents
            .values()
            .map(|content| {
                let guess = if content.species.boiling_point() < self.temperature {
                    1.0
                } else {
                    0.0
                };
                ContentRecord {
                    species: content.species.id().to_string(),
                    concentration: content.concentration,
                    gas_fraction: if content.gas_fraction == guess {
                        None
                    } else {
                        Some(content.gas_fraction)
                    },
                }
            })
            .collect();
        contents.sort_by(|a, b| a.species.cmp(&b.species));
        let mut results: Vec<ResultProgressRecord> = self
            .result_progress
            .iter()
            .map(|(reaction_id, progress)| ResultProgressRecord {
                reaction: reaction_id.to_string(),
                moles_per_liter: *progress,
            })
            .collect();
        results.sort_by(|a, b| a.reaction.cmp(&b.reaction));
        MixtureRecord {
            display_key: self.display_key.clone(),
            temperature: self.temperature,
            contents,
            at_equilibrium: self.at_equilibrium,
            results,
        }
    }

    /// Rebuilds a mixture from a record against a registry.
    ///
    /// Species and reactions the registry no longer knows are dropped with a
    /// warning rather than failing the load.
    pub fn from_record(record: &MixtureRecord, registry: &Arc<Registry>) -> Mixture {
        let mut mixture = Mixture::new(registry.clone());
        mixture.display_key = record.display_key.clone();
        mixture.temperature = record.temperature;
        for content in &record.contents {
            let id = SpeciesId::new(&content.species);
            let Some(species) = registry.species(&id) else {
                warn!(species = %content.species, "unknown species in mixture record, dropped");
                continue;
            };
            if content.concentration <= 0.0 {
                continue;
            }
            let species = species.clone();
            mixture.internal_add_species(species.clone(), content.concentration, false);
            let gas_fraction = match content.gas_fraction {
                Some(fraction) => fraction.clamp(0.0, 1.0),
                None => {
                    if species.boiling_point() < mixture.temperature {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
            if let Some(entry) = mixture.contents.get_mut(species.id()) {
                entry.gas_fraction = gas_fraction;
            }
            if gas_fraction > 0.0 && gas_fraction < 1.0 {
                mixture.boiling = true;
            }
        }
        // Novel results were already reported when the species first formed.
        mixture.pending_novel_results.clear();
        for result in &record.results {
            let reaction_id = ReactionId::new(&result.reaction);
            // Progress toward a reaction the registry no longer defines is
            // meaningless; drop it.
            if registry.reaction(&reaction_id).is_none() {
                continue;
            }
            mixture
                .result_progress
                .insert(reaction_id, result.moles_per_liter);
        }
        mixture.update_next_boiling_points(false);
        mixture.refresh_possible_reactions();
        mixture.at_equilibrium = record.at_equilibrium;
        mixture
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.to_record())
            .map_err(|e| PersistenceError::SerializeFailed(e.to_string()))?;
        fs::write(path, json).map_err(|e| PersistenceError::SaveFailed(e.to_string()))
    }

    pub fn load_json(path: &Path, registry: &Arc<Registry>) -> Result<Mixture, PersistenceError> {
        let json =
            fs::read_to_string(path).map_err(|e| PersistenceError::LoadFailed(e.to_string()))?;
        let record: MixtureRecord = serde_json::from_str(&json)
            .map_err(|e| PersistenceError::ParseFailed(e.to_string()))?;
        Ok(Mixture::from_record(&record, registry))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::library::{self, default_registry};

    use super::*;

    #[test]
    fn record_round_trip_preserves_state() {
        let registry = default_registry();
        let water = registry.species_named(library::WATER).unwrap();
        let ethanol = registry.species_named(library::ETHANOL).unwrap();

        let mut mixture = Mixture::new(registry.clone());
        mixture.set_display_key("flask");
        mixture.add_species(&water, 40.0);
        mixture.add_species(&ethanol, 5.0);
        mixture.set_temperature(310.0);
        mixture.set_gas_fraction(ethanol.id(), 0.25);
        mixture
            .result_progress
            .insert(ReactionId::new("chem:acetic_acid.dissociation"), 0.125);

        let record = mixture.to_record();
        let restored = Mixture::from_record(&record, &registry);

        assert_eq!(restored.display_key(), "flask");
        assert_relative_eq!(restored.temperature(), 310.0);
        assert_relative_eq!(restored.concentration_of(water.id()), 40.0);
        assert_relative_eq!(restored.concentration_of(ethanol.id()), 5.0);
        assert_relative_eq!(restored.gas_fraction_of(ethanol.id()), 0.25);
        assert!(restored.is_boiling());
        assert_relative_eq!(
            restored.result_progress[&ReactionId::new("chem:acetic_acid.dissociation")],
            0.125
        );
    }

    #[test]
    fn unknown_ids_are_dropped_on_load() {
        let registry = default_registry();
        let record = MixtureRecord {
            display_key: String::new(),
            temperature: 298.15,
            contents: vec![
                ContentRecord {
                    species: "chem:water".to_owned(),
                    concentration: 10.0,
                    gas_fraction: None,
                },
                ContentRecord {
                    species: "chem:unobtainium".to_owned(),
                    concentration: 1.0,
                    gas_fraction: None,
                },
            ],
            at_equilibrium: false,
            results: vec![ResultProgressRecord {
                reaction: "chem:forgotten.reaction".to_owned(),
                moles_per_liter: 2.0,
            }],
        };
        let mixture = Mixture::from_record(&record, &registry);
        assert_eq!(mixture.species_present().count(), 1);
        assert!(mixture.result_progress.is_empty());
    }
}
