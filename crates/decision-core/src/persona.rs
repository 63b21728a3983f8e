//! Persona registry and the slider blending rules that turn base weights into a
//! per-request weight vector.

use std::collections::BTreeMap;

use contracts::{ControlValues, PersonaKey, PersonaSummary, UnknownPersonaError, WeightVector};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaDefinition {
    pub key: PersonaKey,
    pub display_name: &'static str,
    pub default_horizon: u32,
    pub base_weights: WeightVector,
    /// Slider defaults in display order; this is also the visible control list.
    pub slider_defaults: &'static [(&'static str, f64)],
}

impl PersonaDefinition {
    pub fn visible_controls(&self) -> Vec<&'static str> {
        self.slider_defaults.iter().map(|(name, _)| *name).collect()
    }

    pub fn default_controls(&self) -> BTreeMap<String, f64> {
        self.slider_defaults
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    pub fn default_control(&self, control: &str) -> Option<f64> {
        self.slider_defaults
            .iter()
            .find(|(name, _)| *name == control)
            .map(|(_, value)| *value)
    }

    /// Supplied value, else this persona's default, else 0.
    fn control(&self, controls: &ControlValues, control: &str) -> f64 {
        controls
            .get(control)
            .or_else(|| self.default_control(control))
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> PersonaSummary {
        PersonaSummary {
            persona: self.key,
            display_name: self.display_name.to_string(),
            default_horizon: self.default_horizon,
            weights: self.base_weights,
            slider_defaults: self.default_controls(),
            visible_controls: self
                .visible_controls()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

const STANDARD_PERSONAS: [PersonaDefinition; 4] = [
    PersonaDefinition {
        key: PersonaKey::Hiker,
        display_name: "Hiker / Camper",
        default_horizon: 5,
        base_weights: WeightVector::new(0.35, 0.1, 0.35, -0.2),
        slider_defaults: &[
            ("drive_time", 0.4),
            ("avoid_reburn", 0.8),
            ("avoid_erosion", 0.7),
            ("scenic_recovery", 0.6),
            ("water_access", 0.5),
        ],
    },
    PersonaDefinition {
        key: PersonaKey::Homebuyer,
        display_name: "Home Buyer / Renter",
        default_horizon: 10,
        base_weights: WeightVector::new(0.2, 0.35, 0.25, -0.2),
        slider_defaults: &[
            ("reburn_tolerance", 0.3),
            ("flood_tolerance", 0.4),
            ("affordability_vs_safety", 0.5),
        ],
    },
    PersonaDefinition {
        key: PersonaKey::Farmer,
        display_name: "Farmer / Landowner",
        default_horizon: 10,
        base_weights: WeightVector::new(0.25, 0.3, 0.15, -0.3),
        slider_defaults: &[
            ("soil_quality", 0.7),
            ("water_availability", 0.6),
            ("market_access", 0.5),
            ("reburn_tolerance", 0.4),
        ],
    },
    PersonaDefinition {
        key: PersonaKey::Planner,
        display_name: "Local Planner / NGO",
        default_horizon: 20,
        base_weights: WeightVector::new(0.3, 0.3, 0.25, -0.15),
        slider_defaults: &[
            ("forest_pct", 0.4),
            ("housing_pct", 0.2),
            ("budget", 0.5),
            ("safety_priority", 0.7),
            ("economy_priority", 0.5),
            ("conservation_priority", 0.6),
        ],
    },
];

/// Immutable process-wide persona registry. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    definitions: [PersonaDefinition; 4],
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl PersonaCatalog {
    pub fn standard() -> Self {
        Self {
            definitions: STANDARD_PERSONAS,
        }
    }

    pub fn definition(&self, persona: PersonaKey) -> &PersonaDefinition {
        let index = match persona {
            PersonaKey::Hiker => 0,
            PersonaKey::Homebuyer => 1,
            PersonaKey::Farmer => 2,
            PersonaKey::Planner => 3,
        };
        &self.definitions[index]
    }

    pub fn definition_for(&self, persona: &str) -> Result<&PersonaDefinition, UnknownPersonaError> {
        let key = persona.parse::<PersonaKey>()?;
        Ok(self.definition(key))
    }

    pub fn personas(&self) -> impl Iterator<Item = &PersonaDefinition> {
        self.definitions.iter()
    }

    pub fn visible_controls(&self, persona: PersonaKey) -> Vec<&'static str> {
        self.definition(persona).visible_controls()
    }

    pub fn default_controls(&self, persona: PersonaKey) -> BTreeMap<String, f64> {
        self.definition(persona).default_controls()
    }

    pub fn weights_for(
        &self,
        persona: &str,
        controls: &ControlValues,
    ) -> Result<WeightVector, UnknownPersonaError> {
        let key = persona.parse::<PersonaKey>()?;
        Ok(self.weights(key, controls))
    }

    /// Base weights blended with the persona's sliders. `social` is never adjusted.
    pub fn weights(&self, persona: PersonaKey, controls: &ControlValues) -> WeightVector {
        let definition = self.definition(persona);
        let mut weights = definition.base_weights;
        let control = |name: &str| definition.control(controls, name);

        match persona {
            PersonaKey::Hiker => {
                weights.env = 0.3 + 0.4 * control("scenic_recovery");
                weights.risk_penalty = -0.2 - 0.2 * control("avoid_reburn");
            }
            PersonaKey::Homebuyer => {
                weights.risk_penalty = -0.1 - 0.4 * (1.0 - control("reburn_tolerance"));
                weights.econ = 0.2 + 0.5 * control("affordability_vs_safety");
            }
            PersonaKey::Farmer => {
                weights.econ = 0.25 + 0.3 * control("market_access");
                weights.env = 0.2 + 0.3 * control("soil_quality");
            }
            PersonaKey::Planner => {
                let safety = control("safety_priority");
                let economy = control("economy_priority");
                let conservation = control("conservation_priority");
                let total = safety + economy + conservation;
                // Non-positive totals keep the base weights.
                if total > 0.0 {
                    weights.risk_penalty = -0.1 - 0.4 * (safety / total);
                    weights.econ = 0.2 + 0.4 * (economy / total);
                    weights.env = 0.2 + 0.4 * (conservation / total);
                }
            }
        }

        debug!(persona = %persona, ?weights, "derived persona weights");
        weights
    }
}
