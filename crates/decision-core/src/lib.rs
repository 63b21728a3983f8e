//! Persona-weighted utility scoring and scenario comparison for post-fire land-use decisions.

pub mod parcels;
pub mod persona;
pub mod rounding;
pub mod scenario;
pub mod utility;

pub use contracts::UnknownPersonaError;
pub use parcels::{
    InMemoryParcelSource, ParcelLookupError, ParcelSource, RiskModel, StubParcelSource,
    StubRiskModel,
};
pub use persona::{PersonaCatalog, PersonaDefinition};
pub use scenario::{BaselineScenarioModel, ScenarioComparator, ScenarioModel};
