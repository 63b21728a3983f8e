//! Seams for the parcel-data and risk-model collaborators, with the stub
//! implementations used until a geospatial store and risk model are wired in.

use std::collections::BTreeMap;

use contracts::{Centroid, ParcelFeature, ParcelRecord, ParcelScores, RiskPrediction};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParcelLookupError {
    #[error("parcel not found: {0}")]
    NotFound(String),
    #[error("parcel source unavailable: {0}")]
    Unavailable(String),
}

pub trait ParcelSource: Send + Sync {
    fn fetch_parcel(&self, parcel_id: &str) -> Result<ParcelRecord, ParcelLookupError>;
}

pub trait RiskModel: Send + Sync {
    fn predict(&self, feature: &ParcelFeature, include_recovery: bool) -> RiskPrediction;
}

/// Answers every id with the same representative high-burn parcel.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubParcelSource;

impl ParcelSource for StubParcelSource {
    fn fetch_parcel(&self, parcel_id: &str) -> Result<ParcelRecord, ParcelLookupError> {
        Ok(ParcelRecord {
            parcel_id: parcel_id.to_string(),
            area_ha: 12.3,
            centroid: Centroid {
                lat: 40.1,
                lng: -120.5,
            },
            burn_class: "high".to_string(),
            burn_index: 0.78,
            risks: BTreeMap::from([
                ("reburn".to_string(), 0.64),
                ("erosion".to_string(), 0.42),
                ("flood".to_string(), 0.21),
            ]),
            recovery_stage: "mid".to_string(),
            scores: ParcelScores::new(0.9, 0.4, 0.6, -0.12),
            explanation: "High slope + high burn severity → high erosion risk.".to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryParcelSource {
    parcels: BTreeMap<String, ParcelRecord>,
}

impl InMemoryParcelSource {
    pub fn new(parcels: impl IntoIterator<Item = ParcelRecord>) -> Self {
        Self {
            parcels: parcels
                .into_iter()
                .map(|parcel| (parcel.parcel_id.clone(), parcel))
                .collect(),
        }
    }
}

impl ParcelSource for InMemoryParcelSource {
    fn fetch_parcel(&self, parcel_id: &str) -> Result<ParcelRecord, ParcelLookupError> {
        self.parcels
            .get(parcel_id)
            .cloned()
            .ok_or_else(|| ParcelLookupError::NotFound(parcel_id.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StubRiskModel;

impl RiskModel for StubRiskModel {
    fn predict(&self, feature: &ParcelFeature, include_recovery: bool) -> RiskPrediction {
        RiskPrediction {
            id: feature.id.clone(),
            reburn: 0.55,
            erosion: 0.32,
            flood: 0.18,
            recovery_stage: include_recovery.then(|| "mid".to_string()),
        }
    }
}
