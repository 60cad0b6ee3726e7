//! The read-only reference-data query surface.
//!
//! `ReferenceStore` is the seam between the pipeline and whatever holds
//! the mob/spawn tables (sqlite in the app shell, fixtures in tests).
//! Lookups can fail when the backing store is unavailable; those errors
//! propagate to the caller untouched, the pipeline never retries.

use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::ReferenceError;
use crate::events::model::Location;

use super::model::{MobProfile, SpawnRegion};

pub trait ReferenceStore {
    /// Mobs whose health sits within `tolerance` (a fraction of the
    /// estimate) of `estimated_health`, nearest first.
    fn find_mobs_by_health(
        &self,
        estimated_health: f64,
        tolerance: f64,
    ) -> Result<Vec<MobProfile>, ReferenceError>;

    /// Spawn regions whose center lies within `radius` of `location`.
    fn find_spawns_near_location(
        &self,
        location: Location,
        radius: f64,
    ) -> Result<Vec<SpawnRegion>, ReferenceError>;

    /// Exact profile lookup by species and (optionally) maturity,
    /// case-insensitive.
    fn find_mob_by_name(
        &self,
        name: &str,
        maturity: Option<&str>,
    ) -> Result<Option<MobProfile>, ReferenceError>;

    /// Every profile in the table; the scorer scans all of them.
    fn all_mobs(&self) -> Result<Vec<MobProfile>, ReferenceError>;
}

/// In-memory store backed by plain vectors, with a name index. Used for
/// tests and for reference data loaded wholesale at startup.
#[derive(Debug, Default)]
pub struct InMemoryReference {
    mobs: Vec<MobProfile>,
    spawns: Vec<SpawnRegion>,
    by_name: HashMap<(String, Option<String>), usize>,
}

impl InMemoryReference {
    pub fn new(mobs: Vec<MobProfile>, spawns: Vec<SpawnRegion>) -> Self {
        let by_name = mobs
            .iter()
            .enumerate()
            .map(|(i, m)| (name_key(&m.name, m.maturity.as_deref()), i))
            .collect();
        Self {
            mobs,
            spawns,
            by_name,
        }
    }

    /// Load spawn regions from the community spawn-API JSON export and
    /// merge them with an existing mob table.
    pub fn from_nexus_json(
        mobs: Vec<MobProfile>,
        spawns_json: &str,
    ) -> Result<Self, ReferenceError> {
        let records: Vec<NexusSpawn> = serde_json::from_str(spawns_json)?;
        let spawns = records.into_iter().map(SpawnRegion::from).collect();
        Ok(Self::new(mobs, spawns))
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }
}

impl ReferenceStore for InMemoryReference {
    fn find_mobs_by_health(
        &self,
        estimated_health: f64,
        tolerance: f64,
    ) -> Result<Vec<MobProfile>, ReferenceError> {
        let min = estimated_health * (1.0 - tolerance);
        let max = estimated_health * (1.0 + tolerance);
        let mut matches: Vec<MobProfile> = self
            .mobs
            .iter()
            .filter(|m| m.avg_health >= min && m.avg_health <= max)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            let da = (a.avg_health - estimated_health).abs();
            let db = (b.avg_health - estimated_health).abs();
            da.total_cmp(&db)
        });
        Ok(matches)
    }

    fn find_spawns_near_location(
        &self,
        location: Location,
        radius: f64,
    ) -> Result<Vec<SpawnRegion>, ReferenceError> {
        Ok(self
            .spawns
            .iter()
            .filter(|s| {
                let dx = s.center.lon - location.lon;
                let dy = s.center.lat - location.lat;
                (dx * dx + dy * dy).sqrt() <= radius
            })
            .cloned()
            .collect())
    }

    fn find_mob_by_name(
        &self,
        name: &str,
        maturity: Option<&str>,
    ) -> Result<Option<MobProfile>, ReferenceError> {
        Ok(self
            .by_name
            .get(&name_key(name, maturity))
            .map(|&i| self.mobs[i].clone()))
    }

    fn all_mobs(&self) -> Result<Vec<MobProfile>, ReferenceError> {
        Ok(self.mobs.clone())
    }
}

fn name_key(name: &str, maturity: Option<&str>) -> (String, Option<String>) {
    (
        name.to_lowercase(),
        maturity.map(|m| m.to_lowercase()),
    )
}

// ─── Nexus spawn-API JSON shape ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NexusSpawn {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Planet", default)]
    planet: Option<NexusPlanet>,
    #[serde(rename = "Properties", default)]
    properties: NexusProperties,
}

#[derive(Debug, Deserialize)]
struct NexusPlanet {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct NexusProperties {
    #[serde(rename = "Coordinates", default)]
    coordinates: Option<NexusPoint>,
    #[serde(rename = "Points", default)]
    points: Vec<NexusPoint>,
    #[serde(rename = "Density", default)]
    density: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NexusPoint {
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
}

impl From<&NexusPoint> for Location {
    fn from(p: &NexusPoint) -> Self {
        Location::new(p.longitude, p.latitude)
    }
}

impl From<NexusSpawn> for SpawnRegion {
    fn from(record: NexusSpawn) -> Self {
        let polygon: Vec<Location> =
            record.properties.points.iter().map(Location::from).collect();
        SpawnRegion {
            name: record.name,
            planet: record
                .planet
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            center: record
                .properties
                .coordinates
                .as_ref()
                .map(Location::from)
                .unwrap_or_default(),
            polygon: (!polygon.is_empty()).then_some(polygon),
            density: record.properties.density,
        }
    }
}
