//! Boundary feature loading, the region model, and output annotation.
//!
//! Boundary data arrives as a GeoJSON FeatureCollection; the core only ever
//! touches each feature's `properties` map. Parsed collections are memoized
//! process-wide by source path (no eviction; the key space is a handful of
//! boundary files), so repeated pipeline runs against an unchanged source
//! skip the re-parse. Annotation always works on a clone, never on the
//! cached copy.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
    sync::{Arc, Mutex, OnceLock},
};

use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson};
use serde_json::json;

use crate::{alias::resolve_alias, detect, error::ReconcileError};

/// One administrative boundary entity. `raw_name` is kept solely for
/// display; `canonical_name` is the join key; `metric_value` is assigned
/// exactly once per pipeline run, during reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub raw_name: String,
    pub canonical_name: String,
    pub metric_value: f64,
}

static BOUNDARY_CACHE: OnceLock<Mutex<HashMap<String, Arc<FeatureCollection>>>> = OnceLock::new();

/// Loads and parses a boundary FeatureCollection, memoized by path.
pub fn load_boundary(path: &Path) -> Result<Arc<FeatureCollection>> {
    let cache = BOUNDARY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = path.display().to_string();
    if let Some(found) = cache
        .lock()
        .expect("boundary cache poisoned")
        .get(&key)
        .cloned()
    {
        return Ok(found);
    }
    let collection = read_feature_collection(path)?;
    let shared = Arc::new(collection);
    cache
        .lock()
        .expect("boundary cache poisoned")
        .insert(key, Arc::clone(&shared));
    Ok(shared)
}

fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let file = File::open(path).with_context(|| format!("Opening boundary file {path:?}"))?;
    let geojson: GeoJson = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing GeoJSON from {path:?}"))?;
    FeatureCollection::try_from(geojson)
        .with_context(|| format!("Boundary file {path:?} is not a FeatureCollection"))
}

/// Picks the property key holding region names, from the first feature.
///
/// An empty collection or a first feature without properties makes field
/// detection impossible and is fatal.
pub fn region_name_key(collection: &FeatureCollection) -> Result<String, ReconcileError> {
    let first = collection
        .features
        .first()
        .ok_or_else(|| ReconcileError::MalformedBoundary("no features".to_string()))?;
    let props = first
        .properties
        .as_ref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            ReconcileError::MalformedBoundary("first feature has no properties".to_string())
        })?;
    detect::detect_region_name_key(props).ok_or_else(|| {
        ReconcileError::MalformedBoundary("first feature has no properties".to_string())
    })
}

/// Builds one [`Region`] per feature from the named property. Features
/// missing the property get an empty raw name rather than failing; they
/// simply never match any uploaded record.
pub fn build_regions(collection: &FeatureCollection, name_key: &str) -> Vec<Region> {
    collection
        .features
        .iter()
        .map(|feature| {
            let raw_name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(name_key))
                .map(|value| match value {
                    serde_json::Value::String(s) => s.trim().to_string(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            let canonical_name = resolve_alias(&raw_name);
            Region {
                raw_name,
                canonical_name,
                metric_value: 0.0,
            }
        })
        .collect()
}

/// Writes the core-derived properties back onto a (cloned) collection:
/// `__state_raw`, `__state_norm`, and `metric_value`, one region per
/// feature in order.
pub fn annotate_features(collection: &mut FeatureCollection, regions: &[Region]) {
    for (feature, region) in collection.features.iter_mut().zip(regions) {
        let props = feature.properties.get_or_insert_with(Default::default);
        props.insert("__state_raw".to_string(), json!(region.raw_name));
        props.insert("__state_norm".to_string(), json!(region.canonical_name));
        props.insert("metric_value".to_string(), json!(region.metric_value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Feature;

    fn feature(props: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: props.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn empty_collection_is_malformed() {
        let fc = collection(vec![]);
        assert!(matches!(
            region_name_key(&fc),
            Err(ReconcileError::MalformedBoundary(_))
        ));
    }

    #[test]
    fn propertyless_first_feature_is_malformed() {
        let fc = collection(vec![feature(serde_json::json!({}))]);
        assert!(matches!(
            region_name_key(&fc),
            Err(ReconcileError::MalformedBoundary(_))
        ));
    }

    #[test]
    fn regions_carry_raw_and_canonical_names() {
        let fc = collection(vec![
            feature(serde_json::json!({"NAME_1": " Odisha "})),
            feature(serde_json::json!({"NAME_1": "Kerala"})),
        ]);
        let key = region_name_key(&fc).unwrap();
        let regions = build_regions(&fc, &key);
        assert_eq!(regions[0].raw_name, "Odisha");
        assert_eq!(regions[0].canonical_name, "orissa");
        assert_eq!(regions[1].canonical_name, "kerala");
        assert!(regions.iter().all(|r| r.metric_value == 0.0));
    }

    #[test]
    fn annotation_writes_derived_properties() {
        let mut fc = collection(vec![feature(serde_json::json!({"NAME_1": "Goa"}))]);
        let regions = vec![Region {
            raw_name: "Goa".to_string(),
            canonical_name: "goa".to_string(),
            metric_value: 12.5,
        }];
        annotate_features(&mut fc, &regions);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["__state_raw"], "Goa");
        assert_eq!(props["__state_norm"], "goa");
        assert_eq!(props["metric_value"], 12.5);
    }
}
