//! Boundary file loading and name attribute detection.
//!
//! The name attribute is resolved once per collection from the schema (the
//! union of property names across all features), never per feature.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use disability_map_boundary_models::{
    BoundaryCollection, BoundaryDefinition, NameAttribute, NameResolution, RegionBoundary,
};
use disability_map_region::label_text;
use geojson::GeoJson;

use crate::BoundaryError;
use crate::geometry::to_multipolygon;

/// Loads a boundary collection from the file named in a
/// [`BoundaryDefinition`].
#[derive(Debug, Clone)]
pub struct BoundaryLoader {
    definition: BoundaryDefinition,
    path: PathBuf,
}

impl BoundaryLoader {
    /// Creates a loader. A relative `file` resolves against `data_dir`.
    #[must_use]
    pub fn new(definition: BoundaryDefinition, data_dir: &Path) -> Self {
        let path = data_dir.join(&definition.file);
        Self { definition, path }
    }

    /// Returns the boundary definition.
    #[must_use]
    pub const fn definition(&self) -> &BoundaryDefinition {
        &self.definition
    }

    /// Returns the resolved boundary file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the boundary file.
    ///
    /// A missing file yields an empty collection rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the file exists but cannot be read or is
    /// not a `GeoJSON` `FeatureCollection`.
    pub fn load(&self) -> Result<BoundaryCollection, BoundaryError> {
        if !self.path.exists() {
            log::warn!(
                "[{}] Boundary file {} not found",
                self.definition.id,
                self.path.display()
            );
            return Ok(BoundaryCollection::empty(&self.definition.fallback_name));
        }

        let text = std::fs::read_to_string(&self.path)?;
        let collection = parse_collection(
            &text,
            &self.definition.name_candidates,
            &self.definition.fallback_name,
        )?;

        log::info!(
            "[{}] Loaded {} regions from {} (name attribute: {}, {})",
            self.definition.id,
            collection.len(),
            self.path.display(),
            collection.name_attribute.name,
            collection.name_attribute.resolution
        );

        Ok(collection)
    }
}

/// Parses `GeoJSON` text into a [`BoundaryCollection`].
///
/// Features without polygonal geometry are skipped with a warning.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the text is not `GeoJSON` or is not a
/// `FeatureCollection`.
pub fn parse_collection(
    text: &str,
    name_candidates: &[String],
    fallback_name: &str,
) -> Result<BoundaryCollection, BoundaryError> {
    let GeoJson::FeatureCollection(fc) = text.parse::<GeoJson>()? else {
        return Err(BoundaryError::Conversion {
            message: "Boundary file is not a FeatureCollection".to_string(),
        });
    };

    let mut skipped = 0_usize;
    let mut features = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let Some(geometry) = feature.geometry.and_then(to_multipolygon) else {
            skipped += 1;
            continue;
        };
        features.push((feature.properties.unwrap_or_default(), geometry));
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} boundary features without polygon geometry");
    }

    let schema: BTreeSet<&str> = features
        .iter()
        .flat_map(|(props, _)| props.keys().map(String::as_str))
        .collect();
    let name_attribute = detect_name_attribute(&schema, name_candidates, fallback_name);

    if name_attribute.resolution == NameResolution::Fallback && !features.is_empty() {
        log::warn!(
            "None of {name_candidates:?} found in boundary properties, using {fallback_name:?}"
        );
    }

    let regions = features
        .into_iter()
        .map(|(properties, geometry)| RegionBoundary {
            name: properties
                .get(&name_attribute.name)
                .map(label_text)
                .unwrap_or_default(),
            geometry,
            properties,
        })
        .collect();

    Ok(BoundaryCollection {
        regions,
        name_attribute,
    })
}

/// Picks the first candidate present in `schema`, or `fallback_name`.
#[must_use]
pub fn detect_name_attribute(
    schema: &BTreeSet<&str>,
    candidates: &[String],
    fallback_name: &str,
) -> NameAttribute {
    candidates
        .iter()
        .find(|c| schema.contains(c.as_str()))
        .map_or_else(
            || NameAttribute {
                name: fallback_name.to_string(),
                resolution: NameResolution::Fallback,
            },
            |c| NameAttribute {
                name: c.clone(),
                resolution: NameResolution::Detected,
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        ["KABKOT", "NAMEOBJ", "WADMKK", "NAME_2", "Kabupaten"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn feature(props: &serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "properties": props,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[107.0, -7.0], [108.0, -7.0], [108.0, -6.0], [107.0, -7.0]]]
            }
        })
    }

    fn collection(features: &[serde_json::Value]) -> String {
        serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    #[test]
    fn detects_first_present_candidate() {
        let schema: BTreeSet<&str> = ["OBJECTID", "WADMKK", "NAME_2"].into_iter().collect();
        let attr = detect_name_attribute(&schema, &candidates(), "KABKOT");
        assert_eq!(attr.name, "WADMKK");
        assert_eq!(attr.resolution, NameResolution::Detected);
    }

    #[test]
    fn falls_back_when_no_candidate_present() {
        let schema: BTreeSet<&str> = ["OBJECTID"].into_iter().collect();
        let attr = detect_name_attribute(&schema, &candidates(), "KABKOT");
        assert_eq!(attr.name, "KABKOT");
        assert_eq!(attr.resolution, NameResolution::Fallback);
    }

    #[test]
    fn candidate_names_are_case_sensitive() {
        let schema: BTreeSet<&str> = ["kabkot"].into_iter().collect();
        let attr = detect_name_attribute(&schema, &candidates(), "KABKOT");
        assert_eq!(attr.resolution, NameResolution::Fallback);
    }

    #[test]
    fn parses_collection_with_detected_attribute() {
        let text = collection(&[
            feature(&serde_json::json!({ "NAME_2": "Bandung", "ID": 1 })),
            feature(&serde_json::json!({ "NAME_2": "Kota Bandung", "ID": 2 })),
        ]);
        let parsed = parse_collection(&text, &candidates(), "KABKOT").unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.name_attribute.name, "NAME_2");
        assert_eq!(parsed.regions[0].name, "Bandung");
        assert_eq!(parsed.regions[1].name, "Kota Bandung");
        assert_eq!(parsed.regions[1].properties["ID"], serde_json::json!(2));
    }

    #[test]
    fn attribute_is_chosen_for_the_whole_collection() {
        // Only the second feature has the preferred attribute; the first
        // gets an empty name instead of falling back per feature.
        let text = collection(&[
            feature(&serde_json::json!({ "NAME_2": "Garut" })),
            feature(&serde_json::json!({ "KABKOT": "CIAMIS", "NAME_2": "Ciamis" })),
        ]);
        let parsed = parse_collection(&text, &candidates(), "KABKOT").unwrap();

        assert_eq!(parsed.name_attribute.name, "KABKOT");
        assert_eq!(parsed.regions[0].name, "");
        assert_eq!(parsed.regions[1].name, "CIAMIS");
    }

    #[test]
    fn missing_candidates_yield_empty_names() {
        let text = collection(&[feature(&serde_json::json!({ "OBJECTID": 9 }))]);
        let parsed = parse_collection(&text, &candidates(), "KABKOT").unwrap();

        assert_eq!(parsed.name_attribute.resolution, NameResolution::Fallback);
        assert_eq!(parsed.regions[0].name, "");
    }

    #[test]
    fn numeric_names_use_text_form() {
        let text = collection(&[feature(&serde_json::json!({ "KABKOT": 3204 }))]);
        let parsed = parse_collection(&text, &candidates(), "KABKOT").unwrap();
        assert_eq!(parsed.regions[0].name, "3204");
    }

    #[test]
    fn skips_features_without_polygons() {
        let text = collection(&[
            feature(&serde_json::json!({ "KABKOT": "BOGOR" })),
            serde_json::json!({
                "type": "Feature",
                "properties": { "KABKOT": "POINT" },
                "geometry": { "type": "Point", "coordinates": [107.0, -7.0] }
            }),
            serde_json::json!({
                "type": "Feature",
                "properties": { "KABKOT": "NULL" },
                "geometry": null
            }),
        ]);
        let parsed = parse_collection(&text, &candidates(), "KABKOT").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.regions[0].name, "BOGOR");
    }

    #[test]
    fn rejects_non_collection_geojson() {
        let text = feature(&serde_json::json!({ "KABKOT": "BOGOR" })).to_string();
        assert!(matches!(
            parse_collection(&text, &candidates(), "KABKOT"),
            Err(BoundaryError::Conversion { .. })
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_collection("{ nope", &candidates(), "KABKOT"),
            Err(BoundaryError::GeoJson(_))
        ));
    }

    #[test]
    fn missing_file_loads_empty_collection() {
        let dir = std::env::temp_dir().join("disability_map_boundary_missing");
        let _ = std::fs::remove_dir_all(&dir);
        let loader = BoundaryLoader::new(crate::registry::default_definition().clone(), &dir);

        let collection = loader.load().unwrap();

        assert!(collection.is_empty());
        assert_eq!(collection.name_attribute.name, "KABKOT");
    }

    #[test]
    fn loads_file_from_data_dir() {
        let dir = std::env::temp_dir().join("disability_map_boundary_load");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("Jabar_By_Kab.geojson"),
            collection(&[feature(&serde_json::json!({ "KABKOT": "SUKABUMI" }))]),
        )
        .unwrap();
        let loader = BoundaryLoader::new(crate::registry::default_definition().clone(), &dir);

        let collection = loader.load().unwrap();

        assert_eq!(loader.path(), dir.join("Jabar_By_Kab.geojson"));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.regions[0].name, "SUKABUMI");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
