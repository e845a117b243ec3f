use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::api::{Feature, FeatureCollection};
use crate::domain::{PlatePolygon, PlateSet};

/// Parse a GeoJSON FeatureCollection into domain plate polygons
///
/// # Algorithm
/// 1. For each Polygon feature, decode the ring nesting and take the
///    exterior ring (interior rings / holes are not modeled)
/// 2. Drop the ring's explicit closing vertex (the area engine wraps
///    implicitly)
/// 3. Name the plate from its properties, falling back to `plate-{index}`
///
/// Non-Polygon geometries and degenerate rings are skipped.
pub fn parse_plates(collection: &FeatureCollection) -> Vec<PlatePolygon> {
    let mut plates = Vec::new();

    for (index, feature) in collection.features.iter().enumerate() {
        let geometry = match &feature.geometry {
            Some(g) => g,
            None => continue,
        };

        if geometry.type_ != "Polygon" {
            continue;
        }

        // Polygon coordinates are a list of rings; ring 0 is the exterior.
        // Positions may carry a third ordinate, so decode loosely.
        let rings: Vec<Vec<Vec<f64>>> =
            match serde_json::from_value(geometry.coordinates.clone()) {
                Ok(r) => r,
                Err(_) => continue,
            };

        let exterior = match rings.first() {
            Some(ring) => ring,
            None => continue,
        };

        let mut points: Vec<(f64, f64)> = exterior
            .iter()
            .filter(|position| position.len() >= 2)
            .map(|position| (position[0], position[1]))
            .collect();

        if is_closed_ring(&points) {
            points.pop();
        }

        if points.len() < 3 {
            continue;
        }

        plates.push(PlatePolygon::new(plate_name(feature, index), points));
    }

    plates
}

fn is_closed_ring(points: &[(f64, f64)]) -> bool {
    if points.len() < 4 {
        return false;
    }
    let first = points.first().unwrap();
    let last = points.last().unwrap();
    (first.0 - last.0).abs() < 1e-9 && (first.1 - last.1).abs() < 1e-9
}

fn plate_name(feature: &Feature, index: usize) -> String {
    feature
        .properties
        .as_ref()
        .and_then(|props| {
            ["PlateName", "Code", "name"]
                .iter()
                .find_map(|key| props.get(*key))
        })
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("plate-{index}"))
}

/// Read and parse a local GeoJSON dataset
pub fn load_plates(path: &Path) -> Result<PlateSet> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read dataset file: {:?}", path))?;

    let collection: FeatureCollection =
        serde_json::from_str(&contents).context("Failed to parse GeoJSON dataset")?;

    let plates = parse_plates(&collection);
    if plates.is_empty() {
        bail!("No usable plate polygons found in {:?}", path);
    }

    Ok(PlateSet::new(plates))
}
