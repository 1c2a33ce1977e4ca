// 🌍 GeoJSON Export - Render plans as FeatureCollections
// Any map library that speaks GeoJSON can consume the output directly

use crate::render::{RenderPlan, RenderSink};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::Write;

/// Convert a render plan into a GeoJSON FeatureCollection
///
/// Coordinates are `[lon, lat]` as GeoJSON requires. Styling and popup
/// fields travel in `properties`; `clustered` is a foreign member on the
/// collection so the client knows whether to group markers.
pub fn to_feature_collection(plan: &RenderPlan) -> Value {
    let features: Vec<Value> = plan
        .entries
        .iter()
        .map(|entry| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [entry.position.lon, entry.position.lat],
                },
                "properties": {
                    "label": entry.label,
                    "color": entry.color,
                    "age_months": entry.age_months,
                    "popup": entry.popup,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
        "clustered": plan.clustered,
        "visible_count": plan.visible_count,
        "active_count": plan.active_count,
    })
}

/// Writes each plan as pretty-printed GeoJSON
pub struct GeoJsonSink<W: Write> {
    writer: W,
}

impl<W: Write> GeoJsonSink<W> {
    pub fn new(writer: W) -> Self {
        GeoJsonSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSink for GeoJsonSink<W> {
    fn render(&mut self, plan: &RenderPlan) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &to_feature_collection(plan))
            .context("Failed to write GeoJSON")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{LatLon, PopupContent, RenderEntry};

    fn sample_plan() -> RenderPlan {
        RenderPlan {
            entries: vec![RenderEntry {
                position: LatLon {
                    lat: 58.9,
                    lon: 5.7,
                },
                color: "#007bff".to_string(),
                label: "A".to_string(),
                popup: PopupContent {
                    name: "A".to_string(),
                    industry: "Energi".to_string(),
                    employees: "Not specified".to_string(),
                    founded: "2024-01-01".to_string(),
                    age: "6 months".to_string(),
                    address: "Not specified".to_string(),
                    status: "Active".to_string(),
                    area: "Not specified".to_string(),
                    org_number: "Not specified".to_string(),
                },
                age_months: Some(6),
            }],
            visible_count: 1,
            active_count: 1,
            clustered: false,
        }
    }

    #[test]
    fn test_feature_collection_shape() {
        let fc = to_feature_collection(&sample_plan());

        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["clustered"], false);
        assert_eq!(fc["features"].as_array().unwrap().len(), 1);

        let feature = &fc["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], 5.7);
        assert_eq!(feature["geometry"]["coordinates"][1], 58.9);
        assert_eq!(feature["properties"]["color"], "#007bff");
        assert_eq!(feature["properties"]["popup"]["industry"], "Energi");
    }

    #[test]
    fn test_sink_writes_json() {
        let mut sink = GeoJsonSink::new(Vec::new());
        sink.render(&sample_plan()).unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["visible_count"], 1);
    }
}
