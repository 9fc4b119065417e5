use std::path::Path;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    error::Result,
    types::{ComputedFootprint, Rect4Outcome, Ring},
};

fn number(v: f64) -> JsonValue {
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

fn ring_feature(id: &str, ring: &Ring) -> Feature {
    let polygon = ring.to_polygon();
    let mut properties = Map::new();
    properties.insert("kind".to_string(), JsonValue::String(id.to_string()));
    properties.insert("vertices".to_string(), JsonValue::from(ring.len()));
    properties.insert("area".to_string(), number(ring.area()));
    properties.insert("perimeter".to_string(), number(ring.perimeter()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&polygon))),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

impl Rect4Outcome {
    /// Polygon feature for a quadrilateral; `None` when there is nothing to draw
    pub fn to_feature(&self) -> Option<Feature> {
        self.ring().map(|ring| ring_feature("rect4", ring))
    }
}

impl ComputedFootprint {
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::new();
        features.extend(self.outcome.to_feature());
        if self.refine_stats.is_some() {
            if let Some(initial) = &self.initial {
                features.push(ring_feature("initial", initial));
            }
        }

        let mut foreign_members = Map::new();
        foreign_members.insert("image_width".to_string(), JsonValue::from(self.image_width));
        foreign_members.insert("image_height".to_string(), JsonValue::from(self.image_height));
        if let Rect4Outcome::NotQuadrilateral { sides } = self.outcome {
            foreign_members.insert("sides".to_string(), JsonValue::from(sides));
        }
        if let Some(stats) = &self.refine_stats {
            foreign_members.insert("refinement".to_string(), serde_json::to_value(stats)?);
        }

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let geojson_string = self.to_geojson_string()?;
        std::fs::write(path, geojson_string)?;
        Ok(())
    }
}
