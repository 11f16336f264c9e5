//! JSON persistence for waypoint graphs.
//!
//! ```json
//! { "waypoints": [ { "position": [x, y, z], "index": 0, "adjacent": [1, 2] } ] }
//! ```
//!
//! `index` values are written as dense ids but read back as opaque
//! references: `adjacent` entries are resolved against the `index` fields,
//! not against array positions. A missing or blank file is an empty graph.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::graph::{Waypoint, WaypointGraph};

/// The persisted form of a whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointFile {
    #[serde(default)]
    pub waypoints: Vec<WaypointRecord>,
}

/// The persisted form of a single waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub position: [f32; 3],
    pub index: usize,
    #[serde(default)]
    pub adjacent: Vec<usize>,
}

/// Flatten a graph into records keyed by its current ids.
pub fn export(graph: &WaypointGraph) -> WaypointFile {
    let waypoints = graph
        .waypoints()
        .iter()
        .enumerate()
        .map(|(index, waypoint)| WaypointRecord {
            position: waypoint.position().into(),
            index,
            adjacent: waypoint.adjacent().collect(),
        })
        .collect();
    WaypointFile { waypoints }
}

/// Rebuild a graph from records.
///
/// All waypoints are created first; adjacency references are resolved in a
/// second pass once every `index` is known.
pub fn import(file: &WaypointFile) -> Result<WaypointGraph> {
    let mut slots = HashMap::with_capacity(file.waypoints.len());
    for (slot, record) in file.waypoints.iter().enumerate() {
        if slots.insert(record.index, slot).is_some() {
            return Err(NavError::DuplicateIndex(record.index));
        }
    }

    let nodes = file
        .waypoints
        .iter()
        .map(|record| {
            let adjacent = record
                .adjacent
                .iter()
                .map(|index| {
                    slots.get(index).copied().ok_or(NavError::UnknownIndex {
                        index: *index,
                        referenced_by: record.index,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Waypoint::with_adjacent(record.position.into(), adjacent))
        })
        .collect::<Result<Vec<_>>>()?;

    WaypointGraph::from_waypoints(nodes)
}

/// Serialize a graph as pretty-printed JSON.
pub fn to_json(graph: &WaypointGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export(graph))?)
}

/// Parse a graph from JSON. Blank input is an empty graph.
pub fn from_json(json: &str) -> Result<WaypointGraph> {
    if json.trim().is_empty() {
        return Ok(WaypointGraph::new());
    }
    let file: WaypointFile = serde_json::from_str(json)?;
    import(&file)
}

/// Write a graph to `path`, creating parent directories as needed.
pub fn save(graph: &WaypointGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_json(graph)?)?;
    info!("stored {} waypoints in {}", graph.len(), path.display());
    Ok(())
}

/// Read a graph from `path`. A missing file is an empty graph.
pub fn load(path: &Path) -> Result<WaypointGraph> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("no waypoint data found at {}", path.display());
            return Ok(WaypointGraph::new());
        }
        Err(e) => return Err(e.into()),
    };
    let graph = from_json(&json)?;
    info!("loaded {} waypoints from {}", graph.len(), path.display());
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickar_core::Vec3;

    fn sample() -> WaypointGraph {
        WaypointGraph::build(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 3.0),
            ],
            &[(0, 1), (1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn export_uses_dense_indices() {
        let file = export(&sample());
        assert_eq!(file.waypoints.len(), 3);
        assert_eq!(file.waypoints[1].index, 1);
        assert_eq!(file.waypoints[1].adjacent, vec![0, 2]);
        assert_eq!(file.waypoints[2].position, [4.0, 0.0, 3.0]);
    }

    #[test]
    fn json_schema_field_names() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["waypoints"][0];
        assert_eq!(first["index"], 0);
        assert_eq!(first["adjacent"], serde_json::json!([1]));
        assert_eq!(first["position"], serde_json::json!([0.0, 0.0, 0.0]));
    }

    #[test]
    fn reload_preserves_distances() {
        let g = sample();
        let back = from_json(&to_json(&g).unwrap()).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.table(), g.table());
    }

    #[test]
    fn indices_are_references_not_positions() {
        let json = r#"{
            "waypoints": [
                { "position": [0, 0, 0], "index": 20, "adjacent": [10] },
                { "position": [6, 0, 0], "index": 10, "adjacent": [20] }
            ]
        }"#;
        let g = from_json(json).unwrap();
        assert_eq!(g.len(), 2);
        assert!((g.distance(0, 1).unwrap() - 6.0).abs() < 1e-4);
        assert_eq!(g.shortest_path(1, 0).unwrap(), vec![1, 0]);
    }

    #[test]
    fn one_way_edges_survive() {
        let json = r#"{"waypoints": [
            { "position": [0, 0, 0], "index": 0, "adjacent": [1] },
            { "position": [1, 0, 0], "index": 1, "adjacent": [] }
        ]}"#;
        let g = from_json(json).unwrap();
        assert_eq!(g.one_way_edges(), vec![(0, 1)]);
    }

    #[test]
    fn unknown_and_duplicate_indices_fail() {
        let unknown = r#"{"waypoints": [{ "position": [0, 0, 0], "index": 0, "adjacent": [7] }]}"#;
        assert!(matches!(
            from_json(unknown),
            Err(NavError::UnknownIndex { index: 7, referenced_by: 0 })
        ));

        let dup = r#"{"waypoints": [
            { "position": [0, 0, 0], "index": 3 },
            { "position": [1, 0, 0], "index": 3 }
        ]}"#;
        assert!(matches!(from_json(dup), Err(NavError::DuplicateIndex(3))));
        assert!(matches!(from_json("{ nope"), Err(NavError::Json(_))));
    }

    #[test]
    fn blank_and_missing_are_empty_graphs() {
        assert!(from_json("").unwrap().is_empty());
        assert!(from_json("  \n").unwrap().is_empty());
        assert!(from_json("{}").unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("waypoints.json");
        save(&sample(), &path).unwrap();
        let g = load(&path).unwrap();
        assert_eq!(g.len(), 3);
        assert!((g.distance(0, 2).unwrap() - 7.0).abs() < 1e-4);
    }
}
