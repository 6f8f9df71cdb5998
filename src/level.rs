//! Level document and editor collection operations
//!
//! A level is `{metadata, objects}` serialized as JSON. The runtime only ever
//! consumes `objects`; metadata rides along for export.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generate::GeneratedObject;
use crate::sim::grid::{self, in_bounds};
use crate::sim::{Course, LevelObject, ObjectKind};

/// Length of generated object ids
const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("object id '{0}' is already in use")]
    DuplicateId(String),
    #[error("no object with id '{0}'")]
    UnknownId(String),
    #[error("cell ({x}, {y}) is outside the playfield")]
    OutOfBounds { x: i32, y: i32 },
    #[error("invalid level document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
    Demon,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
            Difficulty::Demon => "Demon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            "demon" => Some(Difficulty::Demon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetadata {
    pub name: String,
    pub difficulty: Difficulty,
    pub author: String,
    /// Informational only; speed zones drive the simulation
    pub speed: f32,
}

impl Default for LevelMetadata {
    fn default() -> Self {
        Self {
            name: "New Level".to_string(),
            difficulty: Difficulty::Normal,
            author: "Creator".to_string(),
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub metadata: LevelMetadata,
    #[serde(default)]
    pub objects: Vec<LevelObject>,
}

impl LevelData {
    pub fn new(metadata: LevelMetadata) -> Self {
        Self {
            metadata,
            objects: Vec::new(),
        }
    }

    /// Immutable object list handed to the runtime
    pub fn course(&self) -> Course {
        Course::new(self.objects.clone())
    }

    // === Export ===

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export document
    ///
    /// Cells must lie in the playfield and ids must be unique; rotations are
    /// reduced modulo 360.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let mut level: LevelData = serde_json::from_str(json)?;
        let mut seen = HashSet::with_capacity(level.objects.len());
        for o in &mut level.objects {
            if !in_bounds(o.x, o.y) {
                return Err(LevelError::OutOfBounds { x: o.x, y: o.y });
            }
            if !seen.insert(o.id.clone()) {
                return Err(LevelError::DuplicateId(o.id.clone()));
            }
            o.rotation %= 360;
        }
        let unknown = level
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Unknown)
            .count();
        if unknown > 0 {
            log::warn!("{} object(s) of unknown kind will be inert", unknown);
        }
        Ok(level)
    }

    /// Download name: whitespace runs become `_`, lowercased, `.json`
    pub fn export_file_name(&self) -> String {
        let mut stem = String::with_capacity(self.metadata.name.len());
        let mut in_space = false;
        for c in self.metadata.name.chars() {
            if c.is_whitespace() {
                if !in_space {
                    stem.push('_');
                }
                in_space = true;
            } else {
                stem.extend(c.to_lowercase());
                in_space = false;
            }
        }
        format!("{stem}.json")
    }

    // === Queries ===

    pub fn get(&self, id: &str) -> Option<&LevelObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_at(&self, x: i32, y: i32) -> Option<&LevelObject> {
        self.objects.iter().find(|o| o.x == x && o.y == y)
    }

    pub fn max_x(&self) -> Option<i32> {
        self.objects.iter().map(|o| o.x).max()
    }

    /// Ids of objects inside the inclusive cell box spanned by two corners
    pub fn select_in_box(&self, a: (i32, i32), b: (i32, i32)) -> Vec<String> {
        let (x1, x2) = (a.0.min(b.0), a.0.max(b.0));
        let (y1, y2) = (a.1.min(b.1), a.1.max(b.1));
        self.objects
            .iter()
            .filter(|o| (x1..=x2).contains(&o.x) && (y1..=y2).contains(&o.y))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Grid cell under a simulation-space point, if placeable
    pub fn cell_at(point: Vec2) -> Option<(i32, i32)> {
        let (x, y) = grid::cell_at(point);
        in_bounds(x, y).then_some((x, y))
    }

    // === Editing ===

    pub fn add(&mut self, object: LevelObject) -> Result<(), LevelError> {
        if !in_bounds(object.x, object.y) {
            return Err(LevelError::OutOfBounds {
                x: object.x,
                y: object.y,
            });
        }
        if self.get(&object.id).is_some() {
            return Err(LevelError::DuplicateId(object.id));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Paint tool: replace whatever occupies the cell with a fresh object
    pub fn place<R: Rng>(
        &mut self,
        rng: &mut R,
        kind: ObjectKind,
        x: i32,
        y: i32,
    ) -> Result<String, LevelError> {
        if !in_bounds(x, y) {
            return Err(LevelError::OutOfBounds { x, y });
        }
        self.objects.retain(|o| !(o.x == x && o.y == y));
        let id = self.fresh_id(rng);
        self.objects.push(LevelObject::new(id.clone(), kind, x, y));
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LevelObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every listed id; returns how many were removed
    pub fn remove_many(&mut self, ids: &[String]) -> usize {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(o.id.as_str()));
        before - self.objects.len()
    }

    /// Replace the object with the same id
    pub fn update(&mut self, object: LevelObject) -> Result<(), LevelError> {
        if !in_bounds(object.x, object.y) {
            return Err(LevelError::OutOfBounds {
                x: object.x,
                y: object.y,
            });
        }
        let slot = self
            .objects
            .iter_mut()
            .find(|o| o.id == object.id)
            .ok_or_else(|| LevelError::UnknownId(object.id.clone()))?;
        *slot = object;
        Ok(())
    }

    /// Shift the listed objects; nothing moves if any would leave the playfield
    pub fn move_many(&mut self, ids: &[String], dx: i32, dy: i32) -> Result<(), LevelError> {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if let Some(o) = self
            .objects
            .iter()
            .filter(|o| ids.contains(o.id.as_str()))
            .find(|o| shifted(o, dx, dy).is_none())
        {
            return Err(LevelError::OutOfBounds {
                x: o.x.saturating_add(dx),
                y: o.y.saturating_add(dy),
            });
        }
        for o in self.objects.iter_mut().filter(|o| ids.contains(o.id.as_str())) {
            o.x += dx;
            o.y += dy;
        }
        Ok(())
    }

    /// Copy the listed objects one column to the right; returns the new ids
    pub fn duplicate<R: Rng>(&mut self, rng: &mut R, ids: &[String]) -> Vec<String> {
        let copies: Vec<LevelObject> = self
            .objects
            .iter()
            .filter(|o| ids.contains(&o.id))
            .cloned()
            .collect();
        let mut new_ids = Vec::with_capacity(copies.len());
        for mut copy in copies {
            let Some(x) = copy.x.checked_add(1) else {
                log::debug!("Cannot duplicate '{}' past the last column", copy.id);
                continue;
            };
            copy.id = self.fresh_id(rng);
            copy.x = x;
            new_ids.push(copy.id.clone());
            self.objects.push(copy);
        }
        new_ids
    }

    /// Rotate a quarter turn clockwise
    pub fn rotate(&mut self, id: &str) -> Result<u16, LevelError> {
        let obj = self
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| LevelError::UnknownId(id.to_string()))?;
        obj.rotate_quarter();
        Ok(obj.rotation)
    }

    // === AI batches ===

    /// Column where the next generated batch starts
    pub fn next_batch_x(&self) -> i32 {
        self.max_x().unwrap_or(0).saturating_add(2)
    }

    /// Append a generated batch with fresh ids and zero rotation
    ///
    /// All-or-nothing: if any entry is out of bounds, nothing is added.
    pub fn merge_generated<R: Rng>(
        &mut self,
        rng: &mut R,
        batch: &[GeneratedObject],
    ) -> Result<usize, LevelError> {
        if let Some(bad) = batch.iter().find(|g| !in_bounds(g.x, g.y)) {
            log::warn!("Rejected generated batch: {} at ({}, {})", bad.kind, bad.x, bad.y);
            return Err(LevelError::OutOfBounds { x: bad.x, y: bad.y });
        }
        for g in batch {
            let id = self.fresh_id(rng);
            self.objects.push(LevelObject::new(id, g.kind, g.x, g.y));
        }
        log::info!("Merged {} generated object(s)", batch.len());
        Ok(batch.len())
    }

    /// Random base-36 id not already present
    pub fn fresh_id<R: Rng>(&self, rng: &mut R) -> String {
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
                .collect();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Short built-in level used when no document is supplied
    pub fn demo() -> Self {
        use ObjectKind::*;
        let layout: &[(ObjectKind, i32, i32)] = &[
            (Spike, 12, 0),
            (Block, 18, 0),
            (Block, 19, 0),
            (Block, 19, 1),
            (Spike, 20, 0),
            (Spike, 21, 0),
            (YellowPad, 25, 0),
            (Slab, 30, 2),
            (Slab, 31, 2),
            (Orb, 35, 3),
            (Spike, 35, 0),
            (Spike, 36, 0),
            (ShipPortal, 40, 2),
            (Block, 46, 0),
            (Block, 46, 11),
            (Block, 52, 1),
            (Block, 52, 10),
            (CubePortal, 58, 1),
            (SpeedX2, 60, 1),
            (Spike, 66, 0),
            (RedOrb, 70, 3),
            (Spike, 70, 0),
            (Spike, 71, 0),
            (Spike, 72, 0),
            (Portal, 80, 1),
        ];
        let objects = layout
            .iter()
            .enumerate()
            .map(|(i, &(kind, x, y))| LevelObject::new(format!("demo{i}"), kind, x, y))
            .collect();
        Self {
            metadata: LevelMetadata {
                name: "First Steps".to_string(),
                difficulty: Difficulty::Easy,
                ..LevelMetadata::default()
            },
            objects,
        }
    }
}

/// Target cell of `o` moved by `(dx, dy)`, if it stays placeable
fn shifted(o: &LevelObject, dx: i32, dy: i32) -> Option<(i32, i32)> {
    let x = o.x.checked_add(dx)?;
    let y = o.y.checked_add(dy)?;
    in_bounds(x, y).then_some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    fn level_with(objects: &[(&str, ObjectKind, i32, i32)]) -> LevelData {
        let mut level = LevelData::default();
        for &(id, kind, x, y) in objects {
            level.add(LevelObject::new(id, kind, x, y)).unwrap();
        }
        level
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = LevelMetadata::default();
        assert_eq!(meta.name, "New Level");
        assert_eq!(meta.difficulty, Difficulty::Normal);
        assert_eq!(meta.author, "Creator");
        assert_eq!(meta.speed, 1.0);
    }

    #[test]
    fn test_export_document_shape() {
        let level = level_with(&[("a", ObjectKind::Spike, 3, 0)]);
        let json = level.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["difficulty"], "Normal");
        assert_eq!(value["objects"][0]["type"], "SPIKE");
        assert_eq!(value["objects"][0]["x"], 3);
        assert!(json.contains('\n'), "export is pretty-printed");

        let back = LevelData::from_json(&json).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn test_import_tolerates_unknown_kinds_and_missing_rotation() {
        let json = r#"{"metadata":{"name":"x","difficulty":"Demon","author":"me","speed":2},
            "objects":[{"id":"1","type":"LAVA","x":1,"y":0},{"id":"2","type":"ORB","x":2,"y":3}]}"#;
        let level = LevelData::from_json(json).unwrap();
        assert_eq!(level.metadata.difficulty, Difficulty::Demon);
        assert_eq!(level.objects[0].kind, ObjectKind::Unknown);
        assert_eq!(level.objects[1].rotation, 0);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            LevelData::from_json("not json"),
            Err(LevelError::Json(_))
        ));
    }

    #[test]
    fn test_import_validates_cells_and_ids() {
        let row = r#"{"objects":[{"id":"a","type":"BLOCK","x":1,"y":2147483647}]}"#;
        assert!(matches!(
            LevelData::from_json(row),
            Err(LevelError::OutOfBounds { x: 1, y: i32::MAX })
        ));
        let twice = r#"{"objects":[{"id":"a","type":"BLOCK","x":1,"y":0},
            {"id":"a","type":"SPIKE","x":2,"y":0}]}"#;
        assert!(matches!(
            LevelData::from_json(twice),
            Err(LevelError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_import_reduces_rotation() {
        let json = r#"{"objects":[{"id":"a","type":"SPIKE","x":1,"y":0,"rotation":65535}]}"#;
        let mut level = LevelData::from_json(json).unwrap();
        assert_eq!(level.objects[0].rotation, 15);
        assert_eq!(level.rotate("a").unwrap(), 105);
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::from_str("INSANE"), Some(Difficulty::Insane));
        assert_eq!(Difficulty::from_str("demon").map(|d| d.as_str()), Some("Demon"));
        assert_eq!(Difficulty::from_str("extreme"), None);
    }

    #[test]
    fn test_export_file_name() {
        let mut level = LevelData::default();
        assert_eq!(level.export_file_name(), "new_level.json");
        level.metadata.name = "My   Cool\tLevel".to_string();
        assert_eq!(level.export_file_name(), "my_cool_level.json");
    }

    #[test]
    fn test_add_validates() {
        let mut level = level_with(&[("a", ObjectKind::Block, 0, 0)]);
        assert!(matches!(
            level.add(LevelObject::new("a", ObjectKind::Spike, 1, 0)),
            Err(LevelError::DuplicateId(_))
        ));
        assert!(matches!(
            level.add(LevelObject::new("b", ObjectKind::Spike, 1, 12)),
            Err(LevelError::OutOfBounds { x: 1, y: 12 })
        ));
        assert_eq!(level.objects.len(), 1);
    }

    #[test]
    fn test_place_replaces_occupant() {
        let mut level = level_with(&[("a", ObjectKind::Block, 4, 2)]);
        let id = level.place(&mut rng(), ObjectKind::Spike, 4, 2).unwrap();
        assert_eq!(level.objects.len(), 1);
        assert_eq!(level.object_at(4, 2).unwrap().id, id);
        assert_eq!(id.len(), ID_LEN);
    }

    #[test]
    fn test_remove_and_remove_many() {
        let mut level = level_with(&[
            ("a", ObjectKind::Block, 0, 0),
            ("b", ObjectKind::Block, 1, 0),
            ("c", ObjectKind::Block, 2, 0),
        ]);
        assert_eq!(level.remove("b").unwrap().x, 1);
        assert!(level.remove("b").is_none());
        let removed = level.remove_many(&["a".to_string(), "zzz".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(level.objects.len(), 1);
    }

    #[test]
    fn test_update() {
        let mut level = level_with(&[("a", ObjectKind::Block, 0, 0)]);
        let mut changed = level.get("a").unwrap().clone();
        changed.kind = ObjectKind::Slab;
        level.update(changed).unwrap();
        assert_eq!(level.get("a").unwrap().kind, ObjectKind::Slab);
        assert!(matches!(
            level.update(LevelObject::new("nope", ObjectKind::Block, 0, 0)),
            Err(LevelError::UnknownId(_))
        ));
    }

    #[test]
    fn test_move_many_is_atomic() {
        let mut level = level_with(&[
            ("a", ObjectKind::Block, 0, 0),
            ("b", ObjectKind::Block, 5, 10),
        ]);
        let ids = vec!["a".to_string(), "b".to_string()];
        level.move_many(&ids, 2, 1).unwrap();
        assert_eq!((level.get("a").unwrap().x, level.get("a").unwrap().y), (2, 1));

        // "b" would leave the top row
        assert!(level.move_many(&ids, 0, 1).is_err());
        assert_eq!(level.get("a").unwrap().y, 1);
        assert_eq!(level.get("b").unwrap().y, 11);
    }

    #[test]
    fn test_duplicate_shifts_right_with_fresh_ids() {
        let mut level = level_with(&[
            ("a", ObjectKind::Orb, 3, 4),
            ("b", ObjectKind::Spike, 4, 0),
        ]);
        let new_ids = level.duplicate(&mut rng(), &["a".to_string()]);
        assert_eq!(new_ids.len(), 1);
        let copy = level.get(&new_ids[0]).unwrap();
        assert_eq!((copy.kind, copy.x, copy.y), (ObjectKind::Orb, 4, 4));
        assert_ne!(copy.id, "a");
        assert_eq!(level.objects.len(), 3);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut level = level_with(&[("a", ObjectKind::Spike, 0, 0)]);
        for expected in [90, 180, 270, 0] {
            assert_eq!(level.rotate("a").unwrap(), expected);
        }
        assert!(level.rotate("missing").is_err());
    }

    #[test]
    fn test_select_in_box() {
        let level = level_with(&[
            ("a", ObjectKind::Block, 1, 1),
            ("b", ObjectKind::Block, 3, 3),
            ("c", ObjectKind::Block, 6, 1),
        ]);
        let mut picked = level.select_in_box((3, 0), (1, 3));
        picked.sort();
        assert_eq!(picked, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cell_at_rejects_outside() {
        assert_eq!(LevelData::cell_at(Vec2::new(85.0, 470.0)), Some((2, 0)));
        assert_eq!(LevelData::cell_at(Vec2::new(-5.0, 470.0)), None);
        assert_eq!(LevelData::cell_at(Vec2::new(5.0, -1.0)), None);
    }

    #[test]
    fn test_next_batch_x() {
        assert_eq!(LevelData::default().next_batch_x(), 2);
        let level = level_with(&[("a", ObjectKind::Block, 30, 0), ("b", ObjectKind::Block, 7, 0)]);
        assert_eq!(level.next_batch_x(), 32);
    }

    #[test]
    fn test_last_column_saturates() {
        let mut level = level_with(&[("far", ObjectKind::Block, i32::MAX, 0)]);
        assert!(level.course().end_x().is_finite());
        assert_eq!(level.next_batch_x(), i32::MAX);

        let ids = vec!["far".to_string()];
        assert!(matches!(
            level.move_many(&ids, 1, 0),
            Err(LevelError::OutOfBounds { x: i32::MAX, y: 0 })
        ));
        assert_eq!(level.objects[0].x, i32::MAX);
        assert!(level.duplicate(&mut rng(), &ids).is_empty());
        assert_eq!(level.objects.len(), 1);
    }

    #[test]
    fn test_rotate_survives_large_rotation() {
        let mut level = level_with(&[("a", ObjectKind::Spike, 0, 0)]);
        level.objects[0].rotation = u16::MAX;
        assert_eq!(level.rotate("a").unwrap(), 105);
    }

    #[test]
    fn test_merge_generated_assigns_ids() {
        let mut level = level_with(&[("a", ObjectKind::Block, 0, 0)]);
        let batch = vec![
            GeneratedObject::new(ObjectKind::Spike, 2, 0),
            GeneratedObject::new(ObjectKind::RedOrb, 4, 3),
        ];
        assert_eq!(level.merge_generated(&mut rng(), &batch).unwrap(), 2);
        assert_eq!(level.objects.len(), 3);
        let ids: HashSet<_> = level.objects.iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(level.objects.iter().all(|o| o.rotation == 0));
    }

    #[test]
    fn test_merge_generated_is_all_or_nothing() {
        let mut level = LevelData::default();
        let batch = vec![
            GeneratedObject::new(ObjectKind::Spike, 2, 0),
            GeneratedObject::new(ObjectKind::Block, 3, 14),
        ];
        assert!(level.merge_generated(&mut rng(), &batch).is_err());
        assert!(level.objects.is_empty());
    }

    #[test]
    fn test_demo_level_is_valid() {
        let demo = LevelData::demo();
        assert!(demo.objects.iter().all(|o| in_bounds(o.x, o.y)));
        assert!(demo.objects.iter().any(|o| o.kind == ObjectKind::Portal));
        let ids: HashSet<_> = demo.objects.iter().map(|o| &o.id).collect();
        assert_eq!(ids.len(), demo.objects.len());
    }
}
