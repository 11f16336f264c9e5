//! Pickable items and where they live in the warehouse.

use std::collections::BTreeMap;
use std::fmt;

use pickar_core::{Point, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{JobError, Result};

/// Identifier of an inventory item, as encoded on its barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of an item on a shelf. Column and row are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AisleEntry {
    pub shelf: String,
    pub column: u32,
    pub row: u32,
}

impl AisleEntry {
    pub fn new(shelf: impl Into<String>, column: u32, row: u32) -> Self {
        Self {
            shelf: shelf.into(),
            column,
            row,
        }
    }
}

/// Shelf and column, the label shown to the picker (e.g. `A3`).
impl fmt::Display for AisleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.shelf, self.column)
    }
}

/// Layout data for one shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    /// Columns by rows.
    pub dimensions: Point,
    /// Whether the shelf is displayed mirrored.
    pub mirrored: bool,
}

impl Shelf {
    pub fn new(columns: i32, rows: i32, mirrored: bool) -> Self {
        Self {
            dimensions: Point::new(columns, rows),
            mirrored,
        }
    }

    /// Whether the entry's slot exists on this shelf.
    pub fn holds(&self, entry: &AisleEntry) -> bool {
        let slot = Point::new(entry.column as i32 - 1, entry.row as i32 - 1);
        self.dimensions.bounds(slot)
    }
}

/// A static point of interest that can be picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub position: Vec3,
    pub aisle: AisleEntry,
}

impl Item {
    pub fn new(id: u32, position: Vec3, aisle: AisleEntry) -> Self {
        Self {
            id: ItemId(id),
            position,
            aisle,
        }
    }
}

/// Item and shelf registry.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: BTreeMap<ItemId, Item>,
    shelves: BTreeMap<String, Shelf>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item, replacing any previous item with the same id.
    pub fn add_item(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id, item)
    }

    pub fn add_shelf(&mut self, name: impl Into<String>, shelf: Shelf) -> Option<Shelf> {
        self.shelves.insert(name.into(), shelf)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn shelf(&self, name: &str) -> Option<&Shelf> {
        self.shelves.get(name)
    }

    /// Shelf label for an item, e.g. `B5`.
    pub fn aisle_label(&self, id: ItemId) -> Option<String> {
        self.item(id).map(|item| item.aisle.to_string())
    }

    /// Items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up several items at once, failing on the first unknown id.
    pub fn resolve(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        ids.iter()
            .map(|&id| self.item(id).cloned().ok_or(JobError::UnknownItem(id)))
            .collect()
    }

    /// Items whose aisle entry does not fit their shelf, or whose shelf is
    /// not registered.
    pub fn misplaced(&self) -> Vec<ItemId> {
        self.items
            .values()
            .filter(|item| {
                self.shelf(&item.aisle.shelf)
                    .is_none_or(|shelf| !shelf.holds(&item.aisle))
            })
            .map(|item| item.id)
            .collect()
    }
}
