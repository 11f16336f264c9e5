//! Built-in demo warehouse.
//!
//! Two picking aisles (x = 0 and x = 8) run north from a cross corridor at
//! z = 0 and meet again at z = 10. Shelf A faces the west aisle, shelf B the
//! east one; C and D exist in the shelf registry but hold no items.
//!
//! ```text
//!  z=10   2 ----- 4 ----- 7
//!         |               |
//!  z=5    1    [racks]    6
//!         |               |
//!  z=0    0 ----- 3 ----- 5
//!        x=0     x=4     x=8
//! ```

use pickar_core::Vec3;
use pickar_job::{AisleEntry, Inventory, Item, ItemId, Shelf};
use pickar_nav::{NodeId, Result, WaypointGraph};

/// Where the picker stands at startup.
pub const START: Vec3 = Vec3::new(0.0, 0.0, -1.0);

const WAYPOINTS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 5.0],
    [0.0, 0.0, 10.0],
    [4.0, 0.0, 0.0],
    [4.0, 0.0, 10.0],
    [8.0, 0.0, 0.0],
    [8.0, 0.0, 5.0],
    [8.0, 0.0, 10.0],
];

const EDGES: [(NodeId, NodeId); 8] = [
    (0, 1),
    (1, 2),
    (0, 3),
    (3, 5),
    (2, 4),
    (4, 7),
    (5, 6),
    (6, 7),
];

const SHELF_COLUMNS: i32 = 5;
const SHELF_ROWS: i32 = 4;

/// (id, shelf, column, row)
const ITEMS: [(u32, &str, u32, u32); 6] = [
    (0, "A", 1, 1),
    (1, "A", 3, 2),
    (2, "A", 4, 4),
    (3, "B", 2, 3),
    (4, "B", 3, 4),
    (5, "B", 5, 2),
];

pub fn graph() -> Result<WaypointGraph> {
    let positions: Vec<Vec3> = WAYPOINTS.iter().copied().map(Vec3::from).collect();
    WaypointGraph::build(&positions, &EDGES)
}

/// World position of a shelf slot. Columns run north along the aisle, two
/// metres apart; rows stack upwards.
fn slot_position(shelf: &str, column: u32, row: u32) -> Vec3 {
    let x = match shelf {
        "A" => -1.0,
        "B" => 9.0,
        "C" => 3.0,
        _ => 5.0,
    };
    let z = 2.0 * (column as f32 - 1.0) + 1.0;
    let y = 0.4 * row as f32;
    Vec3::new(x, y, z)
}

pub fn inventory() -> Inventory {
    let mut inventory = Inventory::new();
    for (name, mirrored) in [("A", false), ("B", true), ("C", false), ("D", true)] {
        inventory.add_shelf(name, Shelf::new(SHELF_COLUMNS, SHELF_ROWS, mirrored));
    }
    for (id, shelf, column, row) in ITEMS {
        let position = slot_position(shelf, column, row);
        inventory.add_item(Item::new(id, position, AisleEntry::new(shelf, column, row)));
    }
    inventory
}

/// Every stocked item, in id order.
pub fn default_job() -> Vec<ItemId> {
    ITEMS.iter().map(|&(id, ..)| ItemId(id)).collect()
}
