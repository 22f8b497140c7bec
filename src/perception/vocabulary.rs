// src/perception/vocabulary.rs

//! Closed vocabulary of items the robot can be asked about. Landmark items
//! mark survey sites; treasure items are what the operator's clue singles
//! out. Labels outside the vocabulary are tolerated but never chosen as a
//! mission target.

/// Sentinel label for "nothing recognized". Never a real item.
pub const UNKNOWN_ITEM: &str = "unknown";

/// Items that mark survey sites.
pub const LANDMARK_ITEMS: [&str; 8] = [
    "coral",
    "coin",
    "compass",
    "fossil",
    "key",
    "letter",
    "shell",
    "treasure_box",
];

/// Items the operator's clue can designate as the mission target.
pub const TREASURE_ITEMS: [&str; 3] = ["crystal", "diamond", "emerald"];

/// Classification of a known item label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    /// A site-marking item.
    Landmark,
    /// A mission-target item.
    Treasure,
}

/// Classifies `label`, or `None` for labels outside the vocabulary
/// (the unknown sentinel included).
pub fn classify(label: &str) -> Option<ItemClass> {
    if LANDMARK_ITEMS.contains(&label) {
        Some(ItemClass::Landmark)
    } else if TREASURE_ITEMS.contains(&label) {
        Some(ItemClass::Treasure)
    } else {
        None
    }
}

/// True when `label` names a treasure item.
pub fn is_treasure(label: &str) -> bool {
    classify(label) == Some(ItemClass::Treasure)
}

/// True when `label` is in the closed vocabulary.
pub fn is_known(label: &str) -> bool {
    classify(label).is_some()
}
