//! Worktable layout, slot allocation and the labware inventory

pub mod allocator;
pub mod inventory;
pub mod layout;

pub use allocator::{
    boxes_needed, count_tips, fold_trough_position, registered_labware, WorktableAllocator,
    WorktableSlotMap, TIPS_PER_DISTRIBUTION,
};
pub use inventory::{LabwareInventory, LabwareInventoryEntry};
pub use layout::{TargetLocation, WorktableLayout};
