//! Haptic vest geometry and the event-to-command mapping engine.
//!
//! [`map_event`] is pure and deterministic: the same [`GameEvent`] always
//! yields the same commands. Directional events are bucketed onto the vest
//! through a total partition of the circle; magnitudes go through a
//! monotonic, saturating intensity curve. Event types with no table entry
//! map to nothing; a mapping gap is not an error.

mod command;
mod layout;
mod mapper;

pub use command::{
    DEFAULT_PULSE_MS, HapticCommand, MAX_DURATION_MS, MAX_INTENSITY, MIN_DURATION_MS,
};
pub use layout::{
    ALL_CELLS, BACK_CELLS, BACK_UPPER, FRONT_CELLS, FRONT_UPPER, LEFT_SIDE, LOWER_CELLS,
    NUM_CELLS, RIGHT_SIDE, UPPER_CELLS, cell,
};
pub use mapper::{
    Quadrant, damage_cells, damage_intensity, directional_bucket, directional_cells, map_event,
    quadrant_cells,
};
