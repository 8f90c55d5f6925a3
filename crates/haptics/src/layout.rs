//! Third Space vest cell layout.
//!
//! Hardware cell numbering:
//!
//! ```text
//!       FRONT                    BACK
//!   ┌─────┬─────┐          ┌─────┬─────┐
//!   │  2  │  5  │  Upper   │  1  │  6  │
//!   ├─────┼─────┤          ├─────┼─────┤
//!   │  3  │  4  │  Lower   │  0  │  7  │
//!   └─────┴─────┘          └─────┴─────┘
//!     L     R                L     R
//! ```

/// Number of actuator cells on the device.
pub const NUM_CELLS: u8 = 8;

/// Individual cells by physical position.
pub mod cell {
    pub const FRONT_UPPER_LEFT: u8 = 2;
    pub const FRONT_UPPER_RIGHT: u8 = 5;
    pub const FRONT_LOWER_LEFT: u8 = 3;
    pub const FRONT_LOWER_RIGHT: u8 = 4;

    pub const BACK_UPPER_LEFT: u8 = 1;
    pub const BACK_UPPER_RIGHT: u8 = 6;
    pub const BACK_LOWER_LEFT: u8 = 0;
    pub const BACK_LOWER_RIGHT: u8 = 7;
}

pub const FRONT_CELLS: [u8; 4] = [
    cell::FRONT_UPPER_LEFT,
    cell::FRONT_UPPER_RIGHT,
    cell::FRONT_LOWER_LEFT,
    cell::FRONT_LOWER_RIGHT,
];

pub const BACK_CELLS: [u8; 4] = [
    cell::BACK_UPPER_LEFT,
    cell::BACK_UPPER_RIGHT,
    cell::BACK_LOWER_LEFT,
    cell::BACK_LOWER_RIGHT,
];

pub const ALL_CELLS: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

pub const LEFT_SIDE: [u8; 4] = [
    cell::FRONT_UPPER_LEFT,
    cell::FRONT_LOWER_LEFT,
    cell::BACK_UPPER_LEFT,
    cell::BACK_LOWER_LEFT,
];

pub const RIGHT_SIDE: [u8; 4] = [
    cell::FRONT_UPPER_RIGHT,
    cell::FRONT_LOWER_RIGHT,
    cell::BACK_UPPER_RIGHT,
    cell::BACK_LOWER_RIGHT,
];

pub const UPPER_CELLS: [u8; 4] = [
    cell::FRONT_UPPER_LEFT,
    cell::FRONT_UPPER_RIGHT,
    cell::BACK_UPPER_LEFT,
    cell::BACK_UPPER_RIGHT,
];

pub const LOWER_CELLS: [u8; 4] = [
    cell::FRONT_LOWER_LEFT,
    cell::FRONT_LOWER_RIGHT,
    cell::BACK_LOWER_LEFT,
    cell::BACK_LOWER_RIGHT,
];

/// Shoulder-level pairs, used for recoil and pickup feedback.
pub const FRONT_UPPER: [u8; 2] = [cell::FRONT_UPPER_LEFT, cell::FRONT_UPPER_RIGHT];
pub const BACK_UPPER: [u8; 2] = [cell::BACK_UPPER_LEFT, cell::BACK_UPPER_RIGHT];
