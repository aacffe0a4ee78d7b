//! Directional navigation over the irregular slot grid.
//!
//! The thirteen slots (eleven fighters plus the locked and random slots) sit
//! in five fixed rows of uneven width. Navigation works on this row table,
//! never on screen geometry.

use serde::{Deserialize, Serialize};

use crate::state::SLOT_COUNT;

pub const SLOT_ROWS: [&[usize]; 5] = [&[0, 1, 2], &[3, 4], &[5, 6, 7], &[8, 9], &[10, 11, 12]];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavTarget {
    pub slot: usize,
    pub sticky_col: usize,
}

/// Row and column of a slot in the row table.
pub fn slot_position(slot: usize) -> (usize, usize) {
    for (row_idx, row) in SLOT_ROWS.iter().enumerate() {
        if let Some(col) = row.iter().position(|&s| s == slot) {
            return (row_idx, col);
        }
    }
    (0, 0)
}

/// Compute the next slot to focus, or `None` when no enabled slot is
/// reachable in that direction.
///
/// Horizontal moves stay inside the current row and wrap circularly within
/// it; the landing column becomes the new sticky column. Vertical moves scan
/// the other rows circularly in the requested direction, starting each
/// candidate row at the sticky column (clamped to the row width) and walking
/// forward to the row end only; the sticky column is left untouched.
pub fn move_from(
    from: usize,
    sticky_col: usize,
    direction: NavDirection,
    disabled: &dyn Fn(usize) -> bool,
) -> Option<NavTarget> {
    let (row_idx, col) = slot_position(from);
    match direction {
        NavDirection::Left => move_horizontal(row_idx, col, -1, disabled),
        NavDirection::Right => move_horizontal(row_idx, col, 1, disabled),
        NavDirection::Up => move_vertical(row_idx, sticky_col, -1, disabled),
        NavDirection::Down => move_vertical(row_idx, sticky_col, 1, disabled),
    }
}

fn move_horizontal(
    row_idx: usize,
    col: usize,
    delta: isize,
    disabled: &dyn Fn(usize) -> bool,
) -> Option<NavTarget> {
    let row = SLOT_ROWS[row_idx];
    let len = row.len() as isize;
    for step in 1..len {
        let next_col = (col as isize + delta * step).rem_euclid(len) as usize;
        let slot = row[next_col];
        if !disabled(slot) {
            return Some(NavTarget {
                slot,
                sticky_col: next_col,
            });
        }
    }
    None
}

fn move_vertical(
    row_idx: usize,
    sticky_col: usize,
    delta: isize,
    disabled: &dyn Fn(usize) -> bool,
) -> Option<NavTarget> {
    let row_count = SLOT_ROWS.len() as isize;
    for step in 1..row_count {
        let next_row = (row_idx as isize + delta * step).rem_euclid(row_count) as usize;
        let row = SLOT_ROWS[next_row];
        let start = sticky_col.min(row.len() - 1);
        for &slot in &row[start..] {
            if !disabled(slot) {
                return Some(NavTarget {
                    slot,
                    sticky_col,
                });
            }
        }
    }
    None
}

/// Where focus lands when navigation starts with focus outside the grid:
/// the configured slot if enabled, otherwise the first enabled slot in slot
/// order.
pub fn entry_slot(initial: Option<usize>, disabled: &dyn Fn(usize) -> bool) -> Option<usize> {
    if let Some(slot) = initial {
        if slot < SLOT_COUNT && !disabled(slot) {
            return Some(slot);
        }
    }
    (0..SLOT_COUNT).find(|&slot| !disabled(slot))
}
