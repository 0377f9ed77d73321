//! Turning a die roll into a path across the board.
//!
//! A move always runs in a straight line: the player picks one of the open
//! directions at the start cell and the token keeps going that way. If the
//! next step would leave the board the token stops where it is and the rest
//! of the roll is lost.

use crate::board::Board;
use crate::hex::{HexCoord, HexDirection};
use crate::prompt::Prompt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("Center cell {0} has no neighbors on the board; check the board radius")]
    IsolatedCenter(HexCoord),
}

/// Result of a straight-line move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearMove {
    pub start: HexCoord,
    pub end: HexCoord,
    /// None when there was nowhere to go
    pub direction: Option<HexDirection>,
    pub steps_taken: u32,
    /// The edge of the board cut the move short
    pub blocked: bool,
}

/// Result of an attempt to land exactly on the center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactMove {
    pub matched: bool,
    pub end: HexCoord,
    /// Roll that would have been needed
    pub needed: u32,
}

/// Directions from `coord` whose first step stays on the board, clockwise
/// from North
pub fn open_directions(board: &Board, coord: &HexCoord) -> Vec<(HexDirection, HexCoord)> {
    if !board.contains(coord) {
        return Vec::new();
    }
    HexDirection::ALL
        .into_iter()
        .map(|dir| (dir, coord.neighbor(dir)))
        .filter(|(_, next)| board.contains(next))
        .collect()
}

/// Walk `steps` cells from `start` in a fixed direction, stopping at the edge
pub fn walk(board: &Board, start: HexCoord, direction: HexDirection, steps: u32) -> LinearMove {
    let mut position = start;
    let mut steps_taken = 0;
    let mut blocked = false;

    for _ in 0..steps {
        let next = position.neighbor(direction);
        if !board.contains(&next) {
            blocked = true;
            break;
        }
        position = next;
        steps_taken += 1;
    }

    LinearMove {
        start,
        end: position,
        direction: Some(direction),
        steps_taken,
        blocked,
    }
}

/// Ask the player for a direction, then walk `steps` cells that way.
pub fn resolve_linear_move(
    board: &Board,
    start: HexCoord,
    steps: u32,
    prompt: &mut dyn Prompt,
) -> LinearMove {
    let options = open_directions(board, &start);
    if options.is_empty() || steps == 0 {
        return LinearMove {
            start,
            end: start,
            direction: None,
            steps_taken: 0,
            blocked: false,
        };
    }

    let labels: Vec<String> = options
        .iter()
        .map(|(dir, next)| format!("{} towards {}", dir.label(), next))
        .collect();
    let choice = prompt
        .choose_one(&format!("Choose a direction to move {steps} steps"), &labels)
        .min(options.len() - 1);

    walk(board, start, options[choice].0, steps)
}

/// A complete-pie player may only reach the center with an exact roll.
/// On any other roll the player stays put.
pub fn resolve_exact_move_to_center(board: &Board, start: HexCoord, steps: u32) -> ExactMove {
    let needed = board.distance_to_center(&start);
    if steps == needed {
        ExactMove {
            matched: true,
            end: board.center(),
            needed,
        }
    } else {
        ExactMove {
            matched: false,
            end: start,
            needed,
        }
    }
}

/// Leave the center: the first step is the chosen neighbor, then `steps - 1`
/// more in the same direction.
pub fn exit_center(
    board: &Board,
    steps: u32,
    prompt: &mut dyn Prompt,
) -> Result<LinearMove, MovementError> {
    let center = board.center();
    if open_directions(board, &center).is_empty() {
        return Err(MovementError::IsolatedCenter(center));
    }
    Ok(resolve_linear_move(board, center, steps, prompt))
}
