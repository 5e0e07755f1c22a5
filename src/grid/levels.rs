//! Built-in 32x32 drainage puzzles.

use super::Grid;
use crate::error::{SimError, SimResult};

/// Level names, in index order
pub const NAMES: [&str; 4] = ["split-chamber", "nested-spiral", "pillared-floor", "open-ceiling"];

pub const COUNT: usize = NAMES.len();

/// Map text of a built-in level
pub fn source(index: usize) -> Option<&'static str> {
    match index {
        0 => Some(SPLIT_CHAMBER),
        1 => Some(NESTED_SPIRAL),
        2 => Some(PILLARED_FLOOR),
        3 => Some(OPEN_CEILING),
        _ => None,
    }
}

pub fn load(index: usize) -> SimResult<Grid> {
    let text = source(index).ok_or(SimError::UnknownLevel {
        index,
        available: COUNT,
    })?;
    Grid::from_ascii(text)
}

/// Index of a level by name
pub fn find(name: &str) -> Option<usize> {
    NAMES.iter().position(|n| *n == name)
}

const SPLIT_CHAMBER: &str = "\
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwooooooowwwwoo
oowwwwwwwwwwwwwwwwwooooooowwwwoo
oowwwwwwwwwwwwwwwwwoowwwwwwwwwoo
oowwwwwwwwwwwwwwwwwoowwwwwwwwwoo
oowwwwwwwwwwwwwwwwwoowwwwwwwwwoo
oowwwwwwwwwwwwwwwwwoowwwwwwwwwoo
oowwwwwwwwwwwwwwwwwooooooooooooo
oowwwwwwwwwwwwwwwwwooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwooooooowwwwwwwwwwwwwwoo
oowwwwwwwooooooowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oowwwwwwwwwwwwoowwwwwwwwwwwwwwoo
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
";

const NESTED_SPIRAL: &str = "\
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwoooooooooooooooooooooowwwoo
oowwwoooooooooooooooooooooowwwoo
oowwwoowwwwwwwwwwwwwwwwwwoowwwoo
oowwwoowwwwwwwwwwwwwwwwwwoowwwoo
oowwwoowwwwwwwwwwwwwwwwwwoowwwoo
oowwwoowwwwooooooooooowwwoowwwoo
oowwwoowwwwooooooooooowwwoowwwoo
oowwwoowwwwoowwwwwwwoowwwoowwwoo
oowwwoowwwwoowwwwwwwoowwwoowwwoo
oowwwoowwwwoowwwwwwwoowwwoowwwoo
oowwwoowwwwoowwwoooooowwwoowwwoo
oowwwoowwwwoowwwoooooowwwoowwwoo
oowwwoowwwwoowwwwwwwwwwwwoowwwoo
oowwwoowwwwoowwwwwwwwwwwwoowwwoo
oowwwoowwwwoowwwwwwwwwwwwoowwwoo
oowwwoowwwwoooooooooooooooowwwoo
oowwwoowwwwoooooooooooooooowwwoo
oowwwoowwwwwwwwwwwwwwwwwwwwwwwoo
oowwwoowwwwwwwwwwwwwwwwwwwwwwwoo
oowwwoowwwwwwwwwwwwwwwwwwwwwwwoo
oowwwooooooooooooooooooooooooooo
oowwwooooooooooooooooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oowwwwwwwwwwwwwwwwwwwwwwwwwwww..
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
";

const PILLARED_FLOOR: &str = "\
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwoowwwoo
oowwwwwwwwwwwwwwwwwwwwwwwoowwwoo
oowwwwwwwwwwwwwwwwwwwwwwwooooooo
oowwwwwwwwwwwwwwwwwwwwwwwooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwoowwwwwwoowwwwwwwwwwwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoowwwwwwoowwwwwwwoowwwwwwwoo
oowwoooooooooowwwwwwwoowwwwwwwoo
oowwoooooooooowwwwwwwoowwwwwwwoo
oowwwwwwwwwwwwwwwwwwwoowwwwwwwoo
oowwwwwwwwwwwwwwwwwwwoowwwwwwwoo
oowwwwwwwwwwwwwwwwwwwoowwwwwwwoo
oowwwwwwwoowwwwwwwwwwoowwwwwwwoo
oowwwwwwwoowwwwwwwwwwooooooooooo
oowwwwwwwoowwwwwwwwwwooooooooooo
oowwwwwwwoowwwwwwwwwwwwwwwwwwwoo
oowwwwwwwoowwwwwwwwwwwwwwwwwwwoo
oowwwwwwwoowwwwwwwwwwwwwwwwwwwoo
oowwwwwwwoowwwwwwwwwwwwwwwwwwwoo
ooooooooooooo......ooooooooooooo
ooooooooooooo......ooooooooooooo
";

const OPEN_CEILING: &str = "\
ooooooooooooo......ooooooooooooo
ooooooooooooo......ooooooooooooo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwoooooooooooooooowwwwwwoo
oowwwwwwoooooooooooooooowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwoowwwwwwwwwwwwoowwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oowwwwwwwwwwwwwwwwwwwwwwwwwwwwoo
oooooooooooooooooooooooooooooooo
oooooooooooooooooooooooooooooooo
";
