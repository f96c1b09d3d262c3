//! Glyph definitions for cell layers

use crate::core::types::{Heading, PHEROMONE_MAX};

/// Glyph for an empty cell with no pheromone
pub const BACKGROUND: char = '.';

/// Pheromone shading, lightest to strongest
const PHEROMONE_SHADES: [char; 4] = ['-', '+', '*', '#'];

/// Arrow pointing along a heading (0° = right, 90° = down)
pub fn heading_glyph(heading: Heading) -> char {
    match heading.index() {
        0 => '>',
        1 => '\\',
        2 => 'v',
        3 => '/',
        4 => '<',
        5 => '`',
        6 => '^',
        _ => '\'',
    }
}

/// Shade for a pheromone level; overshoot renders as the strongest shade
pub fn pheromone_glyph(level: i32) -> char {
    if level <= 0 {
        return BACKGROUND;
    }
    let level = level.min(PHEROMONE_MAX) as usize;
    let index = (level * PHEROMONE_SHADES.len()).div_ceil(PHEROMONE_MAX as usize) - 1;
    PHEROMONE_SHADES[index]
}
