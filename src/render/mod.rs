//! Text rendering of grid state for headless inspection
//!
//! This module is READ-ONLY - it never modifies simulation state.

pub mod glyphs;

use crate::simulation::state::GridState;

/// One line per row: agents as heading arrows, other cells shaded by pheromone
pub fn text_frame(state: &GridState) -> String {
    let mut out = String::with_capacity(state.rows() * (state.cols() + 1));
    for cell in state.occupied.cells() {
        let glyph = match state.agent_heading(cell) {
            Some(heading) => glyphs::heading_glyph(heading),
            None => glyphs::pheromone_glyph(*state.pheromone.get(cell)),
        };
        out.push(glyph);
        if cell.col + 1 == state.cols() {
            out.push('\n');
        }
    }
    out
}
