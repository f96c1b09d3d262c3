//! The four update rules and agent placement
//!
//! Each rule reads the previous layer values and writes a fresh buffer, so the
//! result never depends on how far through the scan a cell was rewritten. Scans
//! are row-major; random draws happen in scan order, which is what makes a
//! seeded run reproducible.

use crate::core::types::{
    Cell, Heading, Turn, FADING_SIGNAL, FRESH_SIGNAL, PHEROMONE_MAX, PHEROMONE_STEP, SEED_SIGNAL,
};
use crate::simulation::random::RandomSource;
use crate::simulation::state::GridState;
use crate::spatial::grid::Grid;

/// Pick a turn from the pheromone levels ahead-left, straight ahead and ahead-right.
///
/// A unique maximum wins outright. Ties for the maximum are broken uniformly
/// among the tied options only; a three-way tie picks among all three.
pub fn choose_turn(left: i32, straight: i32, right: i32, rng: &mut impl RandomSource) -> Turn {
    if left == straight && left == right {
        Turn::ALL[rng.below(3)]
    } else if left == straight && left > right {
        [Turn::Left, Turn::Straight][rng.below(2)]
    } else if left == right && left > straight {
        [Turn::Left, Turn::Right][rng.below(2)]
    } else if straight == right && straight > left {
        [Turn::Straight, Turn::Right][rng.below(2)]
    } else if left > straight && left > right {
        Turn::Left
    } else if straight > right {
        Turn::Straight
    } else {
        Turn::Right
    }
}

/// Pheromone at the three cells ahead of an agent: [left, straight, right]
pub fn forward_levels(state: &GridState, cell: Cell, heading: Heading) -> [i32; 3] {
    Turn::ALL.map(|turn| {
        let sensed = state.pheromone.offset(cell, heading.turn(turn).offset());
        *state.pheromone.get(sensed)
    })
}

/// Clear the grid and place `population` agents on distinct random cells.
///
/// Cells are drawn without replacement (partial Fisher-Yates over cell indices).
/// Headings are then assigned in row-major order. Each agent starts on a strong
/// signal and a saturated pheromone patch. The caller has already checked that
/// `population` fits on the grid.
pub fn populate(state: &mut GridState, population: usize, rng: &mut impl RandomSource) {
    state.clear();

    let mut cells: Vec<Cell> = state.occupied.cells().collect();
    debug_assert!(population <= cells.len());
    for i in 0..population {
        let j = i + rng.below(cells.len() - i);
        cells.swap(i, j);
        state.occupied.set(cells[i], true);
    }

    let agents: Vec<Cell> = state.agents().collect();
    for cell in agents {
        state.direction.set(cell, Heading::from_index(rng.below(8)));
        state.signal.set(cell, SEED_SIGNAL);
        state.pheromone.set(cell, PHEROMONE_MAX);
    }
}

/// Turn every agent toward the strongest pheromone ahead of it
pub fn update_directions(state: &mut GridState, rng: &mut impl RandomSource) {
    let mut direction = state.direction.clone();

    let agents: Vec<Cell> = state.agents().collect();
    for cell in agents {
        let heading = *state.direction.get(cell);
        let [left, straight, right] = forward_levels(state, cell, heading);
        let turn = choose_turn(left, straight, right, rng);
        direction.set(cell, heading.turn(turn));
    }

    state.direction = direction;
}

/// Decay the pheromone field, then reinforce it from the signal layer.
///
/// Decay clamps each cell to `PHEROMONE_MAX` and removes one unit (floor 0).
/// A fading signal (1) adds `PHEROMONE_STEP` to its 8 neighbors without clamping;
/// overshoot is corrected by the next decay. A fresh signal (2) saturates its own
/// cell. Reinforcement applies in row-major order, so a later neighbor's addition
/// lands on top of an earlier saturation.
pub fn update_pheromones(state: &mut GridState) {
    let mut pheromone = state.pheromone.clone();
    for level in pheromone.iter_mut() {
        *level = (*level).min(PHEROMONE_MAX);
        if *level > 0 {
            *level -= 1;
        }
    }

    for cell in state.signal.cells() {
        match *state.signal.get(cell) {
            FADING_SIGNAL => {
                let neighbors: Vec<Cell> = pheromone.neighbors(cell).collect();
                for neighbor in neighbors {
                    *pheromone.get_mut(neighbor) += PHEROMONE_STEP;
                }
            }
            FRESH_SIGNAL => pheromone.set(cell, PHEROMONE_MAX),
            _ => {}
        }
    }

    state.pheromone = pheromone;
}

/// Advance every agent one cell along its heading.
///
/// Agents are scanned in row-major order into an empty grid. An agent whose
/// target is already taken stays on its own cell. If an earlier agent has
/// already moved onto that cell, the earlier agent is sent back to where it came
/// from, and so on down the chain. Headings travel with their agent.
pub fn update_positions(state: &mut GridState) {
    let movers: Vec<(Cell, Heading)> = state
        .agents()
        .map(|cell| (cell, *state.direction.get(cell)))
        .collect();

    let mut occupant: Grid<Option<usize>> = Grid::new(state.rows(), state.cols());
    for (id, &(origin, heading)) in movers.iter().enumerate() {
        let target = occupant.offset(origin, heading.offset());
        if occupant.get(target).is_none() {
            occupant.set(target, Some(id));
        } else {
            send_home(&mut occupant, &movers, id);
        }
    }

    let mut occupied = Grid::new(state.rows(), state.cols());
    let mut direction = Grid::new(state.rows(), state.cols());
    for cell in occupant.cells() {
        if let Some(id) = *occupant.get(cell) {
            occupied.set(cell, true);
            direction.set(cell, movers[id].1);
        }
    }

    state.occupied = occupied;
    state.direction = direction;
}

/// Put `id` back on its origin, bouncing whoever moved there back to theirs
fn send_home(occupant: &mut Grid<Option<usize>>, movers: &[(Cell, Heading)], id: usize) {
    let mut current = id;
    while let Some(displaced) = occupant.get_mut(movers[current].0).replace(current) {
        current = displaced;
    }
}

/// Age every signal by one, then mark each occupied cell with a fresh signal
pub fn update_signals(state: &mut GridState) {
    let mut signal = state.signal.clone();
    for cell in signal.cells() {
        let level = signal.get_mut(cell);
        if *level > 0 {
            *level -= 1;
        }
        if state.is_occupied(cell) {
            *level = FRESH_SIGNAL;
        }
    }
    state.signal = signal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::SeededRandom;
    use std::collections::VecDeque;

    /// Replays a fixed list of draws
    struct Scripted(VecDeque<usize>);

    impl Scripted {
        fn new(draws: &[usize]) -> Self {
            Self(draws.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn below(&mut self, n: usize) -> usize {
            let draw = self.0.pop_front().expect("script exhausted");
            assert!(draw < n, "scripted draw {} out of range {}", draw, n);
            draw
        }
    }

    /// Fails the test if any draw is requested
    struct NoDraws;

    impl RandomSource for NoDraws {
        fn below(&mut self, _n: usize) -> usize {
            panic!("unexpected random draw");
        }
    }

    fn small_state() -> GridState {
        GridState::with_dimensions(5, 5, 1, 500)
    }

    #[test]
    fn test_choose_turn_unique_max_is_deterministic() {
        assert_eq!(choose_turn(3, 1, 0, &mut NoDraws), Turn::Left);
        assert_eq!(choose_turn(0, 4, 2, &mut NoDraws), Turn::Straight);
        assert_eq!(choose_turn(1, 1, 2, &mut NoDraws), Turn::Right);
        assert_eq!(choose_turn(2, 0, 0, &mut NoDraws), Turn::Left);
    }

    #[test]
    fn test_choose_turn_three_way_tie() {
        assert_eq!(choose_turn(2, 2, 2, &mut Scripted::new(&[0])), Turn::Left);
        assert_eq!(choose_turn(2, 2, 2, &mut Scripted::new(&[1])), Turn::Straight);
        assert_eq!(choose_turn(2, 2, 2, &mut Scripted::new(&[2])), Turn::Right);
    }

    #[test]
    fn test_choose_turn_two_way_ties_exclude_third() {
        assert_eq!(choose_turn(3, 3, 1, &mut Scripted::new(&[0])), Turn::Left);
        assert_eq!(choose_turn(3, 3, 1, &mut Scripted::new(&[1])), Turn::Straight);
        assert_eq!(choose_turn(3, 1, 3, &mut Scripted::new(&[0])), Turn::Left);
        assert_eq!(choose_turn(3, 1, 3, &mut Scripted::new(&[1])), Turn::Right);
        assert_eq!(choose_turn(0, 2, 2, &mut Scripted::new(&[0])), Turn::Straight);
        assert_eq!(choose_turn(0, 2, 2, &mut Scripted::new(&[1])), Turn::Right);
    }

    #[test]
    fn test_choose_turn_tie_below_max_is_not_random() {
        assert_eq!(choose_turn(1, 1, 4, &mut NoDraws), Turn::Right);
        assert_eq!(choose_turn(4, 1, 1, &mut NoDraws), Turn::Left);
        assert_eq!(choose_turn(1, 4, 1, &mut NoDraws), Turn::Straight);
    }

    #[test]
    fn test_forward_levels_rotate_with_heading() {
        let mut state = small_state();
        let center = Cell::new(2, 2);
        // heading 90 (down): left sensor is 45 (down-right), right sensor is 135 (down-left)
        state.pheromone.set(Cell::new(3, 3), 1);
        state.pheromone.set(Cell::new(3, 2), 2);
        state.pheromone.set(Cell::new(3, 1), 3);
        assert_eq!(forward_levels(&state, center, Heading::from_index(2)), [1, 2, 3]);
    }

    #[test]
    fn test_update_directions_climbs_gradient() {
        let mut state = small_state();
        let cell = Cell::new(2, 2);
        state.place_agent(cell, Heading::from_index(0));
        state.pheromone.set(Cell::new(3, 3), 4);

        update_directions(&mut state, &mut NoDraws);

        assert_eq!(state.agent_heading(cell), Some(Heading::from_index(1)));
    }

    #[test]
    fn test_update_directions_wraps_heading() {
        let mut state = small_state();
        let cell = Cell::new(0, 0);
        state.place_agent(cell, Heading::from_index(0));
        // left of heading 0 is 315: (-1, +1) wraps to (4, 1)
        state.pheromone.set(Cell::new(4, 1), 4);

        update_directions(&mut state, &mut NoDraws);

        assert_eq!(state.agent_heading(cell).map(Heading::degrees), Some(315));
    }

    #[test]
    fn test_pheromone_decay_clamps_then_decrements() {
        let mut state = small_state();
        state.pheromone.set(Cell::new(0, 0), 9);
        state.pheromone.set(Cell::new(0, 1), 1);
        state.pheromone.set(Cell::new(0, 2), 0);

        update_pheromones(&mut state);

        assert_eq!(*state.pheromone.get(Cell::new(0, 0)), PHEROMONE_MAX - 1);
        assert_eq!(*state.pheromone.get(Cell::new(0, 1)), 0);
        assert_eq!(*state.pheromone.get(Cell::new(0, 2)), 0);
    }

    #[test]
    fn test_fading_signal_reinforces_neighbors_not_self() {
        let mut state = small_state();
        let source = Cell::new(0, 0);
        state.signal.set(source, FADING_SIGNAL);

        update_pheromones(&mut state);

        assert_eq!(*state.pheromone.get(source), 0);
        for neighbor in state.pheromone.neighbors(source).collect::<Vec<_>>() {
            assert_eq!(*state.pheromone.get(neighbor), PHEROMONE_STEP);
        }
        assert_eq!(state.pheromone_total(), 8 * PHEROMONE_STEP as i64);
    }

    #[test]
    fn test_reinforcement_overshoot_survives_one_step() {
        let mut state = small_state();
        // (1, 1) neighbors both sources
        state.signal.set(Cell::new(0, 0), FADING_SIGNAL);
        state.signal.set(Cell::new(2, 2), FADING_SIGNAL);

        update_pheromones(&mut state);
        assert_eq!(*state.pheromone.get(Cell::new(1, 1)), 2 * PHEROMONE_STEP);

        state.signal.fill(0);
        update_pheromones(&mut state);
        assert_eq!(*state.pheromone.get(Cell::new(1, 1)), PHEROMONE_MAX - 1);
    }

    #[test]
    fn test_fresh_signal_saturates_own_cell() {
        let mut state = small_state();
        state.signal.set(Cell::new(3, 3), FRESH_SIGNAL);
        state.signal.set(Cell::new(1, 1), SEED_SIGNAL);

        update_pheromones(&mut state);

        assert_eq!(*state.pheromone.get(Cell::new(3, 3)), PHEROMONE_MAX);
        assert_eq!(state.pheromone_total(), PHEROMONE_MAX as i64);
    }

    #[test]
    fn test_later_fading_neighbor_adds_on_top_of_saturation() {
        let mut state = small_state();
        state.signal.set(Cell::new(1, 1), FRESH_SIGNAL);
        state.signal.set(Cell::new(2, 2), FADING_SIGNAL);

        update_pheromones(&mut state);

        assert_eq!(*state.pheromone.get(Cell::new(1, 1)), PHEROMONE_MAX + PHEROMONE_STEP);
    }

    #[test]
    fn test_positions_move_along_heading() {
        let mut state = small_state();
        state.place_agent(Cell::new(2, 2), Heading::from_index(3));

        update_positions(&mut state);

        assert!(state.is_occupied(Cell::new(3, 1)));
        assert_eq!(state.agent_heading(Cell::new(3, 1)), Some(Heading::from_index(3)));
        assert_eq!(state.occupied_count(), 1);
    }

    #[test]
    fn test_positions_collision_first_scanned_wins() {
        let mut state = small_state();
        // both target (1, 1)
        state.place_agent(Cell::new(0, 0), Heading::from_index(1));
        state.place_agent(Cell::new(2, 2), Heading::from_index(5));

        update_positions(&mut state);

        assert_eq!(state.agent_heading(Cell::new(1, 1)), Some(Heading::from_index(1)));
        assert_eq!(state.agent_heading(Cell::new(2, 2)), Some(Heading::from_index(5)));
        assert!(!state.is_occupied(Cell::new(0, 0)));
        assert_eq!(state.occupied_count(), 2);
    }

    #[test]
    fn test_positions_chain_follows_into_vacated_cell() {
        let mut state = small_state();
        state.place_agent(Cell::new(1, 0), Heading::from_index(0));
        state.place_agent(Cell::new(1, 1), Heading::from_index(0));

        update_positions(&mut state);

        assert!(state.is_occupied(Cell::new(1, 1)));
        assert!(state.is_occupied(Cell::new(1, 2)));
        assert_eq!(state.occupied_count(), 2);
    }

    #[test]
    fn test_blocked_agent_stays_put() {
        let mut state = small_state();
        // (0,1) and (0,2) both target (1,1); (0,0) follows into (0,1)
        state.place_agent(Cell::new(0, 0), Heading::from_index(0));
        state.place_agent(Cell::new(0, 1), Heading::from_index(2));
        state.place_agent(Cell::new(0, 2), Heading::from_index(3));

        update_positions(&mut state);

        assert_eq!(state.occupied_count(), 3);
        assert_eq!(state.agent_heading(Cell::new(0, 1)), Some(Heading::from_index(0)));
        assert_eq!(state.agent_heading(Cell::new(1, 1)), Some(Heading::from_index(2)));
        assert_eq!(state.agent_heading(Cell::new(0, 2)), Some(Heading::from_index(3)));
    }

    #[test]
    fn test_blocked_agent_bounces_earlier_arrival() {
        let mut state = small_state();
        // (0,0) claims (1,1); (0,1) moves onto (0,2); (0,2) is blocked at (1,1)
        // and takes its own cell back, so (0,1) returns home
        state.place_agent(Cell::new(0, 0), Heading::from_index(1));
        state.place_agent(Cell::new(0, 1), Heading::from_index(0));
        state.place_agent(Cell::new(0, 2), Heading::from_index(3));

        update_positions(&mut state);

        assert_eq!(state.occupied_count(), 3);
        assert_eq!(state.agent_heading(Cell::new(1, 1)), Some(Heading::from_index(1)));
        assert_eq!(state.agent_heading(Cell::new(0, 2)), Some(Heading::from_index(3)));
        assert_eq!(state.agent_heading(Cell::new(0, 1)), Some(Heading::from_index(0)));
    }

    #[test]
    fn test_positions_wrap_at_edges() {
        let mut state = small_state();
        state.place_agent(Cell::new(4, 3), Heading::from_index(2));
        state.place_agent(Cell::new(2, 0), Heading::from_index(5));

        update_positions(&mut state);

        assert!(state.is_occupied(Cell::new(0, 3)));
        assert!(state.is_occupied(Cell::new(1, 4)));
        assert_eq!(state.occupied_count(), 2);
    }

    #[test]
    fn test_signals_decay_and_refresh_under_agents() {
        let mut state = small_state();
        state.signal.set(Cell::new(0, 0), 3);
        state.signal.set(Cell::new(0, 1), 1);
        state.signal.set(Cell::new(4, 4), 0);
        state.place_agent(Cell::new(4, 4), Heading::default());
        state.place_agent(Cell::new(0, 0), Heading::default());

        update_signals(&mut state);

        assert_eq!(*state.signal.get(Cell::new(0, 0)), FRESH_SIGNAL);
        assert_eq!(*state.signal.get(Cell::new(0, 1)), 0);
        assert_eq!(*state.signal.get(Cell::new(4, 4)), FRESH_SIGNAL);
    }

    #[test]
    fn test_populate_places_distinct_agents() {
        let mut state = GridState::new(5, 500);
        let mut rng = SeededRandom::from_seed(3);

        populate(&mut state, 5, &mut rng);

        assert_eq!(state.occupied_count(), 5);
        assert_eq!(state.signal.count(|&s| s == SEED_SIGNAL), 5);
        assert_eq!(state.pheromone.count(|&p| p == PHEROMONE_MAX), 5);
        for cell in state.agents().collect::<Vec<_>>() {
            assert_eq!(*state.signal.get(cell), SEED_SIGNAL);
            assert_eq!(*state.pheromone.get(cell), PHEROMONE_MAX);
        }
    }

    #[test]
    fn test_populate_fills_whole_grid() {
        let mut state = small_state();
        let mut rng = SeededRandom::from_seed(11);
        populate(&mut state, 25, &mut rng);
        assert_eq!(state.occupied_count(), 25);
    }
}
