#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, HashSet};
    use std::num::NonZero;
    use std::str::FromStr;

    use itertools::Itertools;

    use crate::blockade::{first_breaking_prefix, BlockadeFailure, MemorySpace};
    use crate::builder::{Builder, BuilderInvalidReason, OrientedGridBuilder, PlainGridBuilder};
    use crate::keypad::{Keypad, RobotChain, SequenceCache};
    use crate::metrics::{find_cheats, savings, savings_histogram, tiles_on_best_paths, Cheat};
    use crate::patrol::{find_guard, loop_inducing_obstructions, patrol, Action};
    use crate::region::{extract_region, reachable_ends, regions, CycleDetected, Region};
    use crate::render::{costs_on_grid, path_on_grid, region_mask};
    use crate::{add, manhattan, scale, subtract, Edge, Grid, GridError, Heading, Location, Oriented, PathSolver, SolverFailure, StateGraph, INFINITY};

    fn dims(x: usize, y: usize) -> (NonZero<usize>, NonZero<usize>) {
        (NonZero::new(x).unwrap(), NonZero::new(y).unwrap())
    }

    fn grid(text: &str) -> Grid {
        Grid::from_str(text).unwrap()
    }

    fn walls(c: char) -> bool {
        c == '#'
    }

    fn maze(text: &str) -> (Grid, StateGraph<Oriented>) {
        let grid = grid(text);
        let graph = OrientedGridBuilder::from_grid(&grid, walls).build().unwrap();
        (grid, graph)
    }

    // two equally good ways around a pillar that merge before the end
    const FORKED_MAZE: &str = "#######
##...##
#S.#.E#
##...##
#######
";

    #[test]
    fn vector_functions() {
        assert_eq!(add(Location(1, 2), Location(3, -1)), Location(4, 1));
        assert_eq!(subtract(Location(1, 2), Location(3, -1)), Location(-2, 3));
        assert_eq!(scale(Location(1, -2), 3), Location(3, -6));
        assert_eq!(manhattan(Location(0, 0), Location(3, -4)), 7);
        assert_eq!(Location(3, 4).to_string(), "3,4");
    }

    #[test]
    fn headings_rotate() {
        assert_eq!(Heading::North.clockwise(), Heading::East);
        assert_eq!(Heading::West.clockwise(), Heading::North);
        assert_eq!(Heading::North.counter_clockwise(), Heading::West);
        assert_eq!(Heading::South.invert(), Heading::North);
        assert_eq!(Heading::East.attempt_from(Location(1, 1)), Location(2, 1));
        assert_eq!(Heading::direction_to(Location(1, 1), Location(1, 0)), Some(Heading::North));
        assert_eq!(Heading::direction_to(Location(1, 1), Location(2, 2)), None);
        assert_eq!(Heading::from_marker('v'), Some(Heading::South));
    }

    #[test]
    fn grid_round_trips() {
        let text = "#S.\n..E\n";
        let grid = grid(text);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(Location(2, 1)), Some('E'));
        assert_eq!(grid.get(Location(-1, 0)), None);
        assert_eq!(grid.find('S'), Ok(Location(1, 0)));
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn grid_errors() {
        assert_eq!(Grid::from_str("ab\nabc\n"), Err(GridError::Ragged { row: 1, expected: 2, found: 3 }));
        assert_eq!(Grid::from_str(""), Err(GridError::Empty));
        assert_eq!(grid("..\n..").find('Z'), Err(GridError::MarkerNotFound('Z')));
    }

    #[test]
    fn blank_lines_inside_a_grid() {
        assert_eq!(Grid::from_str("ab\n\nab\n"), Err(GridError::Ragged { row: 1, expected: 2, found: 0 }));
        assert_eq!(Grid::from_str("\n\n"), Err(GridError::Empty));

        let padded = grid("\nab\ncd\n\n\n");
        assert_eq!(padded.height(), 2);
        assert_eq!(padded.to_string(), "ab\ncd\n");
    }

    #[test]
    fn plain_edges_in_adjacency_order() {
        let graph = PlainGridBuilder::with_dims(dims(3, 3)).build().unwrap();
        assert_eq!(graph.state_count(), 9);
        assert_eq!(graph.edge_count(), 24);

        let neighbors = graph.outgoing(Location(1, 1)).map(|edge| edge.to).collect_vec();
        assert_eq!(neighbors, vec![Location(1, 0), Location(1, 2), Location(0, 1), Location(2, 1)]);
    }

    #[test]
    fn oriented_states_and_edges() {
        let (grid, graph) = maze(FORKED_MAZE);
        let open = grid.cells().filter(|(_, c)| *c != '#').count();
        assert_eq!(graph.state_count(), open * 4);

        let states: HashSet<Oriented> = graph.states().collect();
        for edge in graph.edges() {
            assert!(states.contains(&edge.from) && states.contains(&edge.to));
        }

        let state = Oriented::new(Location(2, 2), Heading::North);
        assert_eq!(graph.outgoing(state).collect_vec(), vec![
            Edge { from: state, to: Oriented::new(Location(2, 2), Heading::West), cost: 1000 },
            Edge { from: state, to: Oriented::new(Location(2, 2), Heading::East), cost: 1000 },
            Edge { from: state, to: Oriented::new(Location(2, 1), Heading::North), cost: 1 },
        ]);

        // a wall ahead means no forward edge
        assert_eq!(graph.outgoing(Oriented::new(Location(2, 2), Heading::East)).count(), 2);
    }

    #[test]
    fn builder_out_of_bounds() {
        let mut builder = PlainGridBuilder::with_dims(dims(3, 3));
        builder.drop_location(Location(5, 5));
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::FeatureOutOfBounds]));
        assert!(builder.build().is_err());

        // invalid builders ignore further changes
        builder.drop_location(Location(7, 7));
        assert_eq!(builder.is_valid().map(Vec::len), Some(1));
    }

    #[test]
    fn step_rule_restricts_edges() {
        let grid = grid("012\n321\n");
        let graph = PlainGridBuilder::from_grid(&grid, |_| false)
            .step_rule(|from, to| to as u32 == from as u32 + 1)
            .build()
            .unwrap();

        let climbs = graph.edges().map(|edge| (edge.from, edge.to)).collect::<HashSet<_>>();
        assert_eq!(climbs, HashSet::from([
            (Location(0, 0), Location(1, 0)),
            (Location(1, 0), Location(2, 0)),
            (Location(1, 0), Location(1, 1)),
            (Location(2, 1), Location(1, 1)),
            (Location(2, 1), Location(2, 0)),
            (Location(1, 1), Location(0, 1)),
        ]));
    }

    #[test]
    fn start_is_free_with_one_empty_path() {
        let (grid, graph) = maze(FORKED_MAZE);
        let start = Oriented::new(grid.find('S').unwrap(), Heading::East);
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        assert_eq!(optima.cost(start), 0);
        assert_eq!(optima.paths_to(start), vec![Vec::new()]);
    }

    #[test]
    fn start_on_wall_fails() {
        let (_, graph) = maze(FORKED_MAZE);
        let failure = PathSolver::from(&graph).solve(Oriented::new(Location(0, 0), Heading::East));
        assert_eq!(failure.err(), Some(SolverFailure::StartNotInGraph));
    }

    #[test]
    fn corridor_with_one_turn() {
        let text = "####
#S.#
##.#
####
";
        let (grid, graph) = maze(text);
        let start = Oriented::new(grid.find('S').unwrap(), Heading::East);
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        assert_eq!(optima.min_cost_where(|state| state.location == Location(2, 2)), 1002);
        assert_eq!(optima.cost(Oriented::new(Location(2, 2), Heading::South)), 1002);

        let cheap_turns = OrientedGridBuilder::from_grid(&grid, walls).turn_cost(5).build().unwrap();
        let optima = PathSolver::from(&cheap_turns).solve(start).unwrap();
        assert_eq!(optima.min_cost_where(|state| state.location == Location(2, 2)), 7);
    }

    #[test]
    fn unreachable_states_keep_infinity() {
        let grid = grid("S#.\n.#.\n");
        let graph = PlainGridBuilder::from_grid(&grid, walls).build().unwrap();
        let optima = PathSolver::from(&graph).solve(Location(0, 0)).unwrap();

        assert_eq!(optima.cost(Location(2, 1)), INFINITY);
        assert!(!optima.is_reachable(Location(2, 0)));
        assert!(optima.paths_to(Location(2, 1)).is_empty());
        assert_eq!(optima.cost_table().keys().copied().collect_vec(), vec![Location(0, 0), Location(0, 1)]);
    }

    #[test]
    fn ties_keep_every_path() {
        let graph = PlainGridBuilder::with_dims(dims(2, 2)).build().unwrap();
        let optima = PathSolver::from(&graph).solve(Location(0, 0)).unwrap();
        let step = |from, to| Edge { from, to, cost: 1 };

        assert_eq!(optima.cost(Location(1, 1)), 2);
        assert_eq!(optima.paths_to(Location(1, 1)), vec![
            vec![step(Location(0, 0), Location(0, 1)), step(Location(0, 1), Location(1, 1))],
            vec![step(Location(0, 0), Location(1, 0)), step(Location(1, 0), Location(1, 1))],
        ]);

        let capped = PathSolver::from(&graph).path_limit(1).solve(Location(0, 0)).unwrap();
        assert_eq!(capped.paths_to(Location(1, 1)).len(), 1);

        let none = PathSolver::from(&graph).path_limit(0).solve(Location(0, 0)).unwrap();
        assert!(none.paths_to(Location(1, 1)).is_empty());
        assert!(none.paths_to(Location(0, 0)).is_empty());
        assert_eq!(none.cost(Location(1, 1)), 2);
    }

    // every path from `from` to `to` costing exactly `budget`; only terminates without zero-cost cycles
    fn paths_costing(graph: &StateGraph<Oriented>, from: Oriented, to: Oriented, budget: u64) -> usize {
        let here = usize::from(from == to && budget == 0);
        here + graph.outgoing(from)
            .filter(|edge| edge.cost <= budget)
            .map(|edge| paths_costing(graph, edge.to, to, budget - edge.cost))
            .sum::<usize>()
    }

    #[test]
    fn free_steps_keep_every_tie() {
        let graph = OrientedGridBuilder::with_dims(dims(2, 2)).step_cost(0).build().unwrap();
        let start = Oriented::new(Location(0, 0), Heading::East);
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        for state in graph.states().filter(|state| optima.is_reachable(*state)) {
            let paths = optima.paths_to(state);
            assert_eq!(paths.len(), paths_costing(&graph, start, state, optima.cost(state)), "{state:?}");
            assert_eq!(paths.iter().unique().count(), paths.len());
            for path in &paths {
                assert_eq!(path.iter().map(|edge| edge.cost).sum::<u64>(), optima.cost(state));
            }
        }

        // turn around either in place or after a free step east and back, each way round
        assert_eq!(optima.paths_to(Oriented::new(Location(0, 0), Heading::West)).len(), 4);
    }

    #[test]
    fn zero_cost_cycles_stay_finite() {
        let graph = PlainGridBuilder::with_dims(dims(2, 2)).step_cost(0).build().unwrap();
        let optima = PathSolver::from(&graph).solve(Location(0, 0)).unwrap();

        assert_eq!(optima.paths_to(Location(0, 0)), vec![Vec::new()]);
        assert_eq!(optima.paths_to(Location(1, 0)).len(), 1);
        assert_eq!(optima.paths_to(Location(1, 1)).len(), 2);
        assert_eq!(optima.states_on_optimal_paths([Location(1, 1)]).len(), 4);
    }

    #[test]
    fn forked_maze_paths() {
        let (grid, graph) = maze(FORKED_MAZE);
        let start = Oriented::new(grid.find('S').unwrap(), Heading::East);
        let end = grid.find('E').unwrap();
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        let arrival = Oriented::new(end, Heading::East);
        assert_eq!(optima.min_cost_where(|state| state.location == end), 4006);
        assert_eq!(optima.cost(arrival), 4006);

        let paths = optima.paths_to(arrival);
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        for path in &paths {
            assert_eq!(path.first().map(|edge| edge.from), Some(start));
            assert_eq!(path.last().map(|edge| edge.to), Some(arrival));
            assert_eq!(path.iter().map(|edge| edge.cost).sum::<u64>(), 4006);
        }

        let tiles = tiles_on_best_paths(&optima, |state| state.location == end);
        assert_eq!(tiles.len(), 10);
    }

    #[test]
    fn tiles_across_several_arrival_headings() {
        let text = "#####
#.E.#
#.#.#
#.S.#
#####
";
        let (grid, graph) = maze(text);
        let start = Oriented::new(grid.find('S').unwrap(), Heading::North);
        let end = grid.find('E').unwrap();
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        assert_eq!(optima.cost(Oriented::new(end, Heading::East)), 3004);
        assert_eq!(optima.cost(Oriented::new(end, Heading::West)), 3004);
        assert_eq!(optima.paths_to(Oriented::new(end, Heading::East)).len(), 1);

        let tiles = tiles_on_best_paths(&optima, |state| state.location == end);
        let open: BTreeSet<Location> = grid.cells().filter(|(_, c)| *c != '#').map(|(location, _)| location).collect();
        assert_eq!(tiles, open);
    }

    #[test]
    fn costs_are_locally_minimal() {
        let (grid, graph) = maze(FORKED_MAZE);
        let start = Oriented::new(grid.find('S').unwrap(), Heading::East);
        let optima = PathSolver::from(&graph).solve(start).unwrap();

        for state in graph.states().filter(|state| *state != start && optima.is_reachable(*state)) {
            let best_incoming = graph.edges()
                .filter(|edge| edge.to == state && optima.is_reachable(edge.from))
                .map(|edge| optima.cost(edge.from) + edge.cost)
                .min();
            assert_eq!(best_incoming, Some(optima.cost(state)), "{state:?}");
        }
    }

    #[test]
    fn dot_dump() {
        let graph = PlainGridBuilder::with_dims(dims(2, 1)).build().unwrap();
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph {"));
        assert_eq!(dot.matches("->").count(), 2);
    }

    #[test]
    fn region_with_hole() {
        let grid = grid("AAA\nABA\nAAA\n");
        let outer = extract_region(&grid, Location(0, 0)).unwrap();
        assert_eq!(outer.label(), 'A');
        assert_eq!(outer.area(), 8);
        assert_eq!(outer.perimeter_within(&grid), 4);
        assert_eq!(outer.perimeter(), 16);
        assert_eq!(outer.corners(), 8);

        let hole = extract_region(&grid, Location(1, 1)).unwrap();
        assert_eq!((hole.area(), hole.perimeter(), hole.corners()), (1, 4, 4));
        assert!(extract_region(&grid, Location(3, 0)).is_none());
    }

    #[test]
    fn extraction_is_idempotent() {
        let grid = grid("AAAA\nBBCD\nBBCC\nEEEC\n");
        let found = regions(&grid);
        assert_eq!(found.iter().map(Region::area).sum::<usize>(), 16);

        for region in &found {
            for member in region.members() {
                assert_eq!(extract_region(&grid, *member).as_ref(), Some(region));
            }
        }
    }

    fn prices(text: &str) -> (usize, usize) {
        let found = regions(&grid(text));
        (found.iter().map(Region::fence_price).sum(), found.iter().map(Region::bulk_price).sum())
    }

    #[test]
    fn garden_prices() {
        assert_eq!(prices("AAAA\nBBCD\nBBCC\nEEEC\n"), (140, 80));
        assert_eq!(prices("OOOOO\nOXOXO\nOOOOO\nOXOXO\nOOOOO\n"), (772, 436));
        assert_eq!(prices("EEEEE\nEXXXX\nEEEEE\nEXXXX\nEEEEE\n").1, 236);
    }

    #[test]
    fn diagonal_corners_count_twice() {
        let text = "AAAAAA
AAABBA
AAABBA
ABBAAA
ABBAAA
AAAAAA
";
        let found = regions(&grid(text));
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].corners(), 12);
        assert_eq!(prices(text).1, 368);
    }

    fn trail_totals(text: &str) -> (usize, usize) {
        let grid = grid(text);
        let graph = PlainGridBuilder::from_grid(&grid, |_| false)
            .step_rule(|from, to| matches!((from.to_digit(10), to.to_digit(10)), (Some(a), Some(b)) if b == a + 1))
            .build()
            .unwrap();

        grid.cells()
            .filter(|(_, c)| *c == '0')
            .map(|(trailhead, _)| reachable_ends(&graph, trailhead, |location| grid.get(*location) == Some('9')).unwrap())
            .fold((0, 0), |(score, rating), ends| (score + ends.len(), rating + ends.values().sum::<usize>()))
    }

    #[test]
    fn trailheads() {
        assert_eq!(trail_totals("0123\n1234\n8765\n9876\n"), (1, 16));

        let text = "89010123
78121874
87430965
96549874
45678903
32019012
01329801
10456732
";
        assert_eq!(trail_totals(text), (36, 81));
    }

    #[test]
    fn path_counting_rejects_cycles() {
        let graph = PlainGridBuilder::with_dims(dims(2, 1)).build().unwrap();
        assert_eq!(reachable_ends(&graph, Location(0, 0), |_| true), Err(CycleDetected(Location(1, 0))));

        let missing = reachable_ends(&graph, Location(5, 5), |_| true);
        assert_eq!(missing.map(|ends| ends.len()), Ok(0));
    }

    #[test]
    fn cheat_savings() {
        let costs = BTreeMap::from([(Location(0, 0), 0), (Location(2, 0), 12)]);
        assert_eq!(savings((Location(0, 0), 0), (Location(2, 0), 12)), Some(10));
        assert_eq!(find_cheats(&costs, 2, 10), vec![Cheat { from: Location(0, 0), to: Location(2, 0), savings: 10 }]);
        assert!(find_cheats(&costs, 2, 11).is_empty());
        assert!(find_cheats(&costs, 1, 0).is_empty());

        // standing still is not a jump
        assert!(find_cheats(&costs, 0, 0).is_empty());
        assert_eq!(find_cheats(&costs, 2, 0).len(), 1);
    }

    #[test]
    fn cheats_on_a_track() {
        let grid = grid("#####
#S#E#
#.#.#
#...#
#####
");
        let graph = PlainGridBuilder::from_grid(&grid, walls).build().unwrap();
        let optima = PathSolver::from(&graph).solve(grid.find('S').unwrap()).unwrap();
        let costs = optima.cost_table();
        assert_eq!(costs.get(&grid.find('E').unwrap()), Some(&6));

        let cheats = find_cheats(&costs, 2, 1);
        assert_eq!(cheats, vec![
            Cheat { from: Location(1, 1), to: Location(3, 1), savings: 4 },
            Cheat { from: Location(1, 2), to: Location(3, 2), savings: 2 },
        ]);
        assert_eq!(savings_histogram(&cheats), BTreeMap::from([(2, 1), (4, 1)]));
        assert_eq!(find_cheats(&costs, 2, 3).len(), 1);
    }

    #[test]
    fn prefix_search() {
        assert_eq!(first_breaking_prefix(10, 2, |len| Ok::<_, ()>(len >= 7)), Ok(Some(7)));
        assert_eq!(first_breaking_prefix(10, 2, |len| Ok::<_, ()>(len >= 3)), Ok(Some(3)));
        assert_eq!(first_breaking_prefix(10, 0, |_| Ok::<_, ()>(false)), Ok(None));
        assert_eq!(first_breaking_prefix(10, 10, |_| Ok::<_, ()>(true)), Ok(None));
    }

    #[test]
    fn small_memory_space() {
        let space = MemorySpace::square(NonZero::new(3).unwrap());
        assert_eq!(space.escape_cost(&[Location(1, 0), Location(1, 1)]), Ok(4));

        let wall = [Location(1, 0), Location(1, 1), Location(1, 2)];
        assert_eq!(space.escape_cost(&wall), Ok(INFINITY));
        assert_eq!(space.first_blocking(&wall, 0), Ok((2, Location(1, 2))));
        assert_eq!(space.first_blocking(&[Location(1, 1)], 0), Err(BlockadeFailure::NeverBlocked));
        assert!(matches!(space.escape_cost(&[Location(3, 3)]), Err(BlockadeFailure::InvalidBuilder(_))));
    }

    #[test]
    fn falling_bytes() {
        let bytes = "5,4 4,2 4,5 3,0 2,1 6,3 2,4 1,5 0,6 3,3 2,6 5,1 1,2 5,5 2,5 6,5 1,4 0,4 6,4 1,1 6,1 1,0 0,5 1,6 2,0"
            .split_whitespace()
            .map(|pair| {
                let (x, y) = pair.split_once(',').unwrap();
                Location(x.parse().unwrap(), y.parse().unwrap())
            })
            .collect_vec();

        let space = MemorySpace::square(NonZero::new(7).unwrap());
        assert_eq!(space.escape_cost(&bytes[..12]), Ok(22));
        assert_eq!(space.escape_route(&bytes[..12]).unwrap().map(|path| path.len()), Some(22));
        assert_eq!(space.first_blocking(&bytes, 12).map(|(_, location)| location), Ok(Location(6, 1)));
    }

    const LAB: &str = "....#.....
.........#
..........
..#.......
.......#..
..........
.#..^.....
........#.
#.........
......#...
";

    #[test]
    fn guard_patrol() {
        let grid = grid(LAB);
        let guard = find_guard(&grid).unwrap();
        assert_eq!(guard, Oriented::new(Location(4, 6), Heading::North));

        let route = patrol(&grid, guard);
        assert!(!route.is_loop());
        assert_eq!(route.steps.last().map(|(_, action)| *action), Some(Action::Outside));
        assert_eq!(route.visited_locations().len(), 41);

        assert_eq!(loop_inducing_obstructions(&grid, guard).len(), 6);
        assert_eq!(find_guard(&Grid::from_str("..\n..").unwrap()), Err(GridError::MarkerNotFound('^')));
    }

    #[test]
    fn keypad_moves() {
        let numeric = Keypad::numeric();
        assert_eq!(numeric.move_sequences('A', '0'), Ok(vec!["<A".to_string()]));
        assert_eq!(numeric.move_sequences('5', '5'), Ok(vec!["A".to_string()]));

        let around_gap = numeric.move_sequences('7', 'A').unwrap();
        assert_eq!(around_gap.len(), 9);
        assert!(!around_gap.contains(&"vvv>>A".to_string()));

        let directional = Keypad::directional();
        assert_eq!(directional.move_sequences('<', 'A'), Ok(vec![">^>A".to_string(), ">>^A".to_string()]));
        assert!(directional.move_sequences('<', '7').is_err());
    }

    #[test]
    fn robot_chain() {
        let mut cache = SequenceCache::new();
        assert_eq!(RobotChain::new(1).min_sequence_length("029A", &mut cache), Ok(12));

        let mut cache = SequenceCache::new();
        let chain = RobotChain::new(3);
        assert_eq!(chain.min_sequence_length("029A", &mut cache), Ok(68));
        assert!(!cache.is_empty());
        assert_eq!(chain.complexity("029A", &mut cache), Ok(68 * 29));

        assert_eq!(chain.total_complexity(["029A", "980A", "179A", "456A", "379A"]), Ok(126384));
    }

    #[test]
    fn renderings() {
        let grid = grid("S.\n#.\n");
        let graph = PlainGridBuilder::from_grid(&grid, walls).build().unwrap();
        let optima = PathSolver::from(&graph).solve(Location(0, 0)).unwrap();

        assert_eq!(costs_on_grid(&grid, &optima.cost_table(), 2), " 00  01 \n#### 02 \n");

        let path = optima.paths_to(Location(1, 1)).remove(0);
        assert_eq!(path_on_grid(&grid, &path), ">v\n#O\n");

        let region = extract_region(&grid, Location(1, 0)).unwrap();
        assert_eq!(region_mask(&grid, &region), "000 ..\n001 ..\n");
    }
}
