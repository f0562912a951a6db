//! Bellman-Ford Stepper
//!
//! The algorithm state machine. One call to [`BellmanFordStepper::step`] does
//! exactly one unit of work: a phase transition, a single edge relaxation, or
//! the final cycle-check scan. A driver paces the calls; the stepper performs
//! no I/O and knows nothing about rendering.

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::graph::GraphModel;

use super::snapshot::{ActiveEdge, Distance, Phase, StepSnapshot};

/// Holds the mutable run state and advances it one step at a time.
///
/// Single-threaded by construction: the state is owned here and only the
/// holder of `&mut self` can advance it.
pub struct BellmanFordStepper<'a> {
    graph: &'a GraphModel,
    source: NodeIndex,
    /// Distance estimate per node, indexed by `NodeIndex`.
    distances: Vec<Distance>,
    phase: Phase,
    /// Completed full passes over the edge list.
    iteration: usize,
    /// Next edge to relax within the current pass, in `[0, |E|]`.
    edge_cursor: usize,
    /// Edge relaxed by the most recent step (display hint).
    active_edge: Option<usize>,
    /// Node whose distance changed in the most recent step.
    changed_node: Option<NodeIndex>,
    has_negative_cycle: bool,
}

impl<'a> BellmanFordStepper<'a> {
    pub fn new(graph: &'a GraphModel, source: NodeIndex) -> Self {
        let mut stepper = Self {
            graph,
            source,
            distances: Vec::new(),
            phase: Phase::Initialization,
            iteration: 0,
            edge_cursor: 0,
            active_edge: None,
            changed_node: None,
            has_negative_cycle: false,
        };
        stepper.initialize();
        stepper
    }

    /// Source distance 0, everything else unreachable, all cursors at zero.
    /// Idempotent: calling it again discards whatever run was in flight.
    pub fn initialize(&mut self) -> StepSnapshot {
        self.distances = vec![Distance::Unreachable; self.graph.node_count()];
        self.distances[self.source.index()] = Distance::Finite(0);
        self.phase = Phase::Initialization;
        self.iteration = 0;
        self.edge_cursor = 0;
        self.active_edge = None;
        self.changed_node = None;
        self.has_negative_cycle = false;
        self.snapshot()
    }

    /// Discard the run and start over. Same contract as [`Self::initialize`].
    pub fn reset(&mut self) -> StepSnapshot {
        debug!("run state reset");
        self.initialize()
    }

    /// Advance by one unit of work and return the new snapshot.
    ///
    /// Calling this once the run is complete is a no-op that returns the
    /// unchanged snapshot: an extra click must not be an error.
    pub fn step(&mut self) -> StepSnapshot {
        match self.phase {
            Phase::Initialization => {
                // Pure pacing step so an observer can show the initialized
                // distances before the first relaxation.
                self.phase = Phase::Relaxation;
                self.edge_cursor = 0;
                self.changed_node = None;
            }
            Phase::Relaxation => self.relax_next_edge(),
            Phase::CycleCheck => self.scan_for_negative_cycle(),
            Phase::Complete => {}
        }
        self.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Total `step()` calls from initialization to completion, so a driver
    /// can size a progress bar before running.
    pub fn total_steps(&self) -> usize {
        let passes = self.graph.iteration_bound().max(1);
        let per_pass = self.graph.edge_count().max(1);
        1 + passes * per_pass + 1
    }

    /// Relax the edge under the cursor, then close out the pass if the cursor
    /// ran off the end of the edge list.
    fn relax_next_edge(&mut self) {
        self.changed_node = None;

        if let Some(edge) = self.graph.edge_at(self.edge_cursor) {
            self.active_edge = Some(self.edge_cursor);

            if let Distance::Finite(from_dist) = self.distances[edge.from.index()] {
                let candidate = Distance::Finite(from_dist + edge.weight);
                // Strict less-than: ties never trigger an update.
                if candidate < self.distances[edge.to.index()] {
                    self.distances[edge.to.index()] = candidate;
                    self.changed_node = Some(edge.to);
                    debug!(
                        "relaxed {}→{} to {}",
                        self.graph.label(edge.from),
                        self.graph.label(edge.to),
                        candidate,
                    );
                }
            }

            self.edge_cursor += 1;
        }

        if self.edge_cursor >= self.graph.edge_count() {
            self.iteration += 1;
            self.edge_cursor = 0;

            if self.iteration >= self.graph.iteration_bound() {
                self.phase = Phase::CycleCheck;
            }
        }
    }

    /// One sweep over every edge. Any edge that still relaxes after |V| − 1
    /// full passes proves a negative-weight cycle reachable from the source.
    fn scan_for_negative_cycle(&mut self) {
        self.active_edge = None;
        self.changed_node = None;

        let mut found = false;
        for edge in self.graph.edges() {
            if let Distance::Finite(from_dist) = self.distances[edge.from.index()] {
                if Distance::Finite(from_dist + edge.weight) < self.distances[edge.to.index()] {
                    found = true;
                }
            }
        }

        self.has_negative_cycle = found;
        self.phase = Phase::Complete;
        debug!("cycle check done: negative cycle = {}", found);
    }

    pub fn snapshot(&self) -> StepSnapshot {
        let distances = self
            .graph
            .node_indices()
            .map(|node| {
                (
                    self.graph.label(node).to_string(),
                    self.distances[node.index()],
                )
            })
            .collect();

        let active_edge = self
            .active_edge
            .and_then(|index| self.graph.edge_at(index))
            .map(|edge| ActiveEdge {
                from: self.graph.label(edge.from).to_string(),
                to: self.graph.label(edge.to).to_string(),
                weight: edge.weight,
            });

        StepSnapshot {
            phase: self.phase,
            iteration: self.iteration,
            iteration_bound: self.graph.iteration_bound(),
            distances,
            active_edge,
            changed_node: self
                .changed_node
                .map(|node| self.graph.label(node).to_string()),
            has_negative_cycle: self.has_negative_cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeDef, GraphSpec};

    fn sample_model() -> GraphModel {
        GraphModel::from_spec(&GraphSpec::sample()).unwrap()
    }

    fn run_to_completion(stepper: &mut BellmanFordStepper<'_>) -> (StepSnapshot, usize) {
        let mut steps = 0;
        let mut snapshot = stepper.snapshot();
        while !snapshot.is_complete() {
            snapshot = stepper.step();
            steps += 1;
        }
        (snapshot, steps)
    }

    #[test]
    fn initialize_sets_source_to_zero_and_rest_unreachable() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let stepper = BellmanFordStepper::new(&model, source);
        let snapshot = stepper.snapshot();

        assert_eq!(snapshot.phase, Phase::Initialization);
        assert_eq!(snapshot.iteration, 0);
        assert_eq!(snapshot.iteration_bound, 4);
        assert_eq!(snapshot.distance_of("A"), Some(Distance::Finite(0)));
        for node in ["B", "C", "D", "E"] {
            assert_eq!(snapshot.distance_of(node), Some(Distance::Unreachable));
        }
        assert!(snapshot.active_edge.is_none());
        assert!(!snapshot.has_negative_cycle);
    }

    #[test]
    fn first_step_enters_relaxation_without_touching_distances() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);
        let before = stepper.snapshot();

        let after = stepper.step();
        assert_eq!(after.phase, Phase::Relaxation);
        assert_eq!(after.distances, before.distances);
        assert!(after.active_edge.is_none());
        assert!(after.changed_node.is_none());
    }

    #[test]
    fn relaxation_updates_distance_and_reports_active_edge() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);
        stepper.step(); // enter relaxation

        // First edge is A→B(4); A is the source, so B becomes 4.
        let snapshot = stepper.step();
        assert_eq!(snapshot.distance_of("B"), Some(Distance::Finite(4)));
        assert_eq!(snapshot.changed_node.as_deref(), Some("B"));
        let edge = snapshot.active_edge.unwrap();
        assert_eq!((edge.from.as_str(), edge.to.as_str(), edge.weight), ("A", "B", 4));
    }

    #[test]
    fn reaches_cycle_check_after_exactly_one_plus_passes_times_edges_steps() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        // 1 init transition + 4 passes × 8 edges.
        let boundary = 1 + model.iteration_bound() * model.edge_count();
        let mut snapshot = stepper.snapshot();
        for _ in 0..boundary {
            assert_ne!(snapshot.phase, Phase::CycleCheck);
            snapshot = stepper.step();
        }
        assert_eq!(snapshot.phase, Phase::CycleCheck);
        assert_eq!(snapshot.iteration, 4);

        let final_snapshot = stepper.step();
        assert_eq!(final_snapshot.phase, Phase::Complete);
        assert_eq!(stepper.total_steps(), boundary + 1);
    }

    #[test]
    fn sample_instance_completes_without_negative_cycle() {
        // Derived by executing the relaxation rule by hand: pass 1 settles
        // B=4, C=2, D=9, E=12 and later passes change nothing. The only
        // cycle, B→D→B, weighs 5 + (−4) = +1, so the final scan finds no
        // still-relaxable edge.
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let (snapshot, steps) = run_to_completion(&mut stepper);
        assert_eq!(steps, 34);
        assert!(!snapshot.has_negative_cycle);
        assert_eq!(snapshot.distance_of("A"), Some(Distance::Finite(0)));
        assert_eq!(snapshot.distance_of("B"), Some(Distance::Finite(4)));
        assert_eq!(snapshot.distance_of("C"), Some(Distance::Finite(2)));
        assert_eq!(snapshot.distance_of("D"), Some(Distance::Finite(9)));
        assert_eq!(snapshot.distance_of("E"), Some(Distance::Finite(12)));
        assert!(snapshot.active_edge.is_none());
    }

    #[test]
    fn detects_genuinely_negative_cycle() {
        // Same instance with D→B at −6: B→D→B now weighs 5 + (−6) = −1.
        let mut spec = GraphSpec::sample();
        spec.edges[6] = EdgeDef {
            from: "D".to_string(),
            to: "B".to_string(),
            weight: -6,
        };
        let model = GraphModel::from_spec(&spec).unwrap();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let (snapshot, _) = run_to_completion(&mut stepper);
        assert!(snapshot.has_negative_cycle);
    }

    #[test]
    fn distances_never_increase_before_completion() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let mut previous = stepper.snapshot();
        while !previous.is_complete() {
            let next = stepper.step();
            for ((label, before), (_, after)) in
                previous.distances.iter().zip(next.distances.iter())
            {
                assert!(after <= before, "distance of {} increased", label);
            }
            previous = next;
        }
    }

    #[test]
    fn stepping_past_completion_is_a_no_op() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let (done, _) = run_to_completion(&mut stepper);
        for _ in 0..5 {
            assert_eq!(stepper.step(), done);
        }
    }

    #[test]
    fn reset_restores_the_initial_snapshot() {
        let model = sample_model();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);
        let initial = stepper.snapshot();

        for _ in 0..11 {
            stepper.step();
        }
        assert_eq!(stepper.reset(), initial);

        run_to_completion(&mut stepper);
        assert_eq!(stepper.reset(), initial);
    }

    #[test]
    fn unreachable_nodes_never_act_as_relaxation_source() {
        // Source E only reaches D (E→D) and then B (D→B). A and C must stay
        // unreachable, and edges out of them must never fire.
        let model = sample_model();
        let source = model.resolve_source(Some("E")).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let (snapshot, _) = run_to_completion(&mut stepper);
        assert_eq!(snapshot.distance_of("E"), Some(Distance::Finite(0)));
        assert_eq!(snapshot.distance_of("D"), Some(Distance::Finite(2)));
        assert_eq!(snapshot.distance_of("B"), Some(Distance::Finite(-2)));
        assert_eq!(snapshot.distance_of("C"), Some(Distance::Finite(-1)));
        assert_eq!(snapshot.distance_of("A"), Some(Distance::Unreachable));
        assert!(!snapshot.has_negative_cycle);
    }

    #[test]
    fn ties_do_not_trigger_an_update() {
        // Two equal-length routes to C: A→C(2) direct and A→B(1)→C(1).
        // The second route ties at 2 and must leave C's distance alone.
        let spec = GraphSpec {
            nodes: vec!["A".into(), "B".into(), "C".into()],
            edges: vec![
                EdgeDef { from: "A".into(), to: "C".into(), weight: 2 },
                EdgeDef { from: "A".into(), to: "B".into(), weight: 1 },
                EdgeDef { from: "B".into(), to: "C".into(), weight: 1 },
            ],
        };
        let model = GraphModel::from_spec(&spec).unwrap();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        stepper.step(); // enter relaxation
        stepper.step(); // A→C: C = 2
        stepper.step(); // A→B: B = 1
        let snapshot = stepper.step(); // B→C ties at 2
        assert_eq!(snapshot.distance_of("C"), Some(Distance::Finite(2)));
        assert!(snapshot.changed_node.is_none());
    }

    #[test]
    fn single_node_instance_runs_one_vacuous_pass() {
        let spec = GraphSpec {
            nodes: vec!["A".to_string()],
            edges: vec![],
        };
        let model = GraphModel::from_spec(&spec).unwrap();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        let (snapshot, steps) = run_to_completion(&mut stepper);
        // init transition, one empty pass, cycle check.
        assert_eq!(steps, 3);
        assert_eq!(stepper.total_steps(), 3);
        assert!(!snapshot.has_negative_cycle);
        assert_eq!(snapshot.distance_of("A"), Some(Distance::Finite(0)));
    }

    #[test]
    fn duplicate_edges_relax_independently() {
        // The second copy of A→B carries a smaller weight and wins.
        let spec = GraphSpec {
            nodes: vec!["A".into(), "B".into()],
            edges: vec![
                EdgeDef { from: "A".into(), to: "B".into(), weight: 5 },
                EdgeDef { from: "A".into(), to: "B".into(), weight: 3 },
            ],
        };
        let model = GraphModel::from_spec(&spec).unwrap();
        let source = model.resolve_source(None).unwrap();
        let mut stepper = BellmanFordStepper::new(&model, source);

        stepper.step(); // enter relaxation
        let first = stepper.step();
        assert_eq!(first.distance_of("B"), Some(Distance::Finite(5)));
        let second = stepper.step();
        assert_eq!(second.distance_of("B"), Some(Distance::Finite(3)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn spec_strategy() -> impl Strategy<Value = GraphSpec> {
            (2usize..8).prop_flat_map(|n| {
                let edge = (0..n, 0..n, -10i64..10);
                prop::collection::vec(edge, 1..20).prop_map(move |edges| GraphSpec {
                    nodes: (0..n).map(|i| format!("N{}", i)).collect(),
                    edges: edges
                        .into_iter()
                        .map(|(from, to, weight)| EdgeDef {
                            from: format!("N{}", from),
                            to: format!("N{}", to),
                            weight,
                        })
                        .collect(),
                })
            })
        }

        /// Batch reference: |V| − 1 full passes in edge order, then one scan.
        fn reference_bellman_ford(spec: &GraphSpec, source: usize) -> (Vec<Option<i64>>, bool) {
            let n = spec.nodes.len();
            let index = |label: &str| spec.nodes.iter().position(|l| l == label).unwrap();

            let mut dist: Vec<Option<i64>> = vec![None; n];
            dist[source] = Some(0);

            for _ in 0..n.saturating_sub(1) {
                for edge in &spec.edges {
                    let (u, v) = (index(&edge.from), index(&edge.to));
                    if let Some(du) = dist[u] {
                        let candidate = du + edge.weight;
                        if dist[v].map_or(true, |dv| candidate < dv) {
                            dist[v] = Some(candidate);
                        }
                    }
                }
            }

            let mut negative = false;
            for edge in &spec.edges {
                let (u, v) = (index(&edge.from), index(&edge.to));
                if let Some(du) = dist[u] {
                    if dist[v].map_or(true, |dv| du + edge.weight < dv) {
                        negative = true;
                    }
                }
            }

            (dist, negative)
        }

        proptest! {
            /// Property: distances never increase, the step count is exactly
            /// 1 + (|V|−1)·|E| + 1, and the outcome matches a batch run.
            #[test]
            fn stepper_matches_batch_reference(spec in spec_strategy()) {
                let model = GraphModel::from_spec(&spec).unwrap();
                let source = model.resolve_source(None).unwrap();
                let mut stepper = BellmanFordStepper::new(&model, source);

                let mut previous = stepper.snapshot();
                let mut steps = 0;
                while !previous.is_complete() {
                    let next = stepper.step();
                    steps += 1;
                    for ((_, before), (_, after)) in
                        previous.distances.iter().zip(next.distances.iter())
                    {
                        prop_assert!(after <= before);
                    }
                    previous = next;
                }

                prop_assert_eq!(steps, 1 + (spec.nodes.len() - 1) * spec.edges.len() + 1);

                let (expected, negative) = reference_bellman_ford(&spec, 0);
                for (i, (_, distance)) in previous.distances.iter().enumerate() {
                    prop_assert_eq!(distance.finite(), expected[i]);
                }
                prop_assert_eq!(previous.has_negative_cycle, negative);
            }

            /// Property: a reset at any point restores the initial snapshot.
            #[test]
            fn reset_is_equivalent_to_initialize(
                spec in spec_strategy(),
                cutoff in 0usize..40,
            ) {
                let model = GraphModel::from_spec(&spec).unwrap();
                let source = model.resolve_source(None).unwrap();
                let mut stepper = BellmanFordStepper::new(&model, source);
                let initial = stepper.snapshot();

                for _ in 0..cutoff {
                    stepper.step();
                }
                prop_assert_eq!(stepper.reset(), initial);
            }
        }
    }
}
