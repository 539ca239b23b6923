//! Property-based checks over every generator.
//!
//! Each case builds a fresh network, wires it with one generator and then
//! asserts the structural invariants any generated topology must satisfy.

use std::collections::BTreeSet;

use proptest::prelude::*;
use test_strategy::Arbitrary;

use crate::{
    CancelToken, Directedness, GeneratorError, Network,
    analysis::{self, DistanceMetric},
    test_utils::suite_proptest_config,
};

#[derive(Clone, Copy, Debug, Arbitrary)]
enum Topology {
    #[weight(2)]
    ErdosRenyi,
    #[weight(1)]
    FastRandom,
    #[weight(2)]
    Ring,
    #[weight(1)]
    Square,
    #[weight(2)]
    SmallWorld,
    #[weight(3)]
    Poisson,
    #[weight(2)]
    Explicit,
}

impl Topology {
    const fn undirected_only(self) -> bool {
        matches!(self, Self::SmallWorld | Self::Poisson | Self::Explicit)
    }

    const fn is_configuration_model(self) -> bool {
        matches!(self, Self::Poisson | Self::Explicit)
    }
}

#[derive(Clone, Debug, Arbitrary)]
struct Case {
    topology: Topology,
    #[strategy(4_usize..40)]
    size: usize,
    #[strategy(1_usize..8)]
    span: usize,
    directed: bool,
    seed: u64,
    #[strategy(proptest::collection::vec(0_usize..5, 40))]
    degrees: Vec<usize>,
}

impl Case {
    fn directedness(&self) -> Directedness {
        if self.directed && !self.topology.undirected_only() {
            Directedness::Directed
        } else {
            Directedness::Undirected
        }
    }

    fn build(&self) -> (Network, Result<(), GeneratorError>) {
        let mut net = Network::with_seed(self.directedness(), self.seed);
        let cancel = CancelToken::new();
        let k = 1 + self.span % ((self.size - 1) / 2);
        let outcome = match self.topology {
            Topology::ErdosRenyi => {
                net.populate(self.size);
                super::erdos_renyi(&mut net, 2.0, &cancel)
            }
            Topology::FastRandom => {
                net.populate(self.size);
                super::fast_random_graph(&mut net, 2.0, &cancel)
            }
            Topology::Ring => {
                net.populate(self.size);
                super::ring_lattice(&mut net, k)
            }
            Topology::Square => {
                let cols = 1 + self.size / self.span.max(2);
                net.populate(self.span * cols);
                super::square_lattice(&mut net, self.span, cols, self.directed)
            }
            Topology::SmallWorld => {
                net.populate(self.size);
                super::small_world(&mut net, k, 0.3)
            }
            Topology::Poisson => {
                net.populate(self.size);
                super::rand_connect_poisson(&mut net, 2.0, &cancel)
            }
            Topology::Explicit => {
                net.populate(self.size);
                let mut degrees = self.degrees[..self.size].to_vec();
                if degrees.iter().sum::<usize>() % 2 == 1 {
                    degrees[0] += 1;
                }
                super::rand_connect_explicit(&mut net, &degrees, &cancel)
            }
        };
        (net, outcome)
    }
}

fn check_generated(case: &Case) -> Result<(), TestCaseError> {
    let (net, outcome) = case.build();
    match outcome {
        Ok(()) => {}
        Err(GeneratorError::RepairFailed { .. }) if case.topology.is_configuration_model() => {
            prop_assert_eq!(net.arc_count(), 0, "failed repair must leave no arcs");
        }
        Err(error) => return Err(TestCaseError::fail(format!("{error}"))),
    }

    prop_assert!(net.validate().is_empty(), "violations: {:?}", net.validate());
    prop_assert_eq!(net.stub_count(), 0);

    let out_degrees: usize = net.nodes().map(|node| node.degree()).sum();
    prop_assert_eq!(out_degrees, net.arc_count());
    prop_assert_eq!(net.degree_histogram().iter().sum::<usize>(), net.size());
    if !net.is_directed() {
        prop_assert_eq!(net.arc_count(), 2 * net.edge_count());
    }
    if case.topology.is_configuration_model() {
        prop_assert!(analysis::is_simple(&net));
    }
    Ok(())
}

fn check_explicit_degrees_kept(case: &Case) -> Result<(), TestCaseError> {
    let case = Case {
        topology: Topology::Explicit,
        ..case.clone()
    };
    let (net, outcome) = case.build();
    if outcome.is_err() {
        return Ok(());
    }
    let mut expected = case.degrees[..case.size].to_vec();
    if expected.iter().sum::<usize>() % 2 == 1 {
        expected[0] += 1;
    }
    let actual: Vec<usize> = net.nodes().map(|node| node.degree()).collect();
    prop_assert_eq!(actual, expected);
    Ok(())
}

fn check_component_partition(case: &Case) -> Result<(), TestCaseError> {
    let (net, _) = case.build();
    let parts = analysis::components(&net, &CancelToken::new());
    let mut seen = BTreeSet::new();
    for part in &parts {
        prop_assert!(!part.is_empty());
        for &node in part {
            prop_assert!(seen.insert(node), "{node} appears in two components");
        }
    }
    let all: BTreeSet<_> = net.node_ids().into_iter().collect();
    prop_assert_eq!(seen, all);
    Ok(())
}

fn check_distance_symmetry(case: &Case) -> Result<(), TestCaseError> {
    let case = Case {
        directed: false,
        ..case.clone()
    };
    let (net, _) = case.build();
    let matrix = analysis::distance_matrix(&net, DistanceMetric::Hops, &CancelToken::new());
    for (source, row) in &matrix {
        for (target, distance) in row {
            let back = matrix.get(target).and_then(|row| row.get(source));
            prop_assert_eq!(back, Some(distance), "{} -> {}", source, target);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn generated_networks_are_consistent(case in any::<Case>()) {
        check_generated(&case)?;
    }

    #[test]
    fn explicit_sequences_are_realised_exactly(case in any::<Case>()) {
        check_explicit_degrees_kept(&case)?;
    }

    #[test]
    fn components_partition_the_nodes(case in any::<Case>()) {
        check_component_partition(&case)?;
    }

    #[test]
    fn hop_distances_are_symmetric_when_undirected(case in any::<Case>()) {
        check_distance_symmetry(&case)?;
    }
}
