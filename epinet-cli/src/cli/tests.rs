//! Unit tests for CLI command execution.

use super::test_helpers::{
    create_text_file, run_cli_expecting_error, seeded_ring, simulate, temp_dir,
};
use super::{
    Cli, CliError, Command, EngineKind, ExecutionSummary, GenerateCommand, SimulateCommand,
    TopologyArgs, TopologyKind, render_summary, run_cli,
};

use std::process::ExitCode;

use clap::Parser;
use epinet_core::{GeneratorError, SimulationError};
use epinet_providers_edgelist::EdgeListError;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use epinet_test_support::tracing::RecordingLayer;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn generate(topology: TopologyArgs) -> Cli {
    Cli {
        command: Command::Generate(GenerateCommand {
            topology,
            output: None,
        }),
    }
}

fn percolation(topology: TopologyArgs, transmissibility: f64) -> SimulateCommand {
    SimulateCommand {
        topology,
        engine: EngineKind::Percolation,
        transmissibility,
        ..SimulateCommand::default()
    }
}

fn same_exit(left: ExitCode, right: ExitCode) -> bool {
    format!("{left:?}") == format!("{right:?}")
}

#[rstest]
fn generate_ring_reports_structure() -> TestResult {
    let summary = run_cli(generate(seeded_ring(10)))?;
    assert_eq!(summary.command, "generate");
    assert!(summary.epidemic.is_none());

    let network = summary.network;
    assert_eq!(network.nodes, 10);
    assert_eq!(network.edges, 10);
    assert!((network.mean_degree - 2.0).abs() < 1e-12);
    assert_eq!(network.components, 1);
    assert_eq!(network.largest_component, 10);
    assert!(network.simple);
    Ok(())
}

#[rstest]
#[case(false, 12)]
#[case(true, 20)]
fn generate_square_lattice_uses_rows(#[case] diagonals: bool, #[case] edges: usize) -> TestResult {
    let summary = run_cli(generate(TopologyArgs {
        topology: TopologyKind::Square,
        nodes: 9,
        rows: Some(3),
        diagonals,
        seed: Some(4),
        ..TopologyArgs::default()
    }))?;
    assert_eq!(summary.network.nodes, 9);
    assert_eq!(summary.network.edges, edges);
    Ok(())
}

#[rstest]
fn square_lattice_requires_rows() {
    let err = run_cli_expecting_error(
        generate(TopologyArgs {
            topology: TopologyKind::Square,
            nodes: 9,
            ..TopologyArgs::default()
        }),
        "square lattice without rows must fail",
    );
    assert!(matches!(err, CliError::InvalidArgument { name: "rows", .. }));
    assert_eq!(err.code(), "CLI_INVALID_ARGUMENT");
    assert!(same_exit(err.exit_code(), ExitCode::from(2)));
}

#[rstest]
fn invalid_generator_parameter_surfaces_core_error() {
    let err = run_cli_expecting_error(
        generate(TopologyArgs {
            topology: TopologyKind::Ring,
            nodes: 4,
            k: 2,
            ..TopologyArgs::default()
        }),
        "ring with k too large must fail",
    );
    assert!(matches!(
        err,
        CliError::Generator(GeneratorError::InvalidParameter { name: "k", .. })
    ));
    assert_eq!(err.code(), "GENERATOR_INVALID_PARAMETER");
    assert!(same_exit(err.exit_code(), ExitCode::from(2)));
}

#[rstest]
#[case(TopologyKind::ErdosRenyi)]
#[case(TopologyKind::FastRandom)]
#[case(TopologyKind::SmallWorld)]
#[case(TopologyKind::Poisson)]
#[case(TopologyKind::Exponential)]
#[case(TopologyKind::PowerLaw)]
fn random_topologies_build_requested_population(#[case] topology: TopologyKind) -> TestResult {
    let summary = run_cli(generate(TopologyArgs {
        topology,
        nodes: 200,
        cutoff: 5.0,
        seed: Some(99),
        ..TopologyArgs::default()
    }))?;
    assert_eq!(summary.network.nodes, 200);
    assert!(summary.network.largest_component <= 200);
    Ok(())
}

#[rstest]
fn generated_edge_list_loads_back_for_simulation() -> TestResult {
    let dir = temp_dir();
    let path = dir.path().join("ring.csv");
    let generated = run_cli(Cli {
        command: Command::Generate(GenerateCommand {
            topology: seeded_ring(12),
            output: Some(path.clone()),
        }),
    })?;

    let mut command = percolation(seeded_ring(12), 1.0);
    command.input = Some(path);
    let simulated = run_cli(simulate(command))?;

    assert_eq!(simulated.network, generated.network);
    let epidemic = simulated.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.epidemic_size, 12);
    Ok(())
}

#[rstest]
fn certain_percolation_sweeps_the_ring() -> TestResult {
    let summary = run_cli(simulate(percolation(seeded_ring(20), 1.0)))?;
    let epidemic = summary.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.engine, "percolation");
    assert_eq!(epidemic.epidemic_size, 20);

    let first = epidemic.steps.first().ok_or("steps must be recorded")?;
    assert_eq!(first.time, 0.0);
    assert_eq!(first.counts.infectious, 1);
    assert_eq!(first.counts.susceptible, 19);

    let last = epidemic.steps.last().ok_or("steps must be recorded")?;
    assert_eq!(last.counts.resistant, 20);
    assert_eq!(last.counts.infectious, 0);
    assert!((last.time - epidemic.duration).abs() < 1e-12);
    assert!(epidemic.steps.windows(2).all(|pair| pair[0].time < pair[1].time));
    Ok(())
}

#[rstest]
fn certain_chain_binomial_sweeps_the_ring() -> TestResult {
    let summary = run_cli(simulate(SimulateCommand {
        topology: seeded_ring(20),
        engine: EngineKind::ChainBinomial,
        transmissibility: 1.0,
        period: 2,
        ..SimulateCommand::default()
    }))?;
    let epidemic = summary.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.engine, "chain_binomial");
    assert_eq!(epidemic.epidemic_size, 20);
    Ok(())
}

#[rstest]
fn gillespie_with_permanent_immunity_runs_to_extinction() -> TestResult {
    let summary = run_cli(simulate(SimulateCommand {
        topology: seeded_ring(30),
        engine: EngineKind::Gillespie,
        initial: 3,
        ..SimulateCommand::default()
    }))?;
    let epidemic = summary.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.engine, "gillespie");

    let last = epidemic.steps.last().ok_or("steps must be recorded")?;
    assert_eq!(last.counts.exposed, 0);
    assert_eq!(last.counts.infectious, 0);
    assert_eq!(last.counts.resistant, epidemic.epidemic_size);
    assert!(epidemic.epidemic_size >= 3);
    Ok(())
}

#[rstest]
fn gillespie_with_waning_immunity_needs_a_limit() {
    let err = run_cli_expecting_error(
        simulate(SimulateCommand {
            topology: seeded_ring(30),
            engine: EngineKind::Gillespie,
            immunity_duration: Some(2.0),
            ..SimulateCommand::default()
        }),
        "unbounded Gillespie run must be rejected",
    );
    assert!(matches!(err, CliError::UnboundedRun));
    assert_eq!(err.code(), "CLI_UNBOUNDED_RUN");
    assert!(same_exit(err.exit_code(), ExitCode::from(2)));
}

#[rstest]
fn gillespie_with_waning_immunity_honours_the_limit() -> TestResult {
    let summary = run_cli(simulate(SimulateCommand {
        topology: seeded_ring(30),
        engine: EngineKind::Gillespie,
        immunity_duration: Some(2.0),
        limit: Some(5.0),
        ..SimulateCommand::default()
    }))?;
    let epidemic = summary.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.engine, "gillespie");
    assert!(!epidemic.steps.is_empty());
    assert!(epidemic.duration <= 5.0, "ran for {}", epidemic.duration);
    assert!(epidemic.steps.iter().all(|step| step.time <= 5.0));
    Ok(())
}

#[rstest]
#[case(EngineKind::Gillespie, 2.5)]
#[case(EngineKind::Percolation, 2.0)]
#[case(EngineKind::ChainBinomial, 2.0)]
fn time_limit_is_never_overshot(
    #[case] engine: EngineKind,
    #[case] expected: f64,
) -> TestResult {
    let summary = run_cli(simulate(SimulateCommand {
        topology: seeded_ring(60),
        engine,
        transmissibility: 1.0,
        contact_rate: 20.0,
        recovery_rate: 0.1,
        limit: Some(2.5),
        ..SimulateCommand::default()
    }))?;
    let epidemic = summary.epidemic.ok_or("simulate must report an epidemic")?;
    assert_eq!(epidemic.duration, expected);
    assert!(epidemic.steps.windows(2).all(|pair| pair[0].time < pair[1].time));
    let last = epidemic.steps.last().ok_or("steps must be recorded")?;
    assert_eq!(last.time, expected);
    Ok(())
}

#[rstest]
#[case(1.5)]
#[case(-0.1)]
fn out_of_range_transmissibility_is_rejected(#[case] transmissibility: f64) {
    let err = run_cli_expecting_error(
        simulate(percolation(seeded_ring(10), transmissibility)),
        "invalid transmissibility must fail",
    );
    assert!(matches!(
        err,
        CliError::Simulation(SimulationError::InvalidParameter {
            name: "transmissibility",
            ..
        })
    ));
    assert_eq!(err.code(), "SIMULATION_INVALID_PARAMETER");
    assert!(same_exit(err.exit_code(), ExitCode::from(2)));
}

#[rstest]
#[case(0)]
#[case(11)]
fn infection_count_must_fit_the_population(#[case] initial: usize) {
    let mut command = percolation(seeded_ring(10), 0.5);
    command.initial = initial;
    let err = run_cli_expecting_error(simulate(command), "bad infection count must fail");
    assert!(matches!(
        err,
        CliError::Simulation(SimulationError::InvalidInfectionCount { .. })
    ));
    assert!(same_exit(err.exit_code(), ExitCode::FAILURE));
}

#[rstest]
fn missing_input_reports_io_error() {
    let dir = temp_dir();
    let mut command = percolation(seeded_ring(10), 0.5);
    command.input = Some(dir.path().join("missing.csv"));
    let err = run_cli_expecting_error(simulate(command), "missing input must fail");
    match &err {
        CliError::Io { path, .. } => assert!(path.ends_with("missing.csv")),
        other => panic!("expected Io error, got {other:?}"),
    }
    assert_eq!(err.code(), "CLI_IO");
    assert!(same_exit(err.exit_code(), ExitCode::FAILURE));
}

#[rstest]
fn malformed_input_reports_edge_list_error() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "broken.csv", "a,b\na,b,c\n")?;
    let mut command = percolation(seeded_ring(10), 0.5);
    command.input = Some(path);
    let err = run_cli_expecting_error(simulate(command), "malformed input must fail");
    assert!(matches!(
        err,
        CliError::EdgeList(EdgeListError::MalformedLine { line: 2, .. })
    ));
    assert_eq!(err.code(), "EDGELIST_MALFORMED_LINE");
    Ok(())
}

#[rstest]
fn render_summary_outputs_epidemic_table() -> TestResult {
    let summary: ExecutionSummary = run_cli(simulate(percolation(seeded_ring(6), 1.0)))?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.first().copied(), Some("command: simulate"));
    assert!(lines.contains(&"nodes: 6"));
    assert!(lines.contains(&"components: 1 (largest 6)"));
    assert!(lines.contains(&"engine: percolation"));
    assert!(lines.contains(&"epidemic size: 6"));
    let header = lines
        .iter()
        .position(|line| *line == "time\tS\tE\tI\tR")
        .ok_or("table header must be rendered")?;
    assert_eq!(lines.get(header + 1).copied(), Some("0.000\t5\t0\t1\t0"));
    assert_eq!(lines.last().map(|line| line.ends_with("\t0\t0\t0\t6")), Some(true));
    Ok(())
}

#[rstest]
fn clap_parses_generate_flags() -> TestResult {
    let cli = Cli::try_parse_from([
        "epinet",
        "generate",
        "--topology",
        "square",
        "--nodes",
        "16",
        "--rows",
        "4",
        "--diagonals",
        "--seed",
        "7",
    ])?;
    let Command::Generate(command) = cli.command else {
        panic!("expected generate command");
    };
    assert_eq!(command.topology.topology, TopologyKind::Square);
    assert_eq!(command.topology.nodes, 16);
    assert_eq!(command.topology.rows, Some(4));
    assert!(command.topology.diagonals);
    assert_eq!(command.topology.seed, Some(7));
    assert!(command.output.is_none());
    Ok(())
}

#[rstest]
fn clap_parses_simulate_defaults_and_engine() -> TestResult {
    let cli = Cli::try_parse_from([
        "epinet",
        "simulate",
        "--engine",
        "chain-binomial",
        "--topology",
        "power-law",
    ])?;
    let Command::Simulate(command) = cli.command else {
        panic!("expected simulate command");
    };
    assert_eq!(command.engine, EngineKind::ChainBinomial);
    assert_eq!(command.topology.topology, TopologyKind::PowerLaw);
    assert_eq!(command.initial, 1);
    assert_eq!(command.period, 3);
    assert!(command.limit.is_none());
    assert!(command.immunity_duration.is_none());
    Ok(())
}

#[rstest]
#[case(&["epinet", "generate", "--topology", "hexagonal"])]
#[case(&["epinet", "simulate", "--engine", "agent-based"])]
#[case(&["epinet", "simulate", "--nodes", "many"])]
fn clap_rejects_unknown_values(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn generate_emits_tracing_fields() -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let summary = tracing::subscriber::with_default(subscriber, || run_cli(generate(seeded_ring(10))))?;
    assert_eq!(summary.network.edges, 10);

    let run = layer.span("cli.run").expect("cli.run span must exist");
    assert_eq!(run.fields.get("command"), Some(&"generate".to_owned()));

    let generate = layer.span("cli.generate").expect("cli.generate span must exist");
    assert_eq!(generate.fields.get("topology"), Some(&"ring".to_owned()));
    assert_eq!(generate.fields.get("nodes"), Some(&"10".to_owned()));

    let build = layer
        .span("cli.build_network")
        .expect("cli.build_network span must exist");
    assert_eq!(build.fields.get("directed"), Some(&"false".to_owned()));

    assert!(layer.events().iter().any(|event| {
        event.level == Level::INFO
            && event
                .fields
                .get("message")
                .is_some_and(|value| value == "network generated")
            && event.fields.get("edges").is_some_and(|value| value == "10")
    }));
    Ok(())
}

#[rstest]
fn configuration_models_ignore_the_directed_flag() -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let topology = TopologyArgs {
        topology: TopologyKind::Poisson,
        nodes: 50,
        directed: true,
        seed: Some(3),
        ..TopologyArgs::default()
    };

    tracing::subscriber::with_default(subscriber, || run_cli(generate(topology)))?;
    let build = layer
        .span("cli.build_network")
        .expect("cli.build_network span must exist");
    assert_eq!(build.fields.get("directed"), Some(&"false".to_owned()));
    Ok(())
}

#[rstest]
fn simulate_records_engine_and_source() -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        run_cli(simulate(percolation(seeded_ring(10), 0.5)))
    })?;

    let run = layer.span("cli.run").expect("cli.run span must exist");
    assert_eq!(run.fields.get("command"), Some(&"simulate".to_owned()));
    let span = layer.span("cli.simulate").expect("cli.simulate span must exist");
    assert_eq!(span.fields.get("engine"), Some(&"percolation".to_owned()));
    assert_eq!(span.fields.get("source"), Some(&"ring".to_owned()));
    assert!(layer.events().iter().any(|event| {
        event
            .fields
            .get("message")
            .is_some_and(|value| value == "simulation completed")
    }));
    Ok(())
}

#[rstest]
fn load_failure_records_path() {
    let dir = temp_dir();
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let mut command = percolation(seeded_ring(10), 0.5);
    command.input = Some(dir.path().join("absent.csv"));

    let err = tracing::subscriber::with_default(subscriber, || run_cli(simulate(command)))
        .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Io { .. }));

    let load = layer
        .span("cli.load_network")
        .expect("cli.load_network span must exist");
    assert!(
        load.fields
            .get("path")
            .is_some_and(|value| value.ends_with("absent.csv"))
    );
    let span = layer.span("cli.simulate").expect("cli.simulate span must exist");
    assert_eq!(span.fields.get("source"), Some(&"edge-list".to_owned()));
    assert!(
        layer
            .events()
            .iter()
            .any(|event| event.level == Level::ERROR),
        "instrumented errors must be logged"
    );
}
