use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use indexmap::IndexMap;
use itertools::Itertools;
use miette::{IntoDiagnostic, Result, WrapErr};
use resolver_core::{Reporter, Resolver, ResolverOptions};
use tabwriter::TabWriter;
use test_utils::{Candidate, FixtureProvider, Requirement};
use tracing_subscriber::EnvFilter;

mod reporter;

use reporter::TracingReporter;

/// Resolve a set of requirements against a JSON package index fixture.
#[derive(Debug, Parser)]
#[command(name = "resolver-cli", version, about)]
struct Cli {
    /// Path to a fixture JSON file describing the package index.
    index: PathBuf,

    /// Root requirements, each formatted as `name` or `name requirement`
    /// (e.g. `app`, `lib >=1.0.0, <2.0.0`).
    #[arg(required = true)]
    requirements: Vec<String>,

    /// How aggressively the search jumps over ancestor pins not implicated
    /// in a conflict, in `0.0..=1.0`.
    #[arg(long, default_value_t = ResolverOptions::default().optimistic_backjumping_ratio)]
    backjump_ratio: f64,

    /// Bias the search toward whichever package currently has the fewest
    /// remaining candidates.
    #[arg(long)]
    narrow: bool,

    /// Print the resolution as JSON instead of a tree.
    #[arg(long)]
    json: bool,

    /// Print a line for every engine lifecycle event as it happens.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();

    let index_contents = fs::read_to_string(&cli.index)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading fixture {}", cli.index.display()))?;

    let mut provider = FixtureProvider::from_json(&index_contents)
        .into_diagnostic()
        .wrap_err("parsing fixture")?;
    if cli.narrow {
        provider = provider.narrow_to_most_constrained();
    }

    let root_requirements = cli
        .requirements
        .iter()
        .map(|spec| parse_requirement(spec))
        .collect::<Result<Vec<_>>>()?;

    let options = ResolverOptions {
        optimistic_backjumping_ratio: cli.backjump_ratio,
        ..ResolverOptions::default()
    };

    let resolver = Resolver::with_options(provider, options)
        .with_reporter(TracingReporter::new(cli.verbose));

    let graph = resolver
        .resolve(root_requirements)
        .map_err(|error| miette::miette!("{error}"))?;

    if cli.json {
        print_json(&graph)?;
    } else {
        print_tree(&graph)?;
    }

    Ok(())
}

fn parse_requirement(spec: &str) -> Result<Requirement> {
    Requirement::parse(spec)
        .into_diagnostic()
        .wrap_err_with(|| format!("parsing requirement {spec:?}"))
}

fn print_json(graph: &resolver_core::ResolutionGraph<FixtureProvider>) -> Result<()> {
    let pins: IndexMap<String, String> = graph
        .mapping()
        .iter()
        .map(|(name, candidate)| (name.clone(), candidate.version.to_string()))
        .collect();
    let json = serde_json::to_string_pretty(&pins).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn print_tree(graph: &resolver_core::ResolutionGraph<FixtureProvider>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut tw = TabWriter::new(stdout.lock());

    writeln!(tw, "package\tversion").into_diagnostic()?;
    for (name, candidate) in graph.mapping().iter().sorted_by_key(|(name, _)| name.as_str()) {
        writeln!(tw, "{name}\t{}", candidate.version).into_diagnostic()?;
    }
    tw.flush().into_diagnostic()?;

    println!();
    let mut visited = HashSet::new();
    print_subtree(graph, None, 0, &mut visited);
    Ok(())
}

fn print_subtree(
    graph: &resolver_core::ResolutionGraph<FixtureProvider>,
    parent: Option<&Candidate>,
    depth: usize,
    visited: &mut HashSet<String>,
) {
    for child in graph.dependents_of(parent).sorted_by_key(|c| c.name.clone()) {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            console::style(&child.name).bold(),
            console::style(&child.version).dim(),
        );
        if visited.insert(child.name.clone()) {
            print_subtree(graph, Some(child), depth + 1, visited);
        }
    }
}
