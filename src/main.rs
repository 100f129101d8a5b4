use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mcsdr::{
    assign_descriptors,
    descriptor::{DEFAULT_DIAMETER, DEFAULT_TIMEOUT},
    loader, DescriptorArray, DescriptorOptions, MatchOptions, MatchResult, Minification,
    Molecule,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print rings, scaffolds and isolated fragments of a molecule
    Rings {
        path: PathBuf,

        /// Also print the molecule graph in Graphviz format
        #[arg(long)]
        dot: bool,
    },

    /// Compare two molecules
    Compare {
        a: PathBuf,
        b: PathBuf,

        #[command(flatten)]
        options: CompareArgs,
    },

    /// Compare every pair of molecules and write CSV to stdout
    Matrix {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: CompareArgs,
    },
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Largest line-graph distance between compared bonds
    #[arg(long, default_value_t = DEFAULT_DIAMETER)]
    diameter: u32,

    /// Budget per array and per comparison, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    /// Keep explicit hydrogens
    #[arg(long)]
    keep_hydrogens: bool,

    /// Fraction of the comparison budget spent building the product graph
    #[arg(long, default_value_t = 0.5)]
    share: f64,

    /// Decimal places of the similarity score
    #[arg(long, default_value_t = 3)]
    digits: u32,
}

impl CompareArgs {
    fn descriptor_options(&self) -> DescriptorOptions {
        DescriptorOptions::default()
            .diameter(self.diameter)
            .ignore_hydrogen(!self.keep_hydrogens)
            .timeout(Duration::from_millis(self.timeout_ms))
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions::default()
            .timeout(Duration::from_millis(self.timeout_ms))
            .construction_share(self.share)
    }
}

#[derive(Serialize)]
struct Row<'a> {
    a: &'a str,
    b: &'a str,
    edges: usize,
    local_sim: f64,
    valid: bool,
}

fn load(path: &Path) -> Result<Molecule> {
    let mut mol =
        loader::parse(path).with_context(|| format!("failed to parse {}", path.display()))?;
    if let Minification::Incomplete { scaffolds } = assign_descriptors(&mut mol)? {
        tracing::warn!(path = %path.display(), ?scaffolds, "ring set not fully minified");
    }
    Ok(mol)
}

fn rings(path: &Path, dot: bool) -> Result<()> {
    let mol = load(path)?;
    if dot {
        println!("{}", mol.info());
    }
    let topology = mol.topology();
    for (i, scaffold) in topology.scaffolds.iter().enumerate() {
        println!("scaffold {i}");
        for &r in scaffold {
            println!("  ring {r}: {:?}", topology.rings[r]);
        }
    }
    for fragment in &topology.isolated {
        println!("isolated: {fragment:?}");
    }
    Ok(())
}

fn compare(a: &Path, b: &Path, args: &CompareArgs) -> Result<()> {
    let (mol_a, mol_b) = (load(a)?, load(b)?);
    let result = mcsdr::compare(
        &mol_a,
        &mol_b,
        &args.descriptor_options(),
        &args.match_options(),
    )?;
    println!("edges: {}", result.edge_count());
    println!("local_sim: {}", result.local_sim(args.digits));
    println!("valid: {}", result.is_valid());
    Ok(())
}

fn matrix(paths: &[PathBuf], args: &CompareArgs) -> Result<()> {
    let descriptor = args.descriptor_options();
    let options = args.match_options();

    let arrays = paths
        .par_iter()
        .map(|p| -> Result<DescriptorArray> {
            Ok(DescriptorArray::new(&load(p)?, &descriptor)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let pairs: Vec<(usize, usize)> = (0..paths.len())
        .flat_map(|i| (i + 1..paths.len()).map(move |j| (i, j)))
        .collect();
    let results = pairs
        .par_iter()
        .map(|&(i, j)| MatchResult::from_arrays(&arrays[i], &arrays[j], &options))
        .collect::<mcsdr::Result<Vec<_>>>()?;

    let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    let mut writer = csv::Writer::from_writer(io::stdout());
    for (&(i, j), result) in pairs.iter().zip(&results) {
        writer.serialize(Row {
            a: &names[i],
            b: &names[j],
            edges: result.edge_count(),
            local_sim: result.local_sim(args.digits),
            valid: result.is_valid(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Rings { path, dot } => rings(path, *dot),
        Command::Compare { a, b, options } => compare(a, b, options),
        Command::Matrix { paths, options } => matrix(paths, options),
    }
}
