use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use netroute::config::{AppConfig, OutputFormat};
use netroute::network::edge_list;
use netroute::routing::{forwarding_tables, ForwardingTable, PathReport};
use netroute::Topology;

#[derive(Parser)]
#[command(name = "netroute", about = "Link-state forwarding tables for an edge-list topology")]
struct Cli {
    /// JSON config file; defaults apply when it does not exist
    #[arg(long, default_value = "netroute.json")]
    config: PathBuf,

    /// Override the configured output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the forwarding table of one node
    Table {
        file: PathBuf,
        #[arg(long)]
        source: String,
    },
    /// Print the forwarding table of every node
    Tables { file: PathBuf },
    /// Print the shortest path between two nodes
    Path {
        file: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Check that a file loads and report its size
    Validate { file: PathBuf },
    /// Apply edits to a topology file and write the result
    Rewrite {
        file: PathBuf,
        /// Destination file; defaults to overwriting the input
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long = "add-node")]
        add_nodes: Vec<String>,
        #[arg(long = "remove-node")]
        remove_nodes: Vec<String>,
        /// Edge as src,dst,weight
        #[arg(long = "add-edge")]
        add_edges: Vec<String>,
        /// Edge as src,dst
        #[arg(long = "remove-edge")]
        remove_edges: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let output = cli.output.unwrap_or(config.output);

    match cli.command {
        Command::Table { file, source } => {
            let topology = load(&file, &config)?;
            let table = ForwardingTable::build(&topology, &source)?;
            match output {
                OutputFormat::Text => print!("{}", table),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
        }
        Command::Tables { file } => {
            let topology = load(&file, &config)?;
            let tables = forwarding_tables(&topology)?;
            match output {
                OutputFormat::Text => {
                    for table in &tables {
                        println!("{}", table);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
            }
        }
        Command::Path { file, from, to } => {
            let topology = load(&file, &config)?;
            let report = PathReport::build(&topology, &from, &to)?;
            match output {
                OutputFormat::Text => match report.cost {
                    Some(cost) => println!("{} (cost {})", report.hops.join(" -> "), cost),
                    None => println!("{} is unreachable from {}", to, from),
                },
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Command::Validate { file } => {
            let topology = load(&file, &config)?;
            println!(
                "{}: {} nodes, {} links (duplicate edges: {:?})",
                file.display(),
                topology.node_count(),
                topology.edge_count(),
                topology.policy()
            );
        }
        Command::Rewrite {
            file,
            out,
            add_nodes,
            remove_nodes,
            add_edges,
            remove_edges,
        } => {
            let mut topology = load(&file, &config)?;

            for label in add_nodes {
                topology.add_node(label)?;
            }
            for spec in &add_edges {
                let [from, to, cost] = split_fields::<3>(spec)?;
                let Some(cost) = edge_list::parse_weight(cost) else {
                    bail!("invalid weight in --add-edge {}", spec);
                };
                topology.add_edge(from, to, cost)?;
            }
            for spec in &remove_edges {
                let [from, to] = split_fields::<2>(spec)?;
                topology.remove_edge(from, to)?;
            }
            for label in &remove_nodes {
                topology.remove_node(label)?;
            }

            let target = out.unwrap_or(file);
            edge_list::save_to_file(&topology, &target)?;
            info!("Rewrote {}", target.display());
            println!(
                "{}: {} nodes, {} links",
                target.display(),
                topology.node_count(),
                topology.edge_count()
            );
        }
    }

    Ok(())
}

fn load(file: &Path, config: &AppConfig) -> Result<Topology> {
    edge_list::load_from_file_with_policy(file, config.edge_policy)
        .with_context(|| format!("loading topology {}", file.display()))
}

fn split_fields<const N: usize>(spec: &str) -> Result<[&str; N]> {
    let fields: Vec<&str> = spec.split(',').map(str::trim).collect();
    match <[&str; N]>::try_from(fields) {
        Ok(fields) => Ok(fields),
        Err(_) => bail!("expected {} comma-separated fields, got {:?}", N, spec),
    }
}
