// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mg_common::cli::oxide_cli_style;
use mg_common::{print_nopipe, println_nopipe};
use prefixadm::advertised::{
    filter_routes, parse_structured, to_pretty_json, Renderer,
};
use prefixadm::config::{init_log, load_tag_names, read_json};
use prefixadm::tags::TagNameStore;
use rdb::types::{
    AdjacencyDatabase, AdvertisedRouteDetail, Prefix, PrefixType,
    UnicastRoute,
};
use slog::{debug, Logger};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    styles = oxide_cli_style(),
    infer_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file mapping route tags to display names.
    #[arg(long, env = "PREFIXADM_TAG_NAMES")]
    tag_names: Option<PathBuf>,

    /// Write bunyan formatted logs to this file instead of stderr.
    #[arg(long, env = "PREFIXADM_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show advertised routes and the outcome of route selection.
    Advertised(AdvertisedArgs),

    /// Forwarding table commands.
    #[command(subcommand)]
    Fib(FibCommands),

    /// Print the JSON schema of the advertised route document.
    Schema,
}

#[derive(Debug, Args)]
struct AdvertisedArgs {
    /// Advertised route document, `-` for stdin.
    #[arg(short, long)]
    input: PathBuf,

    /// Show every field of each entry.
    #[arg(long, conflicts_with = "json")]
    detail: bool,

    /// Emit the structured document instead of text.
    #[arg(long)]
    json: bool,

    /// Only show prefixes whose forwarding entry has this origin.
    #[arg(long)]
    prefix_type: Option<PrefixType>,

    /// Only show these prefixes.
    prefixes: Vec<Prefix>,
}

#[derive(Subcommand, Debug)]
enum FibCommands {
    /// Show unicast routes programmed in the forwarding table.
    Routes {
        /// Unicast route list, `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,

        /// Adjacency database used to name next hop neighbors.
        #[arg(long)]
        adjacencies: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = init_log(cli.log_file.as_deref())?;

    let names = load_tag_names(cli.tag_names.as_deref())?;
    debug!(log, "loaded tag names"; "count" => names.len());
    let renderer =
        Renderer::new(Arc::new(TagNameStore::new(names)), log.clone());

    match cli.command {
        Commands::Advertised(args) => advertised(args, &renderer, &log)?,
        Commands::Fib(FibCommands::Routes { input, adjacencies }) => {
            let routes: Vec<UnicastRoute> = read_json(&input)?;
            let adjacencies: Option<AdjacencyDatabase> =
                adjacencies.map(|p| read_json(&p)).transpose()?;
            let out =
                renderer.render_unicast_routes(&routes, adjacencies.as_ref())?;
            print_nopipe!("{out}");
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(Vec<AdvertisedRouteDetail>);
            println_nopipe!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

fn advertised(
    args: AdvertisedArgs,
    renderer: &Renderer,
    log: &Logger,
) -> Result<()> {
    let routes = parse_structured(read_json(&args.input)?)?;
    let routes = filter_routes(&routes, &args.prefixes, args.prefix_type);
    debug!(log, "advertised routes selected"; "prefixes" => routes.len());

    let out = if args.json {
        to_pretty_json(&renderer.render_structured(&routes)?)?
    } else if args.detail {
        renderer.render_detailed(&routes)?
    } else {
        renderer.render_table(&routes)?
    };
    print_nopipe!("{out}");
    Ok(())
}
