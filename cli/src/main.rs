//! `koi`: a small command-line front end for a Koillection server.

mod config;
mod printer;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use koillection_core::{
    delete_everything, Album, Client, ClientConfig, Collection, DatumIndex, Item, Tag, User, Wishlist,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Credentials, FileConfig};
use crate::printer::Printer;

#[derive(Parser, Debug)]
#[command(name = "koi", version)]
#[command(about = "Browse and manage a Koillection account", long_about = None)]
struct Cli {
    /// Config file; a bare name is looked up in the home directory
    #[arg(long, global = true)]
    config: Option<String>,
    #[arg(long, global = true, env = "KOILLECTION_SERVER")]
    server: Option<String>,
    #[arg(long, global = true, env = "KOILLECTION_USER")]
    user: Option<String>,
    #[arg(long, global = true, env = "KOILLECTION_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    /// Print every field, and the last exchange on failure
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List collections
    Collections,
    /// List the items of a collection
    Items { collection: String },
    /// Show one item with its data
    Item { id: String },
    /// List albums
    Albums,
    /// List wishlists
    Wishlists,
    /// List tags
    Tags,
    /// Show the account owner
    User,
    /// Show server metrics
    Metrics,
    /// Group the items of a collection by datum label and value
    Index {
        title: String,
        /// Only show this label
        #[arg(long)]
        label: Option<String>,
    },
    /// Delete everything the account owns
    Wipe {
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "koillection_core=debug" } else { "koillection_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn connect(cli: &Cli) -> Result<(ClientConfig, Credentials)> {
    let home: Option<PathBuf> = dirs::home_dir();
    let file = match config::locate(cli.config.as_deref(), home.as_deref())? {
        Some((path, required)) => config::load(&path, required)?,
        None => FileConfig::default(),
    };
    let overrides = FileConfig {
        server: cli.server.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
    };
    let credentials = config::resolve(file, overrides)?;
    let config = ClientConfig {
        base_url: credentials.server.clone(),
        timeout_secs: cli.timeout,
    };
    Ok((config, credentials))
}

fn run(cli: &Cli, client: &Client, out: &mut impl Write) -> Result<()> {
    let printer = Printer::new(0, cli.verbose);
    match &cli.command {
        Command::Collections => printer.print_all(out, &client.list_all::<Collection>()?)?,
        Command::Items { collection } => {
            let items = client.children(Collection::ITEMS, collection)?;
            printer.print_all(out, &items)?;
        }
        Command::Item { id } => {
            let item: Item = client.get(id)?;
            let data = client.children(Item::DATA, id)?;
            printer.print_item(out, &item, data)?;
        }
        Command::Albums => printer.print_all(out, &client.list_all::<Album>()?)?,
        Command::Wishlists => printer.print_all(out, &client.list_all::<Wishlist>()?)?,
        Command::Tags => printer.print_all(out, &client.list_all::<Tag>()?)?,
        Command::User => printer.print_all(out, &client.list_all::<User>()?)?,
        Command::Metrics => {
            for (name, value) in client.metrics()? {
                writeln!(out, "{name}: {value}")?;
            }
        }
        Command::Index { title, label } => {
            let index = DatumIndex::build(client, title)?;
            for name in index.labels().filter(|l| label.as_deref().map_or(true, |wanted| wanted == *l)) {
                writeln!(out, "{name}")?;
                for (value, items) in index.values(name) {
                    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
                    writeln!(out, "  {value}: {}", names.join(", "))?;
                }
            }
        }
        Command::Wipe { yes } => {
            anyhow::ensure!(*yes, "wipe deletes everything the account owns; pass --yes to confirm");
            match delete_everything(client) {
                Ok(deleted) => writeln!(out, "deleted {deleted} resource(s)")?,
                Err(err) => {
                    for failure in &err.failures {
                        writeln!(out, "failed: {failure}")?;
                    }
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, credentials) = match connect(&cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let mut client = Client::from_config(&config);
    info!(server = %config.base_url, user = %credentials.user, "connecting");

    let result = client
        .authenticate(&credentials.user, &credentials.password)
        .map_err(anyhow::Error::from)
        .and_then(|_| run(&cli, &client, &mut io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if cli.verbose {
                eprintln!("{}", client.dump(true));
            }
            ExitCode::FAILURE
        }
    }
}
