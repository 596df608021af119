//! dirsql command-line front end.
//!
//! Loads a RON config, registers its roots, opens a session and runs one
//! query or introspection call.
//!
//! Usage:
//!   dirsql --config roots.ron --catalog docs query "SELECT name FROM docs/*"
//!   dirsql --config roots.ron tables --pattern '%.xml' --type FILE
//!   dirsql --config roots.ron --flavor xml columns --table 'a.xml'
//!   dirsql --config roots.ron --json roots

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dirsql_driver::{ConnectionProperties, Driver, DriverConfig, Flavor, Session};
use dirsql_types::{TabularResult, Value};

/// SQL-like queries over directory trees and XML documents.
#[derive(Parser, Debug)]
#[command(name = "dirsql")]
#[command(about = "Query directories and XML documents with SQL")]
struct Args {
    /// RON file listing the virtual roots
    #[arg(short, long, default_value = "dirsql.ron")]
    config: PathBuf,

    /// Catalog to bind the session to (defaults to the first root)
    #[arg(long)]
    catalog: Option<String>,

    /// Backing-store flavor: file or xml
    #[arg(long, default_value = "file")]
    flavor: Flavor,

    /// Identity to connect as
    #[arg(short, long)]
    user: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a SELECT
    Query { sql: String },
    /// List the roots visible to this identity
    Roots,
    /// List tables under a catalog
    Tables {
        /// Catalog to list (defaults to the bound catalog; add /* to recurse)
        #[arg(long = "in")]
        within: Option<String>,
        /// LIKE pattern over table names
        #[arg(long)]
        pattern: Option<String>,
        /// Table types to keep (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
    },
    /// List the columns of matching tables
    Columns {
        #[arg(long = "in")]
        within: Option<String>,
        /// LIKE pattern over table names
        #[arg(long)]
        table: Option<String>,
        /// LIKE pattern over column names
        #[arg(long)]
        column: Option<String>,
    },
    /// Show the identifying columns of one table
    Keys {
        table: String,
        #[arg(long = "in")]
        within: Option<String>,
    },
    /// List the table types of the flavor
    Types,
    /// List named external data sources
    Sources,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = DriverConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let driver = Driver::from_config(&config).context("registering roots")?;

    let result = match &args.command {
        Command::Sources => return print_sources(&driver, args.json),
        command => run(&driver, &args, command)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records(&result))?);
    } else {
        print_table(&result);
    }
    Ok(())
}

fn run(driver: &Driver, args: &Args, command: &Command) -> Result<TabularResult> {
    let session = connect(driver, args)?;
    let metadata = session.metadata();
    let result = match command {
        Command::Query { sql } => session.execute_query(sql)?,
        Command::Roots => metadata.list_roots()?,
        Command::Tables {
            within,
            pattern,
            types,
        } => {
            let types = (!types.is_empty()).then_some(types.as_slice());
            metadata.list_tables(within.as_deref(), pattern.as_deref(), types)?
        }
        Command::Columns {
            within,
            table,
            column,
        } => metadata.list_columns(within.as_deref(), table.as_deref(), column.as_deref())?,
        Command::Keys { table, within } => {
            metadata.list_identifying_columns(within.as_deref(), table)?
        }
        Command::Types => metadata.list_table_types()?,
        Command::Sources => TabularResult::empty(Vec::new()),
    };
    session.close();
    Ok(result)
}

fn print_sources(driver: &Driver, json: bool) -> Result<()> {
    let sources = driver.data_sources();
    if json {
        println!("{}", serde_json::to_string_pretty(&sources)?);
    } else {
        for source in sources {
            let scope = if source.system { "system" } else { "user" };
            println!("{}\t{}\t{}", source.name, scope, source.description);
        }
    }
    Ok(())
}

fn connect(driver: &Driver, args: &Args) -> Result<Session> {
    let catalog = match &args.catalog {
        Some(catalog) => catalog.clone(),
        None => match driver.registry().names().into_iter().next() {
            Some(first) => first,
            None => bail!("no roots configured in {}", args.config.display()),
        },
    };
    let mut props = ConnectionProperties::new().with("catalog", catalog);
    if let Some(user) = &args.user {
        props.set("user", user.clone());
    }
    let url = args.flavor.url_prefix();
    tracing::debug!(url, catalog = ?props.catalog(), "connecting");
    driver
        .connect(url, &props)?
        .with_context(|| format!("no driver for {}", url))
}

/// Rows as JSON objects keyed by column name.
fn records(result: &TabularResult) -> Vec<serde_json::Map<String, serde_json::Value>> {
    result
        .rows()
        .map(|row| {
            result
                .columns()
                .iter()
                .zip(row.values())
                .map(|(col, value)| (col.name().to_string(), json_value(value)))
                .collect()
        })
        .collect()
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(bytes) => serde_json::Value::from(bytes.len()),
    }
}

fn print_table(result: &TabularResult) {
    let cells: Vec<Vec<String>> = result
        .rows()
        .map(|row| row.values().map(ToString::to_string).collect())
        .collect();
    let mut widths: Vec<usize> = result.columns().iter().map(|c| c.name().len()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(result.columns().iter().map(|c| c.name()).collect()));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    );
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    eprintln!("({} rows)", result.row_count());
}
