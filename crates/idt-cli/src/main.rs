//! IDT Archive CLI
//!
//! Command-line tool for inspecting exported installer tables and the
//! shortcuts they describe.

mod logging;

use clap::{Parser, Subcommand};
use idt_core::{parse_header, Database, ExportedTables, LoadConfig, Table, TableKind};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "idt-cli")]
#[command(about = "Exported installer table viewer", long_about = None)]
#[command(version)]
struct Cli {
    /// Load configuration file (JSON) providing roots and tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for exported table files
    Scan {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,
    },

    /// Parse and display a single exported table file
    Parse {
        /// Path to .idt file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a loaded table
    Show {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Table to show (Component, Directory, File, Property, Shortcut)
        #[arg(short, long)]
        table: TableKind,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,
    },

    /// Export a loaded table to a file
    Export {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Table to export
        #[arg(short, long)]
        table: TableKind,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Look up a value in the Property table
    Property {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Property name
        #[arg(short, long)]
        name: String,
    },

    /// Resolve a directory id to its install path
    Directory {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Directory id
        #[arg(long)]
        id: String,
    },

    /// List resolved shortcuts
    Shortcuts {
        /// Root directories to scan
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a load configuration file
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Root directories to include
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Tables to load (all when omitted)
        #[arg(short, long)]
        table: Vec<TableKind>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> idt_core::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Scan { root } => cmd_scan(&resolve_config(config, root)?),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::Show {
            root,
            table,
            limit,
            columns,
        } => cmd_show(&resolve_config(config, root)?, table, limit, columns),
        Commands::Export {
            root,
            table,
            format,
            output,
        } => cmd_export(&resolve_config(config, root)?, table, &format, &output),
        Commands::Property { root, name } => cmd_property(&resolve_config(config, root)?, &name),
        Commands::Directory { root, id } => cmd_directory(&resolve_config(config, root)?, &id),
        Commands::Shortcuts { root, json } => cmd_shortcuts(&resolve_config(config, root)?, json),
        Commands::CreateConfig {
            output,
            root,
            table,
        } => cmd_create_config(&output, root, table),
    }
}

/// Combine the `--config` file (if any) with roots given on the command line
fn resolve_config(config: Option<&Path>, roots: Vec<PathBuf>) -> idt_core::Result<LoadConfig> {
    let mut load = match config {
        Some(path) => LoadConfig::load(path)?,
        None => LoadConfig::new(Vec::new()),
    };
    load.roots.extend(roots);

    if load.roots.is_empty() {
        eprintln!("No root directories given. Use --root or --config.");
        std::process::exit(1);
    }

    Ok(load)
}

fn cmd_scan(config: &LoadConfig) -> idt_core::Result<()> {
    let exports = ExportedTables::scan(&config.roots)?;

    println!("Scanned {} root(s):", config.roots.len());
    for root in &config.roots {
        println!("  {}", root.display());
    }
    println!();
    println!("Found {} table export(s):", exports.len());
    for (kind, path) in exports.iter() {
        println!("  {:<10} {}", kind, path.display());
    }

    Ok(())
}

fn cmd_parse(file: &PathBuf) -> idt_core::Result<()> {
    let header = parse_header(file)?;
    let table = idt_core::load_table(file, &header)?;

    println!("File: {}", file.display());
    println!("Table: {}", header.table_name);
    match header.codepage {
        Some(cp) => println!("Codepage: {} ({})", cp, header.charset.name()),
        None => println!("Codepage: none ({})", header.charset.name()),
    }
    println!("Keys: {}", header.key_columns.join(", "));
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    print_table(&table, None, Some(10));
    Ok(())
}

fn cmd_show(
    config: &LoadConfig,
    kind: TableKind,
    limit: Option<usize>,
    columns: Option<String>,
) -> idt_core::Result<()> {
    let db = Database::from_config(config)?;
    let table = db.table(kind).ok_or(idt_core::Error::MissingTable(kind))?;

    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());
    print_table(table, col_filter.as_deref(), limit);

    Ok(())
}

fn print_table(table: &Table, filter: Option<&[&str]>, limit: Option<usize>) {
    let display_cols: Vec<&str> = table
        .columns()
        .iter()
        .map(|c| c.name())
        .filter(|name| filter.map_or(true, |f| f.contains(name)))
        .collect();

    // Print header
    println!("{}", display_cols.join("\t"));
    println!("{}", "-".repeat(display_cols.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(table.row_count());
    for row in table.rows().take(row_limit) {
        let values: Vec<String> = display_cols
            .iter()
            .filter_map(|name| row.get(name).ok())
            .map(|value| value.escape_debug().to_string())
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > row_limit {
        println!("... ({} more rows)", table.row_count() - row_limit);
    }
}

fn cmd_export(
    config: &LoadConfig,
    kind: TableKind,
    format: &str,
    output: &PathBuf,
) -> idt_core::Result<()> {
    let db = Database::from_config(config)?;
    let table = db.table(kind).ok_or(idt_core::Error::MissingTable(kind))?;

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);

    match format.to_lowercase().as_str() {
        "csv" => table.write_csv(&mut writer)?,
        "json" => {
            let json = serde_json::to_string_pretty(table)?;
            writeln!(writer, "{}", json)?;
        }
        _ => {
            eprintln!("Unknown format: {}. Supported formats: csv, json", format);
            std::process::exit(1);
        }
    }
    writer.flush()?;

    println!("Exported {} rows to {}", table.row_count(), output.display());

    Ok(())
}

fn cmd_property(config: &LoadConfig, name: &str) -> idt_core::Result<()> {
    let db = Database::from_config(config)?;

    match db.find_property(name)? {
        Some(value) => println!("{}", value),
        None => {
            eprintln!("Property '{}' not found", name);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn cmd_directory(config: &LoadConfig, id: &str) -> idt_core::Result<()> {
    let db = Database::from_config(config)?;
    println!("{}", db.directory_path(id)?.display());
    Ok(())
}

fn cmd_shortcuts(config: &LoadConfig, json: bool) -> idt_core::Result<()> {
    let db = Database::from_config(config)?;
    let shortcuts = db.list_shortcuts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&shortcuts)?);
        return Ok(());
    }

    println!("Shortcuts ({}):", shortcuts.len());
    for shortcut in &shortcuts {
        println!();
        println!("  Path:    {}", shortcut.path.display());
        println!("  Target:  {}", shortcut.target.display());
        println!("  WorkDir: {}", shortcut.work_dir.display());
    }

    Ok(())
}

fn cmd_create_config(
    output: &PathBuf,
    roots: Vec<PathBuf>,
    tables: Vec<TableKind>,
) -> idt_core::Result<()> {
    let mut config = LoadConfig::new(roots);
    if !tables.is_empty() {
        config.tables = tables;
    }

    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!();
    println!("Edit the file to configure your roots, then run:");
    println!("  idt-cli --config {} shortcuts", output.display());

    Ok(())
}
