//! Qido CLI - Compile QIDO-RS searches to T-SQL
//!
//! Usage:
//!   qido compile [KEY=VALUE ...] [--study <uid>] [--series <uid>] [--format <format>]
//!   qido compile --input <options.json>
//!   qido attributes
//!
//! Examples:
//!   qido compile StudyDate=20200101-20201231 Modality=CT limit=50
//!   qido compile --study 1.2.840.1 SOPInstanceUID=1.2.840.1.2.3 --format json
//!   qido attributes

use clap::{Parser, Subcommand, ValueEnum};
use qido::catalog::{self, Attribute};
use qido::config::Settings;
use qido::generator::{generate_in_schema, CompiledQuery};
use qido::qido::{parse_pair, parse_query};
use qido::query::{QueryOptions, QueryValue};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "qido")]
#[command(about = "Qido - Compiles DICOM QIDO-RS metadata searches into parameterized T-SQL")]
#[command(version)]
struct Cli {
    /// Path to a qido.toml settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search to SQL
    Compile {
        /// Search parameters as KEY=VALUE (keyword or tag, offset, limit)
        filters: Vec<String>,

        /// Study instance UID from the request path
        #[arg(long)]
        study: Option<String>,

        /// Series instance UID from the request path
        #[arg(long)]
        series: Option<String>,

        /// Read serialized query options from a JSON file instead
        #[arg(short, long, conflicts_with_all = ["filters", "study", "series"])]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,
    },

    /// List searchable attributes
    Attributes,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL with bound parameters as comments
    Sql,
    /// SQL, parameters and shape as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::discover(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging.level);

    match cli.command {
        Commands::Compile {
            filters,
            study,
            series,
            input,
            format,
        } => {
            let options = match input {
                Some(path) => read_options(&path, &settings),
                None => options_from_filters(&filters, study, series, &settings),
            };
            match options {
                Some(options) => cmd_compile(&options, &settings, format),
                None => ExitCode::FAILURE,
            }
        }
        Commands::Attributes => cmd_attributes(),
    }
}

/// Logs go to stderr so stdout carries only the compiled output.
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

fn options_from_filters(
    filters: &[String],
    study: Option<String>,
    series: Option<String>,
    settings: &Settings,
) -> Option<QueryOptions> {
    let mut pairs = Vec::with_capacity(filters.len());
    for filter in filters {
        match parse_pair(filter) {
            Ok(pair) => pairs.push(pair),
            Err(e) => {
                eprintln!("Error: {}", e);
                return None;
            }
        }
    }

    let mut options = match parse_query(pairs, &settings.limits) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return None;
        }
    };

    // Path segments take precedence over query keys.
    if let Some(uid) = study {
        options.study_instance_uid = Some(uid);
    }
    if let Some(uid) = series {
        options.series_instance_uid = Some(uid);
    }
    Some(options)
}

fn read_options(path: &Path, settings: &Settings) -> Option<QueryOptions> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };

    let options: QueryOptions = match serde_json::from_str(&source) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", path.display(), e);
            return None;
        }
    };

    // The file may carry any page size; the configured policy still applies.
    let requested = options.evaluated_limit;
    let options = options.with_limit_policy(&settings.limits);
    if options.evaluated_limit != requested {
        tracing::warn!(
            requested,
            applied = options.evaluated_limit,
            "evaluated_limit adjusted by limit policy"
        );
    }
    Some(options)
}

fn cmd_compile(options: &QueryOptions, settings: &Settings, format: OutputFormat) -> ExitCode {
    let compiled = match generate_in_schema(options, &settings.schema.name) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Sql => print_sql(&compiled),
        OutputFormat::Json => match serde_json::to_string_pretty(&compiled) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn print_sql(compiled: &CompiledQuery) {
    if !compiled.parameters.is_empty() {
        println!("-- Parameters: {}", compiled.parameter_declarations());
        for param in &compiled.parameters {
            println!("--   {} = {}", param.name, describe_value(&param.value));
        }
        println!();
    }
    println!("{}", compiled.sql);
}

fn describe_value(value: &QueryValue) -> String {
    match value {
        QueryValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        QueryValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
    }
}

fn cmd_attributes() -> ExitCode {
    println!("{:<12} {:<32} {:<20} Column", "Tag", "Keyword", "Table");
    for attribute in Attribute::ALL {
        let entry = catalog::resolve(attribute);
        println!(
            "{:<12} {:<32} {:<20} {}",
            attribute.tag().to_string(),
            attribute.keyword(),
            entry.table.to_string(),
            entry.column.name
        );
    }
    ExitCode::SUCCESS
}
