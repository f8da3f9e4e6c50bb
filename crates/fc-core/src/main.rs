//! fc-core CLI: list demo concepts and run scripted lifecycle sessions
//! against the in-memory concept service.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fc_common::{Error, Result};
use fc_config::{resolve_config, validate::validate, ConfigPaths, Settings};
use fc_core::exit_codes::ExitCode;
use fc_core::logging::{init_logging, LogFormat};
use fc_core::script::{parse_script, ScriptRunner, StepOutcome};
use fc_core::{
    Concept, ConceptFilter, ConceptService, ConceptStatus, ConceptType, ListQuery, ListResponse,
    Periodicity,
};
use tracing::{debug, error, info};

#[derive(Debug, Parser)]
#[command(name = "fc-core", version, about = "Financial concept lifecycle and versioning")]
struct Cli {
    /// Settings file (overrides FC_CONFIG and the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log line format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the simulated service latency
    #[arg(long, global = true)]
    latency_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List concepts from a freshly seeded service
    List(ListArgs),
    /// Execute a JSON script of operations against one session
    Run {
        /// Path to the script file
        script: PathBuf,
    },
    /// Show resolved settings and validation issues
    Config,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    status: Option<ConceptStatus>,
    #[arg(long)]
    periodicity: Option<Periodicity>,
    #[arg(long)]
    concept_type: Option<ConceptType>,
    /// Substring matched against name, description and code
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    page_size: Option<usize>,
}

impl ListArgs {
    fn into_query(self, default_page_size: usize) -> ListQuery {
        ListQuery {
            filter: ConceptFilter {
                status: self.status,
                periodicity: self.periodicity,
                concept_type: self.concept_type,
                search: self.search,
            },
            page: self.page,
            page_size: self.page_size.unwrap_or(default_page_size),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "command failed");
            eprintln!("fc-core: {}", e);
            ExitCode::for_error(&e)
        }
    };
    if !code.is_success() {
        debug!(exit_code = code.as_i32(), "exiting with failure status");
    }
    std::process::exit(code.as_i32());
}

async fn execute(cli: Cli) -> Result<ExitCode> {
    let resolved = resolve_config(&ConfigPaths {
        explicit: cli.config.clone(),
    })?;
    let mut settings = resolved.settings.clone();
    if let Some(latency_ms) = cli.latency_ms {
        settings.latency_ms = latency_ms;
    }
    let issues = validate(&settings);

    if let Command::Config = cli.command {
        match cli.format {
            OutputFormat::Json => {
                let doc = serde_json::json!({
                    "source": resolved.source,
                    "settings": settings,
                    "issues": issues,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            OutputFormat::Text => {
                println!("source: {:?}", resolved.source);
                print_settings(&settings);
                for issue in &issues {
                    println!("issue: {}", issue);
                }
            }
        }
        return Ok(if issues.is_empty() {
            ExitCode::Clean
        } else {
            ExitCode::ConfigError
        });
    }

    if !issues.is_empty() {
        let joined: Vec<String> = issues.iter().map(ToString::to_string).collect();
        return Err(Error::Config(joined.join("; ")));
    }

    let service = ConceptService::new(&settings);
    info!(latency_ms = settings.latency_ms, seeded = settings.seed_demo_data, "service ready");

    match cli.command {
        Command::List(args) => {
            let query = args.into_query(settings.page_size);
            let page = service.list(&query).await?;
            let response = ListResponse::new(page, &query);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Text => {
                    for concept in &response.items {
                        println!("{}", concept_line(concept));
                    }
                    println!(
                        "page {} ({} per page), {} total",
                        response.page, response.page_size, response.total
                    );
                }
            }
            Ok(ExitCode::Clean)
        }
        Command::Run { script } => {
            let content = fs::read_to_string(&script)?;
            let ops = parse_script(&content)?;
            let outcomes = ScriptRunner::new(&service).run(ops).await;
            for outcome in &outcomes {
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string(outcome)?),
                    OutputFormat::Text => println!("{}", outcome_line(outcome)),
                }
            }
            Ok(if outcomes.iter().all(|o| o.ok) {
                ExitCode::Clean
            } else {
                ExitCode::StepsFailed
            })
        }
        Command::Config => Ok(ExitCode::Clean),
    }
}

fn print_settings(settings: &Settings) {
    println!("defaultCurrency: {}", settings.default_currency);
    println!("actorName: {}", settings.actor_name);
    println!("pageSize: {}", settings.page_size);
    println!("latencyMs: {}", settings.latency_ms);
    println!("seedDemoData: {}", settings.seed_demo_data);
}

fn concept_line(c: &Concept) -> String {
    let next = c
        .versioning
        .next
        .as_ref()
        .map(|n| format!(" next={}@{}", n.base_amount, n.valid_from))
        .unwrap_or_default();
    format!(
        "{:<16} {:<24} {:<5} {:<9} {:>10} {} {:<9} {:<9}{}",
        c.code,
        c.name,
        c.concept_type,
        c.calculation.method,
        c.calculation.base_amount,
        c.calculation.currency,
        c.periodicity,
        c.status,
        next
    )
}

fn outcome_line(o: &StepOutcome) -> String {
    let detail = if let Some(e) = &o.error {
        format!("{}: {}", e.kind, e.message)
    } else if let Some(c) = &o.concept {
        concept_line(c)
    } else if let Some(p) = &o.page {
        format!("{} of {} concepts", p.items.len(), p.total)
    } else if let Some(n) = o.promoted {
        format!("{} version(s) promoted", n)
    } else {
        "done".to_string()
    };
    format!(
        "[{:>3}] {:<9} {} {}",
        o.step,
        o.op,
        if o.ok { "ok  " } else { "FAIL" },
        detail
    )
}
