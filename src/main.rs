//! share-dl - CLI entry point.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, EnvFilter};

use share_dl::{
    cli::Args,
    config::{validate_config, Config, RunMode},
    dedup::DedupLog,
    download::{
        download_single, plan_single, plan_tasks, run_batch, BackoffPolicy, BatchOptions,
        BatchReport, Pipeline, ToolInvoker, ToolSet,
    },
    error::{exit_codes, Error, Result},
    fs::read_url_list,
    output::{
        print_banner, print_batch_report, print_error, print_hints, print_info, print_run_summary,
        print_success, print_warning,
    },
    page::PageFetcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            print_hints(e.remediation());
            match e {
                e if e.is_config() => {
                    eprintln!();
                    eprintln!("{}", Args::command().render_usage());
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::InvalidShareUrl(_) | Error::InvalidFilename(_) => {
                    ExitCode::from(exit_codes::ABORT as u8)
                }
                Error::Fetch(_) | Error::ExtractionFailed(_) => {
                    ExitCode::from(exit_codes::FETCH_ERROR as u8)
                }
                Error::Download(_) | Error::Tool { .. } => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                Error::ToolUnavailable => ExitCode::from(exit_codes::TOOL_UNAVAILABLE as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // CLI flags win over the file
    args.merge_into_config(&mut config);
    validate_config(&config)?;
    let mode = config.run_mode()?;

    let tools = ToolSet::detect()?;
    let tool_names: Vec<String> = tools.kinds().iter().map(ToString::to_string).collect();

    let source = match mode {
        RunMode::Single => config.options.url.clone().unwrap_or_default(),
        RunMode::Batch => config
            .options
            .list
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    };
    let output = match (mode, &config.options.out) {
        (_, Some(out)) => out.display().to_string(),
        (RunMode::Single, None) => format!("<share id>.{}", config.tools.container),
        (RunMode::Batch, None) => config.output_directory().display().to_string(),
    };
    print_run_summary(&mode.to_string(), &source, &output, &tool_names);

    // Components are built once per run and shared by every task
    let fetcher = PageFetcher::new(&config.http)?;
    let invoker = ToolInvoker::new(tools, &config.tools, fetcher.user_agent());
    let policy = BackoffPolicy::from(&config.retry);

    match mode {
        RunMode::Single => run_single(&config, Pipeline::new(fetcher, invoker, policy)).await,
        RunMode::Batch => run_list(&config, Pipeline::new(fetcher, invoker, policy)).await,
    }
}

/// Download the URL given with `--url`.
async fn run_single(config: &Config, pipeline: Pipeline) -> Result<()> {
    let url = config
        .options
        .url
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("--url".to_string()))?;

    let mut task = plan_single(url, config.options.out.as_deref(), &config.tools.container)?;

    let pipeline = pipeline.with_fallback(true).with_progress(true);
    let path = download_single(&pipeline, &mut task, true).await?;

    print_success(&format!("Saved {}", path.display()));
    Ok(())
}

/// Download every URL of the `--list` file. Per-URL failures are reported but
/// do not fail the run.
async fn run_list(config: &Config, pipeline: Pipeline) -> Result<()> {
    let list = config
        .options
        .list
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("--list".to_string()))?;

    let urls = read_url_list(list).await?;
    if urls.is_empty() {
        print_warning(&format!("No URLs in {}", list.display()));
        return Ok(());
    }

    let log = DedupLog::load(&config.batch.done_log).await?;
    if !log.is_empty() {
        print_info(&format!(
            "{} URLs already recorded in {}",
            log.len(),
            log.path().display()
        ));
    }

    let mut report = BatchReport::default();
    let tasks = plan_tasks(
        &urls,
        &log,
        &config.output_directory(),
        config.options.prefix.as_deref(),
        &config.tools.container,
        &mut report,
    );

    let options = BatchOptions {
        concurrency: config.batch.concurrency,
        cooldown: config.cooldown(),
        show_progress: true,
    };
    run_batch(tasks, &pipeline, &log, &options, &mut report).await;

    print_batch_report(&report);
    if report.failed() > 0 {
        print_warning(&format!("{} URL(s) failed; see the log above", report.failed()));
    }

    Ok(())
}
