//! agentplug - evaluates monitoring agent items from the command line.
//!
//! `-t ITEM` evaluates a single item, `-p` evaluates every registered item
//! with its sample parameters. Results go to stdout, logs to stderr.

mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

use agentplug_core::AgentError;
use agentplug_core::os::RealFs;
use agentplug_core::plugin::{ExecContext, ItemKey, ItemValue, Registry};
use agentplug_core::plugins::VfsFilePlugin;

use output::{OutputFormat, render};

/// Monitoring agent item tester.
#[derive(Parser)]
#[command(name = "agentplug", about = "Evaluates monitoring agent items", version)]
#[command(group(ArgGroup::new("mode").required(true).args(["test", "print"])))]
struct Args {
    /// Evaluate one item, e.g. 'vfs.file.exists[/etc/passwd]'.
    #[arg(short, long, value_name = "ITEM")]
    test: Option<String>,

    /// Evaluate every registered item with its sample parameters.
    #[arg(short, long)]
    print: bool,

    /// Per-item timeout in seconds, passed to plugins.
    #[arg(
        long,
        env = "AGENTPLUG_TIMEOUT",
        default_value_t = ExecContext::DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64)
            .range(ExecContext::MIN_TIMEOUT_SECS..=ExecContext::MAX_TIMEOUT_SECS)
    )]
    timeout: u64,

    /// Print results as JSON objects, one per line.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agentplug={},agentplug_core={}", level, level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the registry served by this agent, bound to the real filesystem.
fn build_registry() -> Result<Registry, AgentError> {
    let mut registry = Registry::new();
    registry.register(VfsFilePlugin::new(RealFs::new()))?;
    Ok(registry)
}

/// Evaluates one item given in `key[params]` form.
fn evaluate(registry: &Registry, text: &str, ctx: &ExecContext) -> Result<ItemValue, AgentError> {
    let item = ItemKey::parse(text)?;
    registry.export_item(&item, Some(ctx))
}

/// Writes one result line. Returns false if the line could not be rendered.
fn report(
    out: &mut impl Write,
    text: &str,
    result: &Result<ItemValue, AgentError>,
    format: OutputFormat,
) -> io::Result<bool> {
    let clock = chrono::Utc::now().timestamp();
    match render(text, result, format, clock) {
        Ok(line) => {
            writeln!(out, "{}", line)?;
            Ok(true)
        }
        Err(e) => {
            error!("Failed to render result for {}: {}", text, e);
            Ok(false)
        }
    }
}

/// Evaluates every registered item with its sample parameters, in key
/// order. Unsupported items are reported in place and do not stop the run.
fn print_all(
    registry: &Registry,
    ctx: &ExecContext,
    format: OutputFormat,
    out: &mut impl Write,
) -> io::Result<bool> {
    let mut ok = true;
    for (plugin, metric) in registry.metrics() {
        let params = metric.sample_params.iter().map(|p| p.to_string()).collect();
        let item = ItemKey::new(metric.key, params);
        debug!("Evaluating {} from plugin {}", item, plugin);
        let result = registry.export_item(&item, Some(ctx));
        ok &= report(out, &item.to_string(), &result, format)?;
    }
    Ok(ok)
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let ctx = match ExecContext::new(args.timeout) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to register plugins: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if registry.is_empty() {
        error!("No plugins registered");
        return ExitCode::FAILURE;
    }
    debug!(
        "agentplug {} starting, timeout={}s",
        env!("CARGO_PKG_VERSION"),
        args.timeout
    );

    let mut stdout = io::stdout().lock();
    let outcome = match &args.test {
        Some(text) => {
            let result = evaluate(&registry, text, &ctx);
            report(&mut stdout, text, &result, format).map(|rendered| rendered && result.is_ok())
        }
        None => print_all(&registry, &ctx, format, &mut stdout),
    };

    match outcome.and_then(|ok| stdout.flush().map(|_| ok)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Failed to write results: {}", e);
            ExitCode::FAILURE
        }
    }
}
