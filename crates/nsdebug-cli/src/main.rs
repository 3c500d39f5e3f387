use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nsdebug::{args, Arg, DebugConfig, LogLevel, Logger, Registry};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ENV_HELP: &str = concat!(
    "ENVIRONMENT:\n",
    "  DEBUG              Enable spec, e.g. \"http:*,-http:noisy\"\n",
    "  DEBUG_LOG_LEVEL    ERROR, WARN, INFO, DEBUG or ALL\n",
    "  DEBUG_COLORS       Force colorized output on or off\n",
    "  DEBUG_HIDE_DATE    Drop the date column of plain output\n",
    "  RUST_LOG           Filter for nsdebug's own diagnostics"
);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = ENV_HELP)]
struct Cli {
    /// Enable spec, overrides DEBUG
    #[arg(long, global = true, help = "Namespaces to enable, overrides DEBUG")]
    enable: Option<String>,

    /// Force colorized output
    #[arg(long, global = true, help = "Force colorized output")]
    colors: bool,

    /// Force plain output
    #[arg(
        long,
        global = true,
        conflicts_with = "colors",
        help = "Force plain output"
    )]
    no_colors: bool,

    /// Configuration file path
    #[arg(long, global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit one log line
    Emit {
        /// Logger namespace
        #[arg(short, long)]
        namespace: String,

        /// Call level
        #[arg(short, long, value_enum, default_value = "info")]
        level: EmitLevel,

        /// printf-style format string
        format: String,

        /// Arguments, parsed as JSON when possible
        args: Vec<String>,
    },

    /// Report whether namespaces are enabled
    Check {
        #[arg(required = true)]
        namespaces: Vec<String>,
    },

    /// Enable a spec, disable it again and print what comes back
    Roundtrip { spec: String },

    /// Log a short scenario through a few related namespaces
    Demo,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EmitLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<EmitLevel> for LogLevel {
    fn from(level: EmitLevel) -> Self {
        match level {
            EmitLevel::Error => Self::Error,
            EmitLevel::Warn => Self::Warn,
            EmitLevel::Info => Self::Info,
            EmitLevel::Debug => Self::Debug,
        }
    }
}

/// Resolve the configuration: file, then environment, then flags
fn load_config(cli: &Cli) -> Result<DebugConfig> {
    let mut config = DebugConfig::load(cli.config.as_deref())
        .context("Failed to load debug configuration")?;

    if let Some(spec) = &cli.enable {
        config.namespaces = Some(spec.clone());
    }

    if cli.colors {
        config.colors = Some(true);
    } else if cli.no_colors {
        config.colors = Some(false);
    }

    debug!(
        nsdebug.event = "cli_config_resolved",
        namespaces = ?config.namespaces,
        log_level = %config.log_level,
        colors = ?config.colors,
        "Debug configuration resolved"
    );

    Ok(config)
}

/// JSON when it parses, text otherwise
fn parse_arg(raw: &str) -> Arg {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Arg::from)
        .unwrap_or_else(|_| Arg::from(raw))
}

fn emit(logger: &Logger, level: LogLevel, format: &str, args: Vec<Arg>) {
    match level {
        LogLevel::Error => logger.error(format, args),
        LogLevel::Warn => logger.warn(format, args),
        LogLevel::Debug => logger.debug(format, args),
        LogLevel::Info | LogLevel::All => logger.info(format, args),
    }
}

fn check_report(registry: &Registry, namespaces: &[String]) -> Vec<String> {
    namespaces
        .iter()
        .map(|namespace| {
            let state = if registry.is_enabled(namespace) {
                "enabled"
            } else {
                "disabled"
            };
            format!("{}: {}", namespace, state)
        })
        .collect()
}

fn roundtrip(registry: &Registry, spec: &str) -> Result<String> {
    registry
        .enable(spec)
        .with_context(|| format!("Failed to compile enable spec '{}'", spec))?;
    Ok(registry.disable())
}

fn demo(registry: &Registry) -> Result<()> {
    if registry.spec().is_empty() {
        registry.enable("*")?;
    }

    let http = registry.create("http");
    let req = http.ns("req");
    let res = req.ns("res");

    http.log("server started", args![]);
    req.debug("raw request: %10.2B", args![b"hello\n\n"]);
    req.log(
        "%5O",
        args![json!({
            "headers": { "x-": "USER_ID" },
            "recipient": { "id": "PAGE_ID" },
            "timestamp": 1458692752478u64,
            "message": {
                "mid": "mid.1457764197618:41d102a3e1ae206a38",
                "seq": 73,
                "text": "hello, world!",
                "quick_reply": {
                    "payload": "DEVELOPER_DEFINED_PAYLOAD",
                    "author": { "name": "Steve" }
                }
            }
        })],
    );
    res.error(json!({ "name": "Error", "message": "error encountered" }), args![]);

    std::thread::sleep(Duration::from_millis(100));

    req.log("doing a lots of uninteresting work", args![]);
    http.debug("some periodic works occurred", args![]);
    registry.disable();
    http.log("no more output", args![]);

    Ok(())
}

fn init_diagnostics() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Load environment variables before resolving configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_diagnostics();

    let config = load_config(&cli)?;
    let registry = Registry::builder(config)
        .build()
        .context("Failed to initialize debug registry")?;

    match &cli.command {
        Command::Emit {
            namespace,
            level,
            format,
            args,
        } => {
            let logger = registry.create(namespace);
            if !logger.is_enabled() {
                info!(namespace = %namespace, "Namespace is not enabled, nothing emitted");
            }
            let args = args.iter().map(|raw| parse_arg(raw)).collect();
            emit(&logger, (*level).into(), format, args);
        }
        Command::Check { namespaces } => {
            for line in check_report(&registry, namespaces) {
                println!("{}", line);
            }
        }
        Command::Roundtrip { spec } => {
            println!("{}", roundtrip(&registry, spec)?);
        }
        Command::Demo => demo(&registry)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsdebug::MemorySink;
    use serial_test::serial;
    use tempfile::TempDir;

    fn memory_registry(spec: &str) -> (Registry, MemorySink) {
        let sink = MemorySink::new();
        let config = DebugConfig {
            hide_date: true,
            ..DebugConfig::default()
        };
        let registry = Registry::builder(config)
            .colors(false)
            .sink(sink.clone())
            .build()
            .unwrap();
        registry.enable(spec).unwrap();
        (registry, sink)
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("8080"), Arg::from(json!(8080)));
        assert_eq!(parse_arg("{\"a\":1}"), Arg::from(json!({ "a": 1 })));
        assert_eq!(parse_arg("hello"), Arg::from("hello"));
        assert_eq!(parse_arg("\"quoted\""), Arg::from(json!("quoted")));
    }

    #[test]
    fn test_emit_levels() {
        let (registry, sink) = memory_registry("cli");
        let logger = registry.create("cli");

        emit(&logger, LogLevel::Warn, "port %d", vec![parse_arg("8080")]);
        emit(&logger, LogLevel::All, "plain", vec![]);

        assert_eq!(
            sink.lines(),
            vec!["[ WARN]    cli  port 8080  ", "[ INFO]    cli  plain  "]
        );
    }

    #[test]
    fn test_check_report() {
        let (registry, _sink) = memory_registry("api:*,-api:secret");
        let namespaces = vec!["api:users".to_string(), "api:secret".to_string()];

        assert_eq!(
            check_report(&registry, &namespaces),
            vec!["api:users: enabled", "api:secret: disabled"]
        );
    }

    #[test]
    fn test_roundtrip() {
        let (registry, _sink) = memory_registry("");
        assert_eq!(roundtrip(&registry, "b, a -c").unwrap(), "b,a,-c");
        assert_eq!(roundtrip(&registry, "").unwrap(), "");
        assert!(registry.spec().is_empty());
    }

    #[test]
    fn test_demo_stops_after_disable() {
        let (registry, sink) = memory_registry("*");
        demo(&registry).unwrap();

        let output = sink.contents();
        assert!(output.contains("server started"));
        assert!(output.contains("[Buf 68 65 6c 6c 6f 0a 0a (7 B)"));
        assert!(output.contains("http:req:res"));
        assert!(output.contains("some periodic works occurred"));
        assert!(!output.contains("no more output"));
        assert!(registry.spec().is_empty());
    }

    #[test]
    #[serial]
    fn test_load_config_applies_flags_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nsdebug.toml");
        std::fs::write(&path, "namespaces = \"file:*\"\nlog_level = \"warn\"\n").unwrap();

        let cli = Cli::parse_from([
            "nsdebug",
            "--config",
            path.to_str().unwrap(),
            "--enable",
            "flag:*",
            "--no-colors",
            "check",
            "x",
        ]);

        std::env::remove_var("DEBUG");
        std::env::remove_var("DEBUG_LOG_LEVEL");
        let config = load_config(&cli).unwrap();
        assert_eq!(config.namespaces.as_deref(), Some("flag:*"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.colors, Some(false));
    }

    #[test]
    fn test_cli_rejects_conflicting_color_flags() {
        let result = Cli::try_parse_from(["nsdebug", "--colors", "--no-colors", "demo"]);
        assert!(result.is_err());
    }
}
