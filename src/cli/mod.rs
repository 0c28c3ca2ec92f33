//! Command-line interface

pub mod commands;

use clap::Parser;

use commands::Commands;

/// Honyaku Assist - compare DeepL and Google translations side by side
#[derive(Parser, Debug)]
#[command(name = "honyaku-assist", version, about, long_about = None)]
pub struct Args {
    /// DeepL API key (optional, defaults to DEEPL_AUTH_KEY env var)
    #[arg(long)]
    pub deepl_auth_key: Option<String>,

    /// Usage database path (optional, defaults to USAGE_DB_PATH env var)
    #[arg(long)]
    pub db: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Whether `--verbose` or `server --debug` asked for debug logs
    pub fn debug_requested(&self) -> bool {
        self.verbose || matches!(self.command, Some(Commands::Server { debug: true, .. }))
    }

    /// Filter directive for the tracing subscriber.
    ///
    /// The debug flags win over `rust_log`; otherwise `rust_log` is used as-is.
    pub fn log_directive(&self, rust_log: Option<&str>) -> String {
        if self.debug_requested() {
            return "honyaku_assist=debug".to_string();
        }

        match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => value.to_string(),
            None => "honyaku_assist=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("honyaku-assist").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_server_debug_selects_debug_filter() {
        let args = parse(&["server", "--debug"]);
        assert!(args.debug_requested());

        let directive = args.log_directive(Some("warn"));
        assert_eq!(directive, "honyaku_assist=debug");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_verbose_selects_debug_filter() {
        let args = parse(&["--verbose", "usage"]);
        assert_eq!(args.log_directive(None), "honyaku_assist=debug");
    }

    #[test]
    fn test_default_filter_is_info() {
        let args = parse(&["server"]);
        assert!(!args.debug_requested());
        assert_eq!(args.log_directive(None), "honyaku_assist=info");
        assert_eq!(args.log_directive(Some("  ")), "honyaku_assist=info");
    }

    #[test]
    fn test_rust_log_used_without_debug_flags() {
        let args = parse(&["server", "--port", "9000"]);
        assert_eq!(args.log_directive(Some("honyaku_assist=trace")), "honyaku_assist=trace");
    }
}
