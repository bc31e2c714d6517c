use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging controls for the CLI.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Set log level to trace (our crates only)
    #[arg(long, global = true, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set log level to debug (our crates only)
    #[arg(long, global = true, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single log level for our crates (error|warn|info|debug|trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Explicit tracing filter directive, overrides other flags
    /// e.g. "vsearch_experiment=trace,visual_search=debug"
    #[arg(long, global = true)]
    pub log_filter: Option<String>,
}

/// Crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "visual_search",
        "vsearch_core",
        "vsearch_experiment",
        "vsearch_render",
        "vsearch_timing",
    ]
}

pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{t}={lvl}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter precedence: `--log-filter`, then `--trace`/`--debug`/`--log-level`,
/// then `RUST_LOG`, then `info` for our crates.
pub fn compute_spec(args: &LogArgs) -> String {
    if let Some(spec) = &args.log_filter {
        return spec.clone();
    }
    if args.trace {
        return level_spec_for("trace");
    }
    if args.debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = &args.log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

pub fn init(args: &LogArgs) {
    let spec = compute_spec(args);
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&spec))
        .with_target(false)
        .try_init();
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LogArgs {
        LogArgs {
            trace: false,
            debug: false,
            log_level: None,
            log_filter: None,
        }
    }

    #[test]
    fn explicit_filter_wins() {
        let a = LogArgs {
            debug: true,
            log_filter: Some("visual_search=warn".into()),
            ..args()
        };
        assert_eq!(compute_spec(&a), "visual_search=warn");
    }

    #[test]
    fn level_applies_to_every_crate() {
        let a = LogArgs {
            log_level: Some("DEBUG".into()),
            ..args()
        };
        let spec = compute_spec(&a);
        for krate in our_crates() {
            assert!(spec.contains(&format!("{krate}=debug")), "{spec}");
        }
    }
}
