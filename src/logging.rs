use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "chatgate=info,warn";
const VERBOSE_FILTER: &str = "chatgate=debug,warn";

fn filter_directives(env_value: Option<&str>, verbose: bool) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => DEFAULT_FILTER.to_string(),
    }
}

/// Install the stderr `fmt` subscriber. `RUST_LOG` is honoured unless
/// `verbose` asks for debug output. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(env_value.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
