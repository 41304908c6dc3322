use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

const DEFAULT_FILTER: &str = "centerline=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "centerline=debug" } else { DEFAULT_FILTER })
    });
    let tree = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_targets(true)
        .with_timer(Uptime::default());
    let _ = Registry::default().with(filter).with(tree).try_init();
}
