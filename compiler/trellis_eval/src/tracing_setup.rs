use std::sync::Once;

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Install a global tracing subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only the first call in a
/// process has any effect. Events go to stderr, leaving stdout to `show`.
/// With `TRELLIS_LOG_TREE` set, they are printed as an indented tree that
/// follows derivation nesting.
///
/// Enable with `RUST_LOG=trellis_core=trace` or `RUST_LOG=trellis_eval=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }

        let tree = std::env::var_os("TRELLIS_LOG_TREE").is_some();
        subscriber(EnvFilter::from_default_env(), tree, std::io::stderr).init();
    });
}

fn subscriber<W>(filter: EnvFilter, tree: bool, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    if tree {
        Box::new(
            registry.with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_writer(writer)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            ),
        )
    } else {
        Box::new(
            registry.with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true),
            ),
        )
    }
}
