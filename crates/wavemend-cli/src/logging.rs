//! Tracing and thread pool setup.

use tracing_subscriber::EnvFilter;

/// Runtime settings shared by all commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Runtime {
    /// Emit `info` level tracing on stderr.
    pub verbose: bool,
    /// Worker threads for batch processing; rayon's default when `None`.
    pub jobs: Option<usize>,
}

/// Installs the tracing subscriber and sizes the global thread pool.
///
/// Tracing stays off unless `verbose` is set or `RUST_LOG` is present, so the
/// regular output is not interleaved with log lines.
pub fn init(runtime: Runtime) -> anyhow::Result<()> {
    if let Some(threads) = runtime.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;
    }

    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if runtime.verbose || from_env {
        let filter = if from_env {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("info")
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
    Ok(())
}
