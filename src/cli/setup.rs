//! Runtime setup for the binary: worker pool and logging.

/// Rayon worker stack size; tree walks recurse once per nesting level
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Configure the rayon global pool once at startup. `0` means one worker
/// per CPU.
pub fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        log::debug!("thread pool already configured: {e}");
    }
}

/// Default log filter for a `-v` count. `RUST_LOG` wins when set.
pub fn log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8) {
    let env = env_logger::Env::default().default_filter_or(log_filter(verbosity));
    // a second init (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(verbosity >= 3)
        .try_init();
}
