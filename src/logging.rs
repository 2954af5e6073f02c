use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// Filter comes from `BFT_LOG`, then `RUST_LOG`; otherwise `warn`, raised to
/// `debug` by one `-v` and `trace` by two.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env("BFT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            EnvFilter::new(match verbose {
                0 => "warn",
                1 => "bf_tape=debug,bft=debug",
                _ => "bf_tape=trace,bft=trace",
            })
        });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
