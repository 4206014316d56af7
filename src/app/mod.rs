//! Application layer around the sampling engine.

/// Input file loading (scenes, spike files)
pub mod input;
/// Volume descriptor URI parsing
pub mod uri;
/// MHD volume export
pub mod writer;

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
