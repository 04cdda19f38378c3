use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing(default_level: &str) {
    let default_directive = default_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_directive.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Renders a failure as a GitHub workflow error annotation.
pub(crate) fn render_workflow_error(error: &anyhow::Error) -> String {
    let message = format!("{error:#}")
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{message}")
}
