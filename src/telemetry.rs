use crate::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber. `RUST_LOG`, when set, wins over
/// `default_filter`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| Error::InvalidConfig(format!("log filter {default_filter:?}: {e}")))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::InvalidConfig(format!("tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("debug");
        assert!(matches!(init_tracing("debug"), Err(Error::InvalidConfig(_))));
    }
}
