pub mod authorization;
pub mod config;
pub mod core_state; // Shared portal state behind the presentation layer
pub mod directory; // Accounts and the signed-in session
pub mod ledger; // Prescription requests and their review lifecycle
pub mod models;
pub mod seed;
pub mod validation;

pub use core_state::{CoreError, PortalState};
pub use directory::{DirectoryError, IdentityDirectory};
pub use ledger::{LedgerError, RequestLedger};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
