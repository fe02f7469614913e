// src/lib.rs
//
// Bibliothèque : noyau exact (utilisable sans l’interface) + journalisation.

pub mod noyau;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Installe la journalisation si RUST_LOG est défini. Sans effet sinon,
/// et sans effet au deuxième appel.
pub fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    TRACING.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
