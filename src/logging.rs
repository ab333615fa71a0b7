//! Ambient logging stack: `tracing` initialization plus the one-shot
//! warning dedup required by spec §7 ("Warnings are one-shot: the same
//! warning produced multiple times within a single inference call is
//! emitted only once").

use std::collections::HashSet;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber. Priority order matches the
/// nearest-relative crate's own `logging::init_logging`: `RUST_LOG` (or the
/// context-/env-supplied debug level) wins, else default to `warn`.
pub fn init() {
    let level = crate::context::log_level()
        .or_else(|| std::env::var(format!("{}_DEBUG", crate::context::tool_prefix())).ok())
        .unwrap_or_else(|| "warn".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

static EMITTED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Reset the one-shot warning dedup set; called at the start of each
/// top-level inference call.
pub fn reset_warnings() {
    *EMITTED.lock().expect("warning set mutex poisoned") = Some(HashSet::new());
}

/// Emit `message` via `tracing::warn!`, at most once per key across the
/// current inference call.
pub fn warn_once(key: &str, message: &str) {
    let mut guard = EMITTED.lock().expect("warning set mutex poisoned");
    let set = guard.get_or_insert_with(HashSet::new);
    if set.insert(key.to_string()) {
        tracing::warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn warn_once_deduplicates_within_a_call() {
        reset_warnings();
        warn_once("shallow", "shallow clone detected");
        warn_once("shallow", "shallow clone detected");
        let guard = EMITTED.lock().unwrap();
        assert_eq!(guard.as_ref().unwrap().len(), 1);
    }

    #[test]
    #[serial]
    fn reset_clears_prior_keys() {
        reset_warnings();
        warn_once("a", "a");
        reset_warnings();
        warn_once("a", "a");
        let guard = EMITTED.lock().unwrap();
        assert_eq!(guard.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn init_does_not_panic() {
        let result = std::panic::catch_unwind(init);
        assert!(result.is_ok());
    }
}
