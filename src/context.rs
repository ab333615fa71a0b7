//! Process-wide (but thread-local) override context: lets an embedder set a
//! tool-name env-var prefix and a logging level that apply to subsequent
//! inference calls on the current thread (spec §5/§9).

use std::cell::RefCell;

const DEFAULT_PREFIX: &str = "SCM_VERSION";

#[derive(Debug, Clone)]
struct ContextState {
    prefix: String,
    log_level: Option<String>,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            log_level: None,
        }
    }
}

thread_local! {
    static CONTEXT: RefCell<ContextState> = RefCell::new(ContextState::default());
}

/// The env-var prefix consulted before the default (spec §4.7: "a shared
/// tool name prefix mechanism allows embedders ... to register an
/// alternative prefix which is consulted *before* `SETUPTOOLS_SCM_*`").
pub fn tool_prefix() -> String {
    CONTEXT.with(|c| c.borrow().prefix.clone())
}

pub fn log_level() -> Option<String> {
    CONTEXT.with(|c| c.borrow().log_level.clone())
}

/// RAII guard restoring the prior context on drop. Nested guards shadow
/// outer ones strictly.
pub struct Scope {
    prior: ContextState,
}

impl Drop for Scope {
    fn drop(&mut self) {
        CONTEXT.with(|c| *c.borrow_mut() = self.prior.clone());
    }
}

/// Enter a scope with `prefix` as the tool-name prefix for subsequent
/// inference calls on this thread, restored when the returned guard drops.
pub fn with_tool_prefix(prefix: impl Into<String>) -> Scope {
    let prior = CONTEXT.with(|c| {
        let mut state = c.borrow_mut();
        let prior = state.clone();
        state.prefix = prefix.into();
        prior
    });
    Scope { prior }
}

pub fn with_log_level(level: impl Into<String>) -> Scope {
    let prior = CONTEXT.with(|c| {
        let mut state = c.borrow_mut();
        let prior = state.clone();
        state.log_level = Some(level.into());
        prior
    });
    Scope { prior }
}

/// Export the current context as environment-variable assignments, for
/// embedders that spawn a child process which itself invokes this crate.
pub fn export_to_env() -> Vec<(String, String)> {
    let mut out = vec![(format!("{}_TOOL_PREFIX", DEFAULT_PREFIX), tool_prefix())];
    if let Some(level) = log_level() {
        out.push((format!("{}_DEBUG", DEFAULT_PREFIX), level));
    }
    out
}
