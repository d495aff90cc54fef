//! Lingua app: trigger-surface bindings, history persistence and logging
//! setup around the engine's task lifecycle.
pub mod history_store;
pub mod logging;
pub mod orchestrator;
