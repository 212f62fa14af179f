//! simdash — a terminal status-synchronization client for a
//! traffic-simulation backend.
//!
//! The backend (simulation engine and traffic-control logic) is an external
//! service reached only through its REST API. simdash polls it, mirrors the
//! reported state into a terminal dashboard, and issues the operator's
//! start/stop/step/mode-change commands. See [`sync`] for the core client
//! and its gating policy.

pub mod backend;
pub mod cli;
pub mod config;
pub mod sync;
pub mod ui;
