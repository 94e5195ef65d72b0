//! Tauri IPC Commands - Frontend to Backend Communication
//!
//! The UI reaches the host through two commands only:
//! - ipc_invoke: run one of the fixed request channels
//! - ipc_subscribe: validate a push channel name

pub mod ipc;

pub use ipc::{ipc_invoke, ipc_subscribe};
