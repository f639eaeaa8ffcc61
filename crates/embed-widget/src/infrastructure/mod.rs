//! Infrastructure layer for embed-widget.
//!
//! Concrete implementations of the capabilities the application layer asks
//! for, plus the host page runtime that drives instances from a single event
//! queue.
//!
//! | Module         | Provides                                              |
//! |----------------|-------------------------------------------------------|
//! | `host`         | `HostPage` event loop, `HostEvent`, `HostHandle`      |
//! | `settle_timer` | `TokioSettleScheduler` (tokio timers → `HostEvent`)   |
//! | `dispatcher`   | `HostEventTarget` (outbound events → mpsc sink)       |
//! | `config_file`  | TOML host configuration                               |
//! | `commands`     | JSON-line commands read by the `embed-host` binary    |

pub mod commands;
pub mod config_file;
pub mod dispatcher;
pub mod host;
pub mod settle_timer;

pub use commands::HostCommand;
pub use config_file::{load_config, parse_config, HostConfig, HostConfigError};
pub use dispatcher::{DispatchedEvent, HostEventTarget};
pub use host::{HostError, HostEvent, HostHandle, HostPage, WidgetSnapshot};
pub use settle_timer::TokioSettleScheduler;
