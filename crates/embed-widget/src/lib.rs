//! embed-widget library crate.
//!
//! The inline scheduling embed component: one self-contained instance per
//! placement on a host page, each rendering a sandboxed frame that shows a
//! scheduling page, resizing itself to the frame's reported height, and
//! re-announcing booking activity to the host as its own events.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! host page (JSON-line commands, TOML config)
//!         ↕
//! [embed-widget]
//!   ├── domain/           Pure types: rendered structure, instance state,
//!   │                     message channel registry, outbound events
//!   ├── application/      Render engine, message bridge, height controller,
//!   │                     per-instance lifecycle
//!   └── infrastructure/
//!         ├── host        Single-threaded HostPage event loop
//!         ├── settle_timer tokio timers for the loading overlay
//!         ├── dispatcher  Outbound events → host sink
//!         ├── config_file TOML host configuration
//!         └── commands    JSON-line input for `embed-host`
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O, no async, no timers.
//! - `application` depends on `domain` and `embed-core`; side effects go
//!   through the `EventDispatcher` and `SettleScheduler` traits.
//! - `infrastructure` implements those traits with `tokio`.
//!
//! # For beginners: why inject the timer and the dispatcher?
//!
//! An instance reacts to four kinds of signal: attribute changes, frame
//! loads, timer completions, and channel messages.  With the timer and the
//! event sink behind traits, every one of those reactions can be tested as a
//! plain synchronous function call with a mock standing in for the host.

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: embed instance behavior.
pub mod application;

/// Infrastructure layer: host page runtime, timers, configuration.
pub mod infrastructure;
