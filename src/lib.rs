// MIT License - Copyright (c) 2026 The lora-sentinel authors
//
//! # lora-sentinel
//!
//! Receiver-side coordinator of a two-node LoRa security link: drains
//! motion frames from the radio, runs the alarm window, broadcasts status
//! to the peer transmitter, supervises the uplink and handles the
//! restart/factory-reset button.
//!
//! The coordination core is synchronous and deterministic: every component
//! takes the current uptime in milliseconds as a parameter and never reads
//! a clock itself. The binary supplies the clock, the radio, the broker
//! connection and the loop cadence.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lora_sentinel::clock::MonotonicClock;
//! use lora_sentinel::config::NodeConfig;
//! use lora_sentinel::node::{Node, Peripherals, TickOutcome};
//!
//! fn run(peripherals: Peripherals) {
//!     let config = NodeConfig::default();
//!     let mut node = Node::new(&config, peripherals);
//!     let clock = MonotonicClock::new();
//!
//!     let mut events = node.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     loop {
//!         if let TickOutcome::Restart(_) = node.tick(clock.now_ms()) {
//!             break;
//!         }
//!         std::thread::sleep(std::time::Duration::from_millis(20));
//!     }
//! }
//! ```

pub mod alarm;
pub mod button;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ingest;
pub mod node;
pub mod peripherals;
pub mod protocol;
pub mod state;
pub mod status;
pub mod storage;
pub mod supervisor;
pub mod transport;

// Re-exports for convenience
pub use config::{NodeConfig, NodeConfigBuilder};
pub use error::{Result, SentinelError};
pub use event::{EventReceiver, NodeEvent};
pub use node::{Node, Peripherals, RestartKind, TickOutcome};
pub use protocol::{IncomingEvent, InboundKind, StatusMessage};
pub use state::{NodeState, StatusFlags};
