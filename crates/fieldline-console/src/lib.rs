//! # fieldline-console: Session Shell for the Fieldline Checkout Core
//!
//! The imperative shell around [`fieldline_core`]. Screens call the
//! operations on [`service::Console`]; everything stateful lives in one
//! exclusively-owned [`state::Session`]; every collaborator is reached
//! through an injected port.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Console Shell                                    │
//! │                                                                         │
//! │  Screens ──► service::Console ──► state::Session (Arc<Mutex>)          │
//! │                   │                   cart + flow + tender              │
//! │                   │                                                     │
//! │                   └──► ports::CustomerDirectory  (sync, read-only)     │
//! │                   └──► ports::StockService       (sync, read-only)     │
//! │                   └──► ports::PaymentGateway     (async, ONE call      │
//! │                   │                               per attempt)         │
//! │                   └──► ports::OrderSink          (fire-and-forget)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod service;
pub mod state;

pub use config::ConsoleConfig;
pub use error::{ErrorCode, ServiceError};
pub use service::Console;
pub use state::{Session, SessionState};
