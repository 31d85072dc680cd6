//! # Session State
//!
//! The single owner of everything mutable in a console session: the live
//! cart, the checkout flow, and the active tender attempt (when one
//! exists).
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because shell entry points
//! may be driven from an async runtime. The lock is only ever held for a
//! synchronous core transition; it is NEVER held across the gateway
//! await (see [`crate::service`]).
//!
//! ## Single Owner
//! No component holds the cart: core transitions borrow it for exactly
//! one call. There is no ambient/global cart anywhere.

use std::sync::{Arc, Mutex};

use fieldline_core::cart::Cart;
use fieldline_core::checkout::CheckoutFlow;
use fieldline_core::tender::TenderMachine;

/// Everything mutable for one console session.
///
/// ## Invariant
/// `tender` is `Some` exactly while the flow is in CollectingPayment; it
/// is created when payment collection begins and dropped when the flow
/// leaves it. At most one tender attempt exists at a time.
#[derive(Debug, Default)]
pub struct Session {
    /// The live cart.
    pub cart: Cart,

    /// The checkout flow controller.
    pub flow: CheckoutFlow,

    /// The active tender attempt, while payment collection is underway.
    pub tender: Option<TenderMachine>,
}

impl Session {
    /// Creates a fresh session: empty cart, flow in Browsing, no tender.
    pub fn new() -> Self {
        Session {
            cart: Cart::new(),
            flow: CheckoutFlow::new(),
            tender: None,
        }
    }
}

/// Shared handle to the session.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    /// Creates a new session state.
    pub fn new() -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(Session::new())),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = state.with_session(|s| s.cart.total_item_count());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.inner.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.cart.clear());
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.inner.lock().expect("Session mutex poisoned");
        f(&mut session)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
