//! Guards Module Index
//!
//! The request-abuse-prevention core. Each guard is an independent decision function
//! over explicit inputs; none of them reads ambient configuration or calls another guard.
//! The routing layer composes them per endpoint:
//!
//! 1. `origin` gates every mutating request before any handler runs.
//! 2. `rate_limit` gates abuse-sensitive actions (redeeming access codes, email checks).
//! 3. `admin_gate` gates maintenance endpoints.
//! 4. `auth_transition` replaces any response that would differ by account existence.

/// Time source for the rate limiter (system clock, or a manual clock in tests).
pub mod clock;

/// Keyed fixed-window rate limiter. The only guard that owns shared state.
pub mod rate_limit;

/// Cross-origin rejection for mutating requests.
pub mod origin;

/// Environment-aware admin allow-list gate.
pub mod admin_gate;

/// Constant sign-in transition used by the email-check flow.
pub mod auth_transition;

pub use admin_gate::can_use_privileged_endpoint;
pub use auth_transition::{EmailCheckTransition, MessageKey, NextStep, next_transition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use origin::is_allowed_origin;
pub use rate_limit::{RateLimitDecision, RateLimiter};
