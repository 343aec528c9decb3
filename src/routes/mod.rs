/// Router Module Index
///
/// Organizes routes by the guards they need. Layers are attached in `create_router`:
/// the origin guard wraps everything, authentication is resolved per handler through
/// the `AuthUser` extractor, and the admin gate wraps the `/admin` nest.

/// Routes open to anonymous callers.
pub mod public;

/// Routes whose handlers take an `AuthUser`.
pub mod authenticated;

/// Maintenance routes behind the admin gate.
pub mod admin;
