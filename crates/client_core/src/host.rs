//! The page the controllers act on.
//!
//! Rendering stays with the caller; controllers only need the blocking dialogs and
//! the navigation primitives a browser page offers.

pub trait PageHost: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
    /// Discards client state and re-renders from the server.
    fn reload(&self);
    fn navigate(&self, url: &str);
    fn celebrate(&self) {}
}
