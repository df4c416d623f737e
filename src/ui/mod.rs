//! Headless UI behaviours shared by the web client.

pub mod modal;
pub mod toast;

pub use modal::{ModalOverlay, OverlayDismissGuard};
pub use toast::{Severity, Toast, Toaster};
