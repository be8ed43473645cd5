//! Reusable UI components.

pub mod dropdown;
pub mod help_bar;
pub mod input;
pub mod modal;
pub mod notification;

pub use dropdown::Overlay;
