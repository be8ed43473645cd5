//! User interface components and views.
//!
//! This module contains all TUI rendering logic, including views for different
//! screens and reusable UI components.

mod components;
mod screen;
pub mod theme;
mod views;

pub use screen::Screen;
pub use views::Focusable;
