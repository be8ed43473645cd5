//! APTO - a terminal client for the APTO school administration API.
//!
//! Students sign in to see their remedial evaluations and grade history;
//! teachers manage courses, evaluations, grades, students and teachers.
//! The [`app::App`] controller owns all state and talks to the server
//! through [`api::ApiClient`]; the [`ui`] module only draws it and turns
//! input into [`intent::Intent`]s.

pub mod api;
pub mod app;
pub mod config;
pub mod dropdown;
pub mod error;
pub mod events;
pub mod intent;
pub mod logging;
pub mod navigation;
pub mod notification;
pub mod records;
pub mod resource;
pub mod session;
pub mod tasks;
pub mod ui;
