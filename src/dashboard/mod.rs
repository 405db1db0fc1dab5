//! Live attendance table.
//!
//! [`render`] turns records into table markup for the desk page;
//! [`view::TerminalView`] draws the same rows with ratatui for the terminal
//! board. [`controller::Dashboard`] wires a
//! [`source::AttendanceSource`] and a [`view::DashboardView`] to the push
//! channel: every `barcode_scanned` message updates the last-scan line and
//! triggers one refresh.

pub mod board;
pub mod controller;
pub mod render;
pub mod source;
pub mod view;
