//! Library crate for records-console.
//!
//! This crate exposes the building blocks of the console:
//! - Record model and form drafts (`model`, `form`)
//! - Query state and search input (`search`)
//! - The list/detail controller (`controller`) and its effect runner (`effects`)
//! - REST and in-memory backends (`api`)
//! - Application state, config and event loop (`app`)
//! - UI rendering (`ui`)
//!
//! It is used by the `records-console` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod controller;
pub mod effects;
pub mod error;
pub mod form;
pub mod model;
pub mod search;
pub mod ui;

/// Error and result types shared across the crate.
pub use error::{ApiError, Result};
