//! # Trellis - Component-Based Server-Side Web MVC
//!
//! A server-side web framework built around a tree of nested UI controls:
//! pages compose forms, fields, fieldsets, panels and links; one request
//! runs the whole tree through a multi-phase lifecycle (init, security
//! check, process, action firing, get/post, render, destroy) and the tree
//! renders itself recursively into a shared HTML buffer.
//!
//! ## Architecture
//!
//! The framework is organized into the following core modules:
//!
//! - **control**: control trait, arena control tree, containers, links
//! - **field**: value-bearing controls with request binding and validation
//! - **form**: form aggregation, fieldsets, state snapshots, value mapping
//! - **action**: deferred action event registry with nested dispatch scopes
//! - **context**: per-request facade (request, response, session, headers)
//! - **page**: page state, behavior trait and the front-controller driver
//! - **render**: shared HTML buffer and escaping
//! - **service**: template, resource-deploy and message lookup seams
//! - **utils**: shared error types

pub mod action;
pub mod context;
pub mod control;
pub mod field;
pub mod form;
pub mod page;
pub mod render;
pub mod service;
pub mod utils;

// Re-export main types for convenience
pub use context::{Context, Request, Response, Session};
pub use control::{Control, ControlId, ControlTree};
pub use form::{FieldSet, Form};
pub use page::{FrontController, FrontControllerConfig, Page, PageClass};
pub use utils::{Result, TrellisError};

/// Framework version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Trellis";
