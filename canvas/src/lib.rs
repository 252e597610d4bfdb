//! Interactive geometry engine for the brochure page-layout editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and natively
//! for tests and the command-line tool. It owns selection, pointer-driven
//! move/resize/rotate with alignment snapping, marquee selection, grouping,
//! the clipboard and undo/redo. The host JavaScript layer wires DOM events to
//! the engine and reacts to the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Pages, elements, patches and the page store |
//! | [`geometry`] | Snapping, resize and rotation math |
//! | [`history`] | Bounded undo/redo of page snapshots |
//! | [`clipboard`] | Copied elements or page |
//! | [`camera`] | Pan/zoom camera and page slot layout |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against handles and elements |
//! | [`chrome`] | Selection outline, handle and badge positions |
//! | [`render`] | Scene rendering to a 2D canvas |
//! | [`project`] | Project file decode/encode |
//! | [`config`] | Tunable thresholds and limits |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod chrome;
pub mod clipboard;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod project;
pub mod render;
