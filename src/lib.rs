//! atcomplete - recursive fuzzy completion of `@` path references
//!
//! Given editor text and a cursor position, the engine finds the
//! `@`-triggered fragment under the cursor, walks the workspace tree and
//! returns an ordered list of matching file and directory references:
//!
//! ```no_run
//! use atcomplete::autocomplete::PathCompleter;
//!
//! let completer = PathCompleter::new("/path/to/workspace");
//! let items = completer.complete("open @acp/entry", 15)?;
//! // e.g. ["@bloom/acp/entrypoint.py"]
//! # Ok::<(), atcomplete::Error>(())
//! ```
//!
//! Each call is a pure function of the filesystem and its two inputs; no
//! index is kept between calls.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::uninlined_format_args))]
#![allow(
    clippy::must_use_candidate,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod autocomplete;
pub mod cli;
pub mod config;
pub mod error;

pub use autocomplete::{CompletionOptions, CompletionResponse, PathCompleter, complete};
pub use error::{Error, Result};
