//! Plaintext Converter - HTML to plaintext conversion engine
//!
//! This library renders HTML message bodies as readable plaintext, for the
//! `text/plain` alternative of a multipart mail. Structure is kept as
//! plaintext conventions: uppercase headings, tab-indented lists and tables,
//! `> ` quoted blocks, ASCII rules and inline or footnote-style links.
//!
//! The engine is a pipeline of regex-driven rewrite passes, not an HTML
//! parser. Malformed markup is tolerated, never rejected.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `converter`: Pipeline orchestrator and per-call conversion context
//! - `blockquote`: Recursive quoted-block rendering
//! - `preformatted`: Whitespace-preserving `<pre>` rendering
//! - `rules`: Static substitution table
//! - `callbacks`: Per-tag callback dispatch
//! - `links`: Link rendering and the footnote link list
//! - `entities`: Entity decoding, blank line normalization and word wrap
//! - `transform`: Tag-aware uppercasing, strike-through and tag stripping
//! - `options`: Conversion options
//! - `charset`: Character encoding detection for raw bodies
//! - `security`: Input limits and ignored link schemes
//! - `helper`: Infallible entry point for template contexts
//!
//! # Example
//!
//! ```rust
//! use plaintext_converter::{ConversionOptions, LinkMode, PlaintextConverter};
//!
//! let converter = PlaintextConverter::with_options(ConversionOptions {
//!     links: LinkMode::Table,
//!     ..Default::default()
//! });
//! let text = converter
//!     .convert("<h2>Order shipped</h2><p>Track it <a href=\"https://x.test/t/1\">here</a>.</p>")
//!     .unwrap();
//! assert_eq!(
//!     text,
//!     "ORDER SHIPPED\n\nTrack it here [1].\n\n\nLinks:\n------\n[1] https://x.test/t/1\n"
//! );
//! ```

// Module declarations
pub mod blockquote;
pub mod callbacks;
pub mod charset;
pub mod converter;
pub mod entities;
pub mod error;
pub mod helper;
pub mod links;
pub mod options;
mod pattern;
pub mod preformatted;
pub mod rules;
pub mod security;
pub mod transform;

// Re-export main types for convenience
pub use converter::{ConversionContext, PlaintextConverter};
pub use error::ConversionError;
pub use helper::PlaintextHelper;
pub use options::{ConversionOptions, LinkMode};
