//! `tmplgen_core` expands comment-tagged template blocks in source files.
//!
//! A `Keys` block declares a table of rows. Every following template block is
//! repeated once per row with the column names replaced by the row's values:
//!
//! ```text
//! // <tmpl Keys="Type_; Name_">
//! // bool; Enabled
//! // int; Level
//! // </tmpl>
//! // <tmpl>
//! public Type_ Name_ { get; set; } // i_
//! // </tmpl>
//! ```
//!
//! generates
//!
//! ```text
//! public bool Enabled { get; set; } // 0
//! public int Level { get; set; } // 1
//! ```
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source text
//!   → Comment scanner (`//` line comments and `/* */` block comments)
//!   → Marker lexer (reads `<tmpl ...>` / `</tmpl>` from comment content)
//!   → Parser (pairs markers into passthrough and tagged segments)
//!   → Assembler (loads keys tables, drops ignored blocks, expands templates)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `tmplgen.toml`.
//! - [`comments`]: Comment scanning for both comment styles.
//! - [`files`]: Template files on disk: output naming, byte order marks,
//!   writing and checking generated files.
//!
//! ## Quick Start
//!
//! ```rust
//! use tmplgen_core::TmplConfig;
//! use tmplgen_core::generate;
//!
//! let input = "// <tmpl Keys=\"X\">\n// a\n// b\n// </tmpl>\n// <tmpl>\nlet X = i_;\n// </tmpl>\n";
//! let output = generate(input, &TmplConfig::default()).unwrap();
//! assert_eq!(output, "let a = 0;\nlet b = 1;\n");
//! ```

pub use comments::CommentStyle;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use keys::*;
pub use parser::*;
pub use position::*;

pub mod comments;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod files;
mod keys;
pub(crate) mod lexer;
mod parser;
mod position;
