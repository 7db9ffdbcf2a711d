//! ImageScript: chain image operations in one line of text.
//!
//! ```text
//! blur(amount: 4); crush(levels: 4); mirror();
//! ```
//!
//! A script is a `;`-separated list of calls. Each call names a registered
//! operation and passes it integer arguments; the image produced by one
//! call is the input of the next.

pub mod artifact;
pub mod ast;
pub mod error;
pub mod help;
pub mod interpreter;
pub mod operators;
pub mod parser;
pub mod pixmap;
pub mod pool;
pub mod registry;
pub mod report;
