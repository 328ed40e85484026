//! A small interactive Forth-like evaluator: a stack of signed integers plus
//! a dictionary of built-in and user-defined words.

pub mod forth;

pub use forth::{Forth, ForthError, Value};
