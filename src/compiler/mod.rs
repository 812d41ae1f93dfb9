//! AST to bytecode translation.

mod bytecode;


pub use bytecode::compile;
