//! A small stack-based scene language. Programs build spheres, lights and
//! procedural surface shaders, then ask for them to be ray traced.

pub mod ast;
pub mod function;
pub mod interpret;
pub mod render;
pub mod tokenize;

pub use interpret::{Closure, Env, InterpretError, Interpreter, Value};
pub use render::{parse_and_render, RenderRequest, RenderSettings, Rendered};

/// Tokenize and parse program text.
pub fn parse(source: &str) -> Result<Vec<ast::Node>, InterpretError> {
    let tokens = tokenize::tokenize_str(source)?;
    Ok(ast::AstParser::new(tokens).parse_root()?)
}
