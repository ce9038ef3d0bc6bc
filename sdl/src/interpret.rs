use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    io::{Read, Seek},
    sync::Arc,
};

use raytracer::{lighting, math::Vector3, object::SceneObject};
use thiserror::Error;

use crate::{
    ast::{AstError, AstParser, Node},
    function,
    render::RenderRequest,
    tokenize::{TokenizeError, Tokenizer},
};

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizeError),

    #[error("ast error: {0}")]
    Ast(#[from] AstError),

    #[error("a generic IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("the stack is empty (evaluating '{0}')")]
    EmptyStack(String),

    #[error("expected {expected}, got {got} (evaluating '{token}')")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
        token: String,
    },

    #[error("unbound identifier {0}")]
    UnboundIdentifier(String),

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("render was called, but there is nowhere to send the image")]
    NoRenderSink,

    #[error("division by zero (evaluating '{0}')")]
    DivisionByZero(String),

    #[error("index {index} is out of bounds for an array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("cannot render a {0}x{1} image")]
    InvalidDimensions(i64, i64),

    #[error("the program never called render")]
    NoImage,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// The name → value bindings visible to a program. Shared between closures
/// and copied on the first write after sharing.
pub type Env = Arc<HashMap<String, Value>>;

/// A closure body paired with the environment it was created in.
#[derive(Debug, Clone)]
pub struct Closure {
    pub code: Arc<[Node]>,
    pub env: Env,
}

/// A runtime value in the scene language.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    String(String),
    Closure(Closure),
    Array(Vec<Value>),
    Point(Vector3),
    Object(SceneObject),
    Light(lighting::Point),
}

impl Value {
    /// The name of this value's type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Closure(_) => "closure",
            Self::Array(_) => "array",
            Self::Point(_) => "point",
            Self::Object(_) => "object",
            Self::Light(_) => "light",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{:?}", r),
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Closure(c) => write!(f, "{}", Node::Closure(c.code.clone())),
            Self::Array(values) => {
                write!(f, "[")?;
                for v in values {
                    write!(f, " {}", v)?;
                }
                write!(f, " ]")
            }
            Self::Point(p) => write!(f, "point{}", p),
            Self::Object(SceneObject::Sphere(s)) => write!(f, "sphere(center: {}, radius: {})", s.center, s.radius),
            Self::Object(SceneObject::Union(u)) => write!(f, "union({} children)", u.children().len()),
            Self::Light(l) => write!(f, "pointlight(position: {}, color: {})", l.position, l.color),
        }
    }
}

/// A type that can be popped off the stack.
pub trait FromValue: Sized {
    const NAME: &'static str;

    /// Unwrap the value, or hand it back if it has the wrong type.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! from_value {
    ($($ty:ty => $variant:ident, $name:literal;)+) => {
        $(
            impl FromValue for $ty {
                const NAME: &'static str = $name;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

from_value! {
    i64 => Int, "int";
    f64 => Real, "real";
    bool => Bool, "bool";
    String => String, "string";
    Closure => Closure, "closure";
    Vec<Value> => Array, "array";
    Vector3 => Point, "point";
    SceneObject => Object, "object";
    lighting::Point => Light, "light";
}

type RenderSink = Box<dyn FnMut(RenderRequest) -> Result<(), InterpretError>>;
type TraceSink = Box<dyn FnMut(&str)>;

/// The interpreter is the runtime for the scene language. It owns the value
/// stack and the current environment, and runs programs one node at a time.
pub struct Interpreter {
    stack: Vec<Value>,
    env: Env,
    render_sink: Option<RenderSink>,
    trace_sink: Option<TraceSink>,

    // the identifier or binder being evaluated, for error messages
    current: Option<Node>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with an empty stack and environment.
    pub fn new() -> Self {
        Self {
            stack: vec![],
            env: Env::default(),
            render_sink: None,
            trace_sink: None,
            current: None,
        }
    }

    /// Send every `render` request to `sink`. Without a sink, `render` fails.
    pub fn with_render_sink<F>(mut self, sink: F) -> Self
    where
        F: FnMut(RenderRequest) -> Result<(), InterpretError> + 'static,
    {
        self.render_sink = Some(Box::new(sink));
        self
    }

    /// Report every step (node, stack and environment) to `sink`.
    pub fn with_trace_sink<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&str) + 'static,
    {
        self.trace_sink = Some(Box::new(sink));
        self
    }

    /// Tokenize, parse and run a whole program from a reader.
    pub fn run<R: Read + Seek>(&mut self, reader: R) -> Result<(), InterpretError> {
        let program = AstParser::new(Tokenizer::new(reader).tokenize()?).parse_root()?;
        self.eval(&program)
    }

    /// Run a sequence of nodes left to right, stopping at the first error.
    pub fn eval(&mut self, program: &[Node]) -> Result<(), InterpretError> {
        for node in program {
            self.trace(node);
            self.step(node)?;
        }

        Ok(())
    }

    fn step(&mut self, node: &Node) -> Result<(), InterpretError> {
        match node {
            Node::Integer(i) => self.push(Value::Int(*i)),
            Node::Real(r) => self.push(Value::Real(*r)),
            Node::Boolean(b) => self.push(Value::Bool(*b)),
            Node::String(s) => self.push(Value::String(s.clone())),

            Node::Closure(code) => self.push(Value::Closure(Closure {
                code: code.clone(),
                env: self.env.clone(),
            })),

            Node::Binder(name) => {
                self.current = Some(node.clone());
                let value = self.pop_value()?;
                Arc::make_mut(&mut self.env).insert(name.clone(), value);
            }

            Node::Identifier(name) => {
                self.current = Some(node.clone());
                match function::lookup(name) {
                    Some(builtin) => builtin.call(self)?,
                    None => {
                        let value = self
                            .env
                            .get(name)
                            .cloned()
                            .ok_or_else(|| InterpretError::UnboundIdentifier(name.clone()))?;
                        self.push(value);
                    }
                }
            }

            Node::Array(elements) => {
                // elements see an empty stack, and the outer stack comes back even on failure
                let outer = std::mem::take(&mut self.stack);
                let result = self.eval(elements);
                let values = std::mem::replace(&mut self.stack, outer);
                result?;
                self.push(Value::Array(values));
            }
        }

        Ok(())
    }

    /// Run a closure's body in the closure's environment. The caller's
    /// environment is restored afterwards, whether or not the body succeeded.
    pub fn apply(&mut self, closure: &Closure) -> Result<(), InterpretError> {
        let saved = std::mem::replace(&mut self.env, closure.env.clone());
        let result = self.eval(&closure.code);
        self.env = saved;
        result
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop_value(&mut self) -> Result<Value, InterpretError> {
        self.stack
            .pop()
            .ok_or_else(|| InterpretError::EmptyStack(self.current_token()))
    }

    /// Pop a value of a specific type.
    pub fn pop<T: FromValue>(&mut self) -> Result<T, InterpretError> {
        let value = self.pop_value()?;
        T::from_value(value).map_err(|got| self.type_mismatch(T::NAME, &got))
    }

    /// Pop three values of the same type. The top of the stack is the last of the three.
    pub fn pop3<T: FromValue>(&mut self) -> Result<(T, T, T), InterpretError> {
        let z = self.pop()?;
        let y = self.pop()?;
        let x = self.pop()?;
        Ok((x, y, z))
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub(crate) fn type_mismatch(&self, expected: &'static str, got: &Value) -> InterpretError {
        InterpretError::TypeMismatch {
            expected,
            got: got.type_name(),
            token: self.current_token(),
        }
    }

    pub(crate) fn current_token(&self) -> String {
        match &self.current {
            Some(node) => node.to_string(),
            None => "<top level>".into(),
        }
    }

    pub(crate) fn deliver(&mut self, request: RenderRequest) -> Result<(), InterpretError> {
        match self.render_sink.as_mut() {
            Some(sink) => sink(request),
            None => Err(InterpretError::NoRenderSink),
        }
    }

    fn trace(&mut self, node: &Node) {
        if let Some(sink) = self.trace_sink.as_mut() {
            let stack = self
                .stack
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");

            let mut names = self.env.keys().collect::<Vec<_>>();
            names.sort();
            let env = names
                .into_iter()
                .map(|name| format!("{}={}", name, self.env[name]))
                .collect::<Vec<_>>()
                .join(", ");

            sink(&format!("{} | stack: [{}] | env: {{{}}}", node, stack, env));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::parse;

    fn run(source: &str) -> Result<Interpreter, InterpretError> {
        let mut interpreter = Interpreter::new();
        interpreter.eval(&parse(source)?)?;
        Ok(interpreter)
    }

    fn single(source: &str) -> Value {
        let interpreter = run(source).unwrap();
        assert_eq!(1, interpreter.stack().len(), "stack: {:?}", interpreter.stack());
        interpreter.stack()[0].clone()
    }

    #[test]
    fn apply_duplicates_through_a_binder() {
        assert!(matches!(single("1 { /x x x } apply addi"), Value::Int(2)));
    }

    #[test]
    fn closures_capture_lexically() {
        assert!(matches!(single("1 /x { x } /f 2 /x f apply x addi"), Value::Int(3)));
    }

    #[test]
    fn arrays_use_their_own_stack() {
        let interpreter = run("1 [ 2 3 ] 4").unwrap();
        match interpreter.stack() {
            [Value::Int(1), Value::Array(inner), Value::Int(4)] => {
                assert!(matches!(inner.as_slice(), [Value::Int(2), Value::Int(3)]));
            }
            other => panic!("unexpected stack {:?}", other),
        }
    }

    #[test]
    fn arrays_cannot_see_the_outer_stack() {
        assert!(matches!(
            run("1 [ addi ]"),
            Err(InterpretError::EmptyStack(token)) if token == "addi"
        ));
    }

    #[test]
    fn failing_array_restores_the_outer_stack() {
        let mut interpreter = Interpreter::new();
        interpreter.eval(&parse("7").unwrap()).unwrap();
        assert!(interpreter.eval(&parse("[ 1 nope ]").unwrap()).is_err());
        assert!(matches!(interpreter.stack(), [Value::Int(7)]));
    }

    #[test]
    fn apply_restores_env_after_success() {
        let interpreter = run("1 /x { 5 /x } apply").unwrap();
        assert!(matches!(interpreter.env().get("x"), Some(Value::Int(1))));
    }

    #[test]
    fn apply_restores_env_after_failure() {
        let mut interpreter = Interpreter::new();
        interpreter.eval(&parse("1 /x").unwrap()).unwrap();

        let result = interpreter.eval(&parse("{ 5 /x 6 /y nope } apply").unwrap());
        assert!(matches!(result, Err(InterpretError::UnboundIdentifier(name)) if name == "nope"));
        assert!(matches!(interpreter.env().get("x"), Some(Value::Int(1))));
        assert!(interpreter.env().get("y").is_none());
    }

    #[test]
    fn rebinding_overwrites() {
        assert!(matches!(single("1 /x 2 /x x"), Value::Int(2)));
    }

    #[test]
    fn builtins_shadow_bindings() {
        let interpreter = run("1 /point 1.0 2.0 3.0 point").unwrap();
        assert!(matches!(interpreter.stack(), [Value::Point(_)]));
    }

    #[test]
    fn unbound_identifier() {
        assert!(matches!(
            run("x"),
            Err(InterpretError::UnboundIdentifier(name)) if name == "x"
        ));
    }

    #[test]
    fn binding_a_reserved_name_still_calls_the_builtin() {
        assert!(matches!(
            run("1 /light light"),
            Err(InterpretError::NotImplemented(name)) if name == "light"
        ));
    }

    #[test]
    fn binder_on_empty_stack() {
        assert!(matches!(
            run("/x"),
            Err(InterpretError::EmptyStack(token)) if token == "/x"
        ));
    }

    #[test]
    fn type_mismatch_names_the_token() {
        match run("1 2.0 addi") {
            Err(InterpretError::TypeMismatch {
                expected,
                got,
                token,
            }) => {
                assert_eq!("int", expected);
                assert_eq!("real", got);
                assert_eq!("addi", token);
            }
            other => panic!("unexpected result {:?}", other.map(|i| i.stack().to_vec())),
        }
    }

    #[test]
    fn syntax_errors_surface() {
        assert!(matches!(
            parse("\"\\q\""),
            Err(InterpretError::Tokenizer(TokenizeError::IllegalEscape('q')))
        ));
        assert!(matches!(parse("{ 1"), Err(InterpretError::Ast(AstError::UnexpectedEof))));
    }

    #[test]
    fn run_reads_a_whole_program() {
        let mut interpreter = Interpreter::new();
        interpreter
            .run(std::io::Cursor::new("2 3 muli % six\n"))
            .unwrap();
        assert!(matches!(interpreter.stack(), [Value::Int(6)]));
    }

    #[test]
    fn trace_reports_each_step() {
        let lines = Rc::new(RefCell::new(vec![]));
        let sink = lines.clone();
        let mut interpreter =
            Interpreter::new().with_trace_sink(move |line| sink.borrow_mut().push(line.to_string()));

        interpreter.eval(&parse("1 /x x").unwrap()).unwrap();

        let lines = lines.borrow();
        assert_eq!(3, lines.len());
        assert!(lines[0].starts_with("1 |"));
        assert!(lines[2].contains("x=1"));
    }
}
