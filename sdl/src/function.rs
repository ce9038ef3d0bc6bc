use std::{collections::HashMap, sync::Arc};

use lazy_static::lazy_static;
use raytracer::{
    lighting,
    math::Vector3,
    object::{SceneObject, Sphere, Union},
};

use crate::{
    interpret::{Closure, FromValue, InterpretError, Interpreter, Value},
    render::RenderRequest,
};

type BuiltinFn = fn(&mut Interpreter) -> Result<(), InterpretError>;

/// A builtin operator, callable by name from within the scene language.
pub struct Builtin {
    pub name: &'static str,
    func: Option<BuiltinFn>,
}

impl Builtin {
    fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self {
            name,
            func: Some(func),
        }
    }

    /// A reserved name that fails with `NotImplemented` when called.
    fn reserved(name: &'static str) -> Self {
        Self { name, func: None }
    }

    pub fn is_implemented(&self) -> bool {
        self.func.is_some()
    }

    /// Run this builtin against the interpreter's stack.
    pub fn call(&self, interpreter: &mut Interpreter) -> Result<(), InterpretError> {
        match self.func {
            Some(func) => func(interpreter),
            None => Err(InterpretError::NotImplemented(self.name.into())),
        }
    }
}

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = vec![
        // integers
        Builtin::new("addi", addi),
        Builtin::new("subi", subi),
        Builtin::new("muli", muli),
        Builtin::new("divi", divi),
        Builtin::new("modi", modi),
        Builtin::new("negi", negi),
        Builtin::new("eqi", eqi),
        Builtin::new("lessi", lessi),

        // reals
        Builtin::new("addf", addf),
        Builtin::new("subf", subf),
        Builtin::new("mulf", mulf),
        Builtin::new("divf", divf),
        Builtin::new("negf", negf),
        Builtin::new("eqf", eqf),
        Builtin::new("lessf", lessf),
        Builtin::new("sqrt", sqrt),
        Builtin::new("sin", sin),
        Builtin::new("cos", cos),
        Builtin::new("asin", asin),
        Builtin::new("acos", acos),
        Builtin::new("clampf", clampf),
        Builtin::new("floor", floor),
        Builtin::new("frac", frac),
        Builtin::new("real", real),

        // points and arrays
        Builtin::new("point", point),
        Builtin::new("getx", getx),
        Builtin::new("gety", gety),
        Builtin::new("getz", getz),
        Builtin::new("get", get),
        Builtin::new("length", length),

        // control
        Builtin::new("apply", apply),
        Builtin::new("if", if_),

        // scene
        Builtin::new("sphere", sphere),
        Builtin::new("translate", translate),
        Builtin::new("union", union),
        Builtin::new("pointlight", pointlight),
        Builtin::new("render", render),

        Builtin::reserved("cube"),
        Builtin::reserved("cylinder"),
        Builtin::reserved("cone"),
        Builtin::reserved("plane"),
        Builtin::reserved("scale"),
        Builtin::reserved("uscale"),
        Builtin::reserved("rotatex"),
        Builtin::reserved("rotatey"),
        Builtin::reserved("rotatez"),
        Builtin::reserved("intersect"),
        Builtin::reserved("difference"),
        Builtin::reserved("light"),
        Builtin::reserved("spotlight"),
    ]
    .into_iter()
    .map(|b| (b.name, b))
    .collect();
}

/// Find a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

/// Pop `a b` (b on top) and push `f(a, b)`.
fn binary<T: FromValue>(
    i: &mut Interpreter,
    f: impl FnOnce(T, T) -> Result<Value, InterpretError>,
) -> Result<(), InterpretError> {
    let b = i.pop()?;
    let a = i.pop()?;
    let value = f(a, b)?;
    i.push(value);
    Ok(())
}

fn unary<T: FromValue>(i: &mut Interpreter, f: impl FnOnce(T) -> Value) -> Result<(), InterpretError> {
    let a = i.pop()?;
    i.push(f(a));
    Ok(())
}

fn addi(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: i64, b| Ok(Value::Int(a.wrapping_add(b))))
}

fn subi(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: i64, b| Ok(Value::Int(a.wrapping_sub(b))))
}

fn muli(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: i64, b| Ok(Value::Int(a.wrapping_mul(b))))
}

fn divi(i: &mut Interpreter) -> Result<(), InterpretError> {
    let token = i.current_token();
    binary(i, |a: i64, b| match b {
        0 => Err(InterpretError::DivisionByZero(token)),
        b => Ok(Value::Int(a.wrapping_div(b))),
    })
}

fn modi(i: &mut Interpreter) -> Result<(), InterpretError> {
    let token = i.current_token();
    binary(i, |a: i64, b| match b {
        0 => Err(InterpretError::DivisionByZero(token)),
        b => Ok(Value::Int(a.wrapping_rem(b))),
    })
}

fn negi(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: i64| Value::Int(a.wrapping_neg()))
}

fn eqi(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: i64, b| Ok(Value::Bool(a == b)))
}

fn lessi(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: i64, b| Ok(Value::Bool(a < b)))
}

fn addf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Real(a + b)))
}

fn subf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Real(a - b)))
}

fn mulf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Real(a * b)))
}

fn divf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Real(a / b)))
}

fn negf(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(-a))
}

fn eqf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Bool(a == b)))
}

fn lessf(i: &mut Interpreter) -> Result<(), InterpretError> {
    binary(i, |a: f64, b| Ok(Value::Bool(a < b)))
}

fn sqrt(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.sqrt()))
}

// trig works in degrees
fn sin(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.to_radians().sin()))
}

fn cos(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.to_radians().cos()))
}

fn asin(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.asin().to_degrees()))
}

fn acos(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.acos().to_degrees()))
}

fn clampf(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.clamp(0., 1.)))
}

fn floor(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Int(a.floor() as i64))
}

fn frac(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: f64| Value::Real(a.fract()))
}

fn real(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: i64| Value::Real(a as f64))
}

fn point(i: &mut Interpreter) -> Result<(), InterpretError> {
    let (x, y, z) = i.pop3()?;
    i.push(Value::Point(Vector3::new(x, y, z)));
    Ok(())
}

fn getx(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |p: Vector3| Value::Real(p.x))
}

fn gety(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |p: Vector3| Value::Real(p.y))
}

fn getz(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |p: Vector3| Value::Real(p.z))
}

fn get(i: &mut Interpreter) -> Result<(), InterpretError> {
    let index: i64 = i.pop()?;
    let array: Vec<Value> = i.pop()?;

    let value = usize::try_from(index)
        .ok()
        .and_then(|ix| array.get(ix))
        .cloned()
        .ok_or(InterpretError::IndexOutOfBounds {
            index,
            len: array.len(),
        })?;

    i.push(value);
    Ok(())
}

fn length(i: &mut Interpreter) -> Result<(), InterpretError> {
    unary(i, |a: Vec<Value>| Value::Int(a.len() as i64))
}

fn apply(i: &mut Interpreter) -> Result<(), InterpretError> {
    let closure: Closure = i.pop()?;
    i.apply(&closure)
}

fn if_(i: &mut Interpreter) -> Result<(), InterpretError> {
    let otherwise: Closure = i.pop()?;
    let then: Closure = i.pop()?;
    let condition: bool = i.pop()?;

    i.apply(if condition { &then } else { &otherwise })
}

fn sphere(i: &mut Interpreter) -> Result<(), InterpretError> {
    let shader: Closure = i.pop()?;
    i.push(Value::Object(Sphere::procedural(Arc::new(shader)).into()));
    Ok(())
}

fn translate(i: &mut Interpreter) -> Result<(), InterpretError> {
    let (x, y, z) = i.pop3()?;
    let object: SceneObject = i.pop()?;
    i.push(Value::Object(object.translate(x, y, z)));
    Ok(())
}

fn union(i: &mut Interpreter) -> Result<(), InterpretError> {
    // children keep the order they were written in
    let second: SceneObject = i.pop()?;
    let first: SceneObject = i.pop()?;
    i.push(Value::Object(Union::new(vec![first, second]).into()));
    Ok(())
}

fn pointlight(i: &mut Interpreter) -> Result<(), InterpretError> {
    let color: Vector3 = i.pop()?;
    let position: Vector3 = i.pop()?;
    i.push(Value::Light(lighting::Point::new(position, color)));
    Ok(())
}

fn render(i: &mut Interpreter) -> Result<(), InterpretError> {
    let file: String = i.pop()?;
    let height: i64 = i.pop()?;
    let width: i64 = i.pop()?;
    let fov: f64 = i.pop()?;
    let depth: i64 = i.pop()?;
    let scene: SceneObject = i.pop()?;
    let lights: Vec<Value> = i.pop()?;
    let ambient: Vector3 = i.pop()?;

    let lights = lights
        .into_iter()
        .map(|v| match v {
            Value::Light(light) => Ok(light),
            other => Err(i.type_mismatch(lighting::Point::NAME, &other)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    i.deliver(RenderRequest {
        ambient,
        lights,
        scene,
        depth,
        fov,
        width,
        height,
        file,
    })
}
