//! Resolved values and instructions.
//!
//! A method body is an ordered list of [`Instruction`]s plus an exception
//! table. Instructions hold [`Value`] trees; every value knows its static
//! type. Loads and stores of a local are typed by the value they carry; a
//! local that is still boxed after capture analysis is recognised by its
//! [`LeftValue`](crate::LeftValue) type, not by the instruction.

use smallvec::SmallVec;

use crate::{FieldRef, Label, MethodRef, Primitive, TypeId, Var};

/// Primitive constant.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Constant {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Constant {
    pub const fn primitive(self) -> Primitive {
        match self {
            Constant::Bool(_) => Primitive::Bool,
            Constant::Byte(_) => Primitive::Byte,
            Constant::Short(_) => Primitive::Short,
            Constant::Char(_) => Primitive::Char,
            Constant::Int(_) => Primitive::Int,
            Constant::Long(_) => Primitive::Long,
            Constant::Float(_) => Primitive::Float,
            Constant::Double(_) => Primitive::Double,
        }
    }

    pub const fn ty(self) -> TypeId {
        self.primitive().id()
    }

    /// Fixed-width little-endian encoding; floats are encoded by their
    /// IEEE-754 bits.
    pub fn to_bytes(self) -> SmallVec<[u8; 8]> {
        match self {
            Constant::Bool(b) => SmallVec::from_slice(&[u8::from(b)]),
            Constant::Byte(v) => SmallVec::from_slice(&v.to_le_bytes()),
            Constant::Short(v) => SmallVec::from_slice(&v.to_le_bytes()),
            Constant::Char(v) => SmallVec::from_slice(&v.to_le_bytes()),
            Constant::Int(v) => SmallVec::from_slice(&v.to_le_bytes()),
            Constant::Long(v) => SmallVec::from_slice(&v.to_le_bytes()),
            Constant::Float(v) => SmallVec::from_slice(&v.to_bits().to_le_bytes()),
            Constant::Double(v) => SmallVec::from_slice(&v.to_bits().to_le_bytes()),
        }
    }

    /// Decode `bytes` as a constant of `primitive`. The slice must be
    /// exactly [`Primitive::byte_width`] long.
    pub fn from_bytes(primitive: Primitive, bytes: &[u8]) -> Option<Constant> {
        if bytes.len() != primitive.byte_width() {
            return None;
        }
        Some(match primitive {
            Primitive::Bool => Constant::Bool(bytes[0] != 0),
            Primitive::Byte => Constant::Byte(i8::from_le_bytes(bytes.try_into().ok()?)),
            Primitive::Short => Constant::Short(i16::from_le_bytes(bytes.try_into().ok()?)),
            Primitive::Char => Constant::Char(u16::from_le_bytes(bytes.try_into().ok()?)),
            Primitive::Int => Constant::Int(i32::from_le_bytes(bytes.try_into().ok()?)),
            Primitive::Long => Constant::Long(i64::from_le_bytes(bytes.try_into().ok()?)),
            Primitive::Float => {
                Constant::Float(f32::from_bits(u32::from_le_bytes(bytes.try_into().ok()?)))
            }
            Primitive::Double => {
                Constant::Double(f64::from_bits(u64::from_le_bytes(bytes.try_into().ok()?)))
            }
        })
    }

    /// Type a number literal.
    ///
    /// A `f`/`F` suffix gives `float`, a `d`/`D` suffix, a decimal point or
    /// an exponent give `double`. Other literals are `int` when they fit and
    /// `long` otherwise.
    pub fn parse_number(text: &str) -> Option<Constant> {
        if let Some(body) = text.strip_suffix(['f', 'F']) {
            return body.parse::<f32>().ok().map(Constant::Float);
        }
        if let Some(body) = text.strip_suffix(['d', 'D']) {
            return body.parse::<f64>().ok().map(Constant::Double);
        }
        if text.contains(['.', 'e', 'E']) {
            return text.parse::<f64>().ok().map(Constant::Double);
        }
        let value = text.parse::<i64>().ok()?;
        Some(match i32::try_from(value) {
            Ok(int) => Constant::Int(int),
            Err(_) => Constant::Long(value),
        })
    }

    /// The same number as a constant of `target`: any widening along the
    /// numeric lattice, or an `int` that fits a narrower integral type.
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(self, target: Primitive) -> Option<Constant> {
        if self.primitive() == target {
            return Some(self);
        }
        if let Constant::Int(v) = self {
            match target {
                Primitive::Byte => return i8::try_from(v).ok().map(Constant::Byte),
                Primitive::Short => return i16::try_from(v).ok().map(Constant::Short),
                Primitive::Char => return u16::try_from(v).ok().map(Constant::Char),
                _ => {}
            }
        }
        if !self.primitive().widens_to(target) {
            return None;
        }
        let integral = match self {
            Constant::Byte(v) => i64::from(v),
            Constant::Short(v) => i64::from(v),
            Constant::Char(v) => i64::from(v),
            Constant::Int(v) => i64::from(v),
            Constant::Long(v) => v,
            Constant::Float(v) => return Some(Constant::Double(f64::from(v))),
            Constant::Bool(_) | Constant::Double(_) => return None,
        };
        Some(match target {
            Primitive::Short => Constant::Short(i16::try_from(integral).ok()?),
            Primitive::Int => Constant::Int(i32::try_from(integral).ok()?),
            Primitive::Long => Constant::Long(integral),
            Primitive::Float => Constant::Float(integral as f32),
            Primitive::Double => Constant::Double(integral as f64),
            Primitive::Bool | Primitive::Byte | Primitive::Char => return None,
        })
    }

    pub fn parse_bool(text: &str) -> Option<Constant> {
        match text {
            "true" | "yes" => Some(Constant::Bool(true)),
            "false" | "no" => Some(Constant::Bool(false)),
            _ => None,
        }
    }
}

/// Arithmetic, bitwise and comparison operators on primitives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Xor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl PrimOp {
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            PrimOp::Lt | PrimOp::Gt | PrimOp::Le | PrimOp::Ge | PrimOp::Eq | PrimOp::Ne
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryPrimOp {
    Neg,
    BitNot,
    Not,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InvokeKind {
    Static,
    Virtual,
    Interface,
    /// Constructor chaining and private calls.
    Special,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastKind {
    /// Primitive widening along the numeric lattice.
    Widen,
    /// Explicit primitive conversion written with `as`.
    Convert,
    /// Primitive to its wrapper class.
    Box,
    /// Checked reference cast.
    Check,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Const(Constant),
    Str {
        text: String,
        ty: TypeId,
    },
    /// Class literal of `target`.
    ClassLit {
        target: TypeId,
        ty: TypeId,
    },
    Null,
    Array(Box<ArrayValue>),
    EnumConst {
        ty: TypeId,
        name: String,
    },
    Pack(Box<ValuePack>),
    This {
        ty: TypeId,
    },
    Load {
        var: Var,
        ty: TypeId,
    },
    GetField {
        /// `None` for a static field.
        target: Option<Box<Value>>,
        field: FieldRef,
        ty: TypeId,
    },
    ArrayLength(Box<Value>),
    ArrayLoad {
        array: Box<Value>,
        index: Box<Value>,
        ty: TypeId,
    },
    Invoke(Box<Invoke>),
    New(Box<NewObject>),
    Cast {
        kind: CastKind,
        value: Box<Value>,
        ty: TypeId,
    },
    Unary {
        op: UnaryPrimOp,
        operand: Box<Value>,
        ty: TypeId,
    },
    Binary {
        op: PrimOp,
        left: Box<Value>,
        right: Box<Value>,
        ty: TypeId,
    },
    /// Short-circuit `&&` (`and = true`) or `||`.
    Logical {
        and: bool,
        left: Box<Value>,
        right: Box<Value>,
    },
    /// Reference identity (`===`, or `!==` when `negate`).
    Identity {
        negate: bool,
        left: Box<Value>,
        right: Box<Value>,
    },
    InstanceOf {
        value: Box<Value>,
        target: TypeId,
        negate: bool,
    },
    /// String concatenation; parts of any type.
    Concat {
        parts: Vec<Value>,
        ty: TypeId,
    },
    Lambda(Box<LambdaValue>),
    /// Exception caught by the handler this value appears under.
    Caught {
        ty: TypeId,
    },
}

impl Value {
    /// Static type of the value. `null` has [`TypeId::NULL`].
    pub fn ty(&self) -> TypeId {
        match self {
            Value::Const(c) => c.ty(),
            Value::Null => TypeId::NULL,
            Value::Logical { .. } | Value::Identity { .. } | Value::InstanceOf { .. } => {
                TypeId::BOOL
            }
            Value::ArrayLength(_) => TypeId::INT,
            Value::Str { ty, .. }
            | Value::ClassLit { ty, .. }
            | Value::EnumConst { ty, .. }
            | Value::This { ty }
            | Value::Load { ty, .. }
            | Value::GetField { ty, .. }
            | Value::ArrayLoad { ty, .. }
            | Value::Cast { ty, .. }
            | Value::Unary { ty, .. }
            | Value::Binary { ty, .. }
            | Value::Concat { ty, .. }
            | Value::Caught { ty } => *ty,
            Value::Array(array) => array.ty,
            Value::Pack(pack) => pack.result.ty(),
            Value::Invoke(invoke) => invoke.ty,
            Value::New(new) => new.ty,
            Value::Lambda(lambda) => lambda.ty,
        }
    }

    /// Value computable at compile time (annotation arguments, defaults).
    pub fn is_constant(&self) -> bool {
        match self {
            Value::Const(_)
            | Value::Str { .. }
            | Value::ClassLit { .. }
            | Value::EnumConst { .. } => true,
            Value::Array(array) => array.elements.iter().all(Value::is_constant),
            _ => false,
        }
    }

    /// Whether evaluating the value twice is observable or costly.
    pub(crate) fn is_simple(&self) -> bool {
        matches!(
            self,
            Value::Const(_) | Value::Str { .. } | Value::Null | Value::This { .. } | Value::Load { .. }
        )
    }
}

/// Array aggregate `[a, b, c]`.
#[derive(Clone, PartialEq, Debug)]
pub struct ArrayValue {
    /// The array type itself.
    pub ty: TypeId,
    pub element: TypeId,
    pub dims: u32,
    pub elements: Vec<Value>,
}

/// Instructions evaluated before `result`.
#[derive(Clone, PartialEq, Debug)]
pub struct ValuePack {
    pub instructions: Vec<Instruction>,
    pub result: Value,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Invoke {
    pub kind: InvokeKind,
    /// Receiver; `None` for static calls.
    pub target: Option<Value>,
    pub method: MethodRef,
    pub args: Vec<Value>,
    pub ty: TypeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct NewObject {
    pub ty: TypeId,
    pub constructor: MethodRef,
    pub args: Vec<Value>,
}

/// Function object backed by a synthetic method.
///
/// `captured` names, for each captured parameter of `method`, the variable
/// of the creating frame it is seeded from. A variable that stayed boxed is
/// passed as its cell; arguments whose parameter ends up without a slot are
/// not passed.
#[derive(Clone, PartialEq, Debug)]
pub struct LambdaValue {
    pub method: MethodRef,
    /// Abstract method of the functional interface being implemented.
    pub implements: MethodRef,
    pub captured: Vec<Var>,
    /// Receiver for lambdas created in instance methods.
    pub this: Option<Value>,
    pub ty: TypeId,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Instruction {
    Store {
        var: Var,
        value: Value,
    },
    PutField {
        target: Value,
        field: FieldRef,
        value: Value,
    },
    PutStatic {
        field: FieldRef,
        value: Value,
    },
    ArrayStore {
        array: Value,
        index: Value,
        value: Value,
    },
    /// Evaluate and discard.
    Eval(Value),
    Return(Option<Value>),
    Throw(Value),
    Goto(Label),
    /// Jump to `target` when `condition` evaluates to `when`.
    Branch {
        condition: Value,
        when: bool,
        target: Label,
    },
    Label(Label),
    MonitorEnter(Var),
    MonitorExit(Var),
}

impl Instruction {
    /// Control never falls through to the next instruction.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Instruction::Return(_) | Instruction::Throw(_) | Instruction::Goto(_)
        )
    }
}

/// Exception table entry: exceptions of `ty` (any exception when `None`)
/// thrown between `start` and `end` transfer control to `handler`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExceptionEntry {
    pub start: Label,
    pub end: Label,
    pub handler: Label,
    pub ty: Option<TypeId>,
}

#[cfg(test)]
mod tests;
