use pmatch_ir::{Literal, Name};

/// A runtime value as seen by an executing procedure.
///
/// References are transparent: a non-nil reference is the object it points
/// to, a nil reference is [`Value::Nil`].
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Nil,
    Int(i128),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Name),
    /// Member of an opaque symbolic domain.
    Sym(Name),
    Enum {
        name: Name,
        ordinal: i64,
    },
    Object {
        /// Runtime type first, then its ancestors.
        type_chain: Vec<Name>,
        fields: Vec<(Name, Value)>,
    },
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Opt(Option<Box<Value>>),
}

impl Value {
    pub fn object(type_name: Name, fields: impl IntoIterator<Item = (Name, Value)>) -> Value {
        Value::Object {
            type_chain: vec![type_name],
            fields: fields.into_iter().collect(),
        }
    }

    pub fn some(value: Value) -> Value {
        Value::Opt(Some(Box::new(value)))
    }

    pub fn none() -> Value {
        Value::Opt(None)
    }

    pub fn field(&self, name: Name) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } => fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Element count of positional containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Seq(items) | Value::Tuple(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Ordinal of an enumeration member or bool.
    pub fn ordinal(&self) -> Option<i64> {
        match self {
            Value::Enum { ordinal, .. } => Some(*ordinal),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Equality with a literal. Values of another kind are unequal.
    #[allow(clippy::float_cmp)]
    pub fn matches_literal(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (Value::Int(v), Literal::Int { value, .. }) => v == value,
            (Value::Float(v), Literal::Float { bits, .. }) => *v == f64::from_bits(*bits),
            #[allow(clippy::cast_precision_loss)]
            (Value::Float(v), Literal::Int { value, .. }) => *v == *value as f64,
            (Value::Bool(v), Literal::Bool(b)) => v == b,
            (Value::Char(v), Literal::Char(c)) => v == c,
            (Value::Str(v), Literal::Str(s)) => v == s,
            (Value::Nil | Value::Opt(None), Literal::Nil) => true,
            (Value::Enum { name, .. } | Value::Sym(name), Literal::Symbol(s)) => name == s,
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Sym(_) => "symbol",
            Value::Enum { .. } => "enumeration member",
            Value::Object { .. } => "object",
            Value::Seq(_) => "sequence",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Opt(_) => "optional",
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Int { value, .. } => Value::Int(value),
            Literal::Float { bits, .. } => Value::Float(f64::from_bits(bits)),
            Literal::Str(s) => Value::Str(s),
            Literal::Char(c) => Value::Char(c),
            Literal::Bool(b) => Value::Bool(b),
            Literal::Nil => Value::Nil,
            Literal::Symbol(s) => Value::Sym(s),
        }
    }
}
