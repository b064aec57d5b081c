// used for date and datetime arguments
use chrono::{NaiveDate, NaiveDateTime};
// used for decimal numbers
use bigdecimal::BigDecimal;
use serde::Serialize;
use thiserror::Error;

// used when parsing a string into a typed value
use std::str::FromStr;
// used to print out readable forms of a value
use std::fmt;
use std::collections::BTreeMap;

/// The trailing options argument of a finder call, and any other keyed argument.
pub type ArgumentMap = BTreeMap<String, Value>;

// ------------- Value -------------
/// An opaque positional argument passed to a finder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    Decimal(BigDecimal),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
    Range(Box<Value>, Box<Value>),
    Map(ArgumentMap),
    /// A reference to another persistent instance, by identity.
    Entity { entity: String, id: Box<Value> },
}

impl Value {
    pub fn range(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self::Range(Box::new(from.into()), Box::new(to.into()))
    }
    pub fn entity(entity: &str, id: impl Into<Value>) -> Self {
        Self::Entity {
            entity: entity.to_string(),
            id: Box::new(id.into()),
        }
    }
    pub fn map<K: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_map(&self) -> Option<&ArgumentMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
    /// Loose truthiness for flag-style options such as `cache: true` or `lock: "true"`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(s) => parse_bool(s),
            _ => None,
        }
    }
    /// Whether the value can be used as-is where the given type is declared.
    pub fn is_instance_of(&self, value_type: &ValueType) -> bool {
        match (self, value_type) {
            (Self::Bool(_), ValueType::Boolean)
            | (Self::Long(_), ValueType::Long)
            | (Self::Double(_), ValueType::Double)
            | (Self::Decimal(_), ValueType::Decimal)
            | (Self::Str(_), ValueType::String)
            | (Self::Date(_), ValueType::Date)
            | (Self::DateTime(_), ValueType::DateTime) => true,
            (Self::Entity { entity, .. }, ValueType::Entity(target)) => entity == target,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Long(l) => write!(f, "{}", l),
            Self::Double(d) => write!(f, "{}", d),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Str(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d),
            Self::DateTime(d) => write!(f, "{}", d),
            Self::List(values) => write!(f, "{}", render_arguments(values)),
            Self::Range(from, to) => write!(f, "{}..{}", from, to),
            Self::Map(map) => {
                if map.is_empty() {
                    return write!(f, "[:]");
                }
                let entries: Vec<String> = map.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "[{}]", entries.join(", "))
            }
            Self::Entity { entity, id } => write!(f, "{}#{}", entity, id),
        }
    }
}

/// Renders an argument list the way it is reported in finder errors.
pub fn render_arguments(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Long(i64::from(i))
    }
}
impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Self::Long(l)
    }
}
impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}
impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Self::Decimal(d)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}
impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Self::DateTime(d)
    }
}
impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Null, Into::into)
    }
}
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(l) => Self::Long(l),
                None => Self::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(values) => {
                Self::List(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ------------- Value Types -------------
/// The declared type of a persistent property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ValueType {
    Boolean,
    Long,
    Double,
    Decimal,
    String,
    Date,
    DateTime,
    /// An association to the named entity.
    Entity(String),
}

impl ValueType {
    /// Parses a basic type name; any other name is taken to be an entity.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Boolean" | "boolean" | "bool" => Self::Boolean,
            "Long" | "long" | "Integer" | "integer" | "int" => Self::Long,
            "Double" | "double" | "Float" | "float" => Self::Double,
            "Decimal" | "decimal" | "BigDecimal" => Self::Decimal,
            "String" | "string" => Self::String,
            "Date" | "date" => Self::Date,
            "DateTime" | "datetime" => Self::DateTime,
            other => Self::Entity(other.to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Entity(name) => write!(f, "{}", name),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot convert value [{value}] to type {target}")]
pub struct ConversionError {
    pub value: String,
    pub target: String,
}

// ------------- Conversion -------------
/// Converts a value to the declared type. Null converts to null for every type,
/// and values that already are instances of the type are returned unchanged.
pub fn convert(value: &Value, target: &ValueType) -> Result<Value, ConversionError> {
    if value.is_null() || value.is_instance_of(target) {
        return Ok(value.clone());
    }
    let converted = match (value, target) {
        (Value::Str(s), ValueType::Boolean) => parse_bool(s).map(Value::Bool),
        (Value::Str(s), ValueType::Long) => s.trim().parse::<i64>().ok().map(Value::Long),
        (Value::Str(s), ValueType::Double) => s.trim().parse::<f64>().ok().map(Value::Double),
        (Value::Str(s), ValueType::Decimal) => BigDecimal::from_str(s.trim()).ok().map(Value::Decimal),
        (Value::Str(s), ValueType::Date) => NaiveDate::from_str(s.trim()).ok().map(Value::Date),
        (Value::Str(s), ValueType::DateTime) => parse_datetime(s.trim()).map(Value::DateTime),
        (Value::Long(l), ValueType::Double) => Some(Value::Double(*l as f64)),
        (Value::Long(l), ValueType::Decimal) => Some(Value::Decimal(BigDecimal::from(*l))),
        (Value::Double(d), ValueType::Long) if d.is_finite() => Some(Value::Long(*d as i64)),
        (Value::Double(d), ValueType::Decimal) if d.is_finite() => {
            BigDecimal::from_str(&d.to_string()).ok().map(Value::Decimal)
        }
        (Value::Decimal(d), ValueType::Long) => {
            if d.with_scale(0) == *d {
                d.with_scale(0).to_string().parse::<i64>().ok().map(Value::Long)
            } else {
                None
            }
        }
        (Value::Decimal(d), ValueType::Double) => d.to_string().parse::<f64>().ok().map(Value::Double),
        (Value::Date(d), ValueType::DateTime) => d.and_hms_opt(0, 0, 0).map(Value::DateTime),
        (Value::DateTime(d), ValueType::Date) => Some(Value::Date(d.date())),
        (
            Value::Bool(_)
            | Value::Long(_)
            | Value::Double(_)
            | Value::Decimal(_)
            | Value::Date(_)
            | Value::DateTime(_),
            ValueType::String,
        ) => Some(Value::Str(value.to_string())),
        _ => None,
    };
    converted.ok_or_else(|| ConversionError {
        value: value.to_string(),
        target: target.to_string(),
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::from_str(s)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}
