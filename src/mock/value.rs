use std::rc::Rc;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

/// Synthesized example value. Children are `Rc`-shared because a memoized
/// subtree is handed out verbatim every time its key is seen again.
#[derive(Debug, Clone, PartialEq)]
pub enum MockValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Rc<MockValue>>),
    /// Insertion order == field declaration order.
    Object(IndexMap<String, Rc<MockValue>>),
    /// Error or circular-reference marker; renders as a plain string.
    Placeholder(String),
}

impl MockValue {
    pub fn empty_object() -> Self {
        MockValue::Object(IndexMap::new())
    }

    pub fn singleton(item: Rc<MockValue>) -> Self {
        MockValue::List(vec![item])
    }

    pub fn circular(key: &str) -> Self {
        MockValue::Placeholder(format!("[WARN] circular reference, structure already shown as {key}"))
    }

    pub fn unresolvable(presentable: &str) -> Self {
        MockValue::Placeholder(format!("[ERROR] cannot find declaration for type [{presentable}]"))
    }

    pub fn undeterminable(presentable: &str) -> Self {
        MockValue::Placeholder(format!("[ERROR] cannot determine default value for type [{presentable}]"))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, MockValue::Placeholder(_))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Rc<MockValue>>> {
        match self {
            MockValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Text used for query strings, headers and path variables.
    pub fn to_query_text(&self) -> String {
        match self {
            MockValue::Bool(b) => b.to_string(),
            MockValue::Int(i) => i.to_string(),
            MockValue::Float(f) => f.to_string(),
            MockValue::Str(s) | MockValue::Placeholder(s) => s.clone(),
            MockValue::List(items) => items.first().map(|x| x.to_query_text()).unwrap_or_default(),
            MockValue::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            MockValue::Bool(b) => Value::Bool(*b),
            MockValue::Int(i) => Value::from(*i),
            MockValue::Float(f) => Value::from(*f),
            MockValue::Str(s) | MockValue::Placeholder(s) => Value::String(s.clone()),
            MockValue::List(items) => Value::Array(items.iter().map(|x| x.to_json()).collect()),
            MockValue::Object(fields) => Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
            ),
        }
    }
}

impl Serialize for MockValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MockValue::Bool(b) => serializer.serialize_bool(*b),
            MockValue::Int(i) => serializer.serialize_i64(*i),
            MockValue::Float(f) => serializer.serialize_f64(*f),
            MockValue::Str(s) | MockValue::Placeholder(s) => serializer.serialize_str(s),
            MockValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item.as_ref())?;
                }
                seq.end()
            }
            MockValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v.as_ref())?;
                }
                map.end()
            }
        }
    }
}
