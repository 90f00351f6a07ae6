//! Default values for primitives and the well-known boxed/base scalar types.
use std::collections::HashMap;
use chrono::{Local, Utc};
use once_cell::sync::Lazy;

use super::MockValue;
use crate::types::Primitive;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

type Supplier = fn() -> MockValue;

/// Keyed by presentable (simple) type name, exactly as written at use sites.
static SCALAR_DEFAULTS: Lazy<HashMap<&'static str, Supplier>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, Supplier> = HashMap::with_capacity(20);
    table.insert("Boolean", || MockValue::Bool(false));
    table.insert("Byte", || MockValue::Int(0));
    table.insert("Character", || MockValue::Int(0));
    table.insert("Short", || MockValue::Int(0));
    table.insert("Integer", || MockValue::Int(0));
    table.insert("Long", || MockValue::Int(0));
    table.insert("Float", || MockValue::Float(0.0));
    table.insert("Double", || MockValue::Float(0.0));
    table.insert("String", || MockValue::Str(String::new()));
    table.insert("BigDecimal", || MockValue::Int(0));
    table.insert("BigInteger", || MockValue::Int(0));
    table.insert("Date", now_date_time);
    table.insert("LocalDateTime", now_date_time);
    table.insert("LocalDate", || MockValue::Str(Local::now().format(DATE_FORMAT).to_string()));
    table.insert("LocalTime", || MockValue::Str(Local::now().format(TIME_FORMAT).to_string()));
    table.insert("Timestamp", now_epoch_millis);
    table.insert("Instant", now_epoch_millis);
    table
});

fn now_date_time() -> MockValue {
    MockValue::Str(Local::now().format(DATE_TIME_FORMAT).to_string())
}

fn now_epoch_millis() -> MockValue {
    MockValue::Int(Utc::now().timestamp_millis())
}

pub fn is_scalar(presentable: &str) -> bool {
    SCALAR_DEFAULTS.contains_key(presentable)
}

pub fn default_for(presentable: &str) -> Option<MockValue> {
    SCALAR_DEFAULTS.get(presentable).map(|supply| supply())
}

pub fn primitive_default(primitive: Primitive) -> MockValue {
    match primitive {
        Primitive::Boolean => MockValue::Bool(false),
        Primitive::Float | Primitive::Double => MockValue::Float(0.0),
        Primitive::Byte | Primitive::Char | Primitive::Short | Primitive::Int | Primitive::Long => MockValue::Int(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn fixed_scalars_are_deterministic() {
        assert_eq!(default_for("Integer"), Some(MockValue::Int(0)));
        assert_eq!(default_for("Boolean"), Some(MockValue::Bool(false)));
        assert_eq!(default_for("Double"), Some(MockValue::Float(0.0)));
        assert_eq!(default_for("String"), Some(MockValue::Str(String::new())));
        assert_eq!(default_for("BigDecimal"), default_for("BigDecimal"));
        assert_eq!(default_for("User"), None);
        assert!(!is_scalar("List<String>"));
    }

    #[test]
    fn primitives_use_zero_values() {
        assert_eq!(primitive_default(Primitive::Boolean), MockValue::Bool(false));
        assert_eq!(primitive_default(Primitive::Char), MockValue::Int(0));
        assert_eq!(primitive_default(Primitive::Float), MockValue::Float(0.0));
    }

    #[test]
    fn dates_are_well_formed_and_non_decreasing() {
        let parse = |v: MockValue| match v {
            MockValue::Str(s) => NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT).expect("formatted date"),
            other => panic!("expected string, got {other:?}"),
        };
        let first = parse(default_for("Date").unwrap());
        let second = parse(default_for("LocalDateTime").unwrap());
        assert!(first <= second);
    }
}
