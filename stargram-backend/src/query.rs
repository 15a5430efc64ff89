//! Document list queries, in the backend's JSON query syntax.

use serde::Serialize;
use serde_json::Value;

pub const CREATED_AT: &str = "$createdAt";

#[derive(Clone, PartialEq, Debug)]
pub enum Query {
    Equal { attribute: String, values: Vec<Value> },
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
}

#[derive(Serialize)]
struct WireQuery<'a> {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Value>>,
}

impl Query {
    #[must_use]
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    #[must_use]
    pub fn newest_first() -> Self {
        Self::OrderDesc(CREATED_AT.to_owned())
    }

    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        let wire = match self {
            Query::Equal { attribute, values } => WireQuery {
                method: "equal",
                attribute: Some(attribute),
                values: Some(values.clone()),
            },
            Query::OrderAsc(attribute) => WireQuery {
                method: "orderAsc",
                attribute: Some(attribute),
                values: None,
            },
            Query::OrderDesc(attribute) => WireQuery {
                method: "orderDesc",
                attribute: Some(attribute),
                values: None,
            },
            Query::Limit(limit) => WireQuery {
                method: "limit",
                attribute: None,
                values: Some(vec![Value::from(*limit)]),
            },
        };

        serde_json::to_string(&wire)
    }
}

#[cfg(test)]
mod tests {
    use crate::query::Query;

    #[test]
    fn wire_format() {
        assert_eq!(
            Query::equal("accountId", "abc").to_wire().unwrap(),
            r#"{"method":"equal","attribute":"accountId","values":["abc"]}"#
        );
        assert_eq!(
            Query::newest_first().to_wire().unwrap(),
            r#"{"method":"orderDesc","attribute":"$createdAt"}"#
        );
        assert_eq!(
            Query::Limit(20).to_wire().unwrap(),
            r#"{"method":"limit","values":[20]}"#
        );
    }
}
