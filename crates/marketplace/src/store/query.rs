//! Query predicates and ordering.

use std::cmp::Ordering;

use serde_json::Value;

use super::{CollectionPath, Document};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied to a query's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A predicate on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: Value },
}

impl Filter {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Eq { field, value } => doc.fields.get(field) == Some(value),
        }
    }
}

/// A query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// Everything in `collection`, in id order.
    #[must_use]
    pub const fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
        }
    }

    /// Add an equality filter.
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Order results by a field.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_owned(),
            direction,
        });
        self
    }

    /// Returns `true` if the document passes every filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Returns `true` if the query contains `field == value`.
    #[must_use]
    pub fn has_filter(&self, field: &str, value: &Value) -> bool {
        self.filters.iter().any(|f| match f {
            Filter::Eq { field: f, value: v } => f == field && v == value,
        })
    }

    /// Filter and order a set of documents.
    ///
    /// Input is expected in id order; ties on the ordering field keep it.
    #[must_use]
    pub fn evaluate(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            matched.sort_by(|a, b| {
                let ord = compare_values(a.fields.get(&order.field), b.fields.get(&order.field));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        matched
    }
}

/// Total order over optional JSON values.
///
/// Missing < null < bool < number < string; arrays and objects compare
/// equal to each other and sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_) | Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(id: &str, fields: &Value) -> Document {
        Document {
            id: id.to_owned(),
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_where_eq_filters() {
        let query = Query::collection(CollectionPath::reviews()).where_eq("productId", "p1");
        let docs = vec![
            doc("a", &json!({"productId": "p1"})),
            doc("b", &json!({"productId": "p2"})),
            doc("c", &json!({})),
        ];
        let result = query.evaluate(docs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn test_order_descending_numbers() {
        let query =
            Query::collection(CollectionPath::products()).order_by("createdAt", Direction::Descending);
        let docs = vec![
            doc("a", &json!({"createdAt": 1})),
            doc("b", &json!({"createdAt": 3})),
            doc("c", &json!({"createdAt": 2})),
        ];
        let ids: Vec<_> = query.evaluate(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let query =
            Query::collection(CollectionPath::products()).order_by("createdAt", Direction::Descending);
        let docs = vec![
            doc("a", &json!({"createdAt": 5})),
            doc("b", &json!({"createdAt": 5})),
        ];
        let ids: Vec<_> = query.evaluate(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_missing_field_sorts_first_ascending() {
        let query =
            Query::collection(CollectionPath::products()).order_by("createdAt", Direction::Ascending);
        let docs = vec![doc("a", &json!({"createdAt": 5})), doc("b", &json!({}))];
        let ids: Vec<_> = query.evaluate(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_has_filter() {
        let query = Query::collection(CollectionPath::products()).where_eq("supplierId", "u1");
        assert!(query.has_filter("supplierId", &json!("u1")));
        assert!(!query.has_filter("supplierId", &json!("u2")));
    }
}
