/// Filter and update expression builders
///
/// Repositories never hand raw predicates to the store; they assemble a
/// [`Filter`] (a conjunction of typed conditions) for reads and an
/// [`Update`] (an ordered list of `SET` assignments) for writes. Absent
/// criteria are simply not added — there is no wildcard condition.
///
/// Both types render to a readable expression string for logging, and a
/// [`Filter`] can evaluate itself against an [`Item`], which is the
/// reference execution for any backend.
///
/// # Example
///
/// ```
/// use eventhub::db::{to_item, Filter};
/// use serde_json::json;
///
/// let filter = Filter::new()
///     .contains("name", "rust")
///     .eq("status", "active")
///     .not_exists("deleted_at");
///
/// let live = to_item(&json!({ "name": "rustconf", "status": "active" })).unwrap();
/// let gone = to_item(&json!({ "name": "rustconf", "status": "active", "deleted_at": "2025-01-01T00:00:00Z" })).unwrap();
/// assert!(filter.matches(&live));
/// assert!(!filter.matches(&gone));
/// assert_eq!(
///     filter.expression(),
///     "contains(name, \"rust\") AND status = \"active\" AND attribute_not_exists(deleted_at)"
/// );
/// ```
use std::fmt;

use serde_json::Value;

use super::Item;

/// A single predicate over one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact equality (`attr = value`); a missing attribute never matches
    Eq(String, Value),

    /// Case-sensitive substring match on a string attribute
    Contains(String, String),

    /// Inclusive lower bound (`attr >= value`)
    ///
    /// Strings compare lexicographically, which agrees with chronological
    /// order for the RFC 3339 UTC timestamps the models store.
    GreaterOrEqual(String, Value),

    /// The attribute is present and non-null
    AttributeExists(String),

    /// The attribute is absent (or null) — how soft-deletion is queried
    AttributeNotExists(String),
}

impl Condition {
    /// Evaluates this condition against a record
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Condition::Eq(attr, expected) => item.get(attr) == Some(expected),
            Condition::Contains(attr, needle) => item
                .get(attr)
                .and_then(Value::as_str)
                .map(|s| s.contains(needle.as_str()))
                .unwrap_or(false),
            Condition::GreaterOrEqual(attr, bound) => match (item.get(attr), bound) {
                (Some(Value::String(actual)), Value::String(bound)) => {
                    actual.as_str() >= bound.as_str()
                }
                (Some(Value::Number(actual)), Value::Number(bound)) => {
                    match (actual.as_f64(), bound.as_f64()) {
                        (Some(a), Some(b)) => a >= b,
                        _ => false,
                    }
                }
                _ => false,
            },
            Condition::AttributeExists(attr) => {
                matches!(item.get(attr), Some(v) if !v.is_null())
            }
            Condition::AttributeNotExists(attr) => {
                matches!(item.get(attr), None | Some(Value::Null))
            }
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Condition::Eq(attr, value) => {
                out.push_str(&format!("{attr} = {value}"));
            }
            Condition::Contains(attr, needle) => {
                out.push_str(&format!("contains({attr}, \"{needle}\")"));
            }
            Condition::GreaterOrEqual(attr, value) => {
                out.push_str(&format!("{attr} >= {value}"));
            }
            Condition::AttributeExists(attr) => {
                out.push_str(&format!("attribute_exists({attr})"));
            }
            Condition::AttributeNotExists(attr) => {
                out.push_str(&format!("attribute_not_exists({attr})"));
            }
        }
    }
}

/// A conjunction of conditions; empty matches every record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition
    pub fn eq(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(attr.into(), value.into()));
        self
    }

    /// Adds a substring condition
    pub fn contains(mut self, attr: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::Contains(attr.into(), needle.into()));
        self
    }

    /// Adds an inclusive lower-bound condition
    pub fn greater_or_equal(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::GreaterOrEqual(attr.into(), value.into()));
        self
    }

    /// Adds an attribute-presence condition
    pub fn exists(mut self, attr: impl Into<String>) -> Self {
        self.conditions.push(Condition::AttributeExists(attr.into()));
        self
    }

    /// Adds an attribute-absence condition
    pub fn not_exists(mut self, attr: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::AttributeNotExists(attr.into()));
        self
    }

    /// True if no conditions were added
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the conjunction against a record
    pub fn matches(&self, item: &Item) -> bool {
        self.conditions.iter().all(|c| c.matches(item))
    }

    /// Renders the filter as a readable expression string
    pub fn expression(&self) -> String {
        let mut out = String::new();
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            condition.render(&mut out);
        }
        out
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

/// An ordered list of `SET` assignments for a partial update
///
/// Assignments apply in insertion order; the same attribute assigned twice
/// keeps the later value.
#[derive(Debug, Clone, Default)]
pub struct Update {
    assignments: Vec<(String, Value)>,
}

impl Update {
    /// Creates an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `SET attr = value` assignment
    pub fn set(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((attr.into(), value.into()));
        self
    }

    /// True if no assignments were added — callers treat this as "nothing
    /// changed, skip the write"
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Applies the assignments to a record in place
    pub fn apply(&self, item: &mut Item) {
        for (attr, value) in &self.assignments {
            item.insert(attr.clone(), value.clone());
        }
    }

    /// Renders the update as a readable `SET ...` string
    pub fn expression(&self) -> String {
        let mut out = String::from("SET ");
        for (i, (attr, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("{attr} = {value}"));
        }
        out
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::to_item;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        to_item(&value).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&item(json!({ "id": "1" }))));
        assert!(filter.matches(&Item::new()));
    }

    #[test]
    fn test_eq_missing_attribute_never_matches() {
        let filter = Filter::new().eq("role", "admin");
        assert!(filter.matches(&item(json!({ "role": "admin" }))));
        assert!(!filter.matches(&item(json!({ "role": "organizer" }))));
        assert!(!filter.matches(&item(json!({ "name": "no role here" }))));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let filter = Filter::new().contains("name", "Conf");
        assert!(filter.matches(&item(json!({ "name": "RustConf" }))));
        assert!(!filter.matches(&item(json!({ "name": "rustconf" }))));
        // non-string attributes never match
        assert!(!filter.matches(&item(json!({ "name": 42 }))));
    }

    #[test]
    fn test_greater_or_equal_is_lexicographic_for_strings() {
        let filter = Filter::new().greater_or_equal("date", "2025-06-01T00:00:00Z");
        assert!(filter.matches(&item(json!({ "date": "2025-06-01T00:00:00Z" }))));
        assert!(filter.matches(&item(json!({ "date": "2025-12-31T10:00:00Z" }))));
        assert!(!filter.matches(&item(json!({ "date": "2024-01-01T00:00:00Z" }))));
    }

    #[test]
    fn test_not_exists_treats_null_as_absent() {
        let filter = Filter::new().not_exists("deleted_at");
        assert!(filter.matches(&item(json!({ "id": "1" }))));
        assert!(filter.matches(&item(json!({ "id": "1", "deleted_at": null }))));
        assert!(!filter.matches(&item(json!({ "id": "1", "deleted_at": "2025-01-01T00:00:00Z" }))));
    }

    #[test]
    fn test_conjunction() {
        let filter = Filter::new()
            .eq("status", "active")
            .greater_or_equal("date", "2025-01-01T00:00:00Z");
        assert!(filter.matches(&item(
            json!({ "status": "active", "date": "2025-03-01T00:00:00Z" })
        )));
        assert!(!filter.matches(&item(
            json!({ "status": "inactive", "date": "2025-03-01T00:00:00Z" })
        )));
    }

    #[test]
    fn test_update_apply_and_render() {
        let update = Update::new()
            .set("name", "renamed")
            .set("updated_at", "2025-02-01T00:00:00Z");
        assert_eq!(update.len(), 2);

        let mut record = item(json!({ "id": "1", "name": "old" }));
        update.apply(&mut record);
        assert_eq!(record.get("name"), Some(&json!("renamed")));
        assert_eq!(record.get("updated_at"), Some(&json!("2025-02-01T00:00:00Z")));

        assert_eq!(
            update.expression(),
            "SET name = \"renamed\", updated_at = \"2025-02-01T00:00:00Z\""
        );
    }

    #[test]
    fn test_empty_update() {
        let update = Update::new();
        assert!(update.is_empty());
        assert_eq!(update.len(), 0);
    }
}
