// MongoDB query builder — converts core adapter types into BSON documents.

use mongodb::bson::{doc, Bson, Document};

use skillforge_core::db::adapter::{
    Connector, FindManyQuery, Operator, SortDirection, WhereClause,
};

/// Convert a WhereClause slice to a MongoDB filter document.
pub fn build_filter(clauses: &[WhereClause]) -> Document {
    if clauses.is_empty() {
        return doc! {};
    }

    let mut and_conditions: Vec<Document> = Vec::new();
    let mut or_group: Vec<Document> = Vec::new();
    let mut in_or = false;

    for clause in clauses {
        let field_filter = clause_to_doc(clause);

        if in_or {
            or_group.push(field_filter);
        } else {
            and_conditions.push(field_filter);
        }

        if matches!(clause.connector, Some(Connector::Or)) {
            if !in_or {
                // Move the last AND condition into the OR group
                if let Some(last) = and_conditions.pop() {
                    or_group.push(last);
                }
                in_or = true;
            }
        } else if in_or {
            // Flush OR group
            and_conditions.push(doc! { "$or": or_group.clone() });
            or_group.clear();
            in_or = false;
        }
    }

    if !or_group.is_empty() {
        and_conditions.push(doc! { "$or": or_group });
    }

    if and_conditions.len() == 1 {
        and_conditions.into_iter().next().unwrap()
    } else if and_conditions.is_empty() {
        doc! {}
    } else {
        doc! { "$and": and_conditions }
    }
}

/// Convert a single WhereClause to a MongoDB filter document.
fn clause_to_doc(clause: &WhereClause) -> Document {
    let field = mongo_field(&clause.field);
    let value = json_to_bson(&clause.value);

    match clause.operator {
        Operator::Eq => doc! { field: value },
        Operator::Ne => doc! { field: { "$ne": value } },
        Operator::Lt => doc! { field: { "$lt": value } },
        Operator::Lte => doc! { field: { "$lte": value } },
        Operator::Gt => doc! { field: { "$gt": value } },
        Operator::Gte => doc! { field: { "$gte": value } },
        Operator::In => {
            if let Bson::Array(arr) = value {
                doc! { field: { "$in": arr } }
            } else {
                doc! { field: { "$in": [value] } }
            }
        }
        Operator::Contains => {
            let s = clause.value.as_str().unwrap_or("");
            doc! { field: { "$regex": regex_escape(s), "$options": "i" } }
        }
    }
}

/// Map the logical `id` field to Mongo's `_id`.
fn mongo_field(field: &str) -> String {
    if field == "id" {
        "_id".to_string()
    } else {
        field.to_string()
    }
}

/// Convert serde_json::Value to BSON.
pub fn json_to_bson(v: &serde_json::Value) -> Bson {
    match v {
        serde_json::Value::Null => Bson::Null,
        serde_json::Value::Bool(b) => Bson::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Bson::String(s.clone()),
        serde_json::Value::Array(arr) => Bson::Array(arr.iter().map(json_to_bson).collect()),
        serde_json::Value::Object(map) => {
            let mut doc = Document::new();
            for (k, v) in map {
                doc.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(doc)
        }
    }
}

/// Convert BSON to serde_json::Value.
pub fn bson_to_json(b: &Bson) -> serde_json::Value {
    match b {
        Bson::Null => serde_json::Value::Null,
        Bson::Boolean(b) => serde_json::json!(*b),
        Bson::Int32(i) => serde_json::json!(*i),
        Bson::Int64(i) => serde_json::json!(*i),
        Bson::Double(f) => serde_json::json!(*f),
        Bson::String(s) => serde_json::json!(s),
        Bson::ObjectId(oid) => serde_json::json!(oid.to_hex()),
        Bson::Array(arr) => serde_json::Value::Array(arr.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => doc_to_json(doc),
        Bson::DateTime(dt) => serde_json::json!(dt.timestamp_millis()),
        _ => serde_json::Value::Null,
    }
}

/// Convert a MongoDB Document to serde_json::Value, mapping `_id` back to `id`.
pub fn doc_to_json(doc: &Document) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (k, v) in doc {
        let key = if k == "_id" { "id".to_string() } else { k.clone() };
        map.insert(key, bson_to_json(v));
    }
    serde_json::Value::Object(map)
}

/// Convert a JSON data object to an insert document, mapping `id` to `_id`.
pub fn build_insert_doc(data: &serde_json::Value) -> Document {
    let mut doc = Document::new();
    if let Some(obj) = data.as_object() {
        for (k, v) in obj {
            let key = if k == "id" { "_id".to_string() } else { k.clone() };
            doc.insert(key, json_to_bson(v));
        }
    }
    doc
}

/// Convert a JSON data object to a `$set` update document.
pub fn build_update_doc(data: &serde_json::Value) -> Document {
    let mut set = Document::new();
    if let Some(obj) = data.as_object() {
        for (k, v) in obj {
            let key = if k == "id" { "_id".to_string() } else { k.clone() };
            set.insert(key, json_to_bson(v));
        }
    }
    doc! { "$set": set }
}

/// Build a `$inc` update document for a single numeric field.
pub fn build_inc_doc(field: &str, delta: i64) -> Document {
    let mut inc = Document::new();
    inc.insert(mongo_field(field), delta);
    doc! { "$inc": inc }
}

/// Build a sort document from a FindManyQuery.
pub fn build_sort(query: &FindManyQuery) -> Option<Document> {
    query.sort_by.as_ref().map(|sort| {
        let direction = match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        let field = mongo_field(&sort.field);
        doc! { field: direction }
    })
}

/// Escape regex special characters.
fn regex_escape(s: &str) -> String {
    let special = ['.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\'];
    let mut escaped = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        assert_eq!(build_filter(&[]), doc! {});
    }

    #[test]
    fn test_build_filter_eq_and_id_mapping() {
        let filter = build_filter(&[WhereClause::eq("id", "c1")]);
        assert_eq!(filter, doc! { "_id": "c1" });
    }

    #[test]
    fn test_build_filter_gte() {
        let filter = build_filter(&[WhereClause::gte("order", 3)]);
        assert_eq!(filter, doc! { "order": { "$gte": 3_i64 } });
    }

    #[test]
    fn test_build_filter_in() {
        let filter = build_filter(&[WhereClause::is_in(
            "status",
            vec![serde_json::json!("active"), serde_json::json!("completed")],
        )]);
        assert_eq!(filter, doc! { "status": { "$in": ["active", "completed"] } });
    }

    #[test]
    fn test_build_filter_multiple_ands() {
        let filter = build_filter(&[
            WhereClause::eq("courseId", "c1"),
            WhereClause::gte("order", 2),
        ]);
        assert_eq!(
            filter,
            doc! { "$and": [ { "courseId": "c1" }, { "order": { "$gte": 2_i64 } } ] }
        );
    }

    #[test]
    fn test_build_filter_or_group() {
        let filter = build_filter(&[
            WhereClause::contains("title", "rust").or(),
            WhereClause::contains("description", "rust"),
        ]);
        assert!(filter.contains_key("$or"));
    }

    #[test]
    fn test_build_inc_doc() {
        let inc = build_inc_doc("totalStudents", -1);
        assert_eq!(inc, doc! { "$inc": { "totalStudents": -1_i64 } });
    }

    #[test]
    fn test_build_insert_doc_id_mapping() {
        let data = serde_json::json!({"id": "c1", "title": "Rust 101"});
        let doc = build_insert_doc(&data);
        assert!(doc.contains_key("_id"));
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn test_doc_to_json_id_mapping() {
        let doc = doc! { "_id": "c1", "title": "Rust 101" };
        let json = doc_to_json(&doc);
        assert_eq!(json["id"], "c1");
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_build_sort() {
        use skillforge_core::db::adapter::SortBy;
        let query = FindManyQuery {
            sort_by: Some(SortBy::desc("createdAt")),
            ..Default::default()
        };
        assert_eq!(build_sort(&query).unwrap(), doc! { "createdAt": -1 });
    }

    #[test]
    fn test_regex_escape() {
        assert_eq!(regex_escape("c++ (intro)"), "c\\+\\+ \\(intro\\)");
    }
}
