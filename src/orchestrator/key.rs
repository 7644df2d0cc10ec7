//! Request key derivation.
//!
//! The key is the full canonical text of the request, not a digest, so two
//! different requests can never share a key. Every component is written
//! as a JSON string or canonical JSON value, which keeps component
//! boundaries unambiguous (a `/` or `&` inside a value cannot shift them).

use crate::model::{RequestDescriptor, RequestKey};
use serde_json::Value;

/// Derive the canonical key for `descriptor`.
pub fn derive_key(descriptor: &RequestDescriptor) -> RequestKey {
    let mut key = String::new();
    key.push_str(descriptor.method().as_str());
    key.push(' ');
    push_json_string(&mut key, descriptor.path());

    key.push_str(" {");
    // BTreeMap iteration is already sorted by name.
    for (i, (name, value)) in descriptor.query_params().iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        push_json_string(&mut key, name);
        key.push(':');
        push_json_string(&mut key, value);
    }
    key.push('}');

    key.push(' ');
    match descriptor.body_value() {
        Some(body) => push_canonical(&mut key, body),
        None => key.push('-'),
    }

    RequestKey(key)
}

fn push_json_string(out: &mut String, s: &str) {
    out.push_str(&Value::String(s.to_owned()).to_string());
}

/// Canonical JSON: object keys sorted, no insignificant whitespace.
fn push_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_json_string(out, k);
                out.push(':');
                push_canonical(out, v);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_descriptors_share_a_key() {
        let a = RequestDescriptor::get("/staff").query("store", "A");
        let b = RequestDescriptor::get("/staff").query("store", "A");
        assert_eq!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn query_insertion_order_is_irrelevant() {
        let a = RequestDescriptor::get("/shifts")
            .query("from", "2024-01-01")
            .query("to", "2024-01-31");
        let b = RequestDescriptor::get("/shifts")
            .query("to", "2024-01-31")
            .query("from", "2024-01-01");
        assert_eq!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn body_key_order_is_irrelevant() {
        let a = RequestDescriptor::post("/checklists").body(json!({"a": 1, "b": {"y": 2, "x": 1}}));
        let b = RequestDescriptor::post("/checklists").body(json!({"b": {"x": 1, "y": 2}, "a": 1}));
        assert_eq!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn bodies_that_differ_produce_different_keys() {
        let a = RequestDescriptor::post("/shifts").body(json!({"staff": 1}));
        let b = RequestDescriptor::post("/shifts").body(json!({"staff": 2}));
        let c = RequestDescriptor::post("/shifts");
        let d = RequestDescriptor::post("/shifts").body(json!(null));
        let keys = [a, b, c, d].map(|d| derive_key(&d));
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i], keys[j], "{} vs {}", keys[i], keys[j]);
            }
        }
    }

    #[test]
    fn method_is_part_of_identity() {
        let get = RequestDescriptor::get("/staff");
        let delete = RequestDescriptor::delete("/staff");
        assert_ne!(derive_key(&get), derive_key(&delete));
    }

    #[test]
    fn separators_inside_values_cannot_collide() {
        let a = RequestDescriptor::get("/a").query("x", "1\",\"y\":\"2");
        let b = RequestDescriptor::get("/a").query("x", "1").query("y", "2");
        assert_ne!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn key_is_readable_canonical_text() {
        let d = RequestDescriptor::get("/staff").query("store", "A");
        assert_eq!(derive_key(&d).as_str(), r#"GET "/staff" {"store":"A"} -"#);
    }
}
