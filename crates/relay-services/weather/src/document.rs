//! Field access on provider documents.

use relay_framework::HandlerError;
use serde_json::Value;

/// The string at `pointer`, or a malformed-response error.
pub(crate) fn text<'a>(doc: &'a Value, pointer: &str) -> Result<&'a str, HandlerError> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::malformed(format!("no string at {pointer}")))
}

/// The array at `pointer`; `None` when absent or null.
pub(crate) fn list<'a>(doc: &'a Value, pointer: &str) -> Option<&'a [Value]> {
    doc.pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_and_list() {
        let doc = json!({"a": {"b": "c", "n": 1, "xs": [1, 2]}, "nil": null});
        assert_eq!(text(&doc, "/a/b").unwrap(), "c");
        assert!(matches!(text(&doc, "/a/n"), Err(HandlerError::Malformed(_))));
        assert!(matches!(text(&doc, "/missing"), Err(HandlerError::Malformed(_))));
        assert_eq!(list(&doc, "/a/xs").map(<[Value]>::len), Some(2));
        assert!(list(&doc, "/nil").is_none());
        assert!(list(&doc, "/a/b").is_none());
    }
}
