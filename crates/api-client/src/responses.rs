use crate::error::ApiError;
use core_types::Paginated;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The body the backend sends alongside a non-success status.
///
/// The dashboard contract names `message`; FastAPI's default handlers use a
/// string `detail` instead. Validation errors put a list in `detail`, which is
/// not a human-readable message and is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };
        self.message.and_then(non_empty).or_else(|| match self.detail {
            Some(Value::String(detail)) => non_empty(detail),
            _ => None,
        })
    }
}

/// Pagination metadata every list envelope carries next to its items array.
#[derive(Debug, Clone, Deserialize)]
struct PageMeta {
    total: u64,
    page: u32,
    page_size: u32,
    #[serde(default)]
    has_next: bool,
}

/// Reshapes a list envelope such as `{"tokens": [...], "total": .., ...}` into
/// the uniform `Paginated` shape, moving the array found under `items_key`
/// into `items` in the order the backend sent it.
pub fn normalize_list<T: DeserializeOwned>(body: Value, items_key: &str) -> Result<Paginated<T>, ApiError> {
    let Value::Object(mut fields) = body else {
        return Err(ApiError::Deserialization(format!(
            "expected a JSON object carrying '{}'",
            items_key
        )));
    };

    let raw_items = fields.remove(items_key).ok_or_else(|| {
        ApiError::Deserialization(format!("list response is missing the '{}' array", items_key))
    })?;
    let items: Vec<T> = serde_json::from_value(raw_items)
        .map_err(|e| ApiError::Deserialization(format!("'{}' items: {}", items_key, e)))?;
    let meta: PageMeta = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::Deserialization(format!("pagination metadata: {}", e)))?;

    Ok(Paginated {
        items,
        total: meta.total,
        page: meta.page,
        page_size: meta.page_size,
        has_next: meta.has_next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn items_keep_backend_order() {
        let body = json!({
            "exchanges": [{"id": 3}, {"id": 1}, {"id": 2}],
            "total": 43, "page": 2, "page_size": 20, "has_next": true
        });
        let page: Paginated<Item> = normalize_list(body, "exchanges").unwrap();
        assert_eq!(page.items, vec![Item { id: 3 }, Item { id: 1 }, Item { id: 2 }]);
        assert_eq!((page.total, page.page, page.page_size, page.has_next), (43, 2, 20, true));
    }

    #[test]
    fn missing_items_key_is_an_error() {
        let body = json!({ "items": [], "total": 0, "page": 1, "page_size": 20 });
        let err = normalize_list::<Item>(body, "tokens").unwrap_err();
        assert!(err.to_string().contains("'tokens'"));
    }

    #[test]
    fn error_body_prefers_message_over_detail() {
        let body: ErrorBody = serde_json::from_value(json!({"message": "a", "detail": "b"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("a"));

        let body: ErrorBody = serde_json::from_value(json!({"message": "  ", "detail": "b"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("b"));
    }
}
