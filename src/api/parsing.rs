use serde_json::Value;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Case-insensitive header lookup on a raw JSON header map.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v_str_nested() {
        let v = json!({"requestContext": {"http": {"method": "POST"}}});
        assert_eq!(v_str(&v, &["requestContext", "http", "method"]), Some("POST"));
        assert_eq!(v_str(&v, &["requestContext", "missing"]), None);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = json!({"Content-Type": "application/json"});
        assert_eq!(
            get_header_value(&headers, "content-type"),
            Some("application/json")
        );
    }
}
