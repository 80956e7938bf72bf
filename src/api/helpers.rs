//! Response builders for the Lambda entrypoint.

use serde_json::{Value, json};

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_err_response_shape() {
        let v = err_response(404, "Not found");
        assert_eq!(v["statusCode"], 404);
        let body: Value = serde_json::from_str(v["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["error"], "Not found");
    }
}
