use serde_json::{Value, json};

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A successful envelope body carrying `data`.
pub fn ok_body(data: Value) -> String {
    json!({"code": 0, "data": data}).to_string()
}

/// A failed envelope body with a nonzero code and a message.
pub fn fail_body(code: i64, message: &str) -> String {
    json!({"code": code, "message": message}).to_string()
}
