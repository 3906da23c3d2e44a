use serde_json::Value;

/// Asserts the value at a JSON pointer such as `/0/birthday/1`.
#[track_caller]
pub fn assert_at(json: &Value, pointer: &str, expected: Value) {
    match json.pointer(pointer) {
        Some(actual) => assert_eq!(actual, &expected, "at {}", pointer),
        None => panic!("Nothing at {} in {}", pointer, json),
    }
}

/// Keys of the object at `pointer`, in order.
#[track_caller]
pub fn keys_at<'a>(json: &'a Value, pointer: &str) -> Vec<&'a str> {
    match json.pointer(pointer) {
        Some(Value::Object(map)) => map.keys().map(String::as_str).collect(),
        other => panic!("Expected an object at {}, got {:?}", pointer, other),
    }
}
