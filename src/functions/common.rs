/// Greeting shared by the sample functions.
#[must_use]
pub fn hello() -> String {
    "Hello".to_string()
}
