//! The mock response.
//!
//! The data endpoint answers every valid request with the same response:
//! a status code and a JSON body, optionally after a delay. These three
//! values are kept in a [`MockResponse`] which lives behind a
//! [`SharedMock`] handle for the whole lifetime of the process and can be
//! changed at runtime through the control endpoint.
//!
//! The values are stored exactly as the client sent them. Nothing checks
//! that the status code is actually a valid status code or that the delay
//! is a number. Problems only surface when the data endpoint tries to use
//! them: an unusable status code leads to an internal error while an
//! unusable delay is simply treated as no delay at all.

use std::sync::Arc;
use std::time::Duration;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::error::InternalError;
use crate::utils::sync::RwLock;


//------------ MockResponse --------------------------------------------------

/// The response configuration of the data endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct MockResponse {
    /// The status code to respond with.
    pub status_code: Value,

    /// The JSON body to respond with.
    pub response_body: Value,

    /// The delay before responding in milliseconds.
    pub response_delay: Value,
}

impl MockResponse {
    /// Returns the HTTP status code to respond with.
    ///
    /// Returns an error if the configured value is not an integer in the
    /// range of three-digit status codes.
    pub fn status(&self) -> Result<StatusCode, InternalError> {
        self.status_code.as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| {
                InternalError::new(format!(
                    "Invalid status code: {}", self.status_code
                ))
            })
    }

    /// Returns the delay before responding.
    ///
    /// Numbers and strings containing numbers are accepted as milliseconds.
    /// Returns `None` if the value is neither or not greater than zero.
    pub fn delay(&self) -> Option<Duration> {
        let millis = match self.response_delay {
            Value::Number(ref number) => number.as_f64()?,
            Value::String(ref s) => s.trim().parse::<f64>().ok()?,
            _ => return None
        };
        if millis.is_finite() && millis > 0. {
            // Float to int conversion saturates on overflow.
            Some(Duration::from_nanos((millis * 1_000_000.) as u64))
        }
        else {
            None
        }
    }

    /// Returns the mock response in the form reported to clients.
    pub fn to_json(&self) -> Value {
        json!({
            "statusCode": self.status_code,
            "responseBody": self.response_body,
            "responseDelay": self.response_delay,
        })
    }

    /// Applies an update.
    ///
    /// The status code and body are only replaced if the new value is
    /// truthy. The delay is replaced whenever it is present and not null,
    /// so a delay of zero can be used to switch it off again.
    pub fn apply(&mut self, update: MockUpdate) {
        if let Some(status_code) = update.status_code {
            if is_truthy(&status_code) {
                self.status_code = status_code
            }
        }
        if let Some(response_body) = update.response_body {
            if is_truthy(&response_body) {
                self.response_body = response_body
            }
        }
        if let Some(response_delay) = update.response_delay {
            self.response_delay = response_delay
        }
    }
}


//--- Default

impl Default for MockResponse {
    fn default() -> Self {
        MockResponse {
            status_code: 200.into(),
            response_body: json!({
                "success": true,
                "message": "Request processed successfully"
            }),
            response_delay: 0.into(),
        }
    }
}


//------------ MockUpdate ----------------------------------------------------

/// A change to the mock response requested through the control endpoint.
///
/// A field is `None` if it was missing or null.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockUpdate {
    #[serde(default)]
    pub status_code: Option<Value>,

    #[serde(default)]
    pub response_body: Option<Value>,

    #[serde(default)]
    pub response_delay: Option<Value>,
}

impl MockUpdate {
    /// Extracts an update from an arbitrary JSON value.
    ///
    /// Anything but an object results in an empty update. Members other
    /// than the three known ones are ignored.
    pub fn from_json(value: Value) -> Self {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        }
        else {
            Self::default()
        }
    }
}


//------------ SharedMock ----------------------------------------------------

/// A handle to the process-wide mock response.
///
/// Cloning the handle is cheap and all clones refer to the same response.
#[derive(Clone, Debug, Default)]
pub struct SharedMock(Arc<RwLock<MockResponse>>);

impl SharedMock {
    /// Returns a copy of the current mock response.
    pub fn get(&self) -> MockResponse {
        self.0.read().clone()
    }

    /// Applies an update and returns the resulting mock response.
    pub fn set(&self, update: MockUpdate) -> MockResponse {
        let mut mock = self.0.write();
        mock.apply(update);
        mock.clone()
    }
}


//------------ simulate_delay ------------------------------------------------

/// Waits for the given delay without blocking other requests.
pub async fn simulate_delay(delay: Duration) {
    tokio::time::sleep(delay).await
}


//------------ Helpers -------------------------------------------------------

/// Returns whether a value counts as set for the control endpoint.
///
/// Null, false, zero, NaN, the empty string, and the empty object count as
/// not set.
fn is_truthy(value: &Value) -> bool {
    match *value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(ref n) => {
            n.as_f64().map(|n| n != 0. && !n.is_nan()).unwrap_or(true)
        }
        Value::String(ref s) => !s.is_empty(),
        Value::Array(_) => true,
        Value::Object(ref obj) => !obj.is_empty(),
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn update(value: Value) -> MockUpdate {
        MockUpdate::from_json(value)
    }

    #[test]
    fn defaults() {
        let mock = MockResponse::default();
        assert_eq!(mock.status().unwrap(), StatusCode::OK);
        assert_eq!(mock.delay(), None);
        assert_eq!(
            mock.to_json(),
            json!({
                "statusCode": 200,
                "responseBody": {
                    "success": true,
                    "message": "Request processed successfully"
                },
                "responseDelay": 0
            })
        );
    }

    #[test]
    fn partial_update() {
        let shared = SharedMock::default();
        let mock = shared.set(update(json!({"statusCode": 201})));
        assert_eq!(mock.status_code, json!(201));
        assert_eq!(mock.response_body, MockResponse::default().response_body);
        assert_eq!(mock.response_delay, json!(0));
        assert_eq!(shared.get(), mock);

        let mock = shared.set(update(json!({
            "responseBody": [1, 2], "responseDelay": 250, "other": true
        })));
        assert_eq!(mock.status_code, json!(201));
        assert_eq!(mock.response_body, json!([1, 2]));
        assert_eq!(mock.delay(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn falsy_values_are_ignored() {
        let shared = SharedMock::default();
        shared.set(update(json!({
            "statusCode": 404, "responseBody": {"a": 1}, "responseDelay": 5
        })));
        for value in [
            json!(null), json!(0), json!(false), json!(""), json!({})
        ] {
            let mock = shared.set(update(json!({
                "statusCode": value, "responseBody": value
            })));
            assert_eq!(mock.status_code, json!(404));
            assert_eq!(mock.response_body, json!({"a": 1}));
        }

        // A zero delay is explicitly applied, null is not.
        let mock = shared.set(update(json!({"responseDelay": null})));
        assert_eq!(mock.response_delay, json!(5));
        let mock = shared.set(update(json!({"responseDelay": 0})));
        assert_eq!(mock.response_delay, json!(0));
    }

    #[test]
    fn values_are_stored_as_given() {
        let shared = SharedMock::default();
        let mock = shared.set(update(json!({
            "statusCode": "abc", "responseDelay": "soon"
        })));
        assert_eq!(mock.status_code, json!("abc"));
        assert!(mock.status().is_err());
        assert_eq!(mock.delay(), None);
    }

    #[test]
    fn non_objects_update_nothing() {
        for value in [json!([1]), json!("statusCode"), json!(null)] {
            assert_eq!(update(value), MockUpdate::default());
        }
    }

    #[test]
    fn status_range() {
        let mut mock = MockResponse::default();
        for (value, ok) in [
            (json!(100), true), (json!(999), true), (json!(99), false),
            (json!(1000), false), (json!(-200), false), (json!(200.5), false),
        ] {
            mock.status_code = value;
            assert_eq!(mock.status().is_ok(), ok, "{}", mock.status_code);
        }
    }

    #[test]
    fn delay_values() {
        let mut mock = MockResponse::default();
        for (value, delay) in [
            (json!(1500), Some(Duration::from_millis(1500))),
            (json!(" 20 "), Some(Duration::from_millis(20))),
            (json!(0.5), Some(Duration::from_micros(500))),
            (json!(-10), None),
            (json!(true), None),
            (json!([100]), None),
        ] {
            mock.response_delay = value;
            assert_eq!(mock.delay(), delay, "{}", mock.response_delay);
        }
    }

    #[tokio::test]
    async fn delay_waits() {
        let start = tokio::time::Instant::now();
        simulate_delay(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
