//! Validation of data endpoint requests.
//!
//! A request to the data endpoint must carry a JSON body with a `users`
//! array in which every element has a string `login` member. The checks
//! are done in a fixed order and the first one to fail determines the
//! [`Rejection`] returned to the client.

use std::fmt;
use hyper::StatusCode;
use serde_json::{Map, Value};


//------------ validate ------------------------------------------------------

/// Validates the content type and body of a data endpoint request.
///
/// On success, returns the decoded body.
pub fn validate(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Value, Rejection> {
    check_content_type(content_type)?;
    let body = decode_body(body)?;
    check_users(&body)?;
    Ok(body)
}

/// Checks that the content type is JSON.
///
/// Any value mentioning `application/json` is accepted so that parameters
/// such as the charset don’t get in the way.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), Rejection> {
    match content_type {
        Some(value) if value.to_ascii_lowercase().contains(JSON_MEDIA_TYPE) => {
            Ok(())
        }
        _ => {
            Err(Rejection::UnsupportedMediaType(
                content_type.map(Into::into)
            ))
        }
    }
}

/// Decodes the body into a structured JSON value.
///
/// An empty body is treated as an empty object. Anything that isn’t an
/// object or an array is rejected.
fn decode_body(body: &[u8]) -> Result<Value, Rejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()))
    }
    match serde_json::from_slice(body) {
        Ok(value @ Value::Object(_)) | Ok(value @ Value::Array(_)) => {
            Ok(value)
        }
        Ok(_) => Err(Rejection::NotStructured),
        Err(_) => Err(Rejection::MalformedJson),
    }
}

/// Checks the `users` member of the body.
fn check_users(body: &Value) -> Result<(), Rejection> {
    let users = match body.get("users") {
        Some(users) => users,
        None => return Err(Rejection::MissingUsers),
    };
    let users = match users.as_array() {
        Some(users) => users,
        None => return Err(Rejection::UsersNotArray),
    };
    match users.iter().position(|user| {
        !matches!(user.get("login"), Some(Value::String(_)))
    }) {
        Some(index) => Err(Rejection::InvalidLogin(index)),
        None => Ok(())
    }
}


//------------ Rejection -----------------------------------------------------

/// The reason a data endpoint request was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    /// The content type is not JSON.
    ///
    /// Contains the content type if there was one at all.
    UnsupportedMediaType(Option<String>),

    /// The body is not valid JSON.
    MalformedJson,

    /// The body is valid JSON but neither an object nor an array.
    NotStructured,

    /// There is no `users` member.
    MissingUsers,

    /// The `users` member is not an array.
    UsersNotArray,

    /// The user at the given index has no string `login` member.
    InvalidLogin(usize),
}

impl Rejection {
    /// Returns the HTTP status code for the rejection.
    pub fn status(&self) -> StatusCode {
        match *self {
            Rejection::UnsupportedMediaType(_) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            _ => StatusCode::BAD_REQUEST
        }
    }

    /// Returns the value of the `error` member of the response.
    pub fn error(&self) -> &'static str {
        match *self {
            Rejection::UnsupportedMediaType(_) => "Unsupported Media Type",
            _ => "Bad Request"
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rejection::UnsupportedMediaType(Some(ref content_type)) => {
                write!(
                    f, "Content-Type must be {}, got {}",
                    JSON_MEDIA_TYPE, content_type
                )
            }
            Rejection::UnsupportedMediaType(None) => {
                write!(f, "Content-Type must be {}", JSON_MEDIA_TYPE)
            }
            Rejection::MalformedJson => f.write_str("Malformed JSON body"),
            Rejection::NotStructured => {
                f.write_str("Request body must be a JSON object")
            }
            Rejection::MissingUsers => {
                f.write_str("Missing required field: users")
            }
            Rejection::UsersNotArray => {
                f.write_str("Field 'users' must be an array")
            }
            Rejection::InvalidLogin(index) => {
                write!(
                    f, "Invalid user at index {}: \
                        'login' must be a string", index
                )
            }
        }
    }
}


//------------ Constants -----------------------------------------------------

const JSON_MEDIA_TYPE: &str = "application/json";


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn content_type() {
        assert!(check_content_type(JSON).is_ok());
        assert!(
            check_content_type(Some("application/json; charset=utf-8"))
                .is_ok()
        );
        assert!(check_content_type(Some("Application/JSON")).is_ok());
        assert_eq!(
            check_content_type(Some("text/plain")),
            Err(Rejection::UnsupportedMediaType(Some("text/plain".into())))
        );
        assert_eq!(
            check_content_type(None),
            Err(Rejection::UnsupportedMediaType(None))
        );
    }

    #[test]
    fn content_type_is_checked_first() {
        assert_eq!(
            validate(Some("text/plain"), b"not json").unwrap_err().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn body_shape() {
        assert_eq!(
            validate(JSON, b"{\"users\": "),
            Err(Rejection::MalformedJson)
        );
        assert_eq!(validate(JSON, b"null"), Err(Rejection::NotStructured));
        assert_eq!(validate(JSON, b"42"), Err(Rejection::NotStructured));
        assert_eq!(validate(JSON, b"\"x\""), Err(Rejection::NotStructured));
        assert_eq!(validate(JSON, b""), Err(Rejection::MissingUsers));
        assert_eq!(validate(JSON, b"[]"), Err(Rejection::MissingUsers));
        assert_eq!(
            validate(JSON, b"{\"user\": []}"),
            Err(Rejection::MissingUsers)
        );
        assert_eq!(
            validate(JSON, b"{\"users\": {\"login\": \"a\"}}"),
            Err(Rejection::UsersNotArray)
        );
    }

    #[test]
    fn logins() {
        assert_eq!(
            validate(JSON, b"{\"users\":[{\"login\":\"a\"},{\"name\":\"bad\"}]}"),
            Err(Rejection::InvalidLogin(1))
        );
        assert_eq!(
            validate(JSON, b"{\"users\":[{\"login\":1},{\"name\":\"bad\"}]}"),
            Err(Rejection::InvalidLogin(0))
        );
        assert_eq!(
            validate(JSON, b"{\"users\":[\"a\"]}"),
            Err(Rejection::InvalidLogin(0))
        );
        assert_eq!(
            validate(JSON, b"{\"users\":[{\"login\":\"a\"},{\"login\":\"b\"}]}"),
            Ok(json!({"users": [{"login": "a"}, {"login": "b"}]}))
        );
        assert_eq!(
            validate(JSON, b"{\"users\":[]}"),
            Ok(json!({"users": []}))
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            Rejection::InvalidLogin(1).to_string(),
            "Invalid user at index 1: 'login' must be a string"
        );
        assert_eq!(
            Rejection::MissingUsers.to_string(),
            "Missing required field: users"
        );
        assert_eq!(
            Rejection::UnsupportedMediaType(Some("text/plain".into()))
                .to_string(),
            "Content-Type must be application/json, got text/plain"
        );
        assert_eq!(Rejection::MalformedJson.error(), "Bad Request");
    }
}
