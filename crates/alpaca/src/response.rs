use alloc::borrow::Cow;
use alloc::vec::Vec;

use serde::Serialize;

use crate::error::AscomError;

/// A value returned by a device method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[serde(untagged)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Text(Cow<'static, str>),
    /// A list of integers.
    IntegerList(Vec<i64>),
    /// A list of strings.
    TextList(Vec<Cow<'static, str>>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl From<alloc::string::String> for Value {
    fn from(value: alloc::string::String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

/// The `JSON` body answering an Alpaca device or management request.
///
/// A method that succeeds without producing a value omits `Value`.
/// A failed method reports a non-zero `ErrorNumber` and its `ErrorMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[cfg_attr(
    feature = "deserialize",
    serde(bound(deserialize = "T: serde::Deserialize<'de>"))
)]
#[serde(rename_all = "PascalCase")]
pub struct MethodResponse<T = Value> {
    /// The value produced by the method.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "deserialize", serde(default))]
    pub value: Option<T>,
    /// The transaction number sent by the client, if any.
    #[serde(rename = "ClientTransactionID")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "deserialize", serde(default))]
    pub client_transaction_id: Option<u32>,
    /// The transaction number assigned by the server.
    #[serde(rename = "ServerTransactionID")]
    pub server_transaction_id: u32,
    /// The ASCOM error number, zero on success.
    pub error_number: u32,
    /// The ASCOM error message, empty on success.
    pub error_message: Cow<'static, str>,
}

impl<T> MethodResponse<T> {
    /// Creates a successful [`MethodResponse`].
    #[must_use]
    #[inline]
    pub const fn ok(
        value: Option<T>,
        client_transaction_id: Option<u32>,
        server_transaction_id: u32,
    ) -> Self {
        Self {
            value,
            client_transaction_id,
            server_transaction_id,
            error_number: 0,
            error_message: Cow::Borrowed(""),
        }
    }

    /// Creates a [`MethodResponse`] reporting an [`AscomError`].
    #[must_use]
    #[inline]
    pub fn error(
        error: AscomError,
        client_transaction_id: Option<u32>,
        server_transaction_id: u32,
    ) -> Self {
        Self {
            value: None,
            client_transaction_id,
            server_transaction_id,
            error_number: error.code.number(),
            error_message: error.message,
        }
    }

    /// Creates a [`MethodResponse`] from the outcome of a method.
    #[must_use]
    pub fn from_result(
        result: Result<Option<T>, AscomError>,
        client_transaction_id: Option<u32>,
        server_transaction_id: u32,
    ) -> Self {
        match result {
            Ok(value) => Self::ok(value, client_transaction_id, server_transaction_id),
            Err(error) => Self::error(error, client_transaction_id, server_transaction_id),
        }
    }

    /// Whether the response reports an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error_number != 0
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use serde_json::json;

    use crate::error::AscomError;
    use crate::serialize;

    #[cfg(feature = "deserialize")]
    use crate::deserialize;

    use super::{MethodResponse, Value};

    #[test]
    fn test_ok_response() {
        let response = MethodResponse::ok(Some(Value::from(true)), Some(7), 1);
        assert_eq!(
            serialize(&response),
            json!({
                "Value": true,
                "ClientTransactionID": 7,
                "ServerTransactionID": 1,
                "ErrorNumber": 0,
                "ErrorMessage": "",
            })
        );

        #[cfg(feature = "deserialize")]
        assert_eq!(deserialize::<MethodResponse>(serialize(&response)), response);
    }

    #[test]
    fn test_error_response() {
        let response =
            MethodResponse::<Value>::error(AscomError::missing_parameter("State"), None, 9);
        assert!(response.is_error());
        assert_eq!(
            serialize(&response),
            json!({
                "ServerTransactionID": 9,
                "ErrorNumber": 1026,
                "ErrorMessage": "Missing parameter: State",
            })
        );
    }

    #[test]
    fn test_list_value() {
        let response = MethodResponse::ok(Some(vec![1u32]), None, 3);
        assert_eq!(serialize(&response)["Value"], json!([1]));

        assert_eq!(serialize(Value::from(2.5)), json!(2.5));
        assert_eq!(serialize(Value::from("dome")), json!("dome"));
    }
}
