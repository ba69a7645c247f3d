use strum::Display;

/// Per-operation failure raised between a request field being consumed and
/// its response field being written. Every variant is caught at the
/// operation boundary and normalized into a `{success:false, message}`
/// response envelope; none of these cross the dispatch boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("{field_name} is missing")]
    MissingRequiredField { field_name: &'static str },
    #[error("The payment has no suitable transaction")]
    NoSuitableTransaction,
    #[error("{message}")]
    Declined { message: String },
    #[error("Request body serialization failed")]
    RequestEncodingFailed,
    #[error("Failed to deserialize gateway response")]
    ResponseDeserializationFailed,
    #[error("Failed to send request to gateway: {0}")]
    RequestNotSent(String),
}

/// Structural failures that propagate to the transport boundary instead of
/// being normalized. The embedding HTTP layer maps these to 400/500-class
/// responses.
#[derive(Debug, Clone, Display, thiserror::Error)]
pub enum ApplicationErrorResponse {
    BadRequest(ApiError),
    NotFound(ApiError),
    InternalServerError(ApiError),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiError {
    pub sub_code: String,
    pub error_identifier: u16,
    pub error_message: String,
}

impl ApplicationErrorResponse {
    pub fn bad_request(sub_code: &str, message: impl Into<String>) -> Self {
        Self::BadRequest(ApiError {
            sub_code: sub_code.to_owned(),
            error_identifier: 400,
            error_message: message.into(),
        })
    }

    pub fn internal_server_error(sub_code: &str, message: impl Into<String>) -> Self {
        Self::InternalServerError(ApiError {
            sub_code: sub_code.to_owned(),
            error_identifier: 500,
            error_message: message.into(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),
}
