//! Operation vocabulary and the custom-field payload codec.
//!
//! Each operation carries its literal request/response field-name pair as
//! data, so field spellings live in exactly one place. Payload decoding is
//! total: anything that is not a JSON object degrades to a raw token under
//! the operation's default key (a nonce for the vaulting flows, a
//! transaction id for the follow-up flows).

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    // payment-scoped
    GetClientToken,
    TransactionSale,
    PayPalOrder,
    Refund,
    SubmitForSettlement,
    FindTransaction,
    Void,
    AddPackageTracking,
    // customer-scoped
    Find,
    Create,
    Vault,
    UpdatePayment,
    DeletePayment,
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetClientToken => "getClientToken",
            Self::TransactionSale => "transactionSale",
            Self::PayPalOrder => "payPalOrder",
            Self::Refund => "refund",
            Self::SubmitForSettlement => "submitForSettlement",
            Self::FindTransaction => "findTransaction",
            Self::Void => "void",
            Self::AddPackageTracking => "addPackageTracking",
            Self::Find => "find",
            Self::Create => "create",
            Self::Vault => "vault",
            Self::UpdatePayment => "updatePayment",
            Self::DeletePayment => "deletePayment",
        }
    }

    pub const fn request_field(self) -> &'static str {
        match self {
            Self::GetClientToken => "getClientTokenRequest",
            Self::TransactionSale => "transactionSaleRequest",
            Self::PayPalOrder => "payPalOrderRequest",
            Self::Refund => "refundRequest",
            Self::SubmitForSettlement => "submitForSettlementRequest",
            Self::FindTransaction => "findTransactionRequest",
            Self::Void => "voidRequest",
            Self::AddPackageTracking => "addPackageTrackingRequest",
            Self::Find => "findRequest",
            Self::Create => "createRequest",
            Self::Vault => "vaultRequest",
            Self::UpdatePayment => "updatePaymentRequest",
            Self::DeletePayment => "deletePaymentRequest",
        }
    }

    pub const fn response_field(self) -> &'static str {
        match self {
            Self::GetClientToken => "getClientTokenResponse",
            Self::TransactionSale => "transactionSaleResponse",
            Self::PayPalOrder => "payPalOrderResponse",
            Self::Refund => "refundResponse",
            Self::SubmitForSettlement => "submitForSettlementResponse",
            Self::FindTransaction => "findTransactionResponse",
            Self::Void => "voidResponse",
            Self::AddPackageTracking => "addPackageTrackingResponse",
            Self::Find => "findResponse",
            Self::Create => "createResponse",
            Self::Vault => "vaultResponse",
            Self::UpdatePayment => "updatePaymentResponse",
            Self::DeletePayment => "deletePaymentResponse",
        }
    }

    /// Key a bare-string payload is interpreted under.
    pub const fn raw_token_key(self) -> &'static str {
        match self {
            Self::TransactionSale | Self::PayPalOrder | Self::Vault => "paymentMethodNonce",
            Self::Refund | Self::SubmitForSettlement | Self::Void | Self::AddPackageTracking => {
                "transactionId"
            }
            Self::FindTransaction => "orderId",
            Self::GetClientToken | Self::Find => "customerId",
            Self::Create => "id",
            Self::UpdatePayment | Self::DeletePayment => "paymentMethodToken",
        }
    }
}

/// Classified request-field payload. Classification happens once at the
/// boundary; mappers only ever see one of the two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPayload {
    Structured(serde_json::Map<String, Value>),
    RawToken(String),
}

impl FieldPayload {
    /// Total decode: a JSON object parses as structured, everything else
    /// (bare nonces, ids, malformed JSON) passes through as a raw token.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::RawToken(raw.to_owned()),
        }
    }


    pub fn into_object(self, operation: Operation) -> serde_json::Map<String, Value> {
        match self {
            Self::Structured(map) => map,
            Self::RawToken(token) => {
                let mut map = serde_json::Map::new();
                map.insert(operation.raw_token_key().to_owned(), Value::String(token));
                map
            }
        }
    }
}

/// Serializes a payload for custom fields and the audit trail: strings
/// pass through unchanged, objects are stringified after empty-value
/// stripping.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => {
            let mut cleaned = other.clone();
            strip_empty(&mut cleaned);
            cleaned.to_string()
        }
    }
}

/// Recursively drops nulls and, after recursion, empty maps and arrays,
/// so persisted responses don't bloat the audit trail.
pub fn strip_empty(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                strip_empty(child);
            }
            map.retain(|_, child| !is_empty(child));
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                strip_empty(child);
            }
            items.retain(|child| !is_empty(child));
        }
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Top-level merge with caller precedence, reproducing how the original
/// integration spread user payloads over computed defaults.
pub fn merge_over_defaults(
    defaults: Value,
    overlay: serde_json::Map<String, Value>,
) -> serde_json::Map<String, Value> {
    let mut merged = match defaults {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    for (key, value) in overlay {
        merged.insert(key, value);
    }
    merged
}
