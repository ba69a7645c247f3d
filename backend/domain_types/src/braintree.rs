//! Gateway-side wire types. Field spellings follow the gateway's JSON
//! (camelCase); structs carry a flattened passthrough map wherever the
//! integration forwards caller-supplied fields it does not interpret.

use std::str::FromStr;

use serde_json::Value;

/// Gateway transaction status vocabulary. Unknown spellings are preserved
/// in `Unrecognized` so status mapping stays total across gateway schema
/// drift.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Authorized,
    Authorizing,
    AuthorizationExpired,
    SettlementConfirmed,
    SettlementDeclined,
    SettlementPending,
    Settled,
    Settling,
    SubmittedForSettlement,
    GatewayRejected,
    ProcessorDeclined,
    Failed,
    Voided,
    #[strum(default, to_string = "{0}")]
    Unrecognized(String),
}

impl serde::Serialize for TransactionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for TransactionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str(&raw).unwrap_or(Self::Unrecognized(raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Credit,
}

/// Closed payment-instrument classification used for method-info display
/// hints and the local-payment cross-reference.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentInstrumentType {
    CreditCard,
    PaypalAccount,
    VenmoAccount,
    AndroidPayCard,
    ApplePayCard,
    LocalPayment,
    #[serde(other)]
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditCardDetails {
    pub card_type: Option<String>,
    pub masked_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayPalAccountDetails {
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VenmoAccountDetails {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletCardDetails {
    pub source_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalPaymentDetails {
    pub payment_id: Option<String>,
}

/// A gateway transaction as returned by sale, refund, void, settle and
/// find calls.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BraintreeTransaction {
    pub id: String,
    pub status: TransactionStatus,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    pub amount: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub payment_instrument_type: PaymentInstrumentType,
    #[serde(default)]
    pub credit_card: Option<CreditCardDetails>,
    #[serde(default)]
    pub paypal_account: Option<PayPalAccountDetails>,
    #[serde(default)]
    pub venmo_account: Option<VenmoAccountDetails>,
    #[serde(default)]
    pub android_pay_card: Option<WalletCardDetails>,
    #[serde(default)]
    pub apple_pay_card: Option<WalletCardDetails>,
    #[serde(default)]
    pub local_payment: Option<LocalPaymentDetails>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenRequest {
    pub merchant_account_id: Option<String>,
    pub customer_id: Option<String>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub amount: String,
    pub merchant_account_id: Option<String>,
    pub channel: Option<String>,
    pub order_id: Option<String>,
    pub payment_method_nonce: Option<String>,
    pub payment_method_token: Option<String>,
    pub customer_id: Option<String>,
    pub options: Option<TransactionOptions>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOptions {
    pub submit_for_settlement: Option<bool>,
    pub store_in_vault_on_success: Option<bool>,
    pub store_shipping_address_in_vault: Option<bool>,
    pub paypal: Option<PayPalTransactionOptions>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalTransactionOptions {
    pub description: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateRequest {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    pub customer_id: Option<String>,
    pub payment_method_nonce: Option<String>,
    pub options: Option<PaymentMethodOptions>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodOptions {
    pub fail_on_duplicate_payment_method: Option<bool>,
    pub us_bank_account_verification_method: Option<String>,
    pub verify_card: Option<bool>,
    pub verification_merchant_account_id: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTrackingRequest {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

/// Customer as the gateway reports it. Only the id is interpreted; the
/// rest is persisted verbatim into the response field.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Option<String>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, Value>,
}
