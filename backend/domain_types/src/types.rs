use serde_json::Value;

use crate::utils::MinorUnit;

/// Commerce-side transaction classification. Spellings are bit-exact with
/// the platform's vocabulary since they travel on update actions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum TransactionType {
    Authorization,
    CancelAuthorization,
    Charge,
    Refund,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum TransactionState {
    #[default]
    Initial,
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypedMoney {
    pub cent_amount: MinorUnit,
    pub currency_code: Option<String>,
    pub fraction_digits: u32,
}

/// String-keyed custom fields as carried on payments, customers and
/// transactions. Request/response payloads live here as plain strings.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomFields {
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

impl CustomFields {
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub state: TransactionState,
    pub interaction_id: Option<String>,
    pub amount: Option<TypedMoney>,
    pub custom: Option<CustomFields>,
}

impl Transaction {
    pub fn custom_field_str(&self, name: &str) -> Option<&str> {
        self.custom.as_ref().and_then(|custom| custom.get_str(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    pub type_id: String,
    pub id: String,
}

/// Snapshot of the commerce payment driving one dispatch. Read-only for
/// the engine; all writes travel back as update actions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub id: String,
    pub version: u64,
    pub interface_id: Option<String>,
    pub customer: Option<Reference>,
    pub amount_planned: Option<TypedMoney>,
    pub custom: Option<CustomFields>,
    pub transactions: Vec<Transaction>,
}

impl Payment {
    pub fn custom_field_str(&self, name: &str) -> Option<&str> {
        self.custom.as_ref().and_then(|custom| custom.get_str(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: String,
    pub version: u64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub custom: Option<CustomFields>,
}

impl Customer {
    pub fn custom_field_str(&self, name: &str) -> Option<&str> {
        self.custom.as_ref().and_then(|custom| custom.get_str(name))
    }
}

/// Inbound extension call as decoded by the transport layer.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ExtensionInput {
    pub action: ExtensionAction,
    pub resource: ResourceReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExtensionAction {
    Create,
    Update,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    pub type_id: String,
    #[serde(default)]
    pub obj: Option<Value>,
}

/// Terminal shape of one dispatch: always 200 with the accumulated action
/// batch unless the input was structurally broken.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionResponse {
    pub status_code: u16,
    pub actions: Vec<crate::update_actions::UpdateAction>,
}
