use serde_json::Value;

use crate::{
    types::{TransactionState, TransactionType},
    utils::MinorUnit,
};

/// One idempotent instruction for the external applier. The serialized
/// form is exactly what the commerce platform's update endpoint accepts,
/// so variant and field spellings are part of the wire contract.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UpdateAction {
    AddTransaction {
        transaction: TransactionDraft,
    },
    #[serde(rename_all = "camelCase")]
    SetCustomField {
        name: String,
        value: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    SetTransactionCustomField {
        transaction_id: String,
        name: String,
        value: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    AddInterfaceInteraction {
        #[serde(rename = "type")]
        interaction_type: TypeResourceIdentifier,
        fields: InterfaceInteractionFields,
    },
    #[serde(rename_all = "camelCase")]
    SetStatusInterfaceCode {
        interface_code: String,
    },
    #[serde(rename_all = "camelCase")]
    SetStatusInterfaceText {
        interface_text: String,
    },
    SetMethodInfoMethod {
        method: String,
    },
    #[serde(rename_all = "camelCase")]
    ChangeTransactionState {
        transaction_id: String,
        state: TransactionState,
    },
    #[serde(rename_all = "camelCase")]
    SetInterfaceId {
        interface_id: String,
    },
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: DraftMoney,
    pub interaction_id: Option<String>,
    pub timestamp: Option<String>,
    pub state: TransactionState,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMoney {
    pub cent_amount: MinorUnit,
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeResourceIdentifier {
    pub type_id: String,
    pub key: String,
}

impl TypeResourceIdentifier {
    pub fn of_type(key: &str) -> Self {
        Self {
            type_id: "type".to_owned(),
            key: key.to_owned(),
        }
    }
}

/// Audit-trail entry payload: which request/response, the raw data and
/// when it was recorded.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InterfaceInteractionFields {
    #[serde(rename = "type")]
    pub interaction_kind: String,
    pub data: String,
    pub timestamp: String,
}
