//! Audit trail and failure normalization.
//!
//! Every attempted request and every received response is recorded as an
//! interface interaction. Every consumed `<op>Request` field is paired
//! with exactly one command clearing it, which is what keeps duplicate
//! deliveries from re-running an already-consumed request.

use domain_types::{
    errors::GatewayError,
    types::Customer,
    update_actions::{InterfaceInteractionFields, TypeResourceIdentifier, UpdateAction},
    utils::current_timestamp,
};
use serde_json::Value;

use crate::operations::{encode, Operation};

pub const BRAINTREE_PAYMENT_INTERACTION_TYPE_KEY: &str = "braintree-payment-interaction-type";
pub const BRAINTREE_CUSTOMER_ID_FIELD: &str = "braintreeCustomerId";

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

fn set_field(
    transaction_id: Option<&str>,
    name: &str,
    value: Option<Value>,
) -> UpdateAction {
    match transaction_id {
        Some(transaction_id) => UpdateAction::SetTransactionCustomField {
            transaction_id: transaction_id.to_owned(),
            name: name.to_owned(),
            value,
        },
        None => UpdateAction::SetCustomField {
            name: name.to_owned(),
            value,
        },
    }
}

fn interaction(kind: &str, data: String) -> UpdateAction {
    UpdateAction::AddInterfaceInteraction {
        interaction_type: TypeResourceIdentifier::of_type(BRAINTREE_PAYMENT_INTERACTION_TYPE_KEY),
        fields: InterfaceInteractionFields {
            interaction_kind: kind.to_owned(),
            data,
            timestamp: current_timestamp(),
        },
    }
}

/// Records the outbound request in the interaction trail.
pub fn handle_request(operation: Operation, payload: &Value) -> Vec<UpdateAction> {
    let data = encode(payload);
    tracing::info!(operation = operation.name(), request = %data, "gateway request");
    vec![interaction(operation.request_field(), data)]
}

/// Persists a successful response: response field set (scoped to the
/// bound transaction when present), interaction entry, request field
/// cleared.
pub fn handle_response(
    operation: Operation,
    payload: &Value,
    transaction_id: Option<&str>,
) -> Vec<UpdateAction> {
    let data = encode(payload);
    tracing::info!(operation = operation.name(), response = %data, "gateway response");
    vec![
        set_field(
            transaction_id,
            operation.response_field(),
            Some(Value::String(data.clone())),
        ),
        interaction(operation.response_field(), data),
        set_field(transaction_id, operation.request_field(), None),
    ]
}

/// Customer-side variant of `handle_response`: additionally records the
/// gateway customer id once, the first time a response carries one.
pub fn handle_customer_response(
    operation: Operation,
    payload: &Value,
    customer: &Customer,
) -> Vec<UpdateAction> {
    let mut actions = handle_response(operation, payload, None);
    if customer.custom_field_str(BRAINTREE_CUSTOMER_ID_FIELD).is_none() {
        if let Some(id) = payload.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
            actions.push(UpdateAction::SetCustomField {
                name: BRAINTREE_CUSTOMER_ID_FIELD.to_owned(),
                value: Some(Value::String(id.to_owned())),
            });
        }
    }
    actions
}

/// Normalizes any per-operation failure into the unconditional two-action
/// batch: persist a `{success:false, message}` envelope and clear the
/// consumed request field. Callers never branch on the error kind.
pub fn handle_error(
    operation: Operation,
    report: &error_stack::Report<GatewayError>,
    transaction_id: Option<&str>,
) -> Vec<UpdateAction> {
    let mut message = report.current_context().to_string();
    if message.is_empty() {
        message = UNKNOWN_ERROR_MESSAGE.to_owned();
    }
    tracing::error!(operation = operation.name(), error = ?report, "gateway operation failed");
    let envelope = serde_json::json!({"success": false, "message": message}).to_string();
    vec![
        set_field(
            transaction_id,
            operation.response_field(),
            Some(Value::String(envelope)),
        ),
        set_field(transaction_id, operation.request_field(), None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::report;
    use serde_json::json;

    #[test]
    fn response_batch_sets_then_audits_then_clears() {
        let actions = handle_response(Operation::Refund, &json!({"id": "bt-1"}), None);
        assert_eq!(actions.len(), 3);
        assert_eq!(
            actions.first(),
            Some(&UpdateAction::SetCustomField {
                name: "refundResponse".to_owned(),
                value: Some(Value::String(r#"{"id":"bt-1"}"#.to_owned())),
            })
        );
        assert_eq!(
            actions.last(),
            Some(&UpdateAction::SetCustomField {
                name: "refundRequest".to_owned(),
                value: None,
            })
        );
    }

    #[test]
    fn responses_scope_to_the_bound_transaction() {
        let actions = handle_response(Operation::Refund, &json!({"id": "bt-1"}), Some("txn-7"));
        let scoped = actions.iter().all(|action| {
            matches!(
                action,
                UpdateAction::SetTransactionCustomField { transaction_id, .. }
                    if transaction_id == "txn-7"
            ) || matches!(action, UpdateAction::AddInterfaceInteraction { .. })
        });
        assert!(scoped);
    }

    #[test]
    fn errors_normalize_to_envelope_plus_clear() {
        let report = report!(GatewayError::Declined {
            message: "Insufficient Funds".to_owned()
        });
        let actions = handle_error(Operation::SubmitForSettlement, &report, None);
        assert_eq!(
            actions,
            vec![
                UpdateAction::SetCustomField {
                    name: "submitForSettlementResponse".to_owned(),
                    value: Some(Value::String(
                        r#"{"message":"Insufficient Funds","success":false}"#.to_owned()
                    )),
                },
                UpdateAction::SetCustomField {
                    name: "submitForSettlementRequest".to_owned(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn customer_id_recorded_once() {
        let fresh = Customer::default();
        let actions =
            handle_customer_response(Operation::Create, &json!({"id": "cust-9"}), &fresh);
        let recorded = actions.iter().any(|action| {
            matches!(
                action,
                UpdateAction::SetCustomField { name, value: Some(Value::String(id)) }
                    if name == BRAINTREE_CUSTOMER_ID_FIELD && id == "cust-9"
            )
        });
        assert!(recorded);

        let mut known = Customer::default();
        let mut fields = serde_json::Map::new();
        fields.insert(
            BRAINTREE_CUSTOMER_ID_FIELD.to_owned(),
            Value::String("cust-9".to_owned()),
        );
        known.custom = Some(domain_types::types::CustomFields { fields });
        let actions = handle_customer_response(Operation::Create, &json!({"id": "cust-9"}), &known);
        let recorded = actions.iter().any(|action| {
            matches!(action, UpdateAction::SetCustomField { name, .. } if name == BRAINTREE_CUSTOMER_ID_FIELD)
        });
        assert!(!recorded);
    }
}
