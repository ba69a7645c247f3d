//! Request shaping and response mapping for the payment-scoped flows.

use domain_types::{
    braintree::{
        BraintreeTransaction, ClientTokenRequest, PaymentInstrumentType, TransactionKind,
        TransactionRequest, TransactionStatus,
    },
    errors::GatewayError,
    types::{Payment, TransactionState, TransactionType, TypedMoney},
    update_actions::{DraftMoney, TransactionDraft, UpdateAction},
    utils::{gateway_amount_to_minor_units, minor_units_to_gateway_amount},
    CustomResult,
};
use error_stack::{report, ResultExt};
use serde_json::Value;

use crate::{
    configs::GatewayConfig,
    operations::{merge_over_defaults, FieldPayload, Operation},
    selector::{find_suitable_interaction_id, PaymentWithOptionalTransaction},
};

/// Channel identifier stamped on every sale so gateway-side reporting can
/// attribute traffic to this integration.
pub const CHANNEL: &str = "commercetoolsGmbH_SP_BT";

pub const BRAINTREE_ORDER_ID_FIELD: &str = "BraintreeOrderId";
pub const LOCAL_PAYMENT_METHODS_PAYMENT_ID_FIELD: &str = "LocalPaymentMethodsPaymentId";

pub fn map_status_to_transaction_state(status: &TransactionStatus) -> TransactionState {
    match status {
        TransactionStatus::Authorized
        | TransactionStatus::Settled
        | TransactionStatus::SettlementConfirmed
        | TransactionStatus::Voided => TransactionState::Success,
        TransactionStatus::AuthorizationExpired
        | TransactionStatus::GatewayRejected
        | TransactionStatus::ProcessorDeclined
        | TransactionStatus::SettlementDeclined
        | TransactionStatus::Failed => TransactionState::Failure,
        _ => TransactionState::Pending,
    }
}

pub fn map_status_to_transaction_type(status: &TransactionStatus) -> TransactionType {
    match status {
        TransactionStatus::Authorized | TransactionStatus::Authorizing => {
            TransactionType::Authorization
        }
        TransactionStatus::Voided => TransactionType::CancelAuthorization,
        TransactionStatus::Unrecognized(raw) => {
            tracing::warn!(status = %raw, "unrecognized gateway status, mapping to Charge");
            TransactionType::Charge
        }
        _ => TransactionType::Charge,
    }
}

/// Human-readable detail for the method-info line, picked from whichever
/// instrument block the gateway populated.
pub fn payment_method_hint(transaction: &BraintreeTransaction) -> String {
    match transaction.payment_instrument_type {
        PaymentInstrumentType::CreditCard => transaction
            .credit_card
            .as_ref()
            .map(|card| {
                format!(
                    "{} {}",
                    card.card_type.as_deref().unwrap_or_default(),
                    card.masked_number.as_deref().unwrap_or_default()
                )
                .trim()
                .to_owned()
            })
            .unwrap_or_default(),
        PaymentInstrumentType::PaypalAccount => transaction
            .paypal_account
            .as_ref()
            .and_then(|account| account.payer_email.clone())
            .unwrap_or_default(),
        PaymentInstrumentType::VenmoAccount => transaction
            .venmo_account
            .as_ref()
            .and_then(|account| account.username.clone())
            .unwrap_or_default(),
        PaymentInstrumentType::AndroidPayCard => transaction
            .android_pay_card
            .as_ref()
            .and_then(|card| card.source_description.clone())
            .unwrap_or_default(),
        PaymentInstrumentType::ApplePayCard => transaction
            .apple_pay_card
            .as_ref()
            .and_then(|card| card.source_description.clone())
            .unwrap_or_default(),
        PaymentInstrumentType::LocalPayment | PaymentInstrumentType::Other => String::new(),
    }
}

/// Status-interface and method-info refresh emitted after every
/// transaction-bearing response.
pub fn update_payment_fields(transaction: &BraintreeTransaction) -> Vec<UpdateAction> {
    let status = transaction.status.to_string();
    let hint = payment_method_hint(transaction);
    let method = if hint.is_empty() {
        transaction.payment_instrument_type.to_string()
    } else {
        format!("{} ({hint})", transaction.payment_instrument_type)
    };
    vec![
        UpdateAction::SetStatusInterfaceCode {
            interface_code: status.clone(),
        },
        UpdateAction::SetStatusInterfaceText {
            interface_text: status,
        },
        UpdateAction::SetMethodInfoMethod { method },
    ]
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|float| float != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Object(_) | Value::Array(_) => true,
    }
}

pub fn build_client_token_request(
    payload: FieldPayload,
    config: &GatewayConfig,
) -> CustomResult<ClientTokenRequest, GatewayError> {
    let overlay = payload.into_object(Operation::GetClientToken);
    let defaults = serde_json::json!({
        "merchantAccountId": config.merchant_account_id,
    });
    serde_json::from_value(Value::Object(merge_over_defaults(defaults, overlay)))
        .change_context(GatewayError::RequestEncodingFailed)
}

/// Builds the sale request: engine defaults below, caller payload on top,
/// vaulting derived from the payload and the payment's customer link, and
/// a vault-token fallback when the caller supplied no instrument at all.
pub fn build_sale_request(
    context: &PaymentWithOptionalTransaction<'_>,
    payload: FieldPayload,
    config: &GatewayConfig,
) -> CustomResult<TransactionRequest, GatewayError> {
    let payment = context.payment;
    let amount_planned = payment
        .amount_planned
        .as_ref()
        .ok_or_else(|| report!(GatewayError::MissingRequiredField { field_name: "amountPlanned" }))?;

    let overlay = payload.into_object(Operation::TransactionSale);
    // Auto-vault on a customer identity hint in the request (a top-level
    // customerId or an inlined customer object), unless the caller decided.
    let customer_hint = overlay.get("customerId").map(is_truthy).unwrap_or(false)
        || overlay
            .get("customer")
            .and_then(|customer| customer.get("id"))
            .map(is_truthy)
            .unwrap_or(false);
    let store_in_vault = match overlay.get("storeInVaultOnSuccess") {
        Some(explicit) => is_truthy(explicit),
        None => customer_hint,
    };
    let store_shipping = store_in_vault && overlay.get("shipping").map(is_truthy).unwrap_or(false);

    let defaults = serde_json::json!({
        "amount": minor_units_to_gateway_amount(
            amount_planned.cent_amount,
            amount_planned.fraction_digits,
        ),
        "merchantAccountId": config.merchant_account_id,
        "channel": CHANNEL,
        "orderId": payment.custom_field_str(BRAINTREE_ORDER_ID_FIELD),
        "options": {
            "submitForSettlement": config.autocapture,
            "storeInVaultOnSuccess": store_in_vault,
            "storeShippingAddressInVault": store_shipping,
            "paypal": {
                "description": config.paypal_description,
            },
        },
    });

    let mut request: TransactionRequest =
        serde_json::from_value(Value::Object(merge_over_defaults(defaults, overlay)))
            .change_context(GatewayError::RequestEncodingFailed)?;

    // No nonce and no token in the payload: fall back to the vaulted
    // instrument behind the payment's initial authorization.
    if request.payment_method_nonce.is_none() && request.payment_method_token.is_none() {
        request.payment_method_token = Some(find_suitable_interaction_id(
            context,
            Some(TransactionType::Authorization),
            Some(TransactionState::Initial),
        )?);
    }
    Ok(request)
}

/// Splits a follow-up payload into the gateway transaction id it targets
/// and the remaining passthrough fields. An explicit `transactionId`
/// wins; otherwise the suitable transaction of `fallback_type` is used.
pub fn parse_follow_up_request(
    context: &PaymentWithOptionalTransaction<'_>,
    operation: Operation,
    payload: FieldPayload,
    fallback_type: Option<TransactionType>,
) -> CustomResult<(String, serde_json::Map<String, Value>), GatewayError> {
    let mut object = payload.into_object(operation);
    let explicit = object
        .remove("transactionId")
        .and_then(|value| value.as_str().map(str::to_owned))
        .filter(|id| !id.is_empty());
    let transaction_id = match explicit {
        Some(id) => id,
        None => find_suitable_interaction_id(context, fallback_type, None)?,
    };
    Ok((transaction_id, object))
}

fn transaction_draft(
    transaction: &BraintreeTransaction,
    amount_planned: Option<&TypedMoney>,
    transaction_type: TransactionType,
    state: TransactionState,
) -> CustomResult<TransactionDraft, GatewayError> {
    let fraction_digits = amount_planned
        .map(|money| money.fraction_digits)
        .unwrap_or(2);
    let cent_amount = gateway_amount_to_minor_units(&transaction.amount, fraction_digits)
        .change_context(GatewayError::ResponseDeserializationFailed)?;
    Ok(TransactionDraft {
        transaction_type,
        amount: DraftMoney {
            cent_amount,
            currency_code: amount_planned.and_then(|money| money.currency_code.clone()),
        },
        interaction_id: Some(transaction.id.clone()),
        timestamp: transaction.updated_at.clone(),
        state,
    })
}

/// Maps one gateway transaction into commerce-side updates: a new
/// transaction or a state change on the matching existing one, one-time
/// cross-references, and the status/method refresh.
pub fn handle_transaction_response(
    payment: &Payment,
    transaction: &BraintreeTransaction,
) -> CustomResult<Vec<UpdateAction>, GatewayError> {
    let state = map_status_to_transaction_state(&transaction.status);
    let transaction_type = match transaction.kind {
        Some(TransactionKind::Credit) => TransactionType::Refund,
        _ => map_status_to_transaction_type(&transaction.status),
    };

    let mut actions = Vec::new();
    let existing = payment.transactions.iter().find(|candidate| {
        candidate.interaction_id.as_deref() == Some(transaction.id.as_str())
            && candidate.transaction_type == Some(transaction_type)
    });
    match existing {
        Some(candidate) => {
            if candidate.state != state {
                actions.push(UpdateAction::ChangeTransactionState {
                    transaction_id: candidate.id.clone(),
                    state,
                });
            }
        }
        None => {
            actions.push(UpdateAction::AddTransaction {
                transaction: transaction_draft(
                    transaction,
                    payment.amount_planned.as_ref(),
                    transaction_type,
                    state,
                )?,
            });
        }
    }

    if let Some(payment_id) = transaction
        .local_payment
        .as_ref()
        .and_then(|local| local.payment_id.as_deref())
    {
        if payment
            .custom_field_str(LOCAL_PAYMENT_METHODS_PAYMENT_ID_FIELD)
            .is_none()
        {
            actions.push(UpdateAction::SetCustomField {
                name: LOCAL_PAYMENT_METHODS_PAYMENT_ID_FIELD.to_owned(),
                value: Some(Value::String(payment_id.to_owned())),
            });
        }
    }
    if payment.interface_id.is_none() {
        actions.push(UpdateAction::SetInterfaceId {
            interface_id: transaction.id.clone(),
        });
    }
    if let Some(order_id) = transaction.order_id.as_deref() {
        if payment.custom_field_str(BRAINTREE_ORDER_ID_FIELD).is_none() {
            actions.push(UpdateAction::SetCustomField {
                name: BRAINTREE_ORDER_ID_FIELD.to_owned(),
                value: Some(Value::String(order_id.to_owned())),
            });
        }
    }

    actions.extend(update_payment_fields(transaction));
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use domain_types::braintree::CreditCardDetails;

    use super::*;

    #[test]
    fn status_maps_are_total_over_the_documented_vocabulary() {
        let statuses = [
            "authorized",
            "authorizing",
            "authorization_expired",
            "settlement_confirmed",
            "settlement_declined",
            "settlement_pending",
            "settled",
            "settling",
            "submitted_for_settlement",
            "gateway_rejected",
            "processor_declined",
            "failed",
            "voided",
            "some_future_status",
        ];
        for raw in statuses {
            let status: TransactionStatus = serde_json::from_value(Value::String(raw.to_owned()))
                .unwrap_or(TransactionStatus::Unrecognized(raw.to_owned()));
            // both maps must be defined for every spelling
            let _ = map_status_to_transaction_state(&status);
            let _ = map_status_to_transaction_type(&status);
        }
    }

    #[test]
    fn success_failure_and_pending_sets() {
        assert_eq!(
            map_status_to_transaction_state(&TransactionStatus::Settled),
            TransactionState::Success
        );
        assert_eq!(
            map_status_to_transaction_state(&TransactionStatus::Voided),
            TransactionState::Success
        );
        assert_eq!(
            map_status_to_transaction_state(&TransactionStatus::ProcessorDeclined),
            TransactionState::Failure
        );
        assert_eq!(
            map_status_to_transaction_state(&TransactionStatus::SubmittedForSettlement),
            TransactionState::Pending
        );
        assert_eq!(
            map_status_to_transaction_state(&TransactionStatus::Unrecognized(
                "quantum_settled".to_owned()
            )),
            TransactionState::Pending
        );
    }

    #[test]
    fn authorization_void_and_charge_types() {
        assert_eq!(
            map_status_to_transaction_type(&TransactionStatus::Authorizing),
            TransactionType::Authorization
        );
        assert_eq!(
            map_status_to_transaction_type(&TransactionStatus::Voided),
            TransactionType::CancelAuthorization
        );
        assert_eq!(
            map_status_to_transaction_type(&TransactionStatus::Settling),
            TransactionType::Charge
        );
        assert_eq!(
            map_status_to_transaction_type(&TransactionStatus::Unrecognized(
                "quantum_settled".to_owned()
            )),
            TransactionType::Charge
        );
    }

    #[test]
    fn card_hint_combines_type_and_masked_number() {
        let mut transaction = BraintreeTransaction {
            id: "bt-1".to_owned(),
            status: TransactionStatus::Settled,
            kind: Some(TransactionKind::Sale),
            amount: "1.00".to_owned(),
            order_id: None,
            updated_at: None,
            payment_instrument_type: PaymentInstrumentType::CreditCard,
            credit_card: Some(CreditCardDetails {
                card_type: Some("Visa".to_owned()),
                masked_number: Some("401288******1881".to_owned()),
            }),
            paypal_account: None,
            venmo_account: None,
            android_pay_card: None,
            apple_pay_card: None,
            local_payment: None,
        };
        assert_eq!(payment_method_hint(&transaction), "Visa 401288******1881");

        transaction.credit_card = None;
        assert_eq!(payment_method_hint(&transaction), "");
        let actions = update_payment_fields(&transaction);
        assert!(actions.contains(&UpdateAction::SetMethodInfoMethod {
            method: "credit_card".to_owned()
        }));
    }
}
