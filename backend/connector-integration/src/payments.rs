//! Payment-scoped operation handlers and their fixed-order dispatcher.
//!
//! Each handler gates on its request field, runs the gateway call, and
//! resolves to a self-contained action batch. Failures never escape a
//! handler; they become the normalized error envelope, so one failing
//! operation cannot suppress the others in the same dispatch.

pub mod transformers;


use domain_types::{
    braintree::{
        BraintreeTransaction, PackageTrackingRequest, PaymentInstrumentType, PaymentMethodRequest,
        TransactionKind, TransactionStatus,
    },
    errors::GatewayError,
    types::{Payment, Transaction, TransactionState, TransactionType},
    update_actions::{DraftMoney, TransactionDraft, UpdateAction},
    utils::{current_timestamp, minor_units_to_gateway_amount},
    CustomResult,
};
use error_stack::{report, ResultExt};
use interfaces::PaymentGateway;
use serde_json::Value;

use crate::{
    actions::{handle_error, handle_request, handle_response},
    configs::GatewayConfig,
    operations::{FieldPayload, Operation},
    payments::transformers::{
        build_client_token_request, build_sale_request, handle_transaction_response,
        parse_follow_up_request, update_payment_fields, BRAINTREE_ORDER_ID_FIELD,
    },
    selector::PaymentWithOptionalTransaction,
};

/// Runs every payment-scoped operation whose request field is set, first
/// against the payment's own custom fields, then against each transaction's.
pub async fn payment_update_actions(
    payment: &Payment,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> Vec<UpdateAction> {
    let context = PaymentWithOptionalTransaction::payment_scoped(payment);
    let mut actions = Vec::new();
    actions.extend(get_client_token(&context, gateway, config).await);
    actions.extend(transaction_sale(&context, gateway, config).await);
    actions.extend(paypal_order(&context, gateway).await);
    actions.extend(refund(&context, gateway).await);
    actions.extend(submit_for_settlement(&context, gateway).await);
    actions.extend(find_transaction(&context, gateway).await);
    actions.extend(void(&context, gateway).await);
    actions.extend(add_package_tracking(&context, gateway).await);
    for transaction in &payment.transactions {
        let scoped = PaymentWithOptionalTransaction::transaction_scoped(payment, transaction);
        actions.extend(refund(&scoped, gateway).await);
        actions.extend(submit_for_settlement(&scoped, gateway).await);
        actions.extend(void(&scoped, gateway).await);
    }
    actions
}

/// Resolves one operation attempt: the handler's batch on success (which
/// opens with the interaction recording the built gateway request), the
/// error envelope plus the field clear on failure.
fn finish(
    operation: Operation,
    context: &PaymentWithOptionalTransaction<'_>,
    outcome: CustomResult<Vec<UpdateAction>, GatewayError>,
) -> Vec<UpdateAction> {
    match outcome {
        Ok(actions) => actions,
        Err(error) => handle_error(operation, &error, context.bound_transaction_id()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> CustomResult<Value, GatewayError> {
    serde_json::to_value(value).change_context(GatewayError::RequestEncodingFailed)
}

fn amount_from(fields: &mut serde_json::Map<String, Value>) -> Option<String> {
    match fields.remove("amount") {
        Some(Value::String(amount)) => Some(amount),
        Some(Value::Number(amount)) => Some(amount.to_string()),
        _ => None,
    }
}

async fn get_client_token(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::GetClientToken;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let request = build_client_token_request(payload, config)?;
        let mut actions = handle_request(OPERATION, &to_json(&request)?);
        let token = gateway.generate_client_token(request).await?;
        actions.extend(handle_response(
            OPERATION,
            &Value::String(token),
            context.bound_transaction_id(),
        ));
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

async fn transaction_sale(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::TransactionSale;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let request = build_sale_request(context, payload, config)?;
        let mut actions = handle_request(OPERATION, &to_json(&request)?);
        let transaction = gateway.sale(request).await?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transaction)?,
            context.bound_transaction_id(),
        ));
        actions.extend(handle_transaction_response(context.payment, &transaction)?);
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

/// Vaults a PayPal nonce without charging it and records the resulting
/// token as an initial authorization, to be voided or sold later.
async fn paypal_order(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::PayPalOrder;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let amount_planned = context.payment.amount_planned.as_ref().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "amountPlanned"
            })
        })?;
        let mut request: PaymentMethodRequest =
            serde_json::from_value(Value::Object(payload.into_object(OPERATION)))
                .change_context(GatewayError::RequestEncodingFailed)?;
        if request.customer_id.is_none() {
            request.customer_id = context
                .payment
                .customer
                .as_ref()
                .map(|reference| reference.id.clone());
        }
        let mut actions = handle_request(OPERATION, &to_json(&request)?);
        let response = gateway.create_payment_method(request).await?;
        let token = response.token.clone().ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "token"
            })
        })?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&response)?,
            context.bound_transaction_id(),
        ));
        actions.push(UpdateAction::AddTransaction {
            transaction: TransactionDraft {
                transaction_type: TransactionType::Authorization,
                amount: DraftMoney {
                    cent_amount: amount_planned.cent_amount,
                    currency_code: amount_planned.currency_code.clone(),
                },
                interaction_id: Some(token),
                timestamp: response.updated_at.clone(),
                state: TransactionState::Initial,
            },
        });
        let state = TransactionState::Initial.to_string();
        actions.push(UpdateAction::SetStatusInterfaceCode {
            interface_code: state.clone(),
        });
        actions.push(UpdateAction::SetStatusInterfaceText {
            interface_text: state,
        });
        actions.push(UpdateAction::SetMethodInfoMethod {
            method: PaymentInstrumentType::PaypalAccount.to_string(),
        });
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

/// The request interaction for a follow-up call records what actually goes
/// to the gateway, which is just the resolved transaction id and an
/// optional partial amount.
fn follow_up_audit(transaction_id: &str, amount: Option<&String>) -> Value {
    let mut fields = serde_json::Map::new();
    fields.insert(
        "transactionId".to_owned(),
        Value::String(transaction_id.to_owned()),
    );
    if let Some(amount) = amount {
        fields.insert("amount".to_owned(), Value::String(amount.clone()));
    }
    Value::Object(fields)
}

async fn refund(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::Refund;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let (transaction_id, mut rest) =
            parse_follow_up_request(context, OPERATION, payload, Some(TransactionType::Charge))?;
        let amount = amount_from(&mut rest);
        let mut actions =
            handle_request(OPERATION, &follow_up_audit(&transaction_id, amount.as_ref()));
        let transaction = gateway.refund(&transaction_id, amount).await?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transaction)?,
            context.bound_transaction_id(),
        ));
        actions.extend(handle_transaction_response(context.payment, &transaction)?);
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

async fn submit_for_settlement(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::SubmitForSettlement;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let (transaction_id, mut rest) = parse_follow_up_request(
            context,
            OPERATION,
            payload,
            Some(TransactionType::Authorization),
        )?;
        let amount = amount_from(&mut rest);
        let mut actions =
            handle_request(OPERATION, &follow_up_audit(&transaction_id, amount.as_ref()));
        let transaction = gateway
            .submit_for_settlement(&transaction_id, amount)
            .await?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transaction)?,
            context.bound_transaction_id(),
        ));
        actions.extend(handle_transaction_response(context.payment, &transaction)?);
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

async fn find_transaction(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::FindTransaction;
    if context.request_field_str(OPERATION).is_none() {
        return Vec::new();
    }
    let outcome = async {
        // The lookup key is the order id recorded on the payment itself,
        // never anything carried in the request field.
        let order_id = context
            .payment
            .custom_field_str(BRAINTREE_ORDER_ID_FIELD)
            .ok_or_else(|| {
                report!(GatewayError::MissingRequiredField {
                    field_name: "orderId"
                })
            })?
            .to_owned();
        let mut actions = handle_request(
            OPERATION,
            &Value::Object(serde_json::Map::from_iter([(
                "orderId".to_owned(),
                Value::String(order_id.clone()),
            )])),
        );
        let transactions = gateway.find_by_order_id(&order_id).await?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transactions)?,
            context.bound_transaction_id(),
        ));
        for transaction in &transactions {
            actions.extend(handle_transaction_response(context.payment, transaction)?);
        }
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

/// Locates the initial authorization a void would target. Its interaction
/// id is a vaulted payment-method token, not a gateway transaction, so
/// voiding means releasing the token instead of a gateway void.
fn initial_authorization<'a>(
    context: &PaymentWithOptionalTransaction<'a>,
    transaction_id: &str,
) -> Option<&'a Transaction> {
    let is_initial_auth = |transaction: &Transaction| {
        transaction.state == TransactionState::Initial
            && transaction.transaction_type == Some(TransactionType::Authorization)
    };
    match context.transaction {
        Some(transaction) => (transaction.interaction_id.as_deref() == Some(transaction_id)
            && is_initial_auth(transaction))
        .then_some(transaction),
        None => context
            .payment
            .transactions
            .iter()
            .find(|transaction| {
                transaction.interaction_id.as_deref() == Some(transaction_id)
                    && is_initial_auth(transaction)
            }),
    }
}

fn synthesized_void(
    context: &PaymentWithOptionalTransaction<'_>,
    transaction_id: String,
) -> BraintreeTransaction {
    let amount = context
        .payment
        .amount_planned
        .as_ref()
        .map(|money| minor_units_to_gateway_amount(money.cent_amount, money.fraction_digits))
        .unwrap_or_else(|| "0.00".to_owned());
    BraintreeTransaction {
        id: transaction_id,
        status: TransactionStatus::Voided,
        kind: Some(TransactionKind::Sale),
        amount,
        order_id: None,
        updated_at: Some(current_timestamp()),
        payment_instrument_type: PaymentInstrumentType::PaypalAccount,
        credit_card: None,
        paypal_account: None,
        venmo_account: None,
        android_pay_card: None,
        apple_pay_card: None,
        local_payment: None,
    }
}

async fn void(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::Void;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let (transaction_id, _rest) = parse_follow_up_request(
            context,
            OPERATION,
            payload,
            Some(TransactionType::Authorization),
        )?;
        let mut actions = handle_request(OPERATION, &follow_up_audit(&transaction_id, None));
        let transaction = match initial_authorization(context, &transaction_id) {
            Some(_) => {
                gateway.delete_payment_method(&transaction_id).await?;
                synthesized_void(context, transaction_id)
            }
            None => gateway.void(&transaction_id).await?,
        };
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transaction)?,
            context.bound_transaction_id(),
        ));
        actions.extend(handle_transaction_response(context.payment, &transaction)?);
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}

async fn add_package_tracking(
    context: &PaymentWithOptionalTransaction<'_>,
    gateway: &dyn PaymentGateway,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::AddPackageTracking;
    let Some(raw) = context.request_field_str(OPERATION) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let (transaction_id, rest) =
            parse_follow_up_request(context, OPERATION, payload, Some(TransactionType::Charge))?;
        let request: PackageTrackingRequest = serde_json::from_value(Value::Object(rest))
            .change_context(GatewayError::RequestEncodingFailed)?;
        let mut audit = to_json(&request)?;
        if let Some(fields) = audit.as_object_mut() {
            fields.insert(
                "transactionId".to_owned(),
                Value::String(transaction_id.clone()),
            );
        }
        let mut actions = handle_request(OPERATION, &audit);
        let transaction = gateway
            .add_package_tracking(&transaction_id, request)
            .await?;
        actions.extend(handle_response(
            OPERATION,
            &to_json(&transaction)?,
            context.bound_transaction_id(),
        ));
        // Tracking does not change the transaction ledger, only the
        // status/method display fields.
        actions.extend(update_payment_fields(&transaction));
        Ok(actions)
    }
    .await;
    finish(OPERATION, context, outcome)
}
