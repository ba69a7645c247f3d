//! Customer-scoped operation handlers and their fixed-order dispatcher.

pub mod transformers;

#[cfg(test)]
mod test;

use domain_types::{
    errors::GatewayError, types::Customer, update_actions::UpdateAction, CustomResult,
};
use error_stack::ResultExt;
use interfaces::PaymentGateway;
use serde_json::Value;

use crate::{
    actions::{handle_customer_response, handle_error, handle_request, BRAINTREE_CUSTOMER_ID_FIELD},
    configs::GatewayConfig,
    customers::transformers::{
        build_customer_create_request, build_payment_method_request, parse_payment_method_token,
        parse_payment_method_update, resolve_customer_id,
    },
    operations::{FieldPayload, Operation},
};

/// Runs every customer-scoped operation whose request field is set, in
/// fixed order: find, create, vault, updatePayment, deletePayment.
pub async fn customer_update_actions(
    customer: &Customer,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    actions.extend(find(customer, gateway).await);
    actions.extend(create(customer, gateway).await);
    actions.extend(vault(customer, gateway, config).await);
    actions.extend(update_payment(customer, gateway).await);
    actions.extend(delete_payment(customer, gateway).await);
    actions
}

/// Resolves one operation attempt: the handler's batch on success (which
/// opens with the interaction recording the built gateway request), the
/// error envelope plus the field clear on failure.
fn finish(
    operation: Operation,
    outcome: CustomResult<Vec<UpdateAction>, GatewayError>,
) -> Vec<UpdateAction> {
    match outcome {
        Ok(actions) => actions,
        Err(error) => handle_error(operation, &error, None),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> CustomResult<Value, GatewayError> {
    serde_json::to_value(value).change_context(GatewayError::RequestEncodingFailed)
}

fn single_field(key: &str, value: &str) -> Value {
    Value::Object(serde_json::Map::from_iter([(
        key.to_owned(),
        Value::String(value.to_owned()),
    )]))
}

async fn find(customer: &Customer, gateway: &dyn PaymentGateway) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::Find;
    let Some(raw) = customer.custom_field_str(OPERATION.request_field()) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let customer_id = resolve_customer_id(customer, &payload)?;
        let mut actions = handle_request(OPERATION, &single_field("customerId", &customer_id));
        let response = gateway.find_customer(&customer_id).await?;
        actions.extend(handle_customer_response(
            OPERATION,
            &to_json(&response)?,
            customer,
        ));
        Ok(actions)
    }
    .await;
    finish(OPERATION, outcome)
}

async fn create(customer: &Customer, gateway: &dyn PaymentGateway) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::Create;
    let Some(raw) = customer.custom_field_str(OPERATION.request_field()) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let request = build_customer_create_request(customer, payload)?;
        let mut actions = handle_request(OPERATION, &to_json(&request)?);
        let response = gateway.create_customer(request).await?;
        actions.extend(handle_customer_response(
            OPERATION,
            &to_json(&response)?,
            customer,
        ));
        Ok(actions)
    }
    .await;
    finish(OPERATION, outcome)
}

/// Vaults an instrument: against the known gateway customer when the
/// cross-reference exists, otherwise by creating the customer with the
/// nonce attached, which vaults it in the same call.
async fn vault(
    customer: &Customer,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::Vault;
    let Some(raw) = customer.custom_field_str(OPERATION.request_field()) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        match customer
            .custom_field_str(BRAINTREE_CUSTOMER_ID_FIELD)
            .filter(|id| !id.is_empty())
        {
            Some(customer_id) => {
                let request = build_payment_method_request(customer_id, payload, config)?;
                let mut actions = handle_request(OPERATION, &to_json(&request)?);
                let response = gateway.create_payment_method(request).await?;
                actions.extend(handle_customer_response(
                    OPERATION,
                    &to_json(&response)?,
                    customer,
                ));
                Ok(actions)
            }
            None => {
                let request = build_customer_create_request(customer, payload)?;
                let mut actions = handle_request(OPERATION, &to_json(&request)?);
                let response = gateway.create_customer(request).await?;
                actions.extend(handle_customer_response(
                    OPERATION,
                    &to_json(&response)?,
                    customer,
                ));
                Ok(actions)
            }
        }
    }
    .await;
    finish(OPERATION, outcome)
}

async fn update_payment(customer: &Customer, gateway: &dyn PaymentGateway) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::UpdatePayment;
    let Some(raw) = customer.custom_field_str(OPERATION.request_field()) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let (token, request) = parse_payment_method_update(payload)?;
        let mut audit = to_json(&request)?;
        if let Some(fields) = audit.as_object_mut() {
            fields.insert(
                "paymentMethodToken".to_owned(),
                Value::String(token.clone()),
            );
        }
        let mut actions = handle_request(OPERATION, &audit);
        let response = gateway.update_payment_method(&token, request).await?;
        actions.extend(handle_customer_response(
            OPERATION,
            &to_json(&response)?,
            customer,
        ));
        Ok(actions)
    }
    .await;
    finish(OPERATION, outcome)
}

async fn delete_payment(customer: &Customer, gateway: &dyn PaymentGateway) -> Vec<UpdateAction> {
    const OPERATION: Operation = Operation::DeletePayment;
    let Some(raw) = customer.custom_field_str(OPERATION.request_field()) else {
        return Vec::new();
    };
    let payload = FieldPayload::decode(raw);
    let outcome = async {
        let token = parse_payment_method_token(payload)?;
        let mut actions = handle_request(OPERATION, &single_field("paymentMethodToken", &token));
        gateway.delete_payment_method(&token).await?;
        actions.extend(handle_customer_response(
            OPERATION,
            &Value::String("success".to_owned()),
            customer,
        ));
        Ok(actions)
    }
    .await;
    finish(OPERATION, outcome)
}
