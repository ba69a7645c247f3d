//! Request shaping for the customer-scoped flows.

use domain_types::{
    braintree::{CustomerCreateRequest, PaymentMethodRequest},
    errors::GatewayError,
    types::Customer,
    CustomResult,
};
use error_stack::{report, ResultExt};
use serde_json::Value;

use crate::{
    actions::BRAINTREE_CUSTOMER_ID_FIELD,
    configs::GatewayConfig,
    operations::{merge_over_defaults, FieldPayload, Operation},
};

fn known_customer_id(customer: &Customer) -> Option<&str> {
    customer
        .custom_field_str(BRAINTREE_CUSTOMER_ID_FIELD)
        .filter(|id| !id.is_empty())
        .or_else(|| Some(customer.id.as_str()).filter(|id| !id.is_empty()))
}

/// Resolves the gateway customer id a lookup targets: the payload wins,
/// then the recorded cross-reference, then the commerce customer id.
pub fn resolve_customer_id(
    customer: &Customer,
    payload: &FieldPayload,
) -> CustomResult<String, GatewayError> {
    let object = payload.clone().into_object(Operation::Find);
    object
        .get("customerId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .or_else(|| known_customer_id(customer))
        .map(str::to_owned)
        .ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "customerId"
            })
        })
}

/// Builds the gateway customer-create request: commerce profile fields as
/// defaults, payload fields (nonce included) layered on top.
pub fn build_customer_create_request(
    customer: &Customer,
    payload: FieldPayload,
) -> CustomResult<CustomerCreateRequest, GatewayError> {
    let overlay = payload.into_object(Operation::Create);
    let defaults = serde_json::json!({
        "id": known_customer_id(customer),
        "email": customer.email,
        "firstName": customer.first_name,
        "lastName": customer.last_name,
        "company": customer.company_name,
    });
    let request: CustomerCreateRequest =
        serde_json::from_value(Value::Object(merge_over_defaults(defaults, overlay)))
            .change_context(GatewayError::RequestEncodingFailed)?;
    if request.id.as_deref().filter(|id| !id.is_empty()).is_none() {
        return Err(report!(GatewayError::MissingRequiredField {
            field_name: "customerId"
        }));
    }
    Ok(request)
}

/// Builds the vaulting request for a customer already known to the
/// gateway. Verification options are engine policy and override whatever
/// the payload carried.
pub fn build_payment_method_request(
    customer_id: &str,
    payload: FieldPayload,
    config: &GatewayConfig,
) -> CustomResult<PaymentMethodRequest, GatewayError> {
    let overlay = payload.into_object(Operation::Vault);
    let defaults = serde_json::json!({
        "customerId": customer_id,
    });
    let mut merged = merge_over_defaults(defaults, overlay);
    merged.insert(
        "options".to_owned(),
        serde_json::json!({
            "failOnDuplicatePaymentMethod": true,
            "usBankAccountVerificationMethod": "network_check",
            "verifyCard": config.validate_card.then_some(true),
            "verificationMerchantAccountId": config.merchant_account_id,
        }),
    );
    serde_json::from_value(Value::Object(merged))
        .change_context(GatewayError::RequestEncodingFailed)
}

/// Splits an instrument-update payload into the token it targets and the
/// remaining request body.
pub fn parse_payment_method_update(
    payload: FieldPayload,
) -> CustomResult<(String, PaymentMethodRequest), GatewayError> {
    let mut object = payload.into_object(Operation::UpdatePayment);
    let token = object
        .remove("paymentMethodToken")
        .and_then(|value| value.as_str().map(str::to_owned))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "paymentMethodToken"
            })
        })?;
    let request = serde_json::from_value(Value::Object(object))
        .change_context(GatewayError::RequestEncodingFailed)?;
    Ok((token, request))
}

pub fn parse_payment_method_token(payload: FieldPayload) -> CustomResult<String, GatewayError> {
    let object = payload.into_object(Operation::DeletePayment);
    object
        .get("paymentMethodToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            report!(GatewayError::MissingRequiredField {
                field_name: "paymentMethodToken"
            })
        })
}
