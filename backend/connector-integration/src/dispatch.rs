//! Extension-call entry point: resource routing and structural validation.
//!
//! Anything past this boundary resolves to a 200 with an action batch;
//! only structurally broken inputs produce transport-level errors.

use domain_types::{
    errors::ApplicationErrorResponse,
    types::{Customer, ExtensionAction, ExtensionInput, ExtensionResponse, Payment},
    CustomResult,
};
use error_stack::report;
use interfaces::PaymentGateway;

use crate::{
    configs::GatewayConfig, customers::customer_update_actions, payments::payment_update_actions,
};

pub async fn process_extension_request(
    input: ExtensionInput,
    gateway: &dyn PaymentGateway,
    config: &GatewayConfig,
) -> CustomResult<ExtensionResponse, ApplicationErrorResponse> {
    // Creation events carry nothing to reconcile yet.
    if input.action == ExtensionAction::Create {
        return Ok(ExtensionResponse {
            status_code: 200,
            actions: Vec::new(),
        });
    }

    let resource_type = input.resource.type_id.as_str();
    let object = input.resource.obj.clone().ok_or_else(|| {
        report!(ApplicationErrorResponse::bad_request(
            "MISSING_RESOURCE_OBJECT",
            format!("Update notification for {resource_type} carries no resource object"),
        ))
    })?;

    let actions = match resource_type {
        "payment" => {
            let payment: Payment = serde_json::from_value(object).map_err(|error| {
                report!(ApplicationErrorResponse::bad_request(
                    "INVALID_RESOURCE_OBJECT",
                    format!("Unable to decode payment resource: {error}"),
                ))
            })?;
            tracing::debug!(payment_id = %payment.id, "dispatching payment update");
            payment_update_actions(&payment, gateway, config).await
        }
        "customer" => {
            let customer: Customer = serde_json::from_value(object).map_err(|error| {
                report!(ApplicationErrorResponse::bad_request(
                    "INVALID_RESOURCE_OBJECT",
                    format!("Unable to decode customer resource: {error}"),
                ))
            })?;
            tracing::debug!(customer_id = %customer.id, "dispatching customer update");
            customer_update_actions(&customer, gateway, config).await
        }
        other => {
            return Err(report!(ApplicationErrorResponse::internal_server_error(
                "UNRECOGNIZED_RESOURCE_TYPE",
                format!("No handler registered for resource type {other}"),
            )))
        }
    };

    Ok(ExtensionResponse {
        status_code: 200,
        actions,
    })
}
