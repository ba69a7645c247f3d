use domain_types::{
    braintree::{CustomerResponse, PaymentMethodResponse},
    errors::GatewayError,
    types::{Customer, CustomFields},
    update_actions::UpdateAction,
};
use serde_json::Value;

use crate::{
    configs::GatewayConfig,
    customers::customer_update_actions,
    mocks::MockGateway,
};

fn customer_with(pairs: &[(&str, &str)]) -> Customer {
    let mut fields = serde_json::Map::new();
    for (name, value) in pairs {
        fields.insert((*name).to_owned(), Value::String((*value).to_owned()));
    }
    Customer {
        id: "ct-cust-1".to_owned(),
        version: 2,
        email: Some("jamie@example.com".to_owned()),
        first_name: Some("Jamie".to_owned()),
        last_name: Some("Rivera".to_owned()),
        company_name: None,
        custom: Some(CustomFields { fields }),
    }
}

fn interaction_data(actions: &[UpdateAction], kind: &str) -> Option<Value> {
    actions.iter().find_map(|action| match action {
        UpdateAction::AddInterfaceInteraction { fields, .. }
            if fields.interaction_kind == kind =>
        {
            serde_json::from_str(&fields.data).ok()
        }
        _ => None,
    })
}

fn found_customer(id: &str) -> CustomerResponse {
    CustomerResponse {
        id: Some(id.to_owned()),
        additional: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn lookup_miss_becomes_a_clean_failure_envelope() {
    let customer = customer_with(&[("findRequest", "{}")]);
    let gateway = MockGateway::default();
    MockGateway::script(
        &gateway.customer,
        Err(GatewayError::Declined {
            message: "Customer not found".to_owned(),
        }),
    );

    let actions = customer_update_actions(&customer, &gateway, &GatewayConfig::default()).await;

    assert_eq!(
        actions,
        vec![
            UpdateAction::SetCustomField {
                name: "findResponse".to_owned(),
                value: Some(Value::String(
                    r#"{"message":"Customer not found","success":false}"#.to_owned()
                )),
            },
            UpdateAction::SetCustomField {
                name: "findRequest".to_owned(),
                value: None,
            },
        ]
    );
    // the lookup keyed on the commerce customer id
    let calls = gateway.find_customer_calls.lock().expect("mock state poisoned");
    assert_eq!(calls.as_slice(), ["ct-cust-1"]);
}

#[tokio::test]
async fn create_records_the_gateway_customer_id() {
    let customer = customer_with(&[("createRequest", "{}")]);
    let gateway = MockGateway::default();
    MockGateway::script(&gateway.created_customer, Ok(found_customer("ct-cust-1")));

    let actions = customer_update_actions(&customer, &gateway, &GatewayConfig::default()).await;

    assert!(actions.contains(&UpdateAction::SetCustomField {
        name: "braintreeCustomerId".to_owned(),
        value: Some(Value::String("ct-cust-1".to_owned())),
    }));
    assert!(actions.contains(&UpdateAction::SetCustomField {
        name: "createRequest".to_owned(),
        value: None,
    }));

    let requests = gateway
        .customer_create_requests
        .lock()
        .expect("mock state poisoned");
    let request = requests.first().expect("create request captured");
    assert_eq!(request.id.as_deref(), Some("ct-cust-1"));
    assert_eq!(request.email.as_deref(), Some("jamie@example.com"));
    assert_eq!(request.first_name.as_deref(), Some("Jamie"));

    // the request interaction carries the built request with the profile
    // defaults, not the bare payload
    let audit = interaction_data(&actions, "createRequest")
        .expect("request interaction carries the built request");
    assert_eq!(
        audit.get("email"),
        Some(&Value::String("jamie@example.com".to_owned()))
    );
}

#[tokio::test]
async fn vaulting_for_a_known_customer_applies_verification_policy() {
    let customer = customer_with(&[
        ("braintreeCustomerId", "bt-cust-7"),
        ("vaultRequest", "fake-valid-nonce"),
    ]);
    let gateway = MockGateway::default();
    MockGateway::script(
        &gateway.payment_method,
        Ok(PaymentMethodResponse {
            token: Some("tok-1".to_owned()),
            updated_at: None,
            additional: serde_json::Map::new(),
        }),
    );
    let config = GatewayConfig {
        validate_card: true,
        ..GatewayConfig::default()
    };

    let actions = customer_update_actions(&customer, &gateway, &config).await;

    let requests = gateway
        .payment_method_requests
        .lock()
        .expect("mock state poisoned");
    let request = requests.first().expect("vault request captured");
    assert_eq!(request.customer_id.as_deref(), Some("bt-cust-7"));
    assert_eq!(request.payment_method_nonce.as_deref(), Some("fake-valid-nonce"));
    let options = request.options.as_ref().expect("verification options");
    assert_eq!(options.fail_on_duplicate_payment_method, Some(true));
    assert_eq!(
        options.us_bank_account_verification_method.as_deref(),
        Some("network_check")
    );
    assert_eq!(options.verify_card, Some(true));

    assert!(actions.iter().any(|action| matches!(
        action,
        UpdateAction::SetCustomField { name, value: Some(_) } if name == "vaultResponse"
    )));
}

#[tokio::test]
async fn vaulting_without_a_cross_reference_creates_the_customer() {
    let customer = customer_with(&[(
        "vaultRequest",
        r#"{"paymentMethodNonce":"fake-valid-nonce"}"#,
    )]);
    let gateway = MockGateway::default();
    MockGateway::script(&gateway.created_customer, Ok(found_customer("ct-cust-1")));

    let actions = customer_update_actions(&customer, &gateway, &GatewayConfig::default()).await;

    let requests = gateway
        .customer_create_requests
        .lock()
        .expect("mock state poisoned");
    let request = requests.first().expect("create request captured");
    assert_eq!(request.id.as_deref(), Some("ct-cust-1"));
    assert_eq!(
        request.additional.get("paymentMethodNonce"),
        Some(&Value::String("fake-valid-nonce".to_owned()))
    );

    assert!(actions.contains(&UpdateAction::SetCustomField {
        name: "braintreeCustomerId".to_owned(),
        value: Some(Value::String("ct-cust-1".to_owned())),
    }));
}

#[tokio::test]
async fn instrument_update_without_a_token_fails_cleanly() {
    let customer = customer_with(&[("updatePaymentRequest", "{}")]);
    let gateway = MockGateway::default();

    let actions = customer_update_actions(&customer, &gateway, &GatewayConfig::default()).await;

    assert_eq!(
        actions,
        vec![
            UpdateAction::SetCustomField {
                name: "updatePaymentResponse".to_owned(),
                value: Some(Value::String(
                    r#"{"message":"paymentMethodToken is missing","success":false}"#.to_owned()
                )),
            },
            UpdateAction::SetCustomField {
                name: "updatePaymentRequest".to_owned(),
                value: None,
            },
        ]
    );
}

#[tokio::test]
async fn instrument_deletion_reports_success() {
    let customer = customer_with(&[("deletePaymentRequest", "tok-1")]);
    let gateway = MockGateway::default();

    let actions = customer_update_actions(&customer, &gateway, &GatewayConfig::default()).await;

    let deleted = gateway
        .deleted_payment_methods
        .lock()
        .expect("mock state poisoned");
    assert_eq!(deleted.as_slice(), ["tok-1"]);
    assert!(actions.contains(&UpdateAction::SetCustomField {
        name: "deletePaymentResponse".to_owned(),
        value: Some(Value::String("success".to_owned())),
    }));
    assert!(actions.contains(&UpdateAction::SetCustomField {
        name: "deletePaymentRequest".to_owned(),
        value: None,
    }));
}
