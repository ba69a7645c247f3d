use std::sync::Arc;

use domain_types::{
    braintree::{
        BraintreeTransaction, ClientTokenRequest, CustomerCreateRequest, CustomerResponse,
        PackageTrackingRequest, PaymentMethodRequest, PaymentMethodResponse, TransactionRequest,
    },
    errors::{ApplicationErrorResponse, GatewayError},
    types::ExtensionResponse,
    update_actions::UpdateAction,
    CustomResult,
};

/// Contract the engine expects from the payment gateway client. A gateway
/// `success:false` result surfaces as `GatewayError::Declined` with the
/// gateway's message attached; transport failures surface as
/// `RequestNotSent`. The engine treats both identically.
///
/// Payment operations (sale, settle, refund, void) should run with a
/// longer timeout budget than the customer/vault operations; that budget
/// lives entirely in the implementation.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn generate_client_token(
        &self,
        request: ClientTokenRequest,
    ) -> CustomResult<String, GatewayError>;

    async fn sale(
        &self,
        request: TransactionRequest,
    ) -> CustomResult<BraintreeTransaction, GatewayError>;

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<String>,
    ) -> CustomResult<BraintreeTransaction, GatewayError>;

    async fn void(&self, transaction_id: &str) -> CustomResult<BraintreeTransaction, GatewayError>;

    async fn submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Option<String>,
    ) -> CustomResult<BraintreeTransaction, GatewayError>;

    async fn find_by_order_id(
        &self,
        order_id: &str,
    ) -> CustomResult<Vec<BraintreeTransaction>, GatewayError>;

    async fn add_package_tracking(
        &self,
        transaction_id: &str,
        request: PackageTrackingRequest,
    ) -> CustomResult<BraintreeTransaction, GatewayError>;

    async fn find_customer(
        &self,
        customer_id: &str,
    ) -> CustomResult<CustomerResponse, GatewayError>;

    async fn create_customer(
        &self,
        request: CustomerCreateRequest,
    ) -> CustomResult<CustomerResponse, GatewayError>;

    async fn update_customer(
        &self,
        customer_id: &str,
        request: CustomerCreateRequest,
    ) -> CustomResult<CustomerResponse, GatewayError>;

    async fn delete_customer(&self, customer_id: &str) -> CustomResult<(), GatewayError>;

    async fn create_payment_method(
        &self,
        request: PaymentMethodRequest,
    ) -> CustomResult<PaymentMethodResponse, GatewayError>;

    async fn update_payment_method(
        &self,
        token: &str,
        request: PaymentMethodRequest,
    ) -> CustomResult<PaymentMethodResponse, GatewayError>;

    async fn delete_payment_method(&self, token: &str) -> CustomResult<(), GatewayError>;
}

pub type BoxedGateway = Arc<dyn PaymentGateway>;

/// Contract of the commerce platform client. The engine never calls this
/// itself; the transport that owns the extension call fetches the snapshot
/// upstream and applies the returned actions downstream (optimistic
/// concurrency via `version` is the applier's problem).
#[async_trait::async_trait]
pub trait CommercePlatform: Send + Sync {
    async fn fetch_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> CustomResult<serde_json::Value, ApplicationErrorResponse>;

    async fn apply_update(
        &self,
        resource_type: &str,
        id: &str,
        version: u64,
        actions: Vec<UpdateAction>,
    ) -> CustomResult<ExtensionResponse, ApplicationErrorResponse>;
}
