//! Scriptable in-memory gateway for handler tests.

use std::sync::Mutex;

use domain_types::{
    braintree::{
        BraintreeTransaction, ClientTokenRequest, CustomerCreateRequest, CustomerResponse,
        PackageTrackingRequest, PaymentInstrumentType, PaymentMethodRequest, PaymentMethodResponse,
        TransactionKind, TransactionRequest, TransactionStatus,
    },
    errors::GatewayError,
    CustomResult,
};
use error_stack::Report;
use interfaces::PaymentGateway;

type Scripted<T> = Mutex<Option<Result<T, GatewayError>>>;

#[derive(Default)]
pub struct MockGateway {
    pub client_token: Scripted<String>,
    pub sale: Scripted<BraintreeTransaction>,
    pub refund: Scripted<BraintreeTransaction>,
    pub void: Scripted<BraintreeTransaction>,
    pub settlement: Scripted<BraintreeTransaction>,
    pub found: Scripted<Vec<BraintreeTransaction>>,
    pub tracking: Scripted<BraintreeTransaction>,
    pub customer: Scripted<CustomerResponse>,
    pub created_customer: Scripted<CustomerResponse>,
    pub payment_method: Scripted<PaymentMethodResponse>,

    pub sale_requests: Mutex<Vec<TransactionRequest>>,
    pub refund_calls: Mutex<Vec<(String, Option<String>)>>,
    pub settlement_calls: Mutex<Vec<(String, Option<String>)>>,
    pub void_calls: Mutex<Vec<String>>,
    pub find_order_calls: Mutex<Vec<String>>,
    pub find_customer_calls: Mutex<Vec<String>>,
    pub customer_create_requests: Mutex<Vec<CustomerCreateRequest>>,
    pub payment_method_requests: Mutex<Vec<PaymentMethodRequest>>,
    pub deleted_payment_methods: Mutex<Vec<String>>,
}

fn take<T>(slot: &Scripted<T>) -> CustomResult<T, GatewayError> {
    slot.lock()
        .expect("mock state poisoned")
        .take()
        .unwrap_or_else(|| {
            Err(GatewayError::RequestNotSent(
                "no scripted response".to_owned(),
            ))
        })
        .map_err(Report::new)
}

fn record<T>(log: &Mutex<Vec<T>>, entry: T) {
    log.lock().expect("mock state poisoned").push(entry);
}

impl MockGateway {
    pub fn script<T>(slot: &Scripted<T>, outcome: Result<T, GatewayError>) {
        *slot.lock().expect("mock state poisoned") = Some(outcome);
    }
}

pub fn gateway_transaction(id: &str, status: TransactionStatus) -> BraintreeTransaction {
    BraintreeTransaction {
        id: id.to_owned(),
        status,
        kind: Some(TransactionKind::Sale),
        amount: "12.34".to_owned(),
        order_id: None,
        updated_at: Some("2024-05-01T10:00:00Z".to_owned()),
        payment_instrument_type: PaymentInstrumentType::CreditCard,
        credit_card: None,
        paypal_account: None,
        venmo_account: None,
        android_pay_card: None,
        apple_pay_card: None,
        local_payment: None,
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn generate_client_token(
        &self,
        _request: ClientTokenRequest,
    ) -> CustomResult<String, GatewayError> {
        take(&self.client_token)
    }

    async fn sale(
        &self,
        request: TransactionRequest,
    ) -> CustomResult<BraintreeTransaction, GatewayError> {
        record(&self.sale_requests, request);
        take(&self.sale)
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<String>,
    ) -> CustomResult<BraintreeTransaction, GatewayError> {
        record(&self.refund_calls, (transaction_id.to_owned(), amount));
        take(&self.refund)
    }

    async fn void(&self, transaction_id: &str) -> CustomResult<BraintreeTransaction, GatewayError> {
        record(&self.void_calls, transaction_id.to_owned());
        take(&self.void)
    }

    async fn submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Option<String>,
    ) -> CustomResult<BraintreeTransaction, GatewayError> {
        record(&self.settlement_calls, (transaction_id.to_owned(), amount));
        take(&self.settlement)
    }

    async fn find_by_order_id(
        &self,
        order_id: &str,
    ) -> CustomResult<Vec<BraintreeTransaction>, GatewayError> {
        record(&self.find_order_calls, order_id.to_owned());
        take(&self.found)
    }

    async fn add_package_tracking(
        &self,
        _transaction_id: &str,
        _request: PackageTrackingRequest,
    ) -> CustomResult<BraintreeTransaction, GatewayError> {
        take(&self.tracking)
    }

    async fn find_customer(
        &self,
        customer_id: &str,
    ) -> CustomResult<CustomerResponse, GatewayError> {
        record(&self.find_customer_calls, customer_id.to_owned());
        take(&self.customer)
    }

    async fn create_customer(
        &self,
        request: CustomerCreateRequest,
    ) -> CustomResult<CustomerResponse, GatewayError> {
        record(&self.customer_create_requests, request);
        take(&self.created_customer)
    }

    async fn update_customer(
        &self,
        _customer_id: &str,
        request: CustomerCreateRequest,
    ) -> CustomResult<CustomerResponse, GatewayError> {
        record(&self.customer_create_requests, request);
        take(&self.created_customer)
    }

    async fn delete_customer(&self, _customer_id: &str) -> CustomResult<(), GatewayError> {
        Ok(())
    }

    async fn create_payment_method(
        &self,
        request: PaymentMethodRequest,
    ) -> CustomResult<PaymentMethodResponse, GatewayError> {
        record(&self.payment_method_requests, request);
        take(&self.payment_method)
    }

    async fn update_payment_method(
        &self,
        _token: &str,
        request: PaymentMethodRequest,
    ) -> CustomResult<PaymentMethodResponse, GatewayError> {
        record(&self.payment_method_requests, request);
        take(&self.payment_method)
    }

    async fn delete_payment_method(&self, token: &str) -> CustomResult<(), GatewayError> {
        record(&self.deleted_payment_methods, token.to_owned());
        Ok(())
    }
}
