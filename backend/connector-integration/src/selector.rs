//! Suitable-transaction selection for follow-up operations.

use domain_types::{
    errors::GatewayError,
    types::{Payment, Transaction, TransactionState, TransactionType},
    CustomResult,
};
use error_stack::report;

use crate::operations::Operation;

/// Dispatch context: a payment, optionally narrowed to one of its
/// transactions when the event originated from a transaction-scoped
/// request field.
#[derive(Debug, Clone, Copy)]
pub struct PaymentWithOptionalTransaction<'a> {
    pub payment: &'a Payment,
    pub transaction: Option<&'a Transaction>,
}

impl<'a> PaymentWithOptionalTransaction<'a> {
    pub fn payment_scoped(payment: &'a Payment) -> Self {
        Self {
            payment,
            transaction: None,
        }
    }

    pub fn transaction_scoped(payment: &'a Payment, transaction: &'a Transaction) -> Self {
        Self {
            payment,
            transaction: Some(transaction),
        }
    }

    /// The request field driving this dispatch, read from the bound
    /// transaction when one is set, from the payment otherwise.
    pub fn request_field_str(&self, operation: Operation) -> Option<&'a str> {
        match self.transaction {
            Some(transaction) => transaction.custom_field_str(operation.request_field()),
            None => self.payment.custom_field_str(operation.request_field()),
        }
    }

    /// Local transaction id response/error fields should be scoped to.
    pub fn bound_transaction_id(&self) -> Option<&'a str> {
        self.transaction.map(|transaction| transaction.id.as_str())
    }
}

/// Picks the gateway-side id of the transaction a follow-up operation
/// targets. A bound transaction context short-circuits list scanning;
/// otherwise the **last** transaction matching the required type (and
/// state, when given) wins, construction order being chronological.
/// Zero matches is a hard error.
pub fn find_suitable_interaction_id(
    context: &PaymentWithOptionalTransaction<'_>,
    required_type: Option<TransactionType>,
    required_state: Option<TransactionState>,
) -> CustomResult<String, GatewayError> {
    if let Some(transaction) = context.transaction {
        return transaction
            .interaction_id
            .clone()
            .ok_or_else(|| report!(GatewayError::NoSuitableTransaction));
    }
    context
        .payment
        .transactions
        .iter()
        .filter(|transaction| {
            required_type.is_none_or(|wanted| transaction.transaction_type == Some(wanted))
                && required_state.is_none_or(|wanted| transaction.state == wanted)
        })
        .next_back()
        .and_then(|transaction| transaction.interaction_id.clone())
        .ok_or_else(|| report!(GatewayError::NoSuitableTransaction))
}
