//! Engine tunables. Everything here changes request shaping only; the
//! dispatch order and response handling are fixed.

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Merchant account forwarded on client token and sale requests when
    /// the payload does not name one.
    pub merchant_account_id: Option<String>,
    /// Submit sales for settlement immediately instead of leaving them
    /// authorized.
    pub autocapture: bool,
    /// Soft descriptor attached to PayPal-funded sales.
    pub paypal_description: Option<String>,
    /// Run card verification when vaulting a payment method.
    pub validate_card: bool,
}

impl GatewayConfig {
    /// Builds the configuration from `BRAINTREE_`-prefixed environment
    /// variables. Unset variables fall back to the field defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let source = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BRAINTREE")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;

        serde_path_to_error::deserialize(source).map_err(|error| {
            tracing::error!(%error, "unable to deserialize gateway configuration");
            error.into_inner()
        })
    }
}
