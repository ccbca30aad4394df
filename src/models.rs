use serde::{Deserialize, Serialize};

// ============ Collaborator Payloads ============

/// Taxpayer as returned by `GET /contribuyentes/{dni}`.
///
/// Field values are kept exactly as decoded. Fields the portal does not
/// display (`id`, `fecha_creacion`, ...) are ignored by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxpayerRecord {
    /// National ID (DNI), the lookup key.
    #[serde(rename = "dni")]
    pub national_id: String,
    /// Full name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Monthly tax amount, sent back verbatim when initiating a payment.
    #[serde(rename = "monto_mensual_impuesto")]
    pub monthly_tax_amount: f64,
    /// Current debt.
    #[serde(rename = "deuda")]
    pub current_debt: f64,
    /// Subscription status as reported by the backend. Not interpreted.
    #[serde(rename = "estado_suscripcion")]
    pub subscription_status: String,
    /// Tax kind (e.g. "Tasa Retributiva"), when the backend provides it.
    #[serde(
        rename = "tipo_impuesto",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_type: Option<String>,
}

/// Body returned by `POST /pagar`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Checkout URL of the payment processor.
    #[serde(default)]
    pub payment_link: Option<String>,
    /// Informational message from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

/// Parameters of a payment-initiation request, copied from the loaded record.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub national_id: String,
    pub amount: f64,
}

impl PaymentRequest {
    pub fn for_record(record: &TaxpayerRecord) -> Self {
        Self {
            national_id: record.national_id.clone(),
            amount: record.monthly_tax_amount,
        }
    }

    /// `monto` query value: shortest decimal form, no rounding (`1500`, `1500.5`).
    pub fn amount_param(&self) -> String {
        format_amount(self.amount)
    }
}

/// Formats a currency amount for display or transport without rounding.
///
/// Uses `f64` `Display`: the shortest decimal that round-trips, never in
/// exponent form. For currency-sized values this is the same text a JS
/// number prints; outside that range it differs (`1e21` prints as
/// `1000000000000000000000`, where JS gives `1e+21`).
pub fn format_amount(amount: f64) -> String {
    format!("{}", amount)
}

// ============ Portal Views ============

/// Read-only snapshot of the controller state, used for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub input_national_id: String,
    pub taxpayer: Option<TaxpayerRecord>,
    pub error_message: Option<String>,
    pub loading: bool,
    /// Set once a payment link was handed to the browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigated_to: Option<String>,
}

/// Form posted by the lookup control.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub dni: String,
}
