//! Lookup-and-Pay controller.
//!
//! [`InteractionState`] is the portal's whole view state plus the named
//! transitions between `Idle` and `Loading`. It does no I/O and can be driven
//! directly in tests. [`LookupPayController`] pairs that state with a
//! [`PortalClient`] and runs the two operations end to end.
//!
//! At most one operation is in flight per controller. Starting a second one
//! while the first is pending is rejected with [`PortalError::Busy`] and
//! leaves the state untouched.

use crate::errors::PortalError;
use crate::models::{PaymentRequest, PaymentResponse, TaxpayerRecord, ViewState};
use crate::portal_client::PortalClient;
use axum::http::HeaderValue;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Which operation an [`OperationToken`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Payment,
}

/// Proof that an operation was started. Completing requires the token of the
/// operation currently in flight; stale tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationToken {
    id: u64,
    operation: Operation,
}

impl OperationToken {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// A started payment: the token plus the parameters taken from the record.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPayment {
    pub token: OperationToken,
    pub request: PaymentRequest,
}

/// View state owned by the controller.
#[derive(Debug, Default)]
pub struct InteractionState {
    input_national_id: String,
    taxpayer: Option<TaxpayerRecord>,
    error_message: Option<String>,
    in_flight: Option<OperationToken>,
    navigated_to: Option<String>,
    next_token: u64,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> ViewState {
        ViewState {
            input_national_id: self.input_national_id.clone(),
            taxpayer: self.taxpayer.clone(),
            error_message: self.error_message.clone(),
            loading: self.is_loading(),
            navigated_to: self.navigated_to.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn taxpayer(&self) -> Option<&TaxpayerRecord> {
        self.taxpayer.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn input_national_id(&self) -> &str {
        &self.input_national_id
    }

    /// Mirrors the ID input. Allowed at any time, including while loading.
    pub fn set_input(&mut self, national_id: impl Into<String>) {
        self.input_national_id = national_id.into();
    }

    fn issue(&mut self, operation: Operation) -> OperationToken {
        self.next_token += 1;
        let token = OperationToken {
            id: self.next_token,
            operation,
        };
        self.in_flight = Some(token);
        token
    }

    fn finish(&mut self, token: OperationToken) -> bool {
        if self.in_flight != Some(token) {
            tracing::warn!("Ignoring completion of stale operation {:?}", token);
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Enters `Loading` for a lookup and clears the record and error.
    pub fn start_lookup(&mut self) -> Result<OperationToken, PortalError> {
        if self.is_loading() {
            return Err(PortalError::Busy);
        }
        self.error_message = None;
        self.taxpayer = None;
        self.navigated_to = None;
        Ok(self.issue(Operation::Lookup))
    }

    /// Stores the record on success, the fixed lookup message on failure.
    pub fn complete_lookup(
        &mut self,
        token: OperationToken,
        result: Result<TaxpayerRecord, PortalError>,
    ) {
        if token.operation != Operation::Lookup || !self.finish(token) {
            return;
        }
        match result {
            Ok(record) => self.taxpayer = Some(record),
            Err(e) => {
                self.taxpayer = None;
                self.error_message = Some(e.user_message().to_string());
            }
        }
    }

    /// Enters `Loading` for a payment.
    ///
    /// Returns `Ok(None)` without touching anything when no record is
    /// loaded, regardless of whether another operation is pending.
    pub fn start_payment(&mut self) -> Result<Option<PendingPayment>, PortalError> {
        let Some(record) = self.taxpayer.as_ref() else {
            return Ok(None);
        };
        if self.is_loading() {
            return Err(PortalError::Busy);
        }
        let request = PaymentRequest::for_record(record);
        self.error_message = None;
        self.navigated_to = None;
        let token = self.issue(Operation::Payment);
        Ok(Some(PendingPayment { token, request }))
    }

    /// Resolves a payment. Returns the link to navigate to, if any.
    pub fn complete_payment(
        &mut self,
        token: OperationToken,
        result: Result<PaymentResponse, PortalError>,
    ) -> Option<String> {
        if token.operation != Operation::Payment || !self.finish(token) {
            return None;
        }
        let outcome = result.and_then(|response| {
            response
                .payment_link
                .filter(|link| is_navigable(link))
                .ok_or(PortalError::PaymentLinkMissing)
        });
        match outcome {
            Ok(link) => {
                self.navigated_to = Some(link.clone());
                Some(link)
            }
            Err(e) => {
                self.error_message = Some(e.user_message().to_string());
                None
            }
        }
    }
}

/// A link is only handed to the browser if it is an absolute URL that can
/// travel in a `Location` header as-is.
fn is_navigable(link: &str) -> bool {
    if HeaderValue::try_from(link).is_err() {
        tracing::warn!("Payment link is not a valid header value: {:?}", link);
        return false;
    }
    match Url::parse(link) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Payment link {:?} is not a URL: {}", link, e);
            false
        }
    }
}

/// Result of [`LookupPayController::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found,
    Failed,
    /// Another operation was in flight; nothing changed.
    Rejected,
}

/// Result of [`LookupPayController::initiate_payment`].
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Hand the browser over to this checkout URL.
    Navigate(String),
    Failed,
    /// No record loaded; no request was made.
    Skipped,
    /// Another operation was in flight; nothing changed.
    Rejected,
}

/// Owns the interaction state and sequences the two collaborator calls.
///
/// The state lock is only held between awaits, so readers always see the
/// `Loading` phase while a request is pending.
pub struct LookupPayController {
    client: PortalClient,
    state: Mutex<InteractionState>,
}

impl LookupPayController {
    pub fn new(client: PortalClient) -> Self {
        Self {
            client,
            state: Mutex::new(InteractionState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, InteractionState> {
        // Transitions are plain field assignments, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn view(&self) -> ViewState {
        self.state().view()
    }

    pub fn set_input(&self, national_id: impl Into<String>) {
        self.state().set_input(national_id);
    }

    /// Looks up `national_id` and records the outcome in the state.
    pub async fn lookup(&self, national_id: &str) -> LookupOutcome {
        let started = self.state().start_lookup();
        let token = match started {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Lookup for {} rejected: {}", national_id, e);
                return LookupOutcome::Rejected;
            }
        };

        let result = self.client.fetch_taxpayer(national_id).await;
        let outcome = match &result {
            Ok(record) => {
                tracing::info!("✓ Taxpayer {} found", record.national_id);
                LookupOutcome::Found
            }
            Err(e) => {
                tracing::warn!("{}", e);
                LookupOutcome::Failed
            }
        };

        self.state().complete_lookup(token, result);
        outcome
    }

    /// Initiates payment for the loaded record.
    pub async fn initiate_payment(&self) -> PaymentOutcome {
        let started = self.state().start_payment();
        let pending = match started {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                tracing::debug!("Payment requested with no taxpayer loaded");
                return PaymentOutcome::Skipped;
            }
            Err(e) => {
                tracing::warn!("Payment rejected: {}", e);
                return PaymentOutcome::Rejected;
            }
        };

        let result = self.client.initiate_payment(&pending.request).await;
        if let Err(e) = &result {
            tracing::warn!("{}", e);
        }

        let link = self.state().complete_payment(pending.token, result);
        match link {
            Some(link) => {
                tracing::info!(
                    "✓ Redirecting {} to payment processor",
                    pending.request.national_id
                );
                PaymentOutcome::Navigate(link)
            }
            None => PaymentOutcome::Failed,
        }
    }
}
