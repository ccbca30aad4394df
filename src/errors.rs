use std::fmt;

/// Displayed when a taxpayer lookup fails for any reason.
pub const LOOKUP_FAILED_MESSAGE: &str = "taxpayer not found or server error";
/// Displayed when the payment-initiation call fails.
pub const PAYMENT_FAILED_MESSAGE: &str = "error initiating payment";
/// Displayed when payment initiation succeeds without a redirect URL.
pub const PAYMENT_LINK_MISSING_MESSAGE: &str = "no payment link received from the processor";
/// Displayed when another operation is already in flight.
pub const BUSY_MESSAGE: &str = "another request is already in progress";

/// Portal error types.
///
/// The `String` payloads carry diagnostic detail for the logs. What the
/// user sees is always the fixed text from [`PortalError::user_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum PortalError {
    /// Non-OK status, transport error or undecodable payload during lookup.
    LookupFailed(String),
    /// Non-OK status or transport error during payment initiation.
    PaymentInitiationFailed(String),
    /// Payment initiation succeeded but carried no `payment_link`.
    PaymentLinkMissing,
    /// An operation is already in flight on this controller.
    Busy,
    /// The HTTP client could not be built. Only raised at start-up, before
    /// any page is served.
    ClientSetup(String),
}

impl PortalError {
    /// Fixed, human-readable message shown in the portal page.
    pub fn user_message(&self) -> &'static str {
        match self {
            PortalError::LookupFailed(_) => LOOKUP_FAILED_MESSAGE,
            PortalError::PaymentInitiationFailed(_) => PAYMENT_FAILED_MESSAGE,
            PortalError::PaymentLinkMissing => PAYMENT_LINK_MISSING_MESSAGE,
            PortalError::Busy => BUSY_MESSAGE,
            PortalError::ClientSetup(_) => "portal misconfigured",
        }
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::LookupFailed(msg) => write!(f, "Lookup failed: {}", msg),
            PortalError::PaymentInitiationFailed(msg) => {
                write!(f, "Payment initiation failed: {}", msg)
            }
            PortalError::PaymentLinkMissing => write!(f, "Payment link missing from response"),
            PortalError::Busy => write!(f, "Operation already in flight"),
            PortalError::ClientSetup(msg) => write!(f, "Client setup error: {}", msg),
        }
    }
}

impl std::error::Error for PortalError {}

impl From<reqwest::Error> for PortalError {
    /// Transport errors surface as setup errors unless the caller maps them
    /// to the operation they belong to.
    fn from(err: reqwest::Error) -> Self {
        PortalError::ClientSetup(err.to_string())
    }
}
