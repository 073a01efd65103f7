use soap_client::SoapError;
use thiserror::Error;

/// Errors surfaced by the remote-action dispatcher
///
/// Faults reported by the device, malformed responses, and transport
/// failures are all distinct variants so that callers can decide what is
/// retryable. Nothing is swallowed: every failure of an exchange comes
/// back through this type.
#[derive(Debug, Error)]
pub enum UpnpError {
    /// The device reported a structured UPnP fault
    #[error("UPnP Error {error_code} received: {error_description} from {device_address}")]
    Fault {
        /// Numeric code from `<errorCode>`, empty when the fault carried none
        error_code: String,
        /// Human-readable description (standard table, else the device's own text)
        error_description: String,
        /// The SOAP-level `<faultstring>`
        faultstring: String,
        /// Address of the device that produced the fault
        device_address: String,
    },

    /// The response was valid HTTP but neither a success envelope nor a fault
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The HTTP exchange itself failed (refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// A dynamically bound action was called with too many argument lists
    #[error("action '{action}' takes zero or one argument list, {given} given")]
    Arity { action: String, given: usize },
}

impl UpnpError {
    /// The UPnP error code, for `Fault` errors
    pub fn error_code(&self) -> Option<&str> {
        match self {
            UpnpError::Fault { error_code, .. } => Some(error_code),
            _ => None,
        }
    }
}

/// Type alias for results that can return an UpnpError
pub type Result<T> = std::result::Result<T, UpnpError>;

impl From<SoapError> for UpnpError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Transport(msg) => UpnpError::Network(msg),
            SoapError::UnexpectedResponse(msg) => UpnpError::UnexpectedResponse(msg),
        }
    }
}

/// Description for a standard UPnP error code, per the UPnP device
/// architecture plus the control-protocol additions (600 range).
pub fn describe_error_code(code: &str) -> Option<&'static str> {
    Some(match code {
        "400" => "Bad Request",
        "401" => "Invalid Action",
        "402" => "Invalid Args",
        "404" => "Invalid Var",
        "412" => "Precondition Failed",
        "501" => "Action Failed",
        "600" => "Argument Value Invalid",
        "601" => "Argument Value Out of Range",
        "602" => "Optional Action Not Implemented",
        "603" => "Out Of Memory",
        "604" => "Human Intervention Required",
        "605" => "String Argument Too Long",
        "606" => "Action Not Authorized",
        "607" => "Signature Failure",
        "608" => "Signature Missing",
        "609" => "Not Encrypted",
        "610" => "Invalid Sequence",
        "611" => "Invalid Control URL",
        "612" => "No Such Session",
        _ => return None,
    })
}
