use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use soap_client::{
    build_command, parse_fault, unwrap_arguments, wrap_arguments, Argument, SoapCommand,
    SoapError, Transport, UreqTransport,
};
use tracing::{debug, warn};

use crate::error::{describe_error_code, Result, UpnpError};
use crate::service::ServiceIdentity;

/// Decoded result fields of a successful action, keyed by field name.
pub type SoapResult = HashMap<String, String>;

/// Media devices serve control and eventing on this fixed port.
const DEVICE_PORT: u16 = 1400;

/// One service endpoint on one device
///
/// A `Service` binds a [`ServiceIdentity`] to a device address and
/// dispatches remote actions to it. [`send_command`](Self::send_command)
/// is the explicit entry point; [`action`](Self::action) hands out cached
/// bound callables for action names that have no pre-declared wrapper.
///
/// Every invocation is a single blocking HTTP exchange; callers wanting
/// concurrency run their own threads. The only mutable state is the
/// action-binding cache, which is mutex-guarded so one instance may be
/// shared across threads.
pub struct Service {
    core: Arc<ServiceCore>,
    actions: Mutex<HashMap<String, Arc<BoundAction>>>,
}

struct ServiceCore {
    identity: ServiceIdentity,
    device_address: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Service {
    /// Create a service instance using the default `ureq` transport
    pub fn new(device_address: impl Into<String>, identity: ServiceIdentity) -> Self {
        Self::with_transport(device_address, identity, Arc::new(UreqTransport::new()))
    }

    /// Create a service instance with an injected transport
    ///
    /// The transport is the only collaborator the dispatcher consumes;
    /// swapping it out is how tests exercise the pipeline without a device.
    pub fn with_transport(
        device_address: impl Into<String>,
        identity: ServiceIdentity,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let device_address = device_address.into();
        let base_url = format!("http://{}:{}", device_address, DEVICE_PORT);
        Self {
            core: Arc::new(ServiceCore {
                identity,
                device_address,
                base_url,
                transport,
            }),
            actions: Mutex::new(HashMap::new()),
        }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.core.identity
    }

    pub fn device_address(&self) -> &str {
        &self.core.device_address
    }

    pub fn base_url(&self) -> &str {
        &self.core.base_url
    }

    /// Absolute URL of the control endpoint actions are POSTed to
    pub fn control_endpoint(&self) -> String {
        self.core.control_endpoint()
    }

    /// Build the headers and envelope body for an action without sending it
    pub fn build_command(&self, action: &str, args: &[Argument]) -> SoapCommand {
        build_command(
            &self.core.identity.service_uri(),
            action,
            &wrap_arguments(args),
        )
    }

    /// Invoke a named remote action and decode its result fields
    ///
    /// Arguments are serialized in the given order. A device-reported fault
    /// comes back as [`UpnpError::Fault`], a body that is neither a success
    /// envelope nor a fault as [`UpnpError::UnexpectedResponse`], and a
    /// failed HTTP exchange as [`UpnpError::Network`].
    pub fn send_command(&self, action: &str, args: &[Argument]) -> Result<SoapResult> {
        self.core.dispatch(action, args)
    }

    /// A bound callable for an arbitrary action name
    ///
    /// The binding is created on first access and cached for the lifetime
    /// of the instance; later lookups under the same name return the same
    /// `Arc`. Binding never touches the network, so an unknown action name
    /// only fails when it is actually called.
    pub fn action(&self, name: &str) -> Arc<BoundAction> {
        let mut actions = self
            .actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(actions.entry(name.to_string()).or_insert_with(|| {
            Arc::new(BoundAction {
                name: name.to_string(),
                core: Arc::clone(&self.core),
            })
        }))
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("identity", &self.core.identity)
            .field("base_url", &self.core.base_url)
            .finish()
    }
}

impl ServiceCore {
    fn control_endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.identity.control_url())
    }

    fn dispatch(&self, action: &str, args: &[Argument]) -> Result<SoapResult> {
        let command = build_command(&self.identity.service_uri(), action, &wrap_arguments(args));
        let url = self.control_endpoint();
        debug!(action, url = %url, "sending UPnP command");

        let response = self.transport.post(&url, &command.headers, &command.body)?;
        if response.is_success() {
            Ok(unwrap_arguments(&response.body)?)
        } else {
            Err(self.error_from_response(&response.body))
        }
    }

    /// Map a non-2xx response body to the matching error.
    ///
    /// The description for a fault comes from the standard code table,
    /// falling back to the device's own `<errorDescription>` for codes the
    /// table does not know. A fault with no `<errorCode>` keeps an empty
    /// code and falls back to `<faultstring>` for the description.
    fn error_from_response(&self, body: &str) -> UpnpError {
        match parse_fault(body) {
            Some(fault) => {
                let error_code = fault.error_code.unwrap_or_default();
                let error_description = describe_error_code(&error_code)
                    .map(str::to_string)
                    .or(fault.error_description)
                    .or_else(|| fault.faultstring.clone())
                    .unwrap_or_default();
                warn!(error_code = %error_code, device = %self.device_address, "device reported UPnP fault");
                UpnpError::Fault {
                    error_code,
                    error_description,
                    faultstring: fault.faultstring.unwrap_or_default(),
                    device_address: self.device_address.clone(),
                }
            }
            None => {
                SoapError::unexpected("non-success response was not a SOAP fault", body).into()
            }
        }
    }
}

/// A callable bound to one action name on one service instance
///
/// Obtained from [`Service::action`]. The binding holds everything needed
/// to dispatch, so it stays valid independently of the `Service` value it
/// came from.
pub struct BoundAction {
    name: String,
    core: Arc<ServiceCore>,
}

impl BoundAction {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the action with zero or one argument list
    ///
    /// An empty slice is the no-argument call; a single list is passed
    /// through to the action. Two or more lists is a contract violation
    /// and fails with [`UpnpError::Arity`] before anything is sent.
    pub fn call(&self, argument_lists: &[&[Argument]]) -> Result<SoapResult> {
        match argument_lists {
            [] => self.core.dispatch(&self.name, &[]),
            [args] => self.core.dispatch(&self.name, args),
            more => Err(UpnpError::Arity {
                action: self.name.clone(),
                given: more.len(),
            }),
        }
    }

    /// Call the action with one argument list
    pub fn invoke(&self, args: &[Argument]) -> Result<SoapResult> {
        self.core.dispatch(&self.name, args)
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAction")
            .field("name", &self.name)
            .field("service", &self.core.identity.service_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soap_client::HttpResponse;

    /// Transport that refuses every exchange, for tests that must not
    /// reach the network.
    struct RefusingTransport;

    impl Transport for RefusingTransport {
        fn post(
            &self,
            _url: &str,
            _headers: &[(String, String)],
            _body: &str,
        ) -> std::result::Result<HttpResponse, SoapError> {
            Err(SoapError::Transport("connection refused".to_string()))
        }
    }

    fn offline_service() -> Service {
        Service::with_transport(
            "192.168.1.101",
            ServiceIdentity::default(),
            Arc::new(RefusingTransport),
        )
    }

    #[test]
    fn test_instance_urls() {
        let service = offline_service();
        assert_eq!(service.base_url(), "http://192.168.1.101:1400");
        assert_eq!(
            service.control_endpoint(),
            "http://192.168.1.101:1400/Service/Control"
        );
        assert_eq!(service.device_address(), "192.168.1.101");
    }

    #[test]
    fn test_action_binding_is_cached() {
        let service = offline_service();
        let first = service.action("Testing");
        let second = service.action("Testing");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Testing");

        let other = service.action("Other");
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_arity_violation_fails_before_dispatch() {
        let service = offline_service();
        let action = service.action("Testing");
        let args = [Argument::new("a", 1)];
        // Two argument lists never reach the (refusing) transport.
        let err = action.call(&[&args, &args]).unwrap_err();
        match err {
            UpnpError::Arity { action, given } => {
                assert_eq!(action, "Testing");
                assert_eq!(given, 2);
            }
            other => panic!("expected Arity, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_failure_propagates() {
        let service = offline_service();
        let err = service.send_command("GetLEDState", &[]).unwrap_err();
        match err {
            UpnpError::Network(msg) => assert!(msg.contains("connection refused")),
            other => panic!("expected Network, got {:?}", other),
        }
    }

    #[test]
    fn test_build_command_uses_identity_uri() {
        let service = offline_service();
        let command = service.build_command("GetLEDState", &[]);
        assert!(command
            .body
            .contains(r#"<u:GetLEDState xmlns:u="urn:schemas-upnp-org:service:Service:1">"#));
        assert_eq!(
            command.headers[1].1,
            "urn:schemas-upnp-org:service:Service:1#GetLEDState"
        );
    }
}
