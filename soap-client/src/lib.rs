//! Private SOAP client for UPnP device communication
//!
//! This crate provides the low-level marshalling pipeline used to talk to
//! UPnP media devices: wrapping named arguments into an XML payload,
//! building the SOAP envelope and headers for an action, parsing response
//! and fault documents, and the pluggable HTTP transport that carries the
//! exchange. The higher-level `upnp-api` crate layers service identities
//! and dispatch on top of it.

mod error;

pub use error::SoapError;

use std::collections::HashMap;
use std::time::Duration;
use xmltree::{Element, XMLNode};

/// One named action argument, in caller-supplied order.
///
/// The value is coerced to its string form at construction so that callers
/// can pass integers, booleans, and so on directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    value: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Escape a value for embedding as XML element text.
///
/// `&` must be replaced first or the other replacements would be
/// double-escaped.
pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Serialize arguments into `<name>value</name>` pairs, preserving order.
///
/// Produces an XML fragment with no separators and no root element; the
/// caller embeds it into an action element. Some devices are sensitive to
/// argument order, so the input sequence is never re-sorted. An empty
/// input yields an empty string.
pub fn wrap_arguments(args: &[Argument]) -> String {
    let mut payload = String::new();
    for arg in args {
        payload.push('<');
        payload.push_str(&arg.name);
        payload.push('>');
        payload.push_str(&escape(&arg.value));
        payload.push_str("</");
        payload.push_str(&arg.name);
        payload.push('>');
    }
    payload
}

/// Extract the result fields from a SOAP response envelope.
///
/// Locates the single action-result element inside `Body` and maps each of
/// its children's local names to their text content (empty string for
/// empty elements). XML entities are decoded by the parser, so full
/// Unicode content round-trips.
pub fn unwrap_arguments(response: &str) -> Result<HashMap<String, String>, SoapError> {
    let envelope = Element::parse(response.as_bytes())
        .map_err(|e| SoapError::unexpected(&format!("invalid XML ({})", e), response))?;
    let body = envelope
        .get_child("Body")
        .ok_or_else(|| SoapError::unexpected("missing SOAP Body", response))?;
    let result = element_children(body)
        .next()
        .ok_or_else(|| SoapError::unexpected("empty SOAP Body", response))?;

    let mut values = HashMap::new();
    for field in element_children(result) {
        values.insert(field.name.clone(), text_of(field));
    }
    Ok(values)
}

/// The request half of one SOAP exchange: HTTP headers plus envelope body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapCommand {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Build the SOAP 1.1 envelope and HTTP headers for an action.
///
/// `payload` is the pre-escaped argument fragment from [`wrap_arguments`];
/// no escaping happens here, the envelope shape is independent of argument
/// content. The body is emitted without any inter-element whitespace
/// because some devices reject pretty-printed envelopes.
pub fn build_command(service_uri: &str, action: &str, payload: &str) -> SoapCommand {
    let body = format!(
        concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/""#,
            r#" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            "<s:Body>",
            r#"<u:{action} xmlns:u="{service_uri}">{payload}</u:{action}>"#,
            "</s:Body>",
            "</s:Envelope>"
        ),
        action = action,
        service_uri = service_uri,
        payload = payload,
    );
    let headers = vec![
        (
            "Content-Type".to_string(),
            r#"text/xml; charset="utf-8""#.to_string(),
        ),
        ("SOAPACTION".to_string(), format!("{}#{}", service_uri, action)),
    ];
    SoapCommand { headers, body }
}

/// Structured contents of a SOAP fault response.
///
/// `error_code` and `error_description` come from the UPnP
/// `<detail>/<UPnPError>` element when present; `faultstring` is the
/// generic SOAP-level description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    pub faultcode: Option<String>,
    pub faultstring: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

/// Parse a response body as a SOAP fault.
///
/// Returns `None` when the body is not well-formed XML or carries no
/// `Fault` element, so callers can fall through to their
/// unexpected-response handling.
pub fn parse_fault(response: &str) -> Option<SoapFault> {
    let envelope = Element::parse(response.as_bytes()).ok()?;
    let fault = envelope.get_child("Body")?.get_child("Fault")?;
    let upnp_error = fault
        .get_child("detail")
        .and_then(|detail| detail.get_child("UPnPError"));
    Some(SoapFault {
        faultcode: child_text(fault, "faultcode"),
        faultstring: child_text(fault, "faultstring"),
        error_code: upnp_error
            .and_then(|e| child_text(e, "errorCode"))
            .map(|code| code.trim().to_string()),
        error_description: upnp_error.and_then(|e| child_text(e, "errorDescription")),
    })
}

fn element_children(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|node| match node {
        XMLNode::Element(el) => Some(el),
        _ => None,
    })
}

fn text_of(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    parent.get_child(name).map(text_of)
}

/// A raw HTTP response as seen by the SOAP layer.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator performing the actual POST exchange.
///
/// Implementations must hand back the body even for non-2xx statuses,
/// since UPnP devices report faults over HTTP 500. Only genuine transport
/// failures (refused connection, timeout, DNS) map to
/// [`SoapError::Transport`].
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<HttpResponse, SoapError>;
}

/// Default [`Transport`] backed by a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with default timeouts.
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a transport with explicit connect/read timeouts.
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<HttpResponse, SoapError> {
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        match request.send_string(body) {
            Ok(response) => read_response(response),
            // Status errors still carry the fault body we need.
            Err(ureq::Error::Status(_, response)) => read_response(response),
            Err(e) => Err(SoapError::Transport(e.to_string())),
        }
    }
}

fn read_response(response: ureq::Response) -> Result<HttpResponse, SoapError> {
    let status = response.status();
    let body = response
        .into_string()
        .map_err(|e| SoapError::Transport(e.to_string()))?;
    Ok(HttpResponse { status, body })
}
