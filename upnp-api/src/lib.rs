//! Generic UPnP remote-action API for media-device control
//!
//! This crate exposes one named control endpoint on a device as a
//! [`Service`] whose remote actions are invoked by name with ordered
//! `(name, value)` arguments. The SOAP marshalling itself lives in the
//! private `soap-client` crate; this layer adds service identities,
//! dispatch, fault mapping, and dynamic action bindings.
//!
//! ```no_run
//! use upnp_api::{Argument, Service, ServiceIdentity};
//!
//! # fn main() -> upnp_api::Result<()> {
//! let transport = Service::new("192.168.1.101", ServiceIdentity::av_transport());
//!
//! // Explicit dispatch with typed errors:
//! let info = transport.send_command(
//!     "GetTransportInfo",
//!     &[Argument::new("InstanceID", 0)],
//! )?;
//! println!("state: {}", info["CurrentTransportState"]);
//!
//! // Or bind an arbitrary action name once and reuse it:
//! let play = transport.action("Play");
//! play.invoke(&[Argument::new("InstanceID", 0), Argument::new("Speed", 1)])?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod service;

pub use client::{BoundAction, Service, SoapResult};
pub use error::{describe_error_code, Result, UpnpError};
pub use service::ServiceIdentity;

// Callers build argument lists and custom transports against these types.
pub use soap_client::{Argument, HttpResponse, SoapCommand, Transport, UreqTransport};
