/// Identity of one UPnP control endpoint on a device
///
/// The identity fixes the service type and protocol version and derives the
/// paths where the device exposes the service: the control endpoint for
/// SOAP actions, the event endpoint for subscriptions, and the SCPD
/// document describing the service. It is static configuration, built once
/// and shared by every instance that talks to that kind of service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    service_type: String,
    version: u32,
    service_id: String,
    path_prefix: Option<String>,
}

impl ServiceIdentity {
    /// Create an identity for a service type and version
    ///
    /// The service id defaults to the service type; override it with
    /// [`with_service_id`](Self::with_service_id) where a device uses a
    /// different id.
    pub fn new(service_type: impl Into<String>, version: u32) -> Self {
        let service_type = service_type.into();
        Self {
            service_id: service_type.clone(),
            service_type,
            version,
            path_prefix: None,
        }
    }

    /// Override the service id
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }

    /// Nest the control and event paths under a device sub-tree
    ///
    /// Media devices expose renderer and server services under
    /// `MediaRenderer`/`MediaServer` rather than at the device root. The
    /// SCPD path is not affected.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// DeviceProperties:1 - LED state, zone attributes and the like
    pub fn device_properties() -> Self {
        Self::new("DeviceProperties", 1)
    }

    /// AVTransport:1 - playback transport control
    pub fn av_transport() -> Self {
        Self::new("AVTransport", 1).with_path_prefix("MediaRenderer")
    }

    /// RenderingControl:1 - volume, mute, EQ
    pub fn rendering_control() -> Self {
        Self::new("RenderingControl", 1).with_path_prefix("MediaRenderer")
    }

    /// ContentDirectory:1 - media-library browsing
    pub fn content_directory() -> Self {
        Self::new("ContentDirectory", 1).with_path_prefix("MediaServer")
    }

    /// ZoneGroupTopology:1 - device grouping
    pub fn zone_group_topology() -> Self {
        Self::new("ZoneGroupTopology", 1)
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// The URN used in the envelope namespace and SOAPACTION header
    pub fn service_uri(&self) -> String {
        format!(
            "urn:schemas-upnp-org:service:{}:{}",
            self.service_type, self.version
        )
    }

    /// Path of the control endpoint, relative to the device base URL
    pub fn control_url(&self) -> String {
        self.endpoint_path("Control")
    }

    /// Path of the event-subscription endpoint
    pub fn event_url(&self) -> String {
        self.endpoint_path("Event")
    }

    /// Path of the service description document
    pub fn scpd_url(&self) -> String {
        format!("/xml/{}{}.xml", self.service_type, self.version)
    }

    fn endpoint_path(&self, leaf: &str) -> String {
        match &self.path_prefix {
            Some(prefix) => format!("/{}/{}/{}", prefix, self.service_type, leaf),
            None => format!("/{}/{}", self.service_type, leaf),
        }
    }
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self::new("Service", 1)
    }
}
