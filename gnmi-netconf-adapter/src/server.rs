//! The gNMI service and server startup.

use std::sync::Arc;
use std::time::SystemTime;

use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tonic::{Request, Response, Status};
use tracing::{debug, info, trace};

use adapter_netconf::DeviceSession;

use crate::config::ServerConfig;
use crate::gnmi::g_nmi_server::{GNmi, GNmiServer};
use crate::gnmi::{
    CapabilityRequest, CapabilityResponse, Encoding, GetRequest, GetResponse, SetRequest,
    SetResponse, SubscribeRequest, SubscribeResponse,
};
use crate::model::Model;

/// gNMI service version reported by Capabilities. Kept in sync with the
/// `gnmi_service` file option of the vendored proto.
pub const GNMI_VERSION: &str = "0.8.2";

/// The encodings the adapter can serve; a process-wide constant.
pub(crate) const SUPPORTED_ENCODINGS: &[Encoding] = &[Encoding::Json];

/// The gNMI server facade over a single NETCONF device.
///
/// Holds the immutable model and the shared device session; every request
/// works on its own buffers, so the adapter itself needs no locking.
pub struct Adapter {
    pub(crate) model: Arc<Model>,
    pub(crate) session: Arc<dyn DeviceSession>,
}

impl Adapter {
    pub fn new(model: Arc<Model>, session: Arc<dyn DeviceSession>) -> Self {
        Self { model, session }
    }

    /// Build the Capabilities response: advertised models, supported
    /// encodings and the gNMI service version.
    pub fn capability_response(&self) -> CapabilityResponse {
        CapabilityResponse {
            supported_models: self.model.model_data().to_vec(),
            supported_encodings: SUPPORTED_ENCODINGS.iter().map(|e| *e as i32).collect(),
            g_nmi_version: GNMI_VERSION.to_string(),
            extension: Vec::new(),
        }
    }
}

/// Nanoseconds since the Unix epoch, for notification timestamps.
pub(crate) fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("system time before UNIX epoch")
        .as_nanos() as i64
}

#[tonic::async_trait]
impl GNmi for Adapter {
    type SubscribeStream = ReceiverStream<Result<SubscribeResponse, Status>>;

    async fn capabilities(
        &self,
        request: Request<CapabilityRequest>,
    ) -> Result<Response<CapabilityResponse>, Status> {
        debug!("received Capabilities() request");
        trace!(request = ?request.get_ref());
        Ok(Response::new(self.capability_response()))
    }

    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let request = request.into_inner();
        debug!("received Get() request");
        trace!(?request);
        let response = self.handle_get(request).await?;
        Ok(Response::new(response))
    }

    async fn set(&self, request: Request<SetRequest>) -> Result<Response<SetResponse>, Status> {
        let request = request.into_inner();
        debug!("received Set() request");
        trace!(?request);
        let response = self.handle_set(request).await?;
        Ok(Response::new(response))
    }

    async fn subscribe(
        &self,
        _request: Request<tonic::Streaming<SubscribeRequest>>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        Err(Status::unimplemented("Subscribe is not supported"))
    }
}

/// Serve the gNMI service on the configured address, with mutual TLS when
/// enabled.
pub async fn serve(adapter: Adapter, config: &ServerConfig) -> anyhow::Result<()> {
    let address = config.address.parse()?;

    let mut server = Server::builder();
    if config.tls.enabled {
        let certificate = config
            .tls
            .certificate
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("TLS enabled but no certificate configured"))?;
        let key = config
            .tls
            .key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("TLS enabled but no key configured"))?;
        let cert = tokio::fs::read(certificate).await?;
        let key = tokio::fs::read(key).await?;
        let mut tls = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));
        if let Some(ca) = &config.tls.ca_certificate {
            let ca = tokio::fs::read(ca).await?;
            tls = tls.client_ca_root(Certificate::from_pem(ca));
        }
        server = server.tls_config(tls)?;
    }

    info!(%address, "gNMI adapter listening");
    server
        .add_service(GNmiServer::new(adapter))
        .serve(address)
        .await?;
    Ok(())
}
