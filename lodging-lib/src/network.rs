//! Classification of requests that received no response.

use crate::error::NetworkError;
use crate::error::NetworkFailure;
use crate::error::TransportError;
use crate::transport::Transport;

/// Classifies a request that received no response.
///
/// Probes `url` without credentials. A certificate complaint from either the
/// original failure or the probe means [`NetworkFailure::Tls`]; a probe that
/// gets through means the response was withheld by a CORS policy; anything
/// else means the service is unreachable.
pub async fn classify_network_failure(
    transport: &dyn Transport,
    url: &str,
    origin: &str,
    error: &TransportError,
) -> NetworkError {
    if error.is_certificate_error() {
        return NetworkError::new(NetworkFailure::Tls, url, &error.message);
    }

    let failure = match transport.probe(url).await {
        Ok(()) => NetworkFailure::Cors {
            origin: origin.to_string(),
        },
        Err(probe_err) if probe_err.is_certificate_error() => NetworkFailure::Tls,
        Err(probe_err) => {
            log::debug!("reachability probe for {} failed: {}", url, probe_err);
            NetworkFailure::Unreachable
        }
    };

    NetworkError::new(failure, url, &error.message)
}
