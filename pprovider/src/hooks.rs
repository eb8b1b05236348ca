//! Lifecycle hooks for backend and device requests.

use std::time::Duration;

use crate::{BackendKind, Device, ProviderError};

pub trait TransportHooks: Send + Sync {
    fn on_request_start(&self, _backend: BackendKind, _model: &str, _streaming: bool) {}

    fn on_request_success(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _elapsed: Duration,
    ) {
    }

    fn on_request_failure(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
    }

    fn on_device_failure(&self, _device: &Device, _error: &ProviderError) {}
}

#[derive(Debug, Default)]
pub struct NoopTransportHooks;

impl TransportHooks for NoopTransportHooks {}
