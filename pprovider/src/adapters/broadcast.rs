//! Local-broadcast backend: fan a message out to every configured device.
//!
//! Each device receives `POST http://<host>:<port>/message` with body
//! `{"message": ...}`. Devices are contacted concurrently and a failing device
//! never stops the others.
//!
//! ```rust
//! use pprovider::Device;
//!
//! let device: Device = "10.0.0.7:8080".parse().expect("valid device");
//! assert_eq!(device.endpoint(), "http://10.0.0.7:8080/message");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::Client;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::{BackendKind, NoopTransportHooks, ProviderError, ProviderFuture, TransportHooks};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    pub host: String,
    pub port: u16,
}

impl Device {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/message", self.host, self.port)
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Device {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (host, port) = value.rsplit_once(':').ok_or_else(|| {
            ProviderError::invalid_request(format!("device '{value}' must be host:port"))
        })?;

        if host.is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "device '{value}' is missing a host"
            )));
        }

        let port = port.parse::<u16>().map_err(|_| {
            ProviderError::invalid_request(format!("device '{value}' has an invalid port"))
        })?;

        Ok(Self::new(host, port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub device: Device,
    pub result: Result<String, ProviderError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    pub outcomes: Vec<DeviceOutcome>,
}

impl BroadcastReport {
    pub fn successes(&self) -> impl Iterator<Item = (&Device, &str)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(reply) => Some((&outcome.device, reply.as_str())),
            Err(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Device, &ProviderError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((&outcome.device, err)),
        })
    }

    /// Non-empty successful replies joined with newlines, in device order.
    /// Empty when no device answered.
    pub fn answer(&self) -> String {
        self.successes()
            .map(|(_, reply)| reply)
            .filter(|reply| !reply.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub trait DeviceBroadcaster: Send + Sync {
    fn broadcast<'a>(
        &'a self,
        message: &'a str,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<BroadcastReport, ProviderError>>;
}

#[derive(Clone)]
pub struct HttpDeviceBroadcaster {
    client: Client,
    devices: Vec<Device>,
    hooks: Arc<dyn TransportHooks>,
}

impl HttpDeviceBroadcaster {
    pub fn new(client: Client, devices: Vec<Device>) -> Self {
        Self {
            client,
            devices,
            hooks: Arc::new(NoopTransportHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TransportHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    async fn send(&self, device: &Device, message: &str) -> Result<String, ProviderError> {
        let selector = BackendKind::LocalBroadcast.selector();
        let response = self
            .client
            .post(device.endpoint())
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|err| ProviderError::transport(selector, format!("device {device}: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::transport(selector, format!("device {device}: {err}")))?;

        if !status.is_success() {
            return Err(ProviderError::http_status(
                selector,
                status.as_u16(),
                format!("device {device} returned status {status}"),
                (!body.is_empty()).then_some(body),
            ));
        }

        Ok(reply_text(&body))
    }
}

impl DeviceBroadcaster for HttpDeviceBroadcaster {
    fn broadcast<'a>(
        &'a self,
        message: &'a str,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<BroadcastReport, ProviderError>> {
        Box::pin(async move {
            let sends = self.devices.iter().map(|device| async move {
                DeviceOutcome {
                    device: device.clone(),
                    result: self.send(device, message).await,
                }
            });

            let outcomes = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                outcomes = join_all(sends) => outcomes,
            };

            for outcome in &outcomes {
                if let Err(err) = &outcome.result {
                    self.hooks.on_device_failure(&outcome.device, err);
                }
            }

            Ok(BroadcastReport { outcomes })
        })
    }
}

/// A device may answer with `{"reply": ...}`, `{"message": ...}` or plain text.
fn reply_text(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["reply", "message"] {
            if let Some(Value::String(text)) = fields.get(key) {
                return text.trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn device_parsing_requires_host_and_port() {
        assert_eq!(
            " localhost:9000 ".parse::<Device>().expect("valid"),
            Device::new("localhost", 9000)
        );

        for bad in ["localhost", ":9000", "host:port", "host:70000"] {
            let err = bad.parse::<Device>().expect_err("invalid device");
            assert_eq!(err.kind(), ProviderErrorKind::InvalidRequest, "{bad}");
        }
    }

    #[test]
    fn reply_text_prefers_json_fields() {
        assert_eq!(reply_text("{\"reply\":\"hi there\"}"), "hi there");
        assert_eq!(reply_text("{\"message\":\"queued\"}"), "queued");
        assert_eq!(reply_text("  plain ack \n"), "plain ack");
        assert_eq!(reply_text("{\"status\":1}"), "{\"status\":1}");
    }

    #[test]
    fn answer_joins_successes_only() {
        let report = BroadcastReport {
            outcomes: vec![
                DeviceOutcome {
                    device: Device::new("a", 1),
                    result: Ok("first".to_string()),
                },
                DeviceOutcome {
                    device: Device::new("b", 2),
                    result: Err(ProviderError::transport("local", "refused")),
                },
                DeviceOutcome {
                    device: Device::new("c", 3),
                    result: Ok("third".to_string()),
                },
            ],
        };

        assert_eq!(report.answer(), "first\nthird");
        assert_eq!(report.failures().count(), 1);
        assert_eq!(BroadcastReport::default().answer(), "");
    }
}
