use std::net::SocketAddr;
use std::time::Duration;

use pprovider::{
    CancellationToken, Device, DeviceBroadcaster, HttpDeviceBroadcaster, ProviderError,
    ProviderErrorKind,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn device_for(address: &SocketAddr) -> Device {
    Device::new(address.ip().to_string(), address.port())
}

async fn device_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/message"))
        .and(body_json(json!({"message": "lights off"})))
        .respond_with(template)
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn failing_devices_do_not_stop_the_others() {
    let healthy = device_replying(
        ResponseTemplate::new(200).set_body_json(json!({"reply": "kitchen: done"})),
    )
    .await;
    let broken = device_replying(ResponseTemplate::new(500).set_body_string("boom")).await;
    let plain = device_replying(ResponseTemplate::new(200).set_body_string("hallway: ok\n")).await;

    let devices = vec![
        device_for(healthy.address()),
        device_for(broken.address()),
        Device::new("127.0.0.1", 9),
        device_for(plain.address()),
    ];
    let broadcaster = HttpDeviceBroadcaster::new(reqwest::Client::new(), devices.clone());

    let report = broadcaster
        .broadcast("lights off", CancellationToken::new())
        .await
        .expect("broadcast itself never fails on device errors");

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(report.answer(), "kitchen: done\nhallway: ok");

    let failed = report
        .failures()
        .map(|(device, err)| (device.clone(), err.kind()))
        .collect::<Vec<_>>();
    assert_eq!(
        failed,
        vec![
            (devices[1].clone(), ProviderErrorKind::Transport),
            (devices[2].clone(), ProviderErrorKind::Transport),
        ]
    );
}

#[tokio::test]
async fn zero_successes_is_an_empty_answer() {
    let broken = device_replying(ResponseTemplate::new(503)).await;
    let broadcaster =
        HttpDeviceBroadcaster::new(reqwest::Client::new(), vec![device_for(broken.address())]);

    let report = broadcaster
        .broadcast("lights off", CancellationToken::new())
        .await
        .expect("report");

    assert_eq!(report.answer(), "");
    assert_eq!(report.successes().count(), 0);
}

#[tokio::test]
async fn no_devices_means_an_empty_report() {
    let broadcaster = HttpDeviceBroadcaster::new(reqwest::Client::new(), Vec::new());

    let report = broadcaster
        .broadcast("anyone?", CancellationToken::new())
        .await
        .expect("report");

    assert!(report.outcomes.is_empty());
    assert_eq!(report.answer(), "");
}

#[tokio::test]
async fn cancellation_abandons_the_fan_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let broadcaster =
        HttpDeviceBroadcaster::new(reqwest::Client::new(), vec![device_for(server.address())]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = broadcaster
        .broadcast("lights off", cancel)
        .await
        .expect_err("already cancelled");

    assert_eq!(err, ProviderError::Cancelled);
}
