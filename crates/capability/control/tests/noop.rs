use smaas_control::{DevicePublisher, NoopPublisher};

#[tokio::test]
async fn noop_publisher_accepts_everything() {
    let publisher = NoopPublisher;
    publisher
        .publish("arduino/dev-1/relay", vec![1, 1, 0])
        .await
        .expect("publish");
}
