#![allow(dead_code)]

use async_trait::async_trait;
use domain::InboundMessage;
use serde::Serialize;
use serde::de::DeserializeOwned;
use smaas_control::{DevicePublisher, PublishError};
use smaas_gateway::{Gateway, GatewaySettings, TopicRouter};
use smaas_ingest::MessageHandler;
use smaas_protocol::WireCodec;
use smaas_storage::{
    DeviceRecord, DeviceStore, InMemoryRecordStore, RecordEvents, RecordKind, RecordObserver,
    RecordSnapshot, StorageError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 记录所有下行报文的发布器。
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().expect("sent").clone()
    }

    pub fn on(&self, topic: &str) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter(|(sent_topic, _)| sent_topic == topic)
            .map(|(_, payload)| payload)
            .collect()
    }

    pub fn decoded<T: DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.on(topic)
            .iter()
            .map(|payload| WireCodec::default().decode(payload).expect("decode"))
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().expect("sent").clear();
    }
}

#[async_trait]
impl DevicePublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.sent
            .lock()
            .expect("sent")
            .push((topic.to_string(), payload));
        Ok(())
    }
}

/// 在 before_delete 阶段让出执行权，使并发删除交错执行。
pub struct StallOnDelete {
    yields: usize,
}

#[async_trait]
impl RecordObserver for StallOnDelete {
    fn name(&self) -> &'static str {
        "stall_on_delete"
    }

    fn kinds(&self) -> &'static [RecordKind] {
        &[RecordKind::SensorConfig, RecordKind::Credential]
    }

    async fn on_before_delete(&self, _record: &RecordSnapshot) -> Result<(), StorageError> {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<InMemoryRecordStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub gateway: Gateway,
    pub router: TopicRouter,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_settings(GatewaySettings {
            resync_delay: Duration::ZERO,
            ..Default::default()
        })
        .await
    }

    pub async fn with_settings(settings: GatewaySettings) -> Self {
        let store = Arc::new(InMemoryRecordStore::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let gateway = Gateway::new(store.clone(), publisher.clone(), settings);
        gateway.register_hooks();
        let router = gateway.router();
        let harness = Self {
            store,
            publisher,
            gateway,
            router,
        };
        harness.add_device("dev-1").await;
        harness
    }

    pub async fn add_device(&self, device_id: &str) {
        self.store
            .create_device(DeviceRecord {
                device_id: device_id.to_string(),
                account_id: "account-1".to_string(),
                name: format!("board {}", device_id),
                status: "online".to_string(),
            })
            .await
            .expect("device");
    }

    pub fn stall_deletes(&self, yields: usize) {
        self.store.subscribe(Arc::new(StallOnDelete { yields }));
    }

    /// 模拟一条设备上行消息。
    pub async fn inbound(&self, topic: &str, payload: Vec<u8>) {
        self.router
            .handle(InboundMessage::new(topic, payload, 1_700_000_000_000))
            .await
            .expect("router never fails");
    }

    pub async fn inbound_message<T: Serialize>(&self, topic: &str, message: &T) {
        let payload = WireCodec::default().encode(message).expect("encode");
        self.inbound(topic, payload).await;
    }
}
