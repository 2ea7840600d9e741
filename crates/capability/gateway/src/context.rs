//! 各组件共享的网关上下文

use crate::error::GatewayError;
use serde::Serialize;
use smaas_control::DevicePublisher;
use smaas_protocol::{Channel, DEFAULT_MAX_PAYLOAD_BYTES, TopicLayout, WireCodec};
use smaas_storage::RecordStore;
use smaas_telemetry::record_publish_failure;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 网关运行参数。
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub root_topic: String,
    pub max_payload_bytes: usize,
    /// 配置快照发布到 `config/<kind>` 而不是 `config`
    pub per_kind_config_topics: bool,
    pub resync_delay: Duration,
    pub resync_page_size: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            root_topic: "arduino".to_string(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            per_kind_config_topics: false,
            resync_delay: Duration::from_millis(50),
            resync_page_size: 32,
        }
    }
}

/// 存储、发布器与编解码器。
pub struct GatewayContext {
    pub store: Arc<dyn RecordStore>,
    pub publisher: Arc<dyn DevicePublisher>,
    pub codec: WireCodec,
    pub layout: TopicLayout,
}

impl GatewayContext {
    pub fn new(
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn DevicePublisher>,
        settings: &GatewaySettings,
    ) -> Self {
        Self {
            store,
            publisher,
            codec: WireCodec::new(settings.max_payload_bytes),
            layout: TopicLayout::new(settings.root_topic.clone()),
        }
    }

    /// 编码并发布到设备的某个通道。
    pub async fn publish<T: Serialize + Sync>(
        &self,
        device_id: &str,
        channel: Channel,
        message: &T,
    ) -> Result<(), GatewayError> {
        let payload = self.codec.encode(message)?;
        let topic = self.layout.topic(device_id, channel);
        let payload_size = payload.len();
        if let Err(err) = self.publisher.publish(&topic, payload).await {
            record_publish_failure();
            warn!(target: "smaas.gateway", topic = %topic, error = %err, "device_publish_failed");
            return Err(err.into());
        }
        debug!(target: "smaas.gateway", topic = %topic, payload_size, "device_published");
        Ok(())
    }
}
