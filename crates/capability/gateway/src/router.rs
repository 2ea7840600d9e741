//! topic 路由
//!
//! 按 `<root>/<deviceId>/<suffix>` 拆分 topic，以 suffix 查表分发。
//! 路由表在启动时一次性构建，运行期只读。

use crate::error::GatewayError;
use async_trait::async_trait;
use domain::InboundMessage;
use smaas_ingest::{IngestError, MessageHandler};
use smaas_protocol::{Channel, TopicParts};
use smaas_telemetry::{
    record_dropped_bad_topic, record_dropped_decode, record_dropped_unrouted,
    record_message_received, record_write_failure,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 某一通道的消息处理器。
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    async fn handle(
        &self,
        device_id: &str,
        channel: Channel,
        message: &InboundMessage,
    ) -> Result<(), GatewayError>;
}

#[derive(Default)]
pub struct TopicRouter {
    routes: HashMap<&'static str, (Channel, Arc<dyn ChannelHandler>)>,
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, channel: Channel, handler: Arc<dyn ChannelHandler>) -> Self {
        self.routes.insert(channel.suffix(), (channel, handler));
        self
    }

    /// 已注册的 suffix，按字母序。
    pub fn suffixes(&self) -> Vec<&'static str> {
        let mut suffixes: Vec<&'static str> = self.routes.keys().copied().collect();
        suffixes.sort_unstable();
        suffixes
    }

}

#[async_trait]
impl MessageHandler for TopicRouter {
    async fn handle(&self, message: InboundMessage) -> Result<(), IngestError> {
        record_message_received();
        let parts = match TopicParts::parse(&message.topic) {
            Ok(parts) => parts,
            Err(err) => {
                record_dropped_bad_topic();
                warn!(target: "smaas.gateway", topic = %message.topic, error = %err, "topic_rejected");
                return Ok(());
            }
        };
        let Some((channel, handler)) = self.routes.get(parts.suffix) else {
            record_dropped_unrouted();
            debug!(target: "smaas.gateway", topic = %message.topic, "topic_unrouted");
            return Ok(());
        };
        if let Err(err) = handler.handle(parts.device_id, *channel, &message).await {
            match &err {
                err if err.is_decode() => record_dropped_decode(),
                GatewayError::Storage(_) => record_write_failure(),
                _ => {}
            }
            warn!(
                target: "smaas.gateway",
                device_id = %parts.device_id,
                channel = channel.suffix(),
                error = %err,
                "inbound_message_dropped"
            );
        }
        Ok(())
    }
}
