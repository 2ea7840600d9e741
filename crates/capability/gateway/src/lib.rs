//! # 设备同步网关
//!
//! 连接记录存储与通过 MQTT 通信的嵌入式设备：
//!
//! 1. **路由** (`router.rs`)：拆分 `<root>/<deviceId>/<suffix>`，按 suffix 分发
//! 2. **遥测入库** (`telemetry.rs`)：climate / ldr / motion / sensors 读数逐条追加
//! 3. **配置同步** (`config_sync.rs`)：传感器配置变更后下发或撤回快照
//! 4. **继电器桥接** (`relay.rs`)：双向同步端口状态，按设备抑制回显，全量重同步
//! 5. **安全握手** (`security.rs`)：RFID 注册、吊销与刷卡校验
//! 6. **端口开通** (`provision.rs`)：设备创建后开通六个继电器端口
//!
//! ## 并发
//!
//! 每条上行消息在独立任务上处理；存储钩子在发起写入的任务上执行。
//! 回显抑制只作用于发起写入的设备。
//!
//! ## 错误策略
//!
//! 解码、查找与发布失败只记录日志并丢弃；唯一性冲突与存储错误返回给写入方。

pub mod config_sync;
pub mod context;
pub mod error;
pub mod provision;
pub mod relay;
pub mod router;
pub mod security;
pub mod suppression;
pub mod telemetry;

pub use config_sync::{ConfigSynchronizer, snapshot_of};
pub use context::{GatewayContext, GatewaySettings};
pub use error::GatewayError;
pub use provision::RelayProvisioner;
pub use relay::RelayStateBridge;
pub use router::{ChannelHandler, TopicRouter};
pub use security::SecurityHandshake;
pub use suppression::{EchoSuppressor, SuppressionGuard};
pub use telemetry::TelemetryIngestor;

use smaas_control::DevicePublisher;
use smaas_protocol::Channel;
use smaas_storage::{RecordEvents, RecordStore};
use std::sync::Arc;
use tracing::info;

/// 组装好的网关组件。
pub struct Gateway {
    ctx: Arc<GatewayContext>,
    suppressor: Arc<EchoSuppressor>,
    ingestor: Arc<TelemetryIngestor>,
    config_sync: Arc<ConfigSynchronizer>,
    relay: Arc<RelayStateBridge>,
    security: Arc<SecurityHandshake>,
    provisioner: Arc<RelayProvisioner>,
}

impl Gateway {
    pub fn new(
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn DevicePublisher>,
        settings: GatewaySettings,
    ) -> Self {
        let ctx = Arc::new(GatewayContext::new(store.clone(), publisher, &settings));
        let suppressor = Arc::new(EchoSuppressor::new());
        Self {
            ingestor: Arc::new(TelemetryIngestor::new(ctx.clone())),
            config_sync: Arc::new(ConfigSynchronizer::new(ctx.clone(), &settings)),
            relay: Arc::new(RelayStateBridge::new(
                ctx.clone(),
                suppressor.clone(),
                &settings,
            )),
            security: Arc::new(SecurityHandshake::new(ctx.clone())),
            provisioner: Arc::new(RelayProvisioner::new(store)),
            ctx,
            suppressor,
        }
    }

    /// 向存储注册全部生命周期观察者。
    pub fn register_hooks(&self) {
        let store = &self.ctx.store;
        store.subscribe(self.provisioner.clone());
        store.subscribe(self.config_sync.clone());
        store.subscribe(self.relay.clone());
        store.subscribe(self.security.clone());
        info!(target: "smaas.gateway", "record_hooks_registered");
    }

    /// 构建上行路由表。
    pub fn router(&self) -> TopicRouter {
        let ingestor: Arc<dyn ChannelHandler> = self.ingestor.clone();
        let relay: Arc<dyn ChannelHandler> = self.relay.clone();
        let security: Arc<dyn ChannelHandler> = self.security.clone();
        TopicRouter::new()
            .route(Channel::Climate, ingestor.clone())
            .route(Channel::Ldr, ingestor.clone())
            .route(Channel::Motion, ingestor.clone())
            .route(Channel::Sensors, ingestor)
            .route(Channel::Relay, relay.clone())
            .route(Channel::RelayFull, relay)
            .route(Channel::Rfid, security.clone())
            .route(Channel::Auth, security)
    }

    /// 订阅过滤器（每个上行通道一个）。
    pub fn subscriptions(&self) -> Vec<String> {
        Channel::INBOUND
            .iter()
            .map(|channel| self.ctx.layout.subscription(channel.suffix()))
            .collect()
    }

    pub fn context(&self) -> &Arc<GatewayContext> {
        &self.ctx
    }

    pub fn suppressor(&self) -> &Arc<EchoSuppressor> {
        &self.suppressor
    }

    pub fn config_sync(&self) -> &Arc<ConfigSynchronizer> {
        &self.config_sync
    }

    pub fn relay(&self) -> &Arc<RelayStateBridge> {
        &self.relay
    }

    pub fn security(&self) -> &Arc<SecurityHandshake> {
        &self.security
    }
}
