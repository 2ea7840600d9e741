//! 继电器状态桥接
//!
//! - 设备 → 存储：上报 `{duty, port, state}`，定位唯一端口绑定并写入状态
//! - 存储 → 设备：端口绑定更新后下发当前状态，设备处于抑制区间时跳过
//! - 全量重同步：`relay/full` 触发，逐条下发设备的全部端口状态，条间固定间隔

use crate::context::{GatewayContext, GatewaySettings};
use crate::error::GatewayError;
use crate::router::ChannelHandler;
use crate::suppression::EchoSuppressor;
use async_trait::async_trait;
use domain::{InboundMessage, SwitchState};
use smaas_protocol::{Channel, RelayState};
use smaas_storage::{
    RecordKind, RecordObserver, RecordSnapshot, RelayPortBinding, RelayPortStore, RelayPortUpdate,
    StorageError,
};
use smaas_telemetry::{record_relay_echo_suppressed, record_relay_publish, record_relay_resync};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct RelayStateBridge {
    ctx: Arc<GatewayContext>,
    suppressor: Arc<EchoSuppressor>,
    resync_delay: Duration,
    resync_page_size: usize,
}

impl RelayStateBridge {
    pub fn new(
        ctx: Arc<GatewayContext>,
        suppressor: Arc<EchoSuppressor>,
        settings: &GatewaySettings,
    ) -> Self {
        Self {
            ctx,
            suppressor,
            resync_delay: settings.resync_delay,
            resync_page_size: settings.resync_page_size,
        }
    }

    /// 设备上报的端口状态写入存储。
    async fn apply_report(&self, device_id: &str, payload: &[u8]) -> Result<(), GatewayError> {
        let report: RelayState = self.ctx.codec.decode(payload)?;
        let binding = self
            .ctx
            .store
            .find_relay_port_by_slot(device_id, report.duty, report.port)
            .await?
            .ok_or_else(|| {
                GatewayError::NotFound(format!(
                    "{} relay port {} on {}",
                    report.duty, report.port, device_id
                ))
            })?;
        let _guard = self.suppressor.suppress(device_id);
        self.ctx
            .store
            .update_relay_port(&binding.binding_id, RelayPortUpdate::state(report.state.is_on()))
            .await?;
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            duty = %report.duty,
            port = report.port,
            on = report.state.is_on(),
            "relay_state_saved"
        );
        Ok(())
    }

    /// 逐页读取并逐条下发设备的全部端口状态，返回成功下发的条数。
    ///
    /// 页大小只限制单次读取的条数；读到不足一页时结束。
    pub async fn resync(&self, device_id: &str) -> Result<usize, GatewayError> {
        let _guard = self.suppressor.suppress(device_id);
        record_relay_resync();
        let mut total = 0;
        let mut published = 0;
        loop {
            let page = self
                .ctx
                .store
                .list_relay_ports(device_id, total, self.resync_page_size)
                .await?;
            let page_len = page.len();
            for binding in &page {
                if total > 0 && !self.resync_delay.is_zero() {
                    tokio::time::sleep(self.resync_delay).await;
                }
                total += 1;
                match self.publish_state(binding).await {
                    Ok(()) => published += 1,
                    Err(err) => warn!(
                        target: "smaas.gateway",
                        device_id = %device_id,
                        port = binding.port,
                        error = %err,
                        "relay_resync_publish_failed"
                    ),
                }
            }
            if self.resync_page_size == 0 || page_len < self.resync_page_size {
                break;
            }
        }
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            total,
            published,
            "relay_resync_done"
        );
        Ok(published)
    }

    async fn publish_state(&self, binding: &RelayPortBinding) -> Result<(), GatewayError> {
        let message = RelayState {
            duty: binding.duty,
            port: binding.port,
            state: SwitchState::from(binding.state),
        };
        self.ctx
            .publish(&binding.device_id, Channel::Relay, &message)
            .await?;
        record_relay_publish();
        Ok(())
    }
}

#[async_trait]
impl ChannelHandler for RelayStateBridge {
    async fn handle(
        &self,
        device_id: &str,
        channel: Channel,
        message: &InboundMessage,
    ) -> Result<(), GatewayError> {
        match channel {
            Channel::RelayFull => self.resync(device_id).await.map(|_| ()),
            _ => self.apply_report(device_id, &message.payload).await,
        }
    }
}

#[async_trait]
impl RecordObserver for RelayStateBridge {
    fn name(&self) -> &'static str {
        "relay_state_bridge"
    }

    fn kinds(&self) -> &'static [RecordKind] {
        &[RecordKind::RelayPort]
    }

    async fn on_after_update(
        &self,
        _previous: &RecordSnapshot,
        current: &RecordSnapshot,
    ) -> Result<(), StorageError> {
        let RecordSnapshot::RelayPort(binding) = current else {
            return Ok(());
        };
        if self.suppressor.is_suppressed(&binding.device_id) {
            record_relay_echo_suppressed();
            debug!(
                target: "smaas.gateway",
                device_id = %binding.device_id,
                port = binding.port,
                "relay_echo_suppressed"
            );
            return Ok(());
        }
        if let Err(err) = self.publish_state(binding).await {
            warn!(
                target: "smaas.gateway",
                device_id = %binding.device_id,
                port = binding.port,
                error = %err,
                "relay_publish_failed"
            );
        }
        Ok(())
    }
}
