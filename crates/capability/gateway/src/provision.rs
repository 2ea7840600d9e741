//! 设备创建后开通全部继电器端口：低负载 1-4、重负载 1-2，默认关闭。

use async_trait::async_trait;
use domain::DutyClass;
use smaas_storage::{
    RecordKind, RecordObserver, RecordSnapshot, RecordStore, RelayPortBinding, RelayPortStore,
    StorageError,
};
use std::sync::Arc;
use tracing::info;

pub struct RelayProvisioner {
    store: Arc<dyn RecordStore>,
}

impl RelayProvisioner {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordObserver for RelayProvisioner {
    fn name(&self) -> &'static str {
        "relay_provisioner"
    }

    fn kinds(&self) -> &'static [RecordKind] {
        &[RecordKind::Device]
    }

    // 存储错误透传给创建方
    async fn on_after_create(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        let RecordSnapshot::Device(device) = record else {
            return Ok(());
        };
        for duty in DutyClass::ALL {
            for port in 1..=duty.port_count() {
                self.store
                    .create_relay_port(RelayPortBinding::provisioned(
                        &device.device_id,
                        duty,
                        port,
                    ))
                    .await?;
            }
        }
        info!(
            target: "smaas.gateway",
            device_id = %device.device_id,
            "relay_ports_provisioned"
        );
        Ok(())
    }
}
