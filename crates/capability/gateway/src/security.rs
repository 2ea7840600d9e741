//! RFID 安全握手
//!
//! 注册：凭据记录创建后下发 `RegisterRequest{id}`，设备回传
//! `RegisterResponse{id, credential}`，网关按 id 找到记录并写入十六进制 UID。
//! 请求与响应共享凭据记录自身的 ID 作为关联标识；没有超时，
//! 凭据为空即为待注册状态，可通过 [`SecurityHandshake::retry_pending`] 重发。
//!
//! 吊销：凭据记录删除后下发 `RevokeRequest{credential}`，不等待响应。
//!
//! 校验：设备在 `auth` 通道上报刷卡 UID，网关比对后回复 `Status{granted}`
//! 并追加一条访问日志。

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::router::ChannelHandler;
use async_trait::async_trait;
use domain::InboundMessage;
use smaas_protocol::{Channel, RfidEnvelope, now_epoch_ms};
use smaas_storage::{
    AccessLogRecord, AccessLogStore, CredentialStore, RecordKind, RecordObserver, RecordSnapshot,
    SecurityCredential, StorageError, new_record_id,
};
use smaas_telemetry::{record_access_check, record_credential_registered, record_credential_revoked};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SecurityHandshake {
    ctx: Arc<GatewayContext>,
}

impl SecurityHandshake {
    pub fn new(ctx: Arc<GatewayContext>) -> Self {
        Self { ctx }
    }

    /// 重发设备上所有待注册凭据的注册请求，返回下发条数。
    pub async fn retry_pending(&self, device_id: &str) -> Result<usize, GatewayError> {
        let credentials = self.ctx.store.list_credentials(device_id).await?;
        let mut sent = 0;
        for credential in credentials.iter().filter(|item| item.is_pending()) {
            self.request_registration(credential).await?;
            sent += 1;
        }
        Ok(sent)
    }

    async fn request_registration(&self, credential: &SecurityCredential) -> Result<(), GatewayError> {
        let request = RfidEnvelope::RegisterRequest {
            id: credential.credential_id.clone(),
        };
        self.ctx
            .publish(&credential.device_id, Channel::Rfid, &request)
            .await?;
        info!(
            target: "smaas.gateway",
            device_id = %credential.device_id,
            credential_id = %credential.credential_id,
            "rfid_register_requested"
        );
        Ok(())
    }

    async fn revoke(&self, credential: &SecurityCredential) -> Result<(), GatewayError> {
        if credential.is_pending() {
            debug!(
                target: "smaas.gateway",
                credential_id = %credential.credential_id,
                "rfid_revoke_skipped_pending"
            );
            return Ok(());
        }
        let uid = match hex::decode(&credential.credential) {
            Ok(uid) => uid,
            Err(err) => {
                warn!(
                    target: "smaas.gateway",
                    credential_id = %credential.credential_id,
                    error = %err,
                    "rfid_revoke_skipped_undecodable"
                );
                return Ok(());
            }
        };
        self.ctx
            .publish(
                &credential.device_id,
                Channel::Rfid,
                &RfidEnvelope::RevokeRequest { credential: uid },
            )
            .await?;
        record_credential_revoked();
        info!(
            target: "smaas.gateway",
            device_id = %credential.device_id,
            credential_id = %credential.credential_id,
            "rfid_revoke_requested"
        );
        Ok(())
    }

    /// 处理注册响应，并在 `auth` 通道回复结果。
    async fn complete_registration(
        &self,
        device_id: &str,
        id: &str,
        uid: &[u8],
    ) -> Result<(), GatewayError> {
        let result = self.store_credential(device_id, id, uid).await;
        let granted = result.is_ok();
        self.ctx
            .publish(device_id, Channel::Auth, &RfidEnvelope::Status { granted })
            .await?;
        result?;
        record_credential_registered();
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            credential_id = %id,
            "rfid_registered"
        );
        Ok(())
    }

    async fn store_credential(
        &self,
        device_id: &str,
        id: &str,
        uid: &[u8],
    ) -> Result<(), GatewayError> {
        if uid.is_empty() {
            return Err(GatewayError::NotFound(format!("credential value for {}", id)));
        }
        let row = self
            .ctx
            .store
            .find_credential(id)
            .await?
            .filter(|row| row.device_id == device_id)
            .ok_or_else(|| GatewayError::NotFound(format!("credential {} on {}", id, device_id)))?;
        self.ctx
            .store
            .set_credential_value(&row.credential_id, &hex::encode(uid))
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("credential {}", id)))?;
        Ok(())
    }

    /// 校验刷卡 UID，记录访问日志并回复结果。
    async fn verify(&self, device_id: &str, uid: &[u8]) -> Result<(), GatewayError> {
        let presented = hex::encode(uid);
        let credentials = self.ctx.store.list_credentials(device_id).await?;
        let granted = !uid.is_empty()
            && credentials
                .iter()
                .any(|row| !row.is_pending() && row.credential.eq_ignore_ascii_case(&presented));
        let detail = if uid.is_empty() {
            "empty credential"
        } else if granted {
            "granted"
        } else {
            "unknown credential"
        };
        self.ctx
            .store
            .append_access_log(AccessLogRecord {
                log_id: new_record_id(),
                device_id: device_id.to_string(),
                credential: presented,
                granted,
                detail: detail.to_string(),
                ts_ms: now_epoch_ms(),
            })
            .await?;
        record_access_check();
        self.ctx
            .publish(device_id, Channel::Auth, &RfidEnvelope::Status { granted })
            .await?;
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            granted,
            "rfid_access_checked"
        );
        Ok(())
    }
}

#[async_trait]
impl ChannelHandler for SecurityHandshake {
    async fn handle(
        &self,
        device_id: &str,
        channel: Channel,
        message: &InboundMessage,
    ) -> Result<(), GatewayError> {
        let envelope: RfidEnvelope = self.ctx.codec.decode(&message.payload)?;
        match (channel, envelope) {
            (Channel::Rfid, RfidEnvelope::RegisterResponse { id, credential }) => {
                self.complete_registration(device_id, &id, &credential).await
            }
            (Channel::Auth, RfidEnvelope::VerifyRequest { credential }) => {
                self.verify(device_id, &credential).await
            }
            (channel, envelope) => {
                // 网关自己的下行报文也会回到订阅中
                debug!(
                    target: "smaas.gateway",
                    device_id = %device_id,
                    channel = channel.suffix(),
                    kind = envelope.kind_name(),
                    "rfid_envelope_ignored"
                );
                Ok(())
            }
        }
    }
}

#[async_trait]
impl RecordObserver for SecurityHandshake {
    fn name(&self) -> &'static str {
        "security_handshake"
    }

    fn kinds(&self) -> &'static [RecordKind] {
        &[RecordKind::Credential]
    }

    async fn on_after_create(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        if let RecordSnapshot::Credential(credential) = record
            && let Err(err) = self.request_registration(credential).await
        {
            warn!(
                target: "smaas.gateway",
                credential_id = %credential.credential_id,
                error = %err,
                "rfid_register_request_failed"
            );
        }
        Ok(())
    }

    async fn on_after_delete(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        if let RecordSnapshot::Credential(credential) = record
            && let Err(err) = self.revoke(credential).await
        {
            warn!(
                target: "smaas.gateway",
                credential_id = %credential.credential_id,
                error = %err,
                "rfid_revoke_failed"
            );
        }
        Ok(())
    }
}
