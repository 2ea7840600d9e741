//! 网关错误类型

use domain::{InvalidDutyClass, SensorKind};
use smaas_control::PublishError;
use smaas_protocol::ProtocolError;
use smaas_storage::StorageError;

/// 网关处理错误
///
/// 路由与钩子适配层按类别处理：解码、查找、发布错误只记录日志；
/// 存储错误在钩子中透传给写入方。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("sensor kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: SensorKind,
        actual: SensorKind,
    },

    #[error("invalid relay type: {0}")]
    InvalidDuty(#[from] InvalidDutyClass),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}

impl GatewayError {
    /// 报文本身不可用（解码失败或种类不符）。
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            GatewayError::Protocol(_) | GatewayError::KindMismatch { .. }
        )
    }
}
