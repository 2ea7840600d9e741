//! 协议错误类型定义

/// 线协议错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 负载为空
    #[error("empty payload")]
    EmptyPayload,

    /// 负载超过上限
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// 解码失败
    #[error("decode error: {0}")]
    Decode(String),

    /// 编码失败
    #[error("encode error: {0}")]
    Encode(String),

    /// topic 无法解析
    #[error("invalid topic: {0}")]
    Topic(String),
}
