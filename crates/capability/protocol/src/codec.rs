//! 二进制编解码
//!
//! bincode 变长整数编码，限制负载大小并拒绝尾随字节，
//! 截断或拼接过的报文都按解码失败处理。

use crate::error::ProtocolError;
use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 单条报文的默认大小上限（字节）。
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024;

/// 报文编解码器
#[derive(Debug, Clone, Copy)]
pub struct WireCodec {
    max_payload_bytes: usize,
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl WireCodec {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self {
            max_payload_bytes: max_payload_bytes.max(1),
        }
    }

    /// 编码报文
    pub fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, ProtocolError> {
        let bytes = self
            .options()
            .serialize(message)
            .map_err(|err| ProtocolError::Encode(err.to_string()))?;
        if bytes.len() > self.max_payload_bytes {
            return Err(ProtocolError::PayloadTooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    /// 解码报文
    pub fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, ProtocolError> {
        if payload.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        if payload.len() > self.max_payload_bytes {
            return Err(ProtocolError::PayloadTooLarge(payload.len()));
        }
        self.options()
            .deserialize(payload)
            .map_err(|err| ProtocolError::Decode(err.to_string()))
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_limit(self.max_payload_bytes as u64)
            .reject_trailing_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LightReading, SensorData};

    #[test]
    fn rejects_trailing_bytes() {
        let codec = WireCodec::default();
        let mut bytes = codec
            .encode(&SensorData::Light(LightReading {
                sensor_id: 1,
                level: 10.0,
            }))
            .expect("encode");
        bytes.push(0);
        assert!(matches!(
            codec.decode::<SensorData>(&bytes),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let codec = WireCodec::new(4);
        assert!(matches!(
            codec.decode::<SensorData>(&[0; 8]),
            Err(ProtocolError::PayloadTooLarge(8))
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        let codec = WireCodec::default();
        assert!(matches!(
            codec.decode::<SensorData>(&[]),
            Err(ProtocolError::EmptyPayload)
        ));
    }
}
