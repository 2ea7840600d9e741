/// 设备上行的原始消息（topic + 未解码的二进制负载）。
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>, received_at_ms: i64) -> Self {
        Self {
            topic: topic.into(),
            payload,
            received_at_ms,
        }
    }
}
