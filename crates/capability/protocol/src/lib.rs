//! # 线协议能力模块
//!
//! 定义网关与设备之间的全部二进制报文，以及 topic 的组成方式。
//!
//! ## 报文族
//!
//! ```text
//! root/{device}/climate|ldr|motion|sensors   上行  SensorData
//! root/{device}/relay                        双向  RelayState
//! root/{device}/relay/full                   上行  空负载（请求全量重同步）
//! root/{device}/rfid                         双向  RfidEnvelope
//! root/{device}/auth                         双向  RfidEnvelope（校验请求 / 结果）
//! root/{device}/config[/<kind>]              下行  ConfigPush
//! root/{device}/config/remove                下行  ConfigRemoval
//! ```
//!
//! 每个报文族都是封闭的枚举（tagged union），编解码处必须穷尽匹配，
//! 新增传感器种类会在编译期暴露所有需要补充的分支。
//!
//! ## 编码
//!
//! 使用 bincode 变长整数编码，负载有上限且拒绝尾随字节；
//! 负载类型按固定的 1/2 编码传输。

mod codec;
mod error;
mod topic;
mod types;

pub use codec::{DEFAULT_MAX_PAYLOAD_BYTES, WireCodec};
pub use error::ProtocolError;
pub use topic::{Channel, TopicLayout, TopicParts};
pub use types::*;
