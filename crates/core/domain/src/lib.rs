//! 网关各模块共享的领域类型。

pub mod data;
pub mod relay;
pub mod sensor;

pub use data::InboundMessage;
pub use relay::{DutyClass, InvalidDutyClass, SwitchState};
pub use sensor::SensorKind;
