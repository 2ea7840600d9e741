//! 继电器负载类型与开关状态。
//!
//! 负载类型的线上取值固定：1 = 低负载（4 路），2 = 重负载（2 路）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 非法的负载类型编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid duty class code: {0}")]
pub struct InvalidDutyClass(pub u8);

/// 继电器负载类型（共享的继电器夹具）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DutyClass {
    LowDuty = 1,
    HeavyDuty = 2,
}

impl DutyClass {
    pub const ALL: [DutyClass; 2] = [DutyClass::LowDuty, DutyClass::HeavyDuty];

    /// 线上编码。
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 夹具提供的可切换端口数。
    pub fn port_count(self) -> u8 {
        match self {
            DutyClass::LowDuty => 4,
            DutyClass::HeavyDuty => 2,
        }
    }

    /// 端口号从 1 开始。
    pub fn contains_port(self, port: u8) -> bool {
        (1..=self.port_count()).contains(&port)
    }

    /// 共享夹具记录的固定 ID。
    pub fn fixture_id(self) -> &'static str {
        match self {
            DutyClass::LowDuty => "relaylowduty001",
            DutyClass::HeavyDuty => "relayheavyduty1",
        }
    }

    pub fn from_fixture_id(fixture_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|duty| duty.fixture_id() == fixture_id)
    }
}

impl From<DutyClass> for u8 {
    fn from(duty: DutyClass) -> Self {
        duty.code()
    }
}

impl TryFrom<u8> for DutyClass {
    type Error = InvalidDutyClass;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(DutyClass::LowDuty),
            2 => Ok(DutyClass::HeavyDuty),
            other => Err(InvalidDutyClass(other)),
        }
    }
}

impl fmt::Display for DutyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyClass::LowDuty => f.write_str("low_duty"),
            DutyClass::HeavyDuty => f.write_str("heavy_duty"),
        }
    }
}

/// 继电器开关状态（只有开/关，没有未知态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn is_on(self) -> bool {
        matches!(self, SwitchState::On)
    }
}

impl From<bool> for SwitchState {
    fn from(on: bool) -> Self {
        if on { SwitchState::On } else { SwitchState::Off }
    }
}

impl From<SwitchState> for bool {
    fn from(state: SwitchState) -> Self {
        state.is_on()
    }
}
