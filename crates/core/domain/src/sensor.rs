use std::fmt;

/// 传感器种类。
///
/// 传感器 ID 与端口的唯一性都以 (设备, 种类) 为作用域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Climate,
    Light,
    Motion,
}

impl SensorKind {
    /// topic 段名（与设备固件约定一致，光照传感器沿用 `ldr`）。
    pub fn topic_segment(self) -> &'static str {
        match self {
            SensorKind::Climate => "climate",
            SensorKind::Light => "ldr",
            SensorKind::Motion => "motion",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic_segment())
    }
}
