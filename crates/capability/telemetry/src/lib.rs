//! 追踪初始化与网关计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 网关指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub dropped_bad_topic: u64,
    pub dropped_unrouted: u64,
    pub dropped_decode: u64,
    pub readings_written: u64,
    pub write_failure: u64,
    pub config_pushes: u64,
    pub config_removals: u64,
    pub relay_publishes: u64,
    pub relay_echo_suppressed: u64,
    pub relay_resyncs: u64,
    pub credentials_registered: u64,
    pub credentials_revoked: u64,
    pub access_checks: u64,
    pub publish_failure: u64,
}

/// 网关计数器（进程级）。
pub struct TelemetryMetrics {
    messages_received: AtomicU64,
    dropped_bad_topic: AtomicU64,
    dropped_unrouted: AtomicU64,
    dropped_decode: AtomicU64,
    readings_written: AtomicU64,
    write_failure: AtomicU64,
    config_pushes: AtomicU64,
    config_removals: AtomicU64,
    relay_publishes: AtomicU64,
    relay_echo_suppressed: AtomicU64,
    relay_resyncs: AtomicU64,
    credentials_registered: AtomicU64,
    credentials_revoked: AtomicU64,
    access_checks: AtomicU64,
    publish_failure: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            dropped_bad_topic: AtomicU64::new(0),
            dropped_unrouted: AtomicU64::new(0),
            dropped_decode: AtomicU64::new(0),
            readings_written: AtomicU64::new(0),
            write_failure: AtomicU64::new(0),
            config_pushes: AtomicU64::new(0),
            config_removals: AtomicU64::new(0),
            relay_publishes: AtomicU64::new(0),
            relay_echo_suppressed: AtomicU64::new(0),
            relay_resyncs: AtomicU64::new(0),
            credentials_registered: AtomicU64::new(0),
            credentials_revoked: AtomicU64::new(0),
            access_checks: AtomicU64::new(0),
            publish_failure: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            dropped_bad_topic: self.dropped_bad_topic.load(Ordering::Relaxed),
            dropped_unrouted: self.dropped_unrouted.load(Ordering::Relaxed),
            dropped_decode: self.dropped_decode.load(Ordering::Relaxed),
            readings_written: self.readings_written.load(Ordering::Relaxed),
            write_failure: self.write_failure.load(Ordering::Relaxed),
            config_pushes: self.config_pushes.load(Ordering::Relaxed),
            config_removals: self.config_removals.load(Ordering::Relaxed),
            relay_publishes: self.relay_publishes.load(Ordering::Relaxed),
            relay_echo_suppressed: self.relay_echo_suppressed.load(Ordering::Relaxed),
            relay_resyncs: self.relay_resyncs.load(Ordering::Relaxed),
            credentials_registered: self.credentials_registered.load(Ordering::Relaxed),
            credentials_revoked: self.credentials_revoked.load(Ordering::Relaxed),
            access_checks: self.access_checks.load(Ordering::Relaxed),
            publish_failure: self.publish_failure.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录上行消息接收次数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录 topic 无法解析的丢弃次数。
pub fn record_dropped_bad_topic() {
    metrics().dropped_bad_topic.fetch_add(1, Ordering::Relaxed);
}

/// 记录无处理器的丢弃次数。
pub fn record_dropped_unrouted() {
    metrics().dropped_unrouted.fetch_add(1, Ordering::Relaxed);
}

/// 记录解码失败（含种类不匹配）的丢弃次数。
pub fn record_dropped_decode() {
    metrics().dropped_decode.fetch_add(1, Ordering::Relaxed);
}

/// 记录读数写入成功次数。
pub fn record_reading_written() {
    metrics().readings_written.fetch_add(1, Ordering::Relaxed);
}

/// 记录存储写入失败次数。
pub fn record_write_failure() {
    metrics().write_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录配置下发次数。
pub fn record_config_push() {
    metrics().config_pushes.fetch_add(1, Ordering::Relaxed);
}

/// 记录配置撤回次数。
pub fn record_config_removal() {
    metrics().config_removals.fetch_add(1, Ordering::Relaxed);
}

/// 记录继电器状态下发次数。
pub fn record_relay_publish() {
    metrics().relay_publishes.fetch_add(1, Ordering::Relaxed);
}

/// 记录被抑制的继电器回显次数。
pub fn record_relay_echo_suppressed() {
    metrics()
        .relay_echo_suppressed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录继电器全量重同步次数。
pub fn record_relay_resync() {
    metrics().relay_resyncs.fetch_add(1, Ordering::Relaxed);
}

/// 记录凭据注册完成次数。
pub fn record_credential_registered() {
    metrics()
        .credentials_registered
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录凭据吊销下发次数。
pub fn record_credential_revoked() {
    metrics().credentials_revoked.fetch_add(1, Ordering::Relaxed);
}

/// 记录刷卡校验次数。
pub fn record_access_check() {
    metrics().access_checks.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布失败次数。
pub fn record_publish_failure() {
    metrics().publish_failure.fetch_add(1, Ordering::Relaxed);
}
