//! 按设备的继电器回显抑制
//!
//! 设备上报或全量重同步写入存储期间，该设备的继电器更新钩子不再下发，
//! 避免把设备刚报告的状态再发回去。计数而非布尔值，嵌套进入互不干扰。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct EchoSuppressor {
    active: Mutex<HashMap<String, usize>>,
}

impl EchoSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入抑制区间，guard 释放时退出。
    pub fn suppress(&self, device_id: &str) -> SuppressionGuard<'_> {
        *self.lock().entry(device_id.to_string()).or_insert(0) += 1;
        SuppressionGuard {
            owner: self,
            device_id: device_id.to_string(),
        }
    }

    pub fn is_suppressed(&self, device_id: &str) -> bool {
        self.lock()
            .get(device_id)
            .is_some_and(|depth| *depth > 0)
    }

    fn release(&self, device_id: &str) {
        let mut active = self.lock();
        if let Some(depth) = active.get_mut(device_id) {
            *depth = depth.saturating_sub(1);
            if *depth == 0 {
                active.remove(device_id);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 抑制区间守卫
#[must_use]
pub struct SuppressionGuard<'a> {
    owner: &'a EchoSuppressor,
    device_id: String,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.owner.release(&self.device_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_suppression() {
        let suppressor = EchoSuppressor::new();
        {
            let _guard = suppressor.suppress("dev-1");
            assert!(suppressor.is_suppressed("dev-1"));
        }
        assert!(!suppressor.is_suppressed("dev-1"));
    }

    #[test]
    fn nested_guards_keep_device_suppressed() {
        let suppressor = EchoSuppressor::new();
        let outer = suppressor.suppress("dev-1");
        let inner = suppressor.suppress("dev-1");
        drop(inner);
        assert!(suppressor.is_suppressed("dev-1"));
        drop(outer);
        assert!(!suppressor.is_suppressed("dev-1"));
    }

    #[test]
    fn devices_are_independent() {
        let suppressor = EchoSuppressor::new();
        let _guard = suppressor.suppress("dev-1");
        assert!(!suppressor.is_suppressed("dev-2"));
    }
}
