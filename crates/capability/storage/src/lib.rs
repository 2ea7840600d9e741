//! # SMAAS Storage 模块
//!
//! 网关面向的记录存储协作方：按 ID 的 CRUD、带排序/上限的过滤列表，
//! 以及记录变更订阅。网关自身不持有任何持久状态。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：每类记录一个异步 Trait
//! 2. **数据模型层** (`models.rs`)：设备、配置、继电器端口、凭据、遥测、访问日志
//! 3. **生命周期钩子** (`hooks.rs`)：`after_create` / `after_update` /
//!    `before_delete` / `after_delete`，观察者收到记录的不可变快照
//! 4. **错误处理层** (`error.rs`)：区分未找到、唯一性冲突、非法值与后端错误
//! 5. **验证辅助层** (`validation.rs`)：传感器 ID / 端口唯一性、继电器端口范围
//! 6. **实现层** (`in_memory/`)：内存存储，用于测试和单机部署
//!
//! ## 级联与钩子
//!
//! - 创建设备会触发 `after_create(Device)`，由网关的观察者开通继电器端口
//! - 删除设备会先逐条删除其传感器配置、继电器端口、凭据和配置记录，
//!   每条都会经过完整的删除钩子，再删除设备本身
//! - 钩子在发起存储操作的任务上执行，且执行时不持有存储锁，
//!   观察者可以安全地回调存储
//!
//! ## 错误语义
//!
//! - 唯一性冲突在写入前拒绝（`StorageErrorKind::Conflict`），返回给写入方
//! - `after_*` 钩子返回的错误会透传给写入方；`before_delete` 返回错误则中止删除

pub mod error;
pub mod hooks;
pub mod in_memory;
pub mod models;
pub mod traits;
pub mod validation;

pub use error::*;
pub use hooks::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

pub use in_memory::InMemoryRecordStore;
