//! SoftAP + Web 配网模块
//!
//! 提供基于 WiFi AP 模式和 HTTP 服务器的设备配网功能。

pub mod form;
pub mod html;
pub mod routes;
pub mod store;

#[cfg(target_os = "espidf")]
mod handlers;
#[cfg(target_os = "espidf")]
mod server;

pub use form::{Credentials, FormError};
pub use html::{index_html, INDEX_HTML};
pub use store::{CredentialStore, MemoryStore, NvsStore, StrStorage};

#[cfg(target_os = "espidf")]
pub use server::CaptivePortal;

/// 配网服务器发给主循环的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalEvent {
    Configured(Credentials),
}
