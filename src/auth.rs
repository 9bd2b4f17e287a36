// ==========================================
// GoatOS 牧场记录系统 - PIN 访问控制
// ==========================================
// 说明: 全牧场共用一个 PIN；未配置 PIN 时不启用校验
// 红线: 不保存会话状态，是否已通过校验由调用方传入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::FarmSettings;

/// 无需 PIN 即可访问的路径前缀
pub const EXEMPT_PATH_PREFIXES: [&str; 4] = ["/pin/", "/admin/", "/static/", "/media/"];

/// PIN 访问控制
#[derive(Debug, Clone, Default)]
pub struct PinGate {
    pin: Option<String>,
}

impl PinGate {
    pub fn new(pin: Option<String>) -> Self {
        Self {
            pin: pin.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        }
    }

    pub fn from_settings(settings: &FarmSettings) -> Self {
        Self::new(settings.pin.clone())
    }

    /// 是否启用 PIN 校验
    pub fn is_enabled(&self) -> bool {
        self.pin.is_some()
    }

    /// 校验 PIN；未启用时任何输入都通过
    pub fn verify(&self, entered: &str) -> ApiResult<()> {
        match &self.pin {
            None => Ok(()),
            Some(expected) if expected == entered.trim() => Ok(()),
            Some(_) => {
                tracing::warn!("PIN 校验失败");
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// 请求路径是否放行
    pub fn allows(&self, path: &str, session_authenticated: bool) -> bool {
        if !self.is_enabled() || session_authenticated {
            return true;
        }
        EXEMPT_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_gate_allows_everything() {
        let gate = PinGate::new(Some("   ".to_string()));
        assert!(!gate.is_enabled());
        assert!(gate.allows("/", false));
        assert!(gate.verify("anything").is_ok());
    }

    #[test]
    fn test_enabled_gate() {
        let gate = PinGate::new(Some("1234".to_string()));
        assert!(gate.is_enabled());
        assert!(gate.verify("1234").is_ok());
        assert!(matches!(gate.verify("0000"), Err(ApiError::Unauthorized)));

        assert!(!gate.allows("/", false));
        assert!(!gate.allows("/goat/1/", false));
        assert!(gate.allows("/goat/1/", true));
        assert!(gate.allows("/pin/", false));
        assert!(gate.allows("/static/app.css", false));
        assert!(!gate.allows("/pin", false));
    }
}
