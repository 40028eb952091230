//! 站点模块
//!
//! 包含所有站点实现和站点注册表

pub mod biquge;
pub mod cleaner;
pub mod qu02;

use std::collections::HashMap;
use std::sync::Arc;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::core::config::SiteConfig;
use crate::core::error::{Result, SpiderError};
use crate::interfaces::SiteProfile;

pub use biquge::Biquge;
pub use qu02::Qu02;

/// 内置站点标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SiteKind {
    Qu02,
    Biquge,
}

// =============================================================================
// 站点注册表
// =============================================================================

type SiteFactory = Box<dyn Fn(SiteConfig) -> Result<Arc<dyn SiteProfile>> + Send + Sync>;

/// 站点注册表
pub struct SiteRegistry {
    factories: HashMap<String, SiteFactory>,
}

impl SiteRegistry {
    /// 创建新的注册表，并注册全部内置站点
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        for kind in SiteKind::iter() {
            match kind {
                SiteKind::Qu02 => registry.register(kind.as_ref(), |cfg| {
                    Ok(Arc::new(Qu02::new(cfg)?) as Arc<dyn SiteProfile>)
                }),
                SiteKind::Biquge => registry.register(kind.as_ref(), |cfg| {
                    Ok(Arc::new(Biquge::new(cfg)?) as Arc<dyn SiteProfile>)
                }),
            }
        }

        registry
    }

    /// 注册站点工厂
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(SiteConfig) -> Result<Arc<dyn SiteProfile>> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Box::new(factory));
    }

    /// 创建站点实例
    pub fn create(&self, id: &str, config: SiteConfig) -> Result<Arc<dyn SiteProfile>> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| SpiderError::UnknownSite(id.to_string()))?;
        factory(config)
    }

    /// 列出所有已注册的站点
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn builtin_sites_are_registered() {
        let registry = SiteRegistry::new();
        assert_eq!(registry.list(), vec!["biquge", "qu02"]);

        let site = registry.create("biquge", SiteConfig::default()).unwrap();
        assert_eq!(site.id(), "biquge");
        assert_eq!(site.worker_cap(), biquge::DEFAULT_WORKER_CAP);
    }

    #[test]
    fn unknown_site_is_rejected() {
        let registry = SiteRegistry::new();
        let err = registry.create("nowhere", SiteConfig::default()).err().unwrap();
        assert!(matches!(err, SpiderError::UnknownSite(id) if id == "nowhere"));
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let registry = SiteRegistry::new();
        let cfg = SiteConfig {
            base_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(matches!(
            registry.create("qu02", cfg),
            Err(SpiderError::InvalidUrl(_))
        ));
    }

    #[test]
    fn site_kind_round_trips_through_strings() {
        assert_eq!(SiteKind::from_str("qu02").unwrap(), SiteKind::Qu02);
        assert_eq!(SiteKind::Biquge.to_string(), "biquge");
    }
}
