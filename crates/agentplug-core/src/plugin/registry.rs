//! Key → plugin dispatch table.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{ExecContext, ItemKey, ItemValue, Metric, Plugin};
use crate::error::{AgentError, ErrorKind};

/// Set of registered plugins, indexed by the item keys they serve.
#[derive(Default)]
pub struct Registry {
    plugins: Vec<Box<dyn Plugin>>,
    /// Item key → index into `plugins`.
    index: BTreeMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under every key it declares.
    ///
    /// Fails without registering anything if one of the keys is already
    /// served by another plugin.
    pub fn register(&mut self, plugin: impl Plugin + 'static) -> Result<(), AgentError> {
        for metric in plugin.metrics() {
            if let Some(&owner) = self.index.get(metric.key) {
                return Err(AgentError::DuplicateKey {
                    key: metric.key.to_string(),
                    plugin: self.plugins[owner].name().to_string(),
                });
            }
        }

        let slot = self.plugins.len();
        for metric in plugin.metrics() {
            self.index.insert(metric.key, slot);
        }
        debug!(
            plugin = plugin.name(),
            keys = plugin.metrics().len(),
            "plugin registered"
        );
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    /// All registered metrics, ordered by key, with their plugin name.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, &Metric)> + '_ {
        self.index.iter().filter_map(move |(key, &slot)| {
            let plugin = &self.plugins[slot];
            plugin
                .metrics()
                .iter()
                .find(|m| m.key == *key)
                .map(|metric| (plugin.name(), metric))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Dispatches `key` to the plugin that serves it.
    pub fn export(
        &self,
        key: &str,
        params: &[String],
        ctx: Option<&ExecContext>,
    ) -> Result<ItemValue, AgentError> {
        let Some(&slot) = self.index.get(key) else {
            debug!(key, "no plugin serves item key");
            return Err(AgentError::UnsupportedKey(key.to_string()));
        };
        let plugin = &self.plugins[slot];

        debug!(
            key,
            plugin = plugin.name(),
            params = params.len(),
            timeout_secs = ctx.map(|c| c.timeout.as_secs()),
            "exporting item"
        );
        let result = plugin.export(key, params, ctx);
        if let Err(e) = &result {
            if e.kind() == ErrorKind::IoFailure {
                warn!(key, plugin = plugin.name(), error = %e, "item check failed");
            } else {
                debug!(key, plugin = plugin.name(), error = %e, "item not supported");
            }
        }
        result
    }

    /// Convenience wrapper over [`Registry::export`] for a parsed key.
    pub fn export_item(
        &self,
        item: &ItemKey,
        ctx: Option<&ExecContext>,
    ) -> Result<ItemValue, AgentError> {
        self.export(&item.key, &item.params, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::MockFs;
    use crate::plugins::VfsFilePlugin;

    struct PingPlugin;

    impl Plugin for PingPlugin {
        fn name(&self) -> &str {
            "agent"
        }

        fn metrics(&self) -> &[Metric] {
            const METRICS: &[Metric] = &[Metric {
                key: "agent.ping",
                description: "Returns 1 while the agent is alive.",
                sample_params: &[],
            }];
            METRICS
        }

        fn export(
            &self,
            key: &str,
            _params: &[String],
            _ctx: Option<&ExecContext>,
        ) -> Result<ItemValue, AgentError> {
            match key {
                "agent.ping" => Ok(ItemValue::Uint(1)),
                _ => Err(AgentError::UnsupportedKey(key.to_string())),
            }
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(PingPlugin).unwrap();
        registry
            .register(VfsFilePlugin::new(
                MockFs::new().with_file("text.txt", "1234"),
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_registry_dispatches_by_key() {
        let registry = registry();
        let ctx = ExecContext::default();

        assert_eq!(
            registry.export("agent.ping", &[], Some(&ctx)).unwrap(),
            ItemValue::Uint(1)
        );
        let item = ItemKey::parse("vfs.file.exists[text.txt]").unwrap();
        assert_eq!(
            registry.export_item(&item, Some(&ctx)).unwrap(),
            ItemValue::Uint(1)
        );
        let item = ItemKey::parse("vfs.file.exists[text2.txt]").unwrap();
        assert_eq!(registry.export_item(&item, None).unwrap(), ItemValue::Uint(0));
    }

    #[test]
    fn test_registry_unknown_key() {
        let err = registry().export("system.cpu.load", &[], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKey);
    }

    #[test]
    fn test_registry_rejects_duplicate_keys() {
        let mut registry = registry();
        let err = registry
            .register(VfsFilePlugin::new(MockFs::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::DuplicateKey { ref plugin, .. } if plugin == "vfs.file"
        ));

        // The first registration is still in place.
        let params = vec!["text.txt".to_string()];
        assert_eq!(
            registry.export("vfs.file.exists", &params, None).unwrap(),
            ItemValue::Uint(1)
        );
    }

    #[test]
    fn test_registry_lists_metrics_sorted() {
        let registry = registry();
        let keys: Vec<&str> = registry.metrics().map(|(_, m)| m.key).collect();
        assert_eq!(
            keys,
            vec![
                "agent.ping",
                "vfs.file.contents",
                "vfs.file.exists",
                "vfs.file.size"
            ]
        );
        assert!(!registry.is_empty());
        assert!(Registry::new().is_empty());
    }
}
