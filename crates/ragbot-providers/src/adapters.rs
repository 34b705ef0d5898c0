//! Vendor → adapter lookup.
//!
//! Every supported vendor gets an adapter, configured or not: a missing key
//! surfaces as `AuthMissing` from `complete`, not as a gap in the table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use ragbot_core::config::ProvidersConfig;
use ragbot_core::Vendor;

use crate::claude::ClaudeAdapter;
use crate::gemini::GeminiAdapter;
use crate::openai_compat::OpenAiCompatAdapter;
use crate::registry::{ProviderSpec, WireFormat, PROVIDERS};
use crate::traits::ProviderAdapter;

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    by_vendor: HashMap<Vendor, Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut vendors: Vec<&str> = self.by_vendor.keys().map(|v| v.as_str()).collect();
        vendors.sort_unstable();
        f.debug_struct("AdapterRegistry").field("vendors", &vendors).finish()
    }
}

impl AdapterRegistry {
    /// Build one adapter per entry in [`PROVIDERS`].
    pub fn from_config(providers: &ProvidersConfig, timeout: Duration) -> anyhow::Result<Self> {
        let mut adapters = Self::default();
        for spec in PROVIDERS.iter() {
            let adapter = build_adapter(spec, providers, timeout)?;
            debug!(
                provider = spec.display_name(),
                model = adapter.model(),
                "Creating LLM adapter"
            );
            adapters.insert(adapter);
        }
        Ok(adapters)
    }

    /// Register (or replace) the adapter for its vendor.
    pub fn insert(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.by_vendor.insert(adapter.vendor(), adapter);
    }

    pub fn get(&self, vendor: Vendor) -> Option<Arc<dyn ProviderAdapter>> {
        self.by_vendor.get(&vendor).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_vendor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vendor.is_empty()
    }
}

fn build_adapter(
    spec: &'static ProviderSpec,
    providers: &ProvidersConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn ProviderAdapter>> {
    let config = providers.get(spec.vendor);
    Ok(match spec.wire {
        WireFormat::OpenAiChat => Arc::new(OpenAiCompatAdapter::new(spec, config, timeout)?),
        WireFormat::Gemini => Arc::new(GeminiAdapter::new(spec, config, timeout)?),
        WireFormat::Anthropic => Arc::new(ClaudeAdapter::new(spec, config, timeout)?),
    })
}
