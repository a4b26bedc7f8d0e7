use nodegroup_builder::{BoxError, FetchedLaunchTemplate, LaunchTemplateFetcher};
use nodegroup_model::LaunchTemplateRef;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves launch templates from memory, keyed by launch template id.
#[derive(Default)]
pub(crate) struct MockLaunchTemplates {
    templates: HashMap<String, FetchedLaunchTemplate>,
    fetches: Arc<AtomicUsize>,
}

impl MockLaunchTemplates {
    pub(crate) fn with_template<S: Into<String>>(
        mut self,
        id: S,
        template: FetchedLaunchTemplate,
    ) -> Self {
        self.templates.insert(id.into(), template);
        self
    }

    /// Counts the fetches made through this fetcher, also after it was handed over to
    /// `Providers`.
    pub(crate) fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait::async_trait]
impl LaunchTemplateFetcher for MockLaunchTemplates {
    async fn fetch(
        &self,
        launch_template: &LaunchTemplateRef,
    ) -> Result<FetchedLaunchTemplate, BoxError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.templates
            .get(&launch_template.id)
            .cloned()
            .ok_or_else(|| format!("launch template '{}' not found", launch_template.id).into())
    }
}
