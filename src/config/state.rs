// Application state module
// Holds everything a request needs, built once at startup and shared read-only

use std::sync::Arc;

use super::types::Config;
use crate::frontcontroller::v3::FrontControllerV3;
use crate::frontcontroller::v4::FrontControllerV4;
use crate::frontcontroller::{Renderer, TeraRenderer, ViewResolver};
use crate::member::MemberRepository;

/// Application state
pub struct AppState {
    pub config: Config,
    pub repository: Arc<MemberRepository>,
    pub front_v3: FrontControllerV3,
    pub front_v4: FrontControllerV4,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Build both route tables over one member store, rendering with Tera
    pub fn new(config: &Config) -> Self {
        let renderer = Arc::new(TeraRenderer::new(config.views.autoescape));
        Self::with_renderer(config, renderer)
    }

    pub fn with_renderer(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
        let repository = Arc::new(MemberRepository::new());
        let resolver = ViewResolver::from_config(&config.views);

        Self {
            config: config.clone(),
            front_v3: FrontControllerV3::new(&repository, resolver.clone()),
            front_v4: FrontControllerV4::new(&repository, resolver),
            repository,
            renderer,
        }
    }
}
