//! Version 3 front controller
//!
//! Controllers no longer see the HTTP request: the front controller
//! flattens it into a [`ParamMap`], and each controller builds and returns
//! its own [`ModelView`].

mod controllers;

pub use controllers::{MemberFormControllerV3, MemberListControllerV3, MemberSaveControllerV3};

use std::collections::HashMap;
use std::sync::Arc;

use super::{actions, route, ModelView, ParamMap, RenderInstruction, Renderer, ViewResolver};
use crate::error::{Error, Result};
use crate::logger;
use crate::member::MemberRepository;

/// URL prefix served by this front controller
pub const PREFIX: &str = "/front-controller/v3/";

pub trait ControllerV3: Send + Sync {
    fn process(&self, params: &ParamMap) -> Result<ModelView>;
}

/// Entry point for every request under [`PREFIX`]
pub struct FrontControllerV3 {
    controllers: HashMap<String, Arc<dyn ControllerV3>>,
    resolver: ViewResolver,
}

impl FrontControllerV3 {
    /// Route table with the three member controllers
    pub fn new(repository: &Arc<MemberRepository>, resolver: ViewResolver) -> Self {
        let mut front = Self::empty(resolver);
        front.register(
            route(PREFIX, actions::NEW_FORM),
            Arc::new(MemberFormControllerV3),
        );
        front.register(
            route(PREFIX, actions::SAVE),
            Arc::new(MemberSaveControllerV3::new(Arc::clone(repository))),
        );
        front.register(
            route(PREFIX, actions::LIST),
            Arc::new(MemberListControllerV3::new(Arc::clone(repository))),
        );
        front
    }

    pub fn empty(resolver: ViewResolver) -> Self {
        Self {
            controllers: HashMap::new(),
            resolver,
        }
    }

    pub fn register(&mut self, path: impl Into<String>, controller: Arc<dyn ControllerV3>) {
        self.controllers.insert(path.into(), controller);
    }

    /// Run the controller registered for `path` and resolve its view
    pub fn dispatch(&self, path: &str, params: &ParamMap) -> Result<RenderInstruction> {
        let controller = self
            .controllers
            .get(path)
            .ok_or_else(|| Error::RouteNotFound {
                path: path.to_string(),
            })?;

        let model_view = controller.process(params)?;
        logger::log_dispatch(path, model_view.view_name(), model_view.model().len());

        let (view_name, model) = model_view.into_parts();
        Ok(RenderInstruction {
            view: self.resolver.resolve(&view_name),
            model,
        })
    }

    /// Dispatch and render in one pass
    pub async fn service(
        &self,
        path: &str,
        params: &ParamMap,
        renderer: &dyn Renderer,
    ) -> Result<String> {
        self.dispatch(path, params)?.render(renderer).await
    }
}
