//! Version 4 front controller
//!
//! The front controller creates the [`Model`] and lends it to the
//! controller, which fills it and answers with a logical view name only.

mod controllers;

pub use controllers::{MemberFormControllerV4, MemberListControllerV4, MemberSaveControllerV4};

use std::collections::HashMap;
use std::sync::Arc;

use super::{actions, route, Model, ParamMap, RenderInstruction, Renderer, ViewResolver};
use crate::error::{Error, Result};
use crate::logger;
use crate::member::MemberRepository;

/// URL prefix served by this front controller
pub const PREFIX: &str = "/front-controller/v4/";

pub trait ControllerV4: Send + Sync {
    /// Fill `model` and return the logical view name
    fn process(&self, params: &ParamMap, model: &mut Model) -> Result<String>;
}

/// Entry point for every request under [`PREFIX`]
pub struct FrontControllerV4 {
    controllers: HashMap<String, Arc<dyn ControllerV4>>,
    resolver: ViewResolver,
}

impl FrontControllerV4 {
    pub fn new(repository: &Arc<MemberRepository>, resolver: ViewResolver) -> Self {
        let mut front = Self::empty(resolver);
        front.register(
            route(PREFIX, actions::NEW_FORM),
            Arc::new(MemberFormControllerV4),
        );
        front.register(
            route(PREFIX, actions::SAVE),
            Arc::new(MemberSaveControllerV4::new(Arc::clone(repository))),
        );
        front.register(
            route(PREFIX, actions::LIST),
            Arc::new(MemberListControllerV4::new(Arc::clone(repository))),
        );
        front
    }

    pub fn empty(resolver: ViewResolver) -> Self {
        Self {
            controllers: HashMap::new(),
            resolver,
        }
    }

    pub fn register(&mut self, path: impl Into<String>, controller: Arc<dyn ControllerV4>) {
        self.controllers.insert(path.into(), controller);
    }

    pub fn dispatch(&self, path: &str, params: &ParamMap) -> Result<RenderInstruction> {
        let controller = self
            .controllers
            .get(path)
            .ok_or_else(|| Error::RouteNotFound {
                path: path.to_string(),
            })?;

        let mut model = Model::new();
        let view_name = controller.process(params, &mut model)?;
        logger::log_dispatch(path, &view_name, model.len());

        Ok(RenderInstruction {
            view: self.resolver.resolve(&view_name),
            model,
        })
    }

    pub async fn service(
        &self,
        path: &str,
        params: &ParamMap,
        renderer: &dyn Renderer,
    ) -> Result<String> {
        self.dispatch(path, params)?.render(renderer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontcontroller::testing::{scratch_resolver, RecordingRenderer};
    use crate::frontcontroller::{keys, views};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Checks it always receives a fresh model, then marks it
    #[derive(Default)]
    struct MarkingController {
        seen_non_empty: AtomicUsize,
    }

    impl ControllerV4 for MarkingController {
        fn process(&self, params: &ParamMap, model: &mut Model) -> Result<String> {
            if !model.is_empty() {
                self.seen_non_empty.fetch_add(1, Ordering::SeqCst);
            }
            model.put("marker", params.get("value"))?;
            Ok("marked".to_string())
        }
    }

    fn resolver() -> ViewResolver {
        ViewResolver::new("views/", ".html")
    }

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_controller_gets_fresh_model_and_render_sees_its_writes() {
        let (resolver, prefix) = scratch_resolver("v4_mark", &["marked"]);
        let controller = Arc::new(MarkingController::default());
        let mut front = FrontControllerV4::empty(resolver);
        front.register("/mark", Arc::clone(&controller) as Arc<dyn ControllerV4>);
        let renderer = RecordingRenderer::default();

        front
            .service("/mark", &params(&[("value", "one")]), &renderer)
            .await
            .unwrap();
        front
            .service("/mark", &params(&[("value", "two")]), &renderer)
            .await
            .unwrap();

        assert_eq!(controller.seen_non_empty.load(Ordering::SeqCst), 0);
        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, format!("{prefix}marked.html"));
        assert_eq!(calls[0].1.get("marker"), Some(&json!("one")));
        assert_eq!(calls[1].1.get("marker"), Some(&json!("two")));
        assert_eq!(calls[1].1.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_without_render() {
        let repo = Arc::new(MemberRepository::new());
        let front = FrontControllerV4::new(&repo, resolver());
        let renderer = RecordingRenderer::default();

        for path in ["/front-controller/v4/nope", "/front-controller/v3/members"] {
            let err = front
                .service(path, &ParamMap::new(), &renderer)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::RouteNotFound { .. }));
        }
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registered_routes_resolve_to_their_views() {
        let repo = Arc::new(MemberRepository::new());
        let front = FrontControllerV4::new(&repo, resolver());

        let form = front
            .dispatch("/front-controller/v4/members/new-form", &ParamMap::new())
            .unwrap();
        assert_eq!(form.view.path(), "views/new-form.html");
        assert!(form.model.is_empty());

        let list = front
            .dispatch("/front-controller/v4/members", &ParamMap::new())
            .unwrap();
        assert_eq!(list.view.path(), "views/members.html");
        assert_eq!(list.model.get(keys::MEMBERS), Some(&json!([])));
    }

    #[test]
    fn test_save_then_list() {
        let repo = Arc::new(MemberRepository::new());
        let front = FrontControllerV4::new(&repo, resolver());

        let saved = front
            .dispatch(
                "/front-controller/v4/members/save",
                &params(&[("username", "alice"), ("age", "30")]),
            )
            .unwrap();
        assert_eq!(saved.view.path(), format!("views/{}.html", views::SAVE_RESULT));
        assert_eq!(
            saved.model.get(keys::MEMBER),
            Some(&json!({"id": 1, "username": "alice", "age": 30}))
        );

        front
            .dispatch(
                "/front-controller/v4/members/save",
                &params(&[("username", "bob"), ("age", "25")]),
            )
            .unwrap();

        let list = front
            .dispatch("/front-controller/v4/members", &ParamMap::new())
            .unwrap();
        assert_eq!(
            list.model.get(keys::MEMBERS),
            Some(&json!([
                {"id": 1, "username": "alice", "age": 30},
                {"id": 2, "username": "bob", "age": 25}
            ]))
        );
    }

    #[test]
    fn test_save_without_username() {
        let repo = Arc::new(MemberRepository::new());
        let front = FrontControllerV4::new(&repo, resolver());

        let err = front
            .dispatch(
                "/front-controller/v4/members/save",
                &params(&[("age", "30")]),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("username")));
        assert!(repo.find_all().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_through_service() {
        const CALLERS: usize = 32;
        let (resolver, _) = scratch_resolver("v4_concurrent", &[views::SAVE_RESULT]);
        let repo = Arc::new(MemberRepository::new());
        let front = Arc::new(FrontControllerV4::new(&repo, resolver));
        let renderer = Arc::new(RecordingRenderer::default());

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..CALLERS {
            let (front, renderer) = (Arc::clone(&front), Arc::clone(&renderer));
            tasks.spawn(async move {
                let name = format!("user{i}");
                front
                    .service(
                        "/front-controller/v4/members/save",
                        &params(&[("username", name.as_str()), ("age", "20")]),
                        renderer.as_ref(),
                    )
                    .await
                    .unwrap();
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        assert_eq!(repo.find_all().len(), CALLERS);
        assert_eq!(renderer.calls.lock().unwrap().len(), CALLERS);
    }
}
