//! Front controller module
//!
//! One entry point per protocol version looks up the controller for the
//! request path, lets it fill a model and pick a logical view name, then
//! resolves that name to a template path and renders it.
//!
//! - `v3`: controllers return a [`ModelView`] they build themselves
//! - `v4`: the front controller owns the [`Model`] and passes it in;
//!   controllers return only the view name

pub mod model;
pub mod v3;
pub mod v4;
pub mod view;

pub use model::{Model, ModelView, ParamMap};
pub use view::{MyView, RenderInstruction, Renderer, TeraRenderer, ViewResolver};

/// Logical view names shared by both versions
pub mod views {
    pub const NEW_FORM: &str = "new-form";
    /// Target shown after a successful save
    pub const SAVE_RESULT: &str = "save-result";
    pub const MEMBERS: &str = "members";
}

/// Model keys shared by both versions
pub mod keys {
    pub const MEMBER: &str = "member";
    pub const MEMBERS: &str = "members";
}

/// Route path for `action` under a front controller prefix
pub(crate) fn route(prefix: &str, action: &str) -> String {
    format!("{prefix}{action}")
}

/// Actions registered by both front controllers, relative to their prefix
pub mod actions {
    pub const NEW_FORM: &str = "members/new-form";
    pub const SAVE: &str = "members/save";
    pub const LIST: &str = "members";
}

/// Whether `path` names a route that writes to the member store
pub fn changes_state(path: &str) -> bool {
    [v3::PREFIX, v4::PREFIX]
        .iter()
        .any(|prefix| path.strip_prefix(prefix) == Some(actions::SAVE))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Model, MyView, Renderer, ViewResolver};
    use crate::error::Result;

    /// Records every render call instead of producing HTML
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub calls: Mutex<Vec<(String, Model)>>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, view: &MyView, _source: &str, model: &Model) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((view.path().to_string(), model.clone()));
            Ok(view.path().to_string())
        }
    }

    /// Resolver over a scratch directory with an empty template per view.
    /// Returns the resolver and its path prefix.
    pub fn scratch_resolver(name: &str, view_names: &[&str]) -> (ViewResolver, String) {
        let dir = std::env::temp_dir().join(format!(
            "front_controller_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for view in view_names {
            std::fs::write(dir.join(format!("{view}.html")), "").unwrap();
        }
        let prefix = format!("{}/", dir.display());
        (ViewResolver::new(prefix.clone(), ".html"), prefix)
    }
}
