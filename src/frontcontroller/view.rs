//! View resolution and rendering
//!
//! A logical view name becomes a physical template path by plain string
//! concatenation. Whether the template exists is only discovered when the
//! view loads it, which happens asynchronously with `tokio::fs`; the
//! renderer then works on the source text alone.

use tera::{Context, Tera};

use super::Model;
use crate::config::ViewsConfig;
use crate::error::{Error, Result};

/// A physical template path, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyView {
    path: String,
}

impl MyView {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read the template source from disk
    pub async fn load(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::TemplateRead {
                path: self.path.clone(),
                source,
            })
    }

    pub async fn render(&self, model: &Model, renderer: &dyn Renderer) -> Result<String> {
        let source = self.load().await?;
        renderer.render(self, &source, model)
    }
}

/// Maps logical view names to template paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewResolver {
    prefix: String,
    suffix: String,
}

impl ViewResolver {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &ViewsConfig) -> Self {
        Self::new(&config.template_root, &config.template_suffix)
    }

    pub fn resolve(&self, view_name: &str) -> MyView {
        MyView::new(format!("{}{view_name}{}", self.prefix, self.suffix))
    }
}

/// Turns a model and a loaded template into a response body
///
/// `view` only names the template for error reporting.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &MyView, source: &str, model: &Model) -> Result<String>;
}

/// Renders template source with the Tera engine
///
/// Templates are compiled on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct TeraRenderer {
    autoescape: bool,
}

impl TeraRenderer {
    pub const fn new(autoescape: bool) -> Self {
        Self { autoescape }
    }
}

impl Default for TeraRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, view: &MyView, source: &str, model: &Model) -> Result<String> {
        let context = Context::from_serialize(model).map_err(|source| Error::TemplateRender {
            path: view.path().to_string(),
            source,
        })?;
        Tera::one_off(source, &context, self.autoescape).map_err(|source| Error::TemplateRender {
            path: view.path().to_string(),
            source,
        })
    }
}

/// Outcome of a successful dispatch: the resolved view and its model
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstruction {
    pub view: MyView,
    pub model: Model,
}

impl RenderInstruction {
    /// Render once and hand back the body
    pub async fn render(&self, renderer: &dyn Renderer) -> Result<String> {
        self.view.render(&self.model, renderer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "front_controller_view_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_concatenates_prefix_and_suffix() {
        let resolver = ViewResolver::new("/WEB-INF/views/", ".jsp");
        assert_eq!(
            resolver.resolve("members").path(),
            "/WEB-INF/views/members.jsp"
        );
        assert_eq!(resolver.resolve("members"), resolver.resolve("members"));
    }

    #[test]
    fn test_resolve_does_not_check_existence() {
        let resolver = ViewResolver::new("no/such/dir/", ".html");
        assert_eq!(resolver.resolve("ghost").path(), "no/such/dir/ghost.html");
    }

    #[test]
    fn test_resolver_from_config() {
        let config = ViewsConfig {
            template_root: "templates/".to_string(),
            template_suffix: ".html".to_string(),
            autoescape: true,
        };
        let resolver = ViewResolver::from_config(&config);
        assert_eq!(resolver.resolve("new-form").path(), "templates/new-form.html");
    }

    #[tokio::test]
    async fn test_tera_renderer_uses_model() {
        let dir = scratch_dir("render");
        let path = dir.join("greet.html");
        std::fs::write(&path, "Hello {{ name }}! <{{ tag }}>").unwrap();

        let mut model = Model::new();
        model.put("name", "alice").unwrap();
        model.put("tag", "<b>").unwrap();

        let view = MyView::new(path.to_string_lossy());
        let html = view.render(&model, &TeraRenderer::default()).await.unwrap();
        assert_eq!(html, "Hello alice! <&lt;b&gt;>");
    }

    #[tokio::test]
    async fn test_instruction_loads_template_on_each_render() {
        let dir = scratch_dir("reload");
        let path = dir.join("count.html");
        std::fs::write(&path, "{{ items | length }} items").unwrap();

        let mut model = Model::new();
        model.put("items", vec![1, 2, 3]).unwrap();
        let instruction = RenderInstruction {
            view: MyView::new(path.to_string_lossy()),
            model,
        };
        let renderer = TeraRenderer::default();
        assert_eq!(instruction.render(&renderer).await.unwrap(), "3 items");

        // Edits on disk show up without a restart
        std::fs::write(&path, "total: {{ items | length }}").unwrap();
        assert_eq!(instruction.render(&renderer).await.unwrap(), "total: 3");
    }

    #[tokio::test]
    async fn test_missing_template_fails_to_load() {
        let dir = scratch_dir("missing");
        let view = MyView::new(dir.join("absent.html").to_string_lossy());
        let err = view.load().await.unwrap_err();
        assert!(matches!(err, Error::TemplateRead { .. }));

        let err = view
            .render(&Model::new(), &TeraRenderer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TemplateRead { .. }));
    }

    #[test]
    fn test_tera_renderer_template_error() {
        let view = MyView::new("broken.html");
        let err = TeraRenderer::default()
            .render(&view, "{{ unknown_variable }}", &Model::new())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateRender { ref path, .. } if path == "broken.html"));
    }

    #[test]
    fn test_tera_renderer_without_autoescape() {
        let mut model = Model::new();
        model.put("tag", "<b>").unwrap();
        let html = TeraRenderer::new(false)
            .render(&MyView::new("raw.html"), "{{ tag }}", &model)
            .unwrap();
        assert_eq!(html, "<b>");
    }
}
