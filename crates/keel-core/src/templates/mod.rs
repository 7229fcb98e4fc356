//! HTML templates rendered by the error dispatcher and by handlers.
//!
//! Every `*.html` file under the template root is registered under its path
//! relative to the root, without extension (`site/404.html` is `site/404`).
//! Output is always auto-escaped.
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::utils::fs::{find_files_with_extension, relative_stem};

/// Extension of template files
pub const TEMPLATE_EXTENSION: &str = "html";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template folder '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to read template '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse templates: {0}")]
    Parse(#[from] tera::Error),

    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

/// Functions callable from templates, keyed by name.
#[derive(Clone, Default)]
pub struct TemplateFunctions {
    functions: HashMap<String, Arc<dyn tera::Function>>,
}

impl fmt::Debug for TemplateFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFunctions")
            .field("names", &self.names())
            .finish()
    }
}

impl TemplateFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: tera::Function + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// A compiled set of templates.
pub struct TemplateSet {
    tera: Tera,
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("templates", &self.names())
            .finish()
    }
}

impl TemplateSet {
    /// Empty set with `functions` registered.
    pub fn new(functions: &TemplateFunctions) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![""]);
        for (name, function) in &functions.functions {
            let function = Arc::clone(function);
            tera.register_function(name, move |args: &HashMap<String, tera::Value>| {
                function.call(args)
            });
        }
        Self { tera }
    }

    /// Parse every template under `root` into the set.
    ///
    /// On a parse failure the templates parsed before the failing one stay
    /// in the set.
    pub fn load_dir(&mut self, root: &Path) -> Result<usize, TemplateError> {
        if !root.is_dir() {
            return Err(TemplateError::MissingRoot(root.to_path_buf()));
        }

        let files = find_files_with_extension(root, TEMPLATE_EXTENSION).map_err(|source| {
            TemplateError::Io {
                path: root.to_path_buf(),
                source,
            }
        })?;

        let mut sources = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = relative_stem(root, &file) else {
                continue;
            };
            let content = std::fs::read_to_string(&file).map_err(|source| TemplateError::Io {
                path: file.clone(),
                source,
            })?;
            sources.push((name, content));
        }

        let count = sources.len();
        self.tera.add_raw_templates(sources)?;
        Ok(count)
    }

    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: name.to_string(),
            source,
        };
        let context = tera::Context::from_serialize(context).map_err(render_error)?;
        self.tera.render(name, &context).map_err(render_error)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tera.get_template_names().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::new(&TemplateFunctions::default())
    }
}
