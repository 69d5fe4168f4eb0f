//! HTML templates.
//!
//! The pages ship inside the binary. A directory given through
//! `TEMPLATES_DIR` may override any of them by file name.

use std::fs;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};

const BUILTIN: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("post.html", include_str!("../templates/post.html")),
    ("make-post.html", include_str!("../templates/make-post.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Compiled page templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates compiled into the binary.
    pub fn builtin() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN.iter().copied())?;
        Ok(Self { tera })
    }

    /// Built-in templates, with any `*.html` file under `dir` taking precedence.
    pub fn load(dir: Option<&Path>) -> Result<Self, tera::Error> {
        let builtin = Self::builtin()?;
        let Some(dir) = dir else {
            return Ok(builtin);
        };

        let overrides = override_files(dir)?;
        let overridden = overrides.len();
        let mut tera = builtin.tera;
        // Adding rebuilds every inheritance chain, so an override may extend a built-in.
        tera.add_template_files(overrides)?;

        tracing::info!(
            dir = %dir.display(),
            overridden,
            "Loaded template overrides"
        );
        Ok(Self { tera })
    }

    #[cfg(test)]
    fn has(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }
}

/// `*.html` files directly under `dir`, each named by its file name.
fn override_files(dir: &Path) -> Result<Vec<(PathBuf, Option<String>)>, tera::Error> {
    let entries = fs::read_dir(dir)
        .map_err(|e| tera::Error::chain(format!("cannot read {}", dir.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| tera::Error::chain(format!("cannot read {}", dir.display()), e))?
            .path();
        let is_html = path.extension().is_some_and(|ext| ext == "html");
        let name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
        if let (true, Some(name)) = (is_html && path.is_file(), name) {
            files.push((path, Some(name)));
        }
    }
    Ok(files)
}
