use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::{no_escape, Handlebars};
use tracing::{debug, warn};

use crate::core::errors::{ReportError, Result};

pub(super) const LATEX_TABLE_TEMPLATE_NAME: &str = "latex_table";

const DEFAULT_LATEX_TABLE: &str = r"\begin{table}[t]
\centering
\caption{ {{caption}} }
\begin{tabular}{ {{column_spec}} }
\toprule
{{#each headers}}{{#unless @first}} & {{/unless}}{{this}}{{/each}} \\
\midrule
{{#each rows}}{{#each this}}{{#unless @first}} & {{/unless}}{{this}}{{/each}} \\
{{/each}}\bottomrule
\end{tabular}
\end{table}
";

/// Build a template registry holding the built-in templates.
///
/// Escaping is disabled: LaTeX escaping is applied to cell text before
/// rendering, and HTML entities would corrupt the output.
pub(super) fn build_registry() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(LATEX_TABLE_TEMPLATE_NAME, DEFAULT_LATEX_TABLE)?;
    Ok(handlebars)
}

pub(super) fn load_templates_from_dir(
    handlebars: &mut Handlebars<'static>,
    templates_dir: &Path,
) -> Result<()> {
    let entries = fs::read_dir(templates_dir).map_err(|e| {
        ReportError::io(
            format!("Failed to read templates directory {}", templates_dir.display()),
            e,
        )
    })?;

    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.extension().and_then(|s| s.to_str()) != Some("hbs") {
            continue;
        }
        let Some(template_name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping template with non UTF-8 name: {}", path.display());
            continue;
        };

        let template_content = fs::read_to_string(&path)?;
        handlebars.register_template_string(template_name, template_content)?;
        debug!("Registered template '{}' from {}", template_name, path.display());
    }

    Ok(())
}

pub(super) fn detect_templates_dir() -> Option<PathBuf> {
    if let Ok(custom_root) = env::var("KELPIE_TEMPLATE_ROOT") {
        let path = PathBuf::from(custom_root);
        if path.exists() {
            return Some(path);
        }
    }

    env::current_dir()
        .ok()
        .map(|cwd| cwd.join("templates"))
        .filter(|path| path.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn builtin_latex_template_renders_rows() {
        let handlebars = build_registry().unwrap();
        let rendered = handlebars
            .render(
                LATEX_TABLE_TEMPLATE_NAME,
                &json!({
                    "caption": "Results",
                    "column_spec": "lr",
                    "headers": ["Model", "H@1"],
                    "rows": [["ComplEx", "0.500"], ["TransE", "0.250"]],
                }),
            )
            .unwrap();

        assert!(rendered.contains(r"\begin{tabular}{ lr }"));
        assert!(rendered.contains(r"Model & H@1 \\"));
        assert!(rendered.contains(r"TransE & 0.250 \\"));
    }

    #[test]
    fn directory_templates_override_builtins() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("latex_table.hbs"),
            "{{caption}}: {{#each headers}}[{{this}}]{{/each}}",
        )
        .unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let mut handlebars = build_registry().unwrap();
        load_templates_from_dir(&mut handlebars, temp.path()).unwrap();

        let rendered = handlebars
            .render(
                LATEX_TABLE_TEMPLATE_NAME,
                &json!({"caption": "T", "column_spec": "l", "headers": ["a", "b"], "rows": []}),
            )
            .unwrap();
        assert_eq!(rendered, "T: [a][b]");
    }
}
