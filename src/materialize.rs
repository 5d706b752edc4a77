//! # Template Materializer
//!
//! Builds a frontend project from a local templates root by copying a fixed
//! sequence of layers into the workspace. Each layer may overwrite files
//! placed by the layers before it:
//!
//! 1. `raw-templates/template-<framework>`, the framework's own starter,
//!    minus the files the framework lists as raw exceptions
//! 2. `updated-files/common/template-<framework>`
//! 3. `updated-files/<product>/template-<framework>`
//! 4. `updated-files/<product>/common`
//!
//! `package.json` never goes through a plain copy. The fragments found in
//! layers 1, 3 and 4 are deep-merged in that order and written with the
//! workspace package name.
//!
//! Only the raw layer is mandatory. Missing override layers are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::framework::Framework;
use crate::fsops;
use crate::workspace::Workspace;

const PACKAGE_JSON: &str = "package.json";

/// Marker that hides a top-level file name in the templates root, e.g.
/// `_gitignore` is materialized as `gitignore`.
const RESERVED_PREFIX: char = '_';

/// One directory copied into the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub source: PathBuf,
    /// Paths relative to `source` that are not copied
    pub ignore: Vec<PathBuf>,
    /// Whether a missing `source` is an error rather than a skipped layer
    pub required: bool,
}

impl Layer {
    fn new(source: PathBuf, ignore: &[&str], required: bool) -> Self {
        Self {
            source,
            ignore: ignore.iter().map(PathBuf::from).collect(),
            required,
        }
    }

    fn ignore_paths(&self) -> Vec<PathBuf> {
        self.ignore.iter().map(|path| self.source.join(path)).collect()
    }
}

/// Locations of the template layers for one framework and product.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub framework: Framework,
    pub templates_root: PathBuf,
    pub product: String,
}

impl TemplateSource {
    pub fn new(framework: Framework, templates_root: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self {
            framework,
            templates_root: templates_root.into(),
            product: product.into(),
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.templates_root
            .join("raw-templates")
            .join(self.framework.template_dir_name())
    }

    pub fn common_dir(&self) -> PathBuf {
        self.templates_root
            .join("updated-files")
            .join("common")
            .join(self.framework.template_dir_name())
    }

    pub fn product_dir(&self) -> PathBuf {
        self.templates_root
            .join("updated-files")
            .join(&self.product)
            .join(self.framework.template_dir_name())
    }

    pub fn product_common_dir(&self) -> PathBuf {
        self.templates_root
            .join("updated-files")
            .join(&self.product)
            .join("common")
    }

    /// The layers in the order they are applied.
    pub fn layers(&self) -> Vec<Layer> {
        let mut raw_ignore = self.framework.info().raw_exceptions.to_vec();
        if !raw_ignore.contains(&PACKAGE_JSON) {
            raw_ignore.push(PACKAGE_JSON);
        }
        vec![
            Layer::new(self.raw_dir(), &raw_ignore, true),
            Layer::new(self.common_dir(), &[PACKAGE_JSON], false),
            Layer::new(self.product_dir(), &[PACKAGE_JSON], false),
            Layer::new(self.product_common_dir(), &[PACKAGE_JSON], false),
        ]
    }

    /// Sources of `package.json` fragments, lowest precedence first.
    pub fn package_json_sources(&self) -> [PathBuf; 3] {
        [
            self.raw_dir().join(PACKAGE_JSON),
            self.product_dir().join(PACKAGE_JSON),
            self.product_common_dir().join(PACKAGE_JSON),
        ]
    }
}

/// Recursively merge `source` into `target`.
///
/// Object values recurse (a non-object target is replaced by an empty object
/// first); every other source value replaces the target value outright,
/// arrays included.
pub fn deep_merge(target: &mut JsonValue, source: JsonValue) {
    let JsonValue::Object(source_map) = source else {
        *target = source;
        return;
    };
    if !target.is_object() {
        *target = JsonValue::Object(Map::new());
    }
    if let JsonValue::Object(target_map) = target {
        for (key, value) in source_map {
            if value.is_object() {
                let nested = target_map
                    .entry(key)
                    .or_insert_with(|| JsonValue::Object(Map::new()));
                deep_merge(nested, value);
            } else {
                target_map.insert(key, value);
            }
        }
    }
}

fn read_json_or_empty(path: &Path) -> Result<JsonValue> {
    if !path.is_file() {
        debug!("No package.json fragment at {}", path.display());
        return Ok(JsonValue::Object(Map::new()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Merge the `package.json` fragments of `source` and stamp `package_name`.
pub fn merge_package_json(source: &TemplateSource, package_name: &str) -> Result<JsonValue> {
    let mut merged = JsonValue::Object(Map::new());
    for path in source.package_json_sources() {
        deep_merge(&mut merged, read_json_or_empty(&path)?);
    }
    if let JsonValue::Object(map) = &mut merged {
        map.insert("name".to_string(), JsonValue::String(package_name.to_string()));
    }
    Ok(merged)
}

/// Copy the top-level entries of `layer` into `dest`, renaming reserved names.
fn apply_layer(layer: &Layer, dest: &Path) -> Result<()> {
    let ignore = layer.ignore_paths();
    let mut entries = fs::read_dir(&layer.source)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let target_name = name.strip_prefix(RESERVED_PREFIX).unwrap_or(&name);
        fsops::copy_entry(&entry.path(), &dest.join(target_name), &ignore)?;
    }
    Ok(())
}

/// Materialize the framework template described by `source` into the
/// workspace's frontend directory.
pub fn materialize(source: &TemplateSource, workspace: &Workspace) -> Result<()> {
    let dest = workspace.frontend_dir()?;
    if workspace.uses_subfolders() {
        debug!("Creating frontend folder {}", dest.display());
    }
    fs::create_dir_all(&dest)?;

    for layer in source.layers() {
        if !layer.source.is_dir() {
            if layer.required {
                return Err(Error::TemplateNotFound {
                    framework: source.framework.to_string(),
                    path: layer.source.display().to_string(),
                });
            }
            debug!("Skipping missing layer {}", layer.source.display());
            continue;
        }
        info!("Copying {}", layer.source.display());
        apply_layer(&layer, &dest)?;
    }

    let package = merge_package_json(source, workspace.package_name())?;
    let content = serde_json::to_string_pretty(&package)? + "\n";
    fs::write(dest.join(PACKAGE_JSON), content)?;
    debug!("Wrote merged package.json for {}", workspace.package_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Defaults;
    use crate::workspace::{InitOptions, PackageManager};
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn workspace(cwd: &Path) -> Workspace {
        let mut ws = Workspace::new(cwd, PackageManager::default());
        let options = InitOptions {
            target_dir: Some("app".to_string()),
            overwrite: None,
            default_target_dir: "openfort-project".to_string(),
        };
        ws.initialize(&options, &Defaults::default()).unwrap();
        ws
    }

    #[test]
    fn test_deep_merge_nested_right_biased() {
        let mut target = json!({"a": {"x": 1, "y": 2}});
        deep_merge(&mut target, json!({"a": {"y": 3}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 3}}));
    }

    #[test]
    fn test_deep_merge_arrays_replaced() {
        let mut target = json!({"files": ["a", "b"], "keep": true});
        deep_merge(&mut target, json!({"files": ["c"]}));
        assert_eq!(target, json!({"files": ["c"], "keep": true}));
    }

    #[test]
    fn test_deep_merge_object_over_scalar() {
        let mut target = json!({"scripts": "none"});
        deep_merge(&mut target, json!({"scripts": {"dev": "vite"}}));
        assert_eq!(target, json!({"scripts": {"dev": "vite"}}));
    }

    #[test]
    fn test_deep_merge_null_replaces() {
        let mut target = json!({"private": true});
        deep_merge(&mut target, json!({"private": null}));
        assert_eq!(target, json!({"private": null}));
    }

    #[test]
    fn test_layers_order_and_ignores() {
        let source = TemplateSource::new(Framework::Vite, "/t", "openfortkit");
        let layers = source.layers();

        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].source, PathBuf::from("/t/raw-templates/template-vite"));
        assert!(layers[0].required);
        assert!(layers[0].ignore.contains(&PathBuf::from("src/App.tsx")));
        assert_eq!(layers[1].source, PathBuf::from("/t/updated-files/common/template-vite"));
        assert_eq!(
            layers[2].source,
            PathBuf::from("/t/updated-files/openfortkit/template-vite")
        );
        assert_eq!(layers[3].source, PathBuf::from("/t/updated-files/openfortkit/common"));
        for layer in &layers[1..] {
            assert!(!layer.required);
            assert_eq!(layer.ignore, vec![PathBuf::from("package.json")]);
        }
    }

    #[test]
    fn test_materialize_missing_raw_template() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path());
        let source = TemplateSource::new(Framework::NextJs, temp.path().join("templates"), "openfortkit");

        let err = materialize(&source, &ws).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { ref framework, .. } if framework == "nextjs"));
    }

    #[test]
    fn test_materialize_layers_override_and_rename() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("templates");
        let raw = root.join("raw-templates/template-vite");
        write(&raw.join("index.html"), "raw index");
        write(&raw.join("src/main.tsx"), "raw main");
        write(&raw.join("src/App.tsx"), "raw app");
        write(&raw.join("_gitignore"), "node_modules");
        write(&raw.join("package.json"), r#"{"name":"raw","scripts":{"dev":"vite","build":"vite build"}}"#);
        write(&root.join("updated-files/common/template-vite/src/main.tsx"), "common main");
        write(&root.join("updated-files/openfortkit/template-vite/src/App.tsx"), "kit app");
        write(
            &root.join("updated-files/openfortkit/template-vite/package.json"),
            r#"{"dependencies":{"@openfort/react":"^1.0.0"},"scripts":{"dev":"vite --port 5173"}}"#,
        );
        write(&root.join("updated-files/openfortkit/common/src/_providers.tsx"), "providers");
        write(
            &root.join("updated-files/openfortkit/common/package.json"),
            r#"{"dependencies":{"wagmi":"^2.0.0"}}"#,
        );

        let ws = workspace(temp.path());
        let source = TemplateSource::new(Framework::Vite, &root, "openfortkit");
        materialize(&source, &ws).unwrap();

        let app = temp.path().join("app");
        assert_eq!(fs::read_to_string(app.join("index.html")).unwrap(), "raw index");
        assert_eq!(fs::read_to_string(app.join("src/main.tsx")).unwrap(), "common main");
        assert_eq!(fs::read_to_string(app.join("src/App.tsx")).unwrap(), "kit app");
        assert_eq!(fs::read_to_string(app.join("gitignore")).unwrap(), "node_modules");
        // Only top-level names are renamed
        assert!(app.join("src/_providers.tsx").exists());

        let content = fs::read_to_string(app.join("package.json")).unwrap();
        assert!(content.ends_with("}\n"));
        let package: JsonValue = serde_json::from_str(&content).unwrap();
        assert_eq!(
            package,
            json!({
                "name": "app",
                "scripts": {"dev": "vite --port 5173", "build": "vite build"},
                "dependencies": {"@openfort/react": "^1.0.0", "wagmi": "^2.0.0"}
            })
        );
    }

    #[test]
    fn test_materialize_into_frontend_subfolder() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("templates");
        write(&root.join("raw-templates/template-nextjs/app/page.tsx"), "page");

        let mut ws = workspace(temp.path());
        ws.enable_subfolders();
        let source = TemplateSource::new(Framework::NextJs, &root, "openfortkit");
        materialize(&source, &ws).unwrap();

        let frontend = temp.path().join("app/frontend");
        assert!(frontend.join("app/page.tsx").exists());
        let package: JsonValue =
            serde_json::from_str(&fs::read_to_string(frontend.join("package.json")).unwrap()).unwrap();
        assert_eq!(package, json!({"name": "app"}));
    }
}
