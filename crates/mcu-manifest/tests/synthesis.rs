//! End-to-end synthesis scenarios against throwaway node_modules trees

use mcu_manifest::{Manifest, ManifestBuilder, ManifestError, ModuleEntry, SequenceNames};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _root: TempDir,
    project: PathBuf,
    templates: PathBuf,
    out: PathBuf,
}

impl Workspace {
    fn new() -> Option<Self> {
        let root = TempDir::new().ok()?;
        let project = root.path().join("project");
        let templates = root.path().join("mcu_nodes");
        let out = root.path().join("out");
        fs::create_dir_all(project.join("node_modules")).ok()?;
        fs::create_dir_all(&templates).ok()?;
        Some(Workspace {
            _root: root,
            project,
            templates,
            out,
        })
    }

    fn package_dir(&self, name: &str) -> PathBuf {
        name.split('/')
            .fold(self.project.join("node_modules"), |dir, segment| dir.join(segment))
    }

    /// Write `node_modules/<name>/package.json` plus the given files.
    fn add_package(&self, name: &str, descriptor: Value, files: &[&str]) -> Option<PathBuf> {
        let dir = self.package_dir(name);
        fs::create_dir_all(&dir).ok()?;
        fs::write(
            dir.join("package.json"),
            serde_json::to_string_pretty(&descriptor).ok()?,
        )
        .ok()?;
        for file in files {
            let path = dir.join(file);
            fs::create_dir_all(path.parent()?).ok()?;
            fs::write(&path, "export default {};\n").ok()?;
        }
        Some(dir)
    }

    fn add_template(&self, name: &str, document: Value) -> Option<()> {
        let path = name
            .split('/')
            .fold(self.templates.clone(), |dir, segment| dir.join(segment))
            .join("manifest.json");
        fs::create_dir_all(path.parent()?).ok()?;
        fs::write(path, serde_json::to_string_pretty(&document).ok()?).ok()
    }

    fn builder(&self) -> Option<ManifestBuilder> {
        Some(
            ManifestBuilder::new(&self.templates)
                .ok()?
                .with_search_roots(vec![self.project.clone()]),
        )
    }

    fn out_manifest(&self, name: &str) -> PathBuf {
        ManifestBuilder::destination_for(name, &self.out)
    }

    /// Every file below the output directory with its contents.
    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![self.out.clone()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_link = path.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink());
                if path.is_dir() && !is_link {
                    pending.push(path);
                } else if is_link {
                    let target = fs::read_link(&path).unwrap_or_default();
                    files.insert(path, target.to_string_lossy().as_bytes().to_vec());
                } else {
                    files.insert(path.clone(), fs::read(&path).unwrap_or_default());
                }
            }
        }
        files
    }
}

fn load(path: &Path) -> Manifest {
    Manifest::load_from_path(path).unwrap_or_default()
}

fn module(manifest: &Manifest, alias: &str) -> Option<ModuleEntry> {
    manifest.modules.as_ref()?.get(alias).cloned()
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_leaf_package_end_to_end() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(leaf_dir) = ws.add_package("leaf", json!({ "name": "leaf" }), &["index.js"]) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    let result = builder.synthesize("leaf", &ws.out);
    assert!(result.is_ok_and(|p| p == Some(ws.out_manifest("leaf"))));

    let manifest = load(&ws.out_manifest("leaf"));
    assert_eq!(
        module(&manifest, "leaf"),
        Some(ModuleEntry::Single(path_string(&leaf_dir.join("index"))))
    );
    assert_eq!(
        manifest.include,
        Some(vec!["$(MCUMODULES)/require/manifest.json".to_string()])
    );
    assert_eq!(
        manifest.build.as_ref().and_then(|b| b.get("MCUMODULES")),
        Some(&path_string(&ws.templates))
    );
    assert_eq!(module(&manifest, "*"), Some(ModuleEntry::Multiple(Vec::new())));
    assert!(manifest
        .provenance
        .as_ref()
        .is_some_and(|p| p["npm"] == "leaf" && p.get("template").is_none()));
}

#[test]
fn test_dependency_cycle_terminates() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "a",
        json!({ "name": "a", "dependencies": { "b": "1.0.0" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(_) = ws.add_package(
        "b",
        json!({ "name": "b", "dependencies": { "a": "1.0.0" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("a", &ws.out).is_ok_and(|p| p.is_some()));

    let a = load(&ws.out_manifest("a"));
    let b = load(&ws.out_manifest("b"));
    let a_path = path_string(&ws.out_manifest("a"));
    let b_path = path_string(&ws.out_manifest("b"));
    assert!(a.include.as_ref().is_some_and(|inc| inc.contains(&b_path)));
    assert!(b.include.as_ref().is_some_and(|inc| inc.contains(&a_path)));
}

#[test]
fn test_generate_is_idempotent() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "app",
        json!({ "name": "app", "main": "lib/app.mjs", "dependencies": { "util": "*" } }),
        &["lib/app.mjs"],
    ) else {
        return;
    };
    let Some(_) = ws.add_package("util", json!({ "name": "util" }), &["index.js"]) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.generate("app", &ws.out).is_ok_and(|p| p.is_some()));
    let first = ws.snapshot();
    assert!(!first.is_empty());

    let Some(mut again) = ws.builder() else {
        return;
    };
    assert!(again
        .generate("app", &ws.out)
        .is_ok_and(|p| p == Some(ws.out_manifest("app"))));
    assert_eq!(ws.snapshot(), first);
}

#[test]
fn test_template_gates_module_entries() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package("foo", json!({ "name": "foo" }), &["index.js"]) else {
        return;
    };
    let Some(_) = ws.add_package("bar", json!({ "name": "bar" }), &["index.js"]) else {
        return;
    };
    let template = json!({ "//": { "template": { "modules": ["foo"] } } });
    let Some(()) = ws.add_template("foo", template.clone()) else {
        return;
    };
    let Some(()) = ws.add_template("bar", template) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("foo", &ws.out).is_ok_and(|p| p.is_some()));
    assert!(builder.synthesize("bar", &ws.out).is_ok_and(|p| p.is_some()));

    let foo = load(&ws.out_manifest("foo"));
    let bar = load(&ws.out_manifest("bar"));
    assert!(module(&foo, "foo").is_some());
    assert!(module(&bar, "bar").is_none());

    // Neither template permits MCUMODULES or the require include
    assert_eq!(foo.include, Some(Vec::new()));
    assert!(foo.build.as_ref().is_some_and(|b| b.is_empty()));
    assert!(!foo.is_template());
}

#[test]
fn test_template_sections_survive_seeding() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package("sensor", json!({ "name": "sensor" }), &["index.js"]) else {
        return;
    };
    let Some(()) = ws.add_template(
        "sensor",
        json!({
            "//": { "template": { "modules": ["*"], "build": ["MCUMODULES"] } },
            "include": ["$(MODDABLE)/modules/pins/i2c/manifest.json"],
            "preload": ["sensor"]
        }),
    ) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("sensor", &ws.out).is_ok_and(|p| p.is_some()));
    let manifest = load(&ws.out_manifest("sensor"));
    assert_eq!(
        manifest.include,
        Some(vec!["$(MODDABLE)/modules/pins/i2c/manifest.json".to_string()])
    );
    assert_eq!(manifest.preload, Some(vec!["sensor".to_string()]));
    assert!(manifest.build.as_ref().is_some_and(|b| b.contains_key("MCUMODULES")));
    assert!(module(&manifest, "sensor").is_some());
}

#[test]
fn test_template_gates_dependencies() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "hub",
        json!({ "name": "hub", "dependencies": { "wanted": "*", "unwanted": "*" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(_) = ws.add_package("wanted", json!({ "name": "wanted" }), &["index.js"]) else {
        return;
    };
    let Some(_) = ws.add_package("unwanted", json!({ "name": "unwanted" }), &["index.js"]) else {
        return;
    };
    let Some(()) = ws.add_template(
        "hub",
        json!({ "//": { "template": { "modules": ["*"], "include": ["wanted"] } } }),
    ) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("hub", &ws.out).is_ok_and(|p| p.is_some()));
    let hub = load(&ws.out_manifest("hub"));
    assert_eq!(hub.include, Some(vec![path_string(&ws.out_manifest("wanted"))]));
    assert!(!ws.out_manifest("unwanted").exists());
}

#[cfg(unix)]
#[test]
fn test_non_native_entry_gets_unique_alias() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(dir) = ws.add_package(
        "esm",
        json!({ "name": "esm", "exports": { "import": "./dist/index.mjs" } }),
        &["dist/index.mjs"],
    ) else {
        return;
    };
    let taken = ws.out.join("esm").join("index-mjs-AAAA.js");
    if fs::create_dir_all(ws.out.join("esm")).is_err() || fs::write(&taken, "occupied").is_err() {
        return;
    }
    let Some(builder) = ws.builder() else {
        return;
    };
    let mut builder = builder.with_name_provider(SequenceNames::new(["AAAA", "BBBB"]));

    assert!(builder.synthesize("esm", &ws.out).is_ok_and(|p| p.is_some()));

    let alias = ws.out.join("esm").join("index-mjs-BBBB.js");
    assert!(fs::read_link(&alias).is_ok_and(|t| t == dir.join("dist").join("index.mjs")));
    assert_eq!(fs::read_to_string(&taken).unwrap_or_default(), "occupied");

    let manifest = load(&ws.out_manifest("esm"));
    assert_eq!(
        module(&manifest, "esm"),
        Some(ModuleEntry::Single(path_string(&ws.out.join("esm").join("index-mjs-BBBB"))))
    );
}

#[test]
fn test_scoped_package_layout() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(dir) = ws.add_package(
        "@acme/widget",
        json!({ "name": "@acme/widget", "main": "src/main.js" }),
        &["src/main.js"],
    ) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    let expected = ws.out.join("@acme").join("widget").join("manifest.json");
    assert!(builder
        .synthesize("@acme/widget", &ws.out)
        .is_ok_and(|p| p == Some(expected.clone())));
    assert_eq!(
        module(&load(&expected), "@acme/widget"),
        Some(ModuleEntry::Single(path_string(&dir.join("src").join("main"))))
    );
}

#[test]
fn test_unresolved_root_is_fatal() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };
    assert!(matches!(
        builder.synthesize("nowhere", &ws.out),
        Err(ManifestError::UnresolvedPackage(name)) if name == "nowhere"
    ));
    assert!(!ws.out.exists());
}

#[test]
fn test_broken_dependencies_are_skipped() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "root",
        json!({
            "name": "root",
            "dependencies": {
                "@types/thing": "*",
                "ghost": "*",
                "hollow": "*",
                "solid": "*"
            }
        }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(_) = ws.add_package("@types/thing", json!({ "name": "@types/thing", "main": "" }), &[])
    else {
        return;
    };
    let Some(_) = ws.add_package("hollow", json!({ "name": "hollow", "main": "gone.js" }), &[])
    else {
        return;
    };
    let Some(_) = ws.add_package("solid", json!({ "name": "solid" }), &["index.js"]) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("root", &ws.out).is_ok_and(|p| p.is_some()));

    let root = load(&ws.out_manifest("root"));
    assert_eq!(
        root.include,
        Some(vec![
            "$(MCUMODULES)/require/manifest.json".to_string(),
            path_string(&ws.out_manifest("solid")),
        ])
    );
    assert!(!ws.out_manifest("@types/thing").exists());
    assert!(!ws.out_manifest("hollow").exists());
}

#[test]
fn test_void_root_writes_nothing() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package("@types/only", json!({ "name": "@types/only", "main": "" }), &[])
    else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };
    assert!(builder
        .synthesize("@types/only", &ws.out)
        .is_ok_and(|p| p.is_none()));
    assert!(!ws.out_manifest("@types/only").exists());
}

#[test]
fn test_shipped_manifest_is_included_not_regenerated() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "board",
        json!({ "name": "board", "dependencies": { "driver": "*" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(driver_dir) = ws.add_package("driver", json!({ "name": "driver" }), &["index.js"])
    else {
        return;
    };
    let shipped = driver_dir.join("mcu").join("manifest.json");
    if fs::create_dir_all(driver_dir.join("mcu")).is_err()
        || fs::write(&shipped, r#"{ "modules": { "driver": "./driver" } }"#).is_err()
    {
        return;
    }
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("board", &ws.out).is_ok_and(|p| p.is_some()));
    let board = load(&ws.out_manifest("board"));
    assert!(board
        .include
        .as_ref()
        .is_some_and(|inc| inc.contains(&path_string(&shipped))));
    assert!(!ws.out_manifest("driver").exists());
}

#[test]
fn test_untyped_shipped_manifest_dependency_is_included() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "app",
        json!({ "name": "app", "dependencies": { "dep": "*", "tail": "*" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(dep_dir) = ws.add_package("dep", json!({ "name": "dep" }), &["index.js"]) else {
        return;
    };
    let Some(_) = ws.add_package("tail", json!({ "name": "tail" }), &["index.js"]) else {
        return;
    };
    let shipped = dep_dir.join("mcu").join("manifest.json");
    if fs::create_dir_all(dep_dir.join("mcu")).is_err()
        || fs::write(
            &shipped,
            r#"{ "include": "$(MODDABLE)/modules/base/timer/manifest.json", "modules": { "dep": "./index" } }"#,
        )
        .is_err()
    {
        return;
    }
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("app", &ws.out).is_ok_and(|p| p.is_some()));
    let app = load(&ws.out_manifest("app"));
    assert!(app.include.as_ref().is_some_and(|inc| {
        inc.contains(&path_string(&shipped))
            && inc.contains(&path_string(&ws.out_manifest("tail")))
    }));
    assert!(!ws.out_manifest("dep").exists());
}

#[test]
fn test_malformed_dependency_manifest_is_skipped() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package(
        "app",
        json!({ "name": "app", "dependencies": { "broken": "*", "tail": "*" } }),
        &["index.js"],
    ) else {
        return;
    };
    let Some(broken_dir) = ws.add_package("broken", json!({ "name": "broken" }), &["index.js"])
    else {
        return;
    };
    let Some(_) = ws.add_package("tail", json!({ "name": "tail" }), &["index.js"]) else {
        return;
    };
    if fs::write(broken_dir.join("manifest.json"), "{ \"modules\": ").is_err() {
        return;
    }
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("app", &ws.out).is_ok_and(|p| p.is_some()));
    let app = load(&ws.out_manifest("app"));
    let tail = path_string(&ws.out_manifest("tail"));
    assert!(app.include.as_ref().is_some_and(|inc| inc.contains(&tail)));
    assert!(!ws.out_manifest("broken").exists());
}

#[test]
fn test_module_alias_uses_declared_name() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(dir) = ws.add_package("alias-pkg", json!({ "name": "@real/pkg" }), &["index.js"])
    else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    let expected = ws.out.join("alias-pkg").join("manifest.json");
    assert!(builder
        .synthesize("alias-pkg", &ws.out)
        .is_ok_and(|p| p == Some(expected.clone())));
    assert!(!ws.out.join("@real").exists());

    let manifest = load(&expected);
    assert_eq!(
        module(&manifest, "@real/pkg"),
        Some(ModuleEntry::Single(path_string(&dir.join("index"))))
    );
    assert!(module(&manifest, "alias-pkg").is_none());
    assert!(manifest
        .provenance
        .as_ref()
        .is_some_and(|p| p["npm"] == "alias-pkg"));
}

#[test]
fn test_require_include_without_mcu_modules_uses_literal_root() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    let Some(_) = ws.add_package("plain", json!({ "name": "plain" }), &["index.js"]) else {
        return;
    };
    let Some(()) = ws.add_template(
        "plain",
        json!({ "//": { "template": { "modules": ["*"], "include": ["require"] } } }),
    ) else {
        return;
    };
    let Some(mut builder) = ws.builder() else {
        return;
    };

    assert!(builder.synthesize("plain", &ws.out).is_ok_and(|p| p.is_some()));
    let manifest = load(&ws.out_manifest("plain"));
    let literal = format!("{}/require/manifest.json", path_string(&ws.templates));
    assert_eq!(manifest.include, Some(vec![literal]));
    assert!(manifest.build.as_ref().is_some_and(|b| b.is_empty()));
}
