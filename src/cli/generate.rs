//! `fern generate`: scaffold a new module from the project template.

use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::log;

/// Template copied by `fern generate module`, relative to the project root
pub const MODULE_TEMPLATE: &str = "fern/templates/module";

/// Directory holding all modules, relative to the project root
pub const MODULES_DIR: &str = "modules";

/// Generate `kind` named `name` under `root`.
///
/// Only `module` is supported. Returns the created paths, relative to `root`.
pub fn generate(root: &Path, kind: &str, name: &str) -> Result<Vec<PathBuf>> {
    if kind != "module" {
        bail!("generate does not support type `{kind}` (available types: module)");
    }
    validate_name(name)?;

    let target = root.join(MODULES_DIR).join(name);
    if target.symlink_metadata().is_ok() {
        bail!("module `{name}` already exists");
    }

    let template = root.join(MODULE_TEMPLATE);
    if !template.is_dir() {
        bail!("module template `{}` not found", MODULE_TEMPLATE);
    }

    log!("generate"; "installing module");
    let mut created = Vec::new();
    copy_dir(&template, &target, &mut created)?;
    created.sort();

    let created: Vec<PathBuf> = created
        .into_iter()
        .map(|p| p.strip_prefix(root).map(Path::to_path_buf).unwrap_or(p))
        .collect();

    for path in &created {
        log!("generate"; "  created {}", path.display());
    }
    Ok(created)
}

/// A module name is a single path component.
fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => bail!("invalid module name `{name}`"),
    }
}

/// Recursively copy `src` to `dst`, recording every created entry below `dst`.
fn copy_dir(src: &Path, dst: &Path, created: &mut Vec<PathBuf>) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create directory '{}'", dst.display()))?;

    let entries = fs::read_dir(src)
        .with_context(|| format!("Failed to read directory '{}'", src.display()))?;

    for entry in entries {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            created.push(to.clone());
            copy_dir(&from, &to, created)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("Failed to copy '{}'", from.display()))?;
            created.push(to);
        }
    }
    Ok(())
}
