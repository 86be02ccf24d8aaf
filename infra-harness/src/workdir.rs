//! Per-test working copies of the terraform module.
//!
//! Every test applies from its own copy so parallel tests never share a
//! `.terraform` directory or a state file. The copy lives in a `TempDir`
//! that is removed once the owning stack is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::HarnessError;

/// Hidden files terraform needs to reproduce the same provider versions.
const KEPT_HIDDEN: [&str; 2] = [".terraform.lock.hcl", ".terraform-version"];

/// A temp copy of the module root.
#[derive(Debug)]
pub struct ModuleCopy {
    dir: TempDir,
    module_dir: PathBuf,
}

impl ModuleCopy {
    /// Root of the copy.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The module directory inside the copy (what terraform runs in).
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Give up ownership of the temp dir (used by the stack handle).
    pub fn into_parts(self) -> (TempDir, PathBuf) {
        (self.dir, self.module_dir)
    }
}

/// Copy `root` into a fresh temp dir and locate `module_dir` inside it.
///
/// Skips local state and caches: `.terraform/`, `*.tfstate*`,
/// `terraform.tfvars[.json]`, other hidden entries, and `target/` build
/// output at the top level. Symlinks are copied as symlinks.
pub fn copy_module_to_temp(root: &Path, module_dir: &str) -> Result<ModuleCopy, HarnessError> {
    let source_module = root.join(module_dir);
    if !source_module.is_dir() {
        return Err(HarnessError::ModuleNotFound(source_module));
    }

    let dir = tempfile::Builder::new().prefix("k3s-infra-").tempdir()?;
    copy_dir(root, dir.path(), true)?;

    let module_dir = dir.path().join(module_dir);
    tracing::debug!(
        "copied {} to {}",
        source_module.display(),
        module_dir.display()
    );

    Ok(ModuleCopy { dir, module_dir })
}

fn copy_dir(src: &Path, dst: &Path, top_level: bool) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            if is_skipped_file(&name) || (top_level && name == "target") {
                continue;
            }
            copy_symlink(&entry.path(), &dst.join(&*name))?;
        } else if file_type.is_dir() {
            if is_skipped_dir(&name, top_level) {
                continue;
            }
            copy_dir(&entry.path(), &dst.join(&*name), false)?;
        } else if !is_skipped_file(&name) {
            fs::copy(entry.path(), dst.join(&*name))?;
        }
    }

    Ok(())
}

/// Recreate the link; relative targets resolve inside the copy.
#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::metadata(src)?.is_dir() {
        copy_dir(src, dst, false)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

fn is_skipped_dir(name: &str, top_level: bool) -> bool {
    name.starts_with('.') || (top_level && name == "target")
}

fn is_skipped_file(name: &str) -> bool {
    if KEPT_HIDDEN.contains(&name) {
        return false;
    }
    name.starts_with('.')
        || name.contains(".tfstate")
        || name == "terraform.tfvars"
        || name == "terraform.tfvars.json"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn copies_module_and_skips_local_state() {
        let src = tempfile::tempdir().unwrap();
        let root = src.path();
        write(&root.join("terraform/main.tf"), "resource {}");
        write(&root.join("terraform/modules/vpc/main.tf"), "module {}");
        write(&root.join("terraform/.terraform.lock.hcl"), "lock");
        write(&root.join("terraform/.terraform/providers/aws"), "binary");
        write(&root.join("terraform/terraform.tfstate"), "{}");
        write(&root.join("terraform/terraform.tfstate.backup"), "{}");
        write(&root.join("terraform/terraform.tfvars"), "cluster_name = \"prod\"");
        write(&root.join("terraform/.env"), "SECRET=1");
        write(&root.join("target/debug/big"), "artifact");
        write(&root.join("scripts/k3s-install.sh"), "#!/bin/sh");

        let copy = copy_module_to_temp(root, "terraform").unwrap();
        let module = copy.module_dir();

        assert!(module.join("main.tf").exists());
        assert!(module.join("modules/vpc/main.tf").exists());
        assert!(module.join(".terraform.lock.hcl").exists());
        assert!(copy.root().join("scripts/k3s-install.sh").exists());

        assert!(!module.join(".terraform").exists());
        assert!(!module.join("terraform.tfstate").exists());
        assert!(!module.join("terraform.tfstate.backup").exists());
        assert!(!module.join("terraform.tfvars").exists());
        assert!(!module.join(".env").exists());
        assert!(!copy.root().join("target").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_module_dirs_are_recreated() {
        let src = tempfile::tempdir().unwrap();
        let root = src.path();
        write(&root.join("shared/vpc/main.tf"), "module {}");
        write(&root.join("terraform/main.tf"), "module \"vpc\" { source = \"./vpc\" }");
        write(&root.join("shared/common.tf"), "locals {}");
        std::os::unix::fs::symlink("../shared/vpc", root.join("terraform/vpc")).unwrap();
        std::os::unix::fs::symlink("../shared/common.tf", root.join("terraform/common.tf")).unwrap();

        let copy = copy_module_to_temp(root, "terraform").unwrap();
        let module = copy.module_dir();

        let link = fs::symlink_metadata(module.join("vpc")).unwrap();
        assert!(link.file_type().is_symlink());
        assert!(module.join("vpc/main.tf").exists());
        assert!(module.join("common.tf").exists());
        assert!(module.join("vpc").canonicalize().unwrap().starts_with(copy.root().canonicalize().unwrap()));
    }

    #[test]
    fn nested_target_dirs_are_copied() {
        let src = tempfile::tempdir().unwrap();
        write(&src.path().join("terraform/target/main.tf"), "module {}");

        let copy = copy_module_to_temp(src.path(), "terraform").unwrap();
        assert!(copy.module_dir().join("target/main.tf").exists());
    }

    #[test]
    fn missing_module_dir_is_reported() {
        let src = tempfile::tempdir().unwrap();
        let err = copy_module_to_temp(src.path(), "terraform").unwrap_err();
        assert!(matches!(err, HarnessError::ModuleNotFound(path) if path.ends_with("terraform")));
    }

    #[test]
    fn copies_are_independent() {
        let src = tempfile::tempdir().unwrap();
        write(&src.path().join("terraform/main.tf"), "resource {}");

        let a = copy_module_to_temp(src.path(), "terraform").unwrap();
        let b = copy_module_to_temp(src.path(), "terraform").unwrap();
        assert_ne!(a.module_dir(), b.module_dir());

        let a_root = a.root().to_path_buf();
        drop(a);
        assert!(!a_root.exists());
        assert!(b.module_dir().join("main.tf").exists());
    }
}
