//! Kernel boot smoke test in a user-mode Linux VM.

use crate::process::Invocation;
use cbl_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub const BOOT_UTILS_REPO: &str = "https://github.com/ClangBuiltLinux/boot-utils";

#[derive(Debug, Clone)]
pub struct BootTest {
    pub kernel_url: String,
    pub workdir: PathBuf,
    pub boot_utils_repo: String,
}

impl BootTest {
    pub fn new(kernel_url: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            kernel_url: kernel_url.into(),
            workdir: workdir.into(),
            boot_utils_repo: BOOT_UTILS_REPO.to_string(),
        }
    }

    pub fn kernel_image(&self) -> PathBuf {
        self.workdir.join("linux")
    }

    pub fn boot_utils(&self) -> PathBuf {
        self.workdir.join("boot-utils")
    }

    /// Report the runner's mounts and disk usage, fetch the kernel and
    /// boot-utils, then boot.
    pub fn run(&self) -> Result<()> {
        Invocation::new("mount").run_inherited()?;
        Invocation::new("df").arg("-HT").run_inherited()?;

        let image = self.kernel_image();
        download(&self.kernel_url, &image)?;
        make_executable(&image)?;

        let boot_utils = self.boot_utils();
        Invocation::new("git")
            .args(["clone", "--depth", "1", self.boot_utils_repo.as_str()])
            .arg(&boot_utils)
            .run_inherited()?;

        Invocation::new(boot_utils.join("boot-uml.sh"))
            .arg("-k")
            .arg(&image)
            .run_inherited()
    }
}

fn download(url: &str, dest: &Path) -> Result<()> {
    info!(url, dest = %dest.display(), "Downloading kernel image");
    let bytes = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(|e| Error::Network(format!("{}: {}", url, e)))?;
    std::fs::write(dest, &bytes)?;
    info!(bytes = bytes.len(), "Download complete");
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let test = BootTest::new("https://builds.tuxbuild.com/abc/linux", "/tmp/boot");
        assert_eq!(test.kernel_image(), PathBuf::from("/tmp/boot/linux"));
        assert_eq!(test.boot_utils(), PathBuf::from("/tmp/boot/boot-utils"));
        assert_eq!(test.boot_utils_repo, BOOT_UTILS_REPO);
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable() {
        use std::os::unix::fs::PermissionsExt;
        let file = tempfile::NamedTempFile::new().unwrap();
        make_executable(file.path()).unwrap();
        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
