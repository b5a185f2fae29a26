//! Job naming and config classification.

use cbl_core::Build;
use sha2::{Digest, Sha256};

/// Human readable job name, e.g.
/// `ARCH=arm64 LLVM=1 LLVM_IAS=1 LLVM_VERSION=17 defconfig`.
///
/// Two builds with the same name produce the same job id.
pub fn job_name(build: &Build) -> String {
    let mut job = format!("ARCH={}", build.arch);
    // BOOT=1 is the default, only show it when disabled
    if !build.boot {
        job.push_str(" BOOT=0");
    }
    // LLVM=0 reads poorly, spell it as CC=clang
    if build.llvm {
        job.push_str(" LLVM=1");
    } else {
        job.push_str(" CC=clang");
    }
    if let Some(ld) = build.make_variable("LD") {
        job.push_str(&format!(" LD={}", ld));
    }
    if let Some(ias) = build.make_variable("LLVM_IAS") {
        job.push_str(&format!(" LLVM_IAS={}", ias));
    }
    job.push_str(&format!(" LLVM_VERSION={}", build.llvm_version));
    job.push(' ');
    job.push_str(&build.config.to_string());
    job
}

/// Workflow job id derived from a job name.
///
/// Job names contain characters Actions does not allow in ids, so the id is
/// a digest of the name.
pub fn job_id(name: &str) -> String {
    let hash = Sha256::digest(name.as_bytes());
    format!("_{}", hex::encode(&hash[..16]))
}

/// Group of builds sharing one TuxSuite kick-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigClass {
    Defconfigs,
    DistributionConfigs,
    Allconfigs,
}

impl ConfigClass {
    /// Emission order in the generated workflow.
    pub const ALL: [ConfigClass; 3] = [
        ConfigClass::Defconfigs,
        ConfigClass::DistributionConfigs,
        ConfigClass::Allconfigs,
    ];

    /// Classify a build by substring matching on its config.
    pub fn classify(build: &Build) -> Self {
        let config = &build.config;
        if config.contains("defconfig") || config.contains("chromeos") {
            ConfigClass::Defconfigs
        } else if config.contains("https://") {
            ConfigClass::DistributionConfigs
        } else {
            ConfigClass::Allconfigs
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigClass::Defconfigs => "defconfigs",
            ConfigClass::DistributionConfigs => "distribution_configs",
            ConfigClass::Allconfigs => "allconfigs",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ConfigClass::Defconfigs => 0,
            ConfigClass::DistributionConfigs => 1,
            ConfigClass::Allconfigs => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbl_core::{ConfigValue, LlvmVersion, MakeValue};
    use std::collections::BTreeMap;

    fn build(config: ConfigValue) -> Build {
        Build {
            git_repo: "https://example.com/linux.git".to_string(),
            git_ref: "master".to_string(),
            llvm_version: LlvmVersion::Release(17),
            arch: "x86_64".to_string(),
            boot: true,
            llvm: true,
            config,
            make_variables: BTreeMap::from([("LLVM_IAS".to_string(), MakeValue::Int(1))]),
        }
    }

    fn single(s: &str) -> ConfigValue {
        ConfigValue::Single(s.to_string())
    }

    #[test]
    fn test_job_name_defaults() {
        assert_eq!(
            job_name(&build(single("defconfig"))),
            "ARCH=x86_64 LLVM=1 LLVM_IAS=1 LLVM_VERSION=17 defconfig"
        );
    }

    #[test]
    fn test_job_name_all_segments() {
        let mut b = build(ConfigValue::Fragments(vec![
            "defconfig".to_string(),
            "CONFIG_LTO_CLANG_THIN=y".to_string(),
        ]));
        b.arch = "arm64".to_string();
        b.boot = false;
        b.llvm = false;
        b.make_variables
            .insert("LD".to_string(), MakeValue::Text("ld.lld".to_string()));
        b.make_variables
            .insert("LLVM_IAS".to_string(), MakeValue::Int(0));
        assert_eq!(
            job_name(&b),
            "ARCH=arm64 BOOT=0 CC=clang LD=ld.lld LLVM_IAS=0 LLVM_VERSION=17 defconfig+CONFIG_LTO_CLANG_THIN=y"
        );
    }

    #[test]
    fn test_job_name_without_ias() {
        let mut b = build(single("allmodconfig"));
        b.make_variables.clear();
        b.llvm_version = LlvmVersion::Nightly;
        assert_eq!(
            job_name(&b),
            "ARCH=x86_64 LLVM=1 LLVM_VERSION=nightly allmodconfig"
        );
    }

    #[test]
    fn test_equal_parameters_collide() {
        let a = build(single("defconfig"));
        let mut b = build(single("defconfig"));
        // Fields outside the name do not change the id
        b.git_ref = "for-next".to_string();
        assert_eq!(job_id(&job_name(&a)), job_id(&job_name(&b)));

        let c = build(single("tinyconfig"));
        assert_ne!(job_id(&job_name(&a)), job_id(&job_name(&c)));
    }

    #[test]
    fn test_job_id_shape() {
        let id = job_id("ARCH=x86_64 LLVM=1 LLVM_IAS=1 LLVM_VERSION=17 defconfig");
        assert!(id.starts_with('_'));
        assert_eq!(id.len(), 33);
        assert!(id[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            ConfigClass::classify(&build(single("defconfig"))),
            ConfigClass::Defconfigs
        );
        assert_eq!(
            ConfigClass::classify(&build(single("chromeos/config/chromeos/x86_64/common.config"))),
            ConfigClass::Defconfigs
        );
        assert_eq!(
            ConfigClass::classify(&build(single("https://example.com/frag.config"))),
            ConfigClass::DistributionConfigs
        );
        assert_eq!(
            ConfigClass::classify(&build(single("allmodconfig"))),
            ConfigClass::Allconfigs
        );
        // defconfig wins over a URL
        assert_eq!(
            ConfigClass::classify(&build(ConfigValue::Fragments(vec![
                "https://example.com/frag.config".to_string(),
                "x86_64_defconfig".to_string(),
            ]))),
            ConfigClass::Defconfigs
        );
    }
}
