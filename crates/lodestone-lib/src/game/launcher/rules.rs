//! Compatibility rule evaluation for libraries and argument fragments.

use crate::game::installer::config::EngineConfig;
use crate::game::launcher::version_parser::{Rule, RuleAction};
use regex::Regex;

/// Platform and feature state rules are evaluated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEnv {
    /// `windows`, `osx`, `linux` or `unknown`
    pub os_name: String,
    /// Kernel release string, tested by `os.version` patterns
    pub os_version: String,
    pub os_arch: String,
    /// Pointer width, substituted for `${arch}` in native classifiers
    pub arch_bits: String,
    pub has_custom_resolution: bool,
    pub is_demo_user: bool,
}

impl RuleEnv {
    /// Host platform with every feature off
    pub fn current() -> Self {
        Self {
            os_name: os_name(std::env::consts::OS).to_string(),
            os_version: sysinfo::System::kernel_version().unwrap_or_default(),
            os_arch: os_arch(std::env::consts::ARCH).to_string(),
            arch_bits: if cfg!(target_pointer_width = "64") {
                "64".to_string()
            } else {
                "32".to_string()
            },
            has_custom_resolution: false,
            is_demo_user: false,
        }
    }

    /// Host platform with features taken from the engine configuration
    pub fn for_config(config: &EngineConfig) -> Self {
        Self {
            has_custom_resolution: config.resolution.is_some(),
            is_demo_user: config.demo_user,
            ..Self::current()
        }
    }

    fn feature(&self, name: &str) -> Option<bool> {
        match name {
            "has_custom_resolution" => Some(self.has_custom_resolution),
            "is_demo_user" => Some(self.is_demo_user),
            _ => None,
        }
    }
}

fn os_name(os: &str) -> &'static str {
    match os {
        "windows" => "windows",
        "macos" => "osx",
        "linux" => "linux",
        _ => "unknown",
    }
}

fn os_arch(arch: &str) -> &str {
    match arch {
        "x86" => "x86",
        "x86_64" => "x86_64",
        "aarch64" => "arm64",
        "arm" => "arm32",
        other => other,
    }
}

/// Decide whether a rule-gated fragment applies.
///
/// Every matching `allow` sets allowed, every matching `disallow` sets
/// disallowed; the result is `allowed && !disallowed`. No rules means allowed.
pub fn is_allowed(rules: Option<&[Rule]>, env: &RuleEnv) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    let mut allowed = false;
    let mut disallowed = false;
    for rule in rules {
        if rule_matches(rule, env) {
            match rule.action {
                RuleAction::Allow => allowed = true,
                RuleAction::Disallow => disallowed = true,
            }
        }
    }
    allowed && !disallowed
}

fn rule_matches(rule: &Rule, env: &RuleEnv) -> bool {
    if let Some(ref os_rule) = rule.os {
        if let Some(ref name) = os_rule.name {
            if name != &env.os_name {
                return false;
            }
        }

        if let Some(ref pattern) = os_rule.version {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(&env.os_version) {
                        return false;
                    }
                }
                Err(e) => {
                    log::warn!("Ignoring rule with invalid os.version pattern {:?}: {}", pattern, e);
                    return false;
                }
            }
        }

        if let Some(ref arch) = os_rule.arch {
            if arch != &env.os_arch {
                return false;
            }
        }
    }

    if let Some(ref features) = rule.features {
        for (name, required) in features {
            // Unknown features never match
            if env.feature(name) != Some(*required) {
                return false;
            }
        }
    }

    true
}
