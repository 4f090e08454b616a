/// Library artifact resolution and classpath helpers
use crate::game::launcher::rules::{is_allowed, RuleEnv};
use crate::game::launcher::version_parser::{Artifact, ExtractRules, Library};
use anyhow::Result;

/// A library file after rule evaluation, ready to validate or put on the classpath
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Maven coordinate of the owning library
    pub name: String,
    /// Path relative to the libraries directory, `/`-separated
    pub path: String,
    pub url: String,
    pub sha1: Option<String>,
    pub size: Option<u64>,
    pub is_native: bool,
    pub extract: Option<ExtractRules>,
}

/// Convert Maven coordinates to file path
/// Format: group:artifact:version[:classifier][@extension]
/// Example: "com.google.guava:guava:21.0" -> "com/google/guava/guava/21.0/guava-21.0.jar"
pub fn maven_to_path(coords: &str) -> Result<String> {
    let parts: Vec<&str> = coords.split(':').collect();

    if parts.len() < 3 {
        anyhow::bail!("Invalid Maven coordinates: {}", coords);
    }

    let group = parts[0].replace('.', "/");
    let artifact = parts[1];
    let mut version = parts[2];
    let mut classifier = None;
    let mut extension = "jar";

    if parts.len() == 3 {
        // group:artifact:version@extension
        if let Some((v, ext)) = version.split_once('@') {
            version = v;
            extension = ext;
        }
    } else if let Some((clf, ext)) = parts[3].split_once('@') {
        classifier = Some(clf);
        extension = ext;
    } else {
        classifier = Some(parts[3]);
    }

    let filename = if let Some(clf) = classifier {
        format!("{}-{}-{}.{}", artifact, version, clf, extension)
    } else {
        format!("{}-{}.{}", artifact, version, extension)
    };

    Ok(format!("{}/{}/{}/{}", group, artifact, version, filename))
}

/// Identity of a library for chain-wide dedup: `group:artifact[:classifier]`.
/// The version is left out so a child's override replaces the ancestor's entry.
pub fn coordinate_key(coords: &str) -> String {
    let parts: Vec<&str> = coords.split(':').collect();
    match parts.as_slice() {
        [group, artifact, _version, classifier, ..] => {
            format!("{}:{}:{}", group, artifact, classifier)
        }
        [group, artifact, ..] => format!("{}:{}", group, artifact),
        _ => coords.to_string(),
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn classpath_separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

fn artifact_url(lib: &Library, artifact: Option<&Artifact>, path: &str, base_url: &str) -> String {
    if let Some(url) = artifact.and_then(|a| non_empty(&a.url)) {
        return url.to_string();
    }
    let base = non_empty(&lib.url).unwrap_or(base_url);
    join_url(base, path)
}

/// Whether the library carries a main (non-native) artifact.
/// Natives-only entries declare classifiers but no artifact.
fn has_main_artifact(lib: &Library) -> bool {
    match lib.downloads {
        Some(ref downloads) => downloads.artifact.is_some(),
        None => lib.natives.is_none(),
    }
}

fn native_classifier(lib: &Library, os_name: &str, arch_bits: &str) -> Option<String> {
    lib.natives
        .as_ref()
        .and_then(|n| n.get(os_name))
        .map(|c| c.replace("${arch}", arch_bits))
}

fn native_artifact(lib: &Library, classifier: &str, base_url: &str) -> Result<ResolvedArtifact> {
    let declared = lib
        .downloads
        .as_ref()
        .and_then(|d| d.classifiers.as_ref())
        .and_then(|c| c.get(classifier));

    let path = match declared.and_then(|a| non_empty(&a.path)) {
        Some(p) => p.to_string(),
        None => maven_to_path(&format!("{}:{}", lib.name, classifier))?,
    };

    Ok(ResolvedArtifact {
        name: lib.name.clone(),
        url: artifact_url(lib, declared, &path, base_url),
        sha1: declared.and_then(|a| a.sha1.clone()),
        size: declared.and_then(|a| a.size),
        path,
        is_native: true,
        extract: lib.extract.clone(),
    })
}

/// Files a library contributes on this platform. Empty when its rules exclude it.
pub fn resolve_artifacts(
    lib: &Library,
    env: &RuleEnv,
    base_url: &str,
) -> Result<Vec<ResolvedArtifact>> {
    if !is_allowed(lib.rules.as_deref(), env) {
        log::debug!("Library {} excluded by rules", lib.name);
        return Ok(Vec::new());
    }

    let mut out = Vec::new();

    if has_main_artifact(lib) {
        let artifact = lib.downloads.as_ref().and_then(|d| d.artifact.as_ref());
        let path = match artifact.and_then(|a| non_empty(&a.path)) {
            Some(p) => p.to_string(),
            None => maven_to_path(&lib.name)?,
        };
        out.push(ResolvedArtifact {
            name: lib.name.clone(),
            url: artifact_url(lib, artifact, &path, base_url),
            sha1: artifact.and_then(|a| a.sha1.clone()),
            size: artifact.and_then(|a| a.size),
            path,
            is_native: false,
            extract: None,
        });
    }

    if let Some(classifier) = native_classifier(lib, &env.os_name, &env.arch_bits) {
        out.push(native_artifact(lib, &classifier, base_url)?);
    }

    Ok(out)
}

/// Every library path the descriptor could reference on any platform.
/// Rules are ignored so cleanup never removes another platform's files.
pub fn declared_artifact_paths(lib: &Library) -> Vec<String> {
    let mut paths = Vec::new();

    if has_main_artifact(lib) {
        let declared = lib
            .downloads
            .as_ref()
            .and_then(|d| d.artifact.as_ref())
            .and_then(|a| non_empty(&a.path).map(str::to_string));
        if let Some(path) = declared.or_else(|| maven_to_path(&lib.name).ok()) {
            paths.push(path);
        }
    }

    if let Some(classifiers) = lib.downloads.as_ref().and_then(|d| d.classifiers.as_ref()) {
        for (classifier, artifact) in classifiers {
            let declared = non_empty(&artifact.path).map(str::to_string);
            if let Some(path) =
                declared.or_else(|| maven_to_path(&format!("{}:{}", lib.name, classifier)).ok())
            {
                paths.push(path);
            }
        }
    }

    if let Some(natives) = lib.natives.as_ref() {
        for template in natives.values() {
            for bits in ["32", "64"] {
                let classifier = template.replace("${arch}", bits);
                if let Ok(path) = maven_to_path(&format!("{}:{}", lib.name, classifier)) {
                    paths.push(path);
                }
            }
        }
    }

    paths.sort();
    paths.dedup();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::launcher::version_parser::{LibraryDownloads, OsRule, Rule, RuleAction};
    use std::collections::HashMap;

    fn linux() -> RuleEnv {
        RuleEnv {
            os_name: "linux".into(),
            os_version: "6.1.0".into(),
            os_arch: "x86_64".into(),
            arch_bits: "64".into(),
            has_custom_resolution: false,
            is_demo_user: false,
        }
    }

    fn legacy(name: &str) -> Library {
        Library {
            name: name.into(),
            downloads: None,
            url: None,
            rules: None,
            natives: None,
            extract: None,
        }
    }

    #[test]
    fn test_maven_to_path_simple() {
        let path = maven_to_path("com.google.guava:guava:21.0").unwrap();
        assert_eq!(path, "com/google/guava/guava/21.0/guava-21.0.jar");
    }

    #[test]
    fn test_maven_to_path_with_classifier() {
        let path = maven_to_path("org.lwjgl:lwjgl:3.3.1:natives-windows").unwrap();
        assert_eq!(path, "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-windows.jar");
    }

    #[test]
    fn test_maven_to_path_with_extension() {
        let path = maven_to_path("com.example:lib:1.0:sources@zip").unwrap();
        assert_eq!(path, "com/example/lib/1.0/lib-1.0-sources.zip");
    }

    #[test]
    fn test_maven_to_path_rejects_short_coordinates() {
        assert!(maven_to_path("com.example:lib").is_err());
    }

    #[test]
    fn test_coordinate_key_ignores_version() {
        assert_eq!(coordinate_key("com.google.guava:guava:21.0"), "com.google.guava:guava");
        assert_eq!(coordinate_key("com.google.guava:guava:31.1"), "com.google.guava:guava");
        assert_eq!(
            coordinate_key("org.lwjgl:lwjgl:3.3.1:natives-linux"),
            "org.lwjgl:lwjgl:natives-linux"
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a/", "/b/c.jar"), "https://a/b/c.jar");
        assert_eq!(join_url("https://a", "b/c.jar"), "https://a/b/c.jar");
    }

    #[test]
    fn legacy_library_uses_override_base_and_no_hash() {
        let mut lib = legacy("net.minecraftforge:forge:1.7.10-10.13.4.1614");
        lib.url = Some("https://maven.minecraftforge.net/".into());

        let resolved = resolve_artifacts(&lib, &linux(), "https://libraries.minecraft.net/").unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved[0].url,
            "https://maven.minecraftforge.net/net/minecraftforge/forge/1.7.10-10.13.4.1614/forge-1.7.10-10.13.4.1614.jar"
        );
        assert!(resolved[0].sha1.is_none());
        assert!(!resolved[0].is_native);
    }

    #[test]
    fn declared_artifact_wins_over_derived_values() {
        let mut lib = legacy("com.mojang:brigadier:1.0.18");
        lib.downloads = Some(LibraryDownloads {
            artifact: Some(Artifact {
                path: Some("com/mojang/brigadier/1.0.18/brigadier-1.0.18.jar".into()),
                url: Some("https://cdn.example/brigadier.jar".into()),
                sha1: Some("c1ef1234dd2b3e3b9b6f9a3d2d6d1e0e0a0b0c0d".into()),
                size: Some(77392),
            }),
            classifiers: None,
        });

        let resolved = resolve_artifacts(&lib, &linux(), "https://libraries.minecraft.net/").unwrap();
        assert_eq!(resolved[0].url, "https://cdn.example/brigadier.jar");
        assert_eq!(resolved[0].size, Some(77392));
        assert!(resolved[0].sha1.is_some());
    }

    #[test]
    fn natives_replace_arch_and_skip_main_artifact() {
        let mut natives = HashMap::new();
        natives.insert("linux".to_string(), "natives-linux-${arch}".to_string());
        let mut classifiers = HashMap::new();
        classifiers.insert(
            "natives-linux-64".to_string(),
            Artifact {
                path: Some("org/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux-64.jar".into()),
                url: None,
                sha1: Some("abc".into()),
                size: None,
            },
        );
        let mut lib = legacy("org.lwjgl.lwjgl:lwjgl-platform:2.9.4");
        lib.natives = Some(natives);
        lib.downloads = Some(LibraryDownloads {
            artifact: None,
            classifiers: Some(classifiers),
        });

        let resolved = resolve_artifacts(&lib, &linux(), "https://libraries.minecraft.net").unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].is_native);
        assert_eq!(resolved[0].sha1.as_deref(), Some("abc"));
        assert_eq!(
            resolved[0].url,
            "https://libraries.minecraft.net/org/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux-64.jar"
        );
    }

    #[test]
    fn native_artifact_carries_extract_rules() {
        let mut natives = HashMap::new();
        natives.insert("linux".to_string(), "natives-linux".to_string());
        let mut lib = legacy("org.lwjgl.lwjgl:lwjgl-platform:2.9.4");
        lib.natives = Some(natives);
        lib.extract = Some(ExtractRules {
            exclude: vec!["META-INF/".into()],
        });

        let resolved = resolve_artifacts(&lib, &linux(), "https://libraries.minecraft.net/").unwrap();
        let path = "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar";
        assert_eq!(
            resolved,
            vec![ResolvedArtifact {
                name: "org.lwjgl.lwjgl:lwjgl-platform:2.9.4".into(),
                path: path.into(),
                url: format!("https://libraries.minecraft.net/{}", path),
                sha1: None,
                size: None,
                is_native: true,
                extract: Some(ExtractRules {
                    exclude: vec!["META-INF/".into()],
                }),
            }]
        );
    }

    #[test]
    fn excluded_library_resolves_to_nothing_but_stays_declared() {
        let mut lib = legacy("ca.weblite:java-objc-bridge:1.1");
        lib.rules = Some(vec![Rule {
            action: RuleAction::Allow,
            os: Some(OsRule {
                name: Some("osx".into()),
                version: None,
                arch: None,
            }),
            features: None,
        }]);

        assert!(resolve_artifacts(&lib, &linux(), "https://x/").unwrap().is_empty());
        assert_eq!(
            declared_artifact_paths(&lib),
            vec!["ca/weblite/java-objc-bridge/1.1/java-objc-bridge-1.1.jar".to_string()]
        );
    }
}
