/// Effective argument construction across an inheritance chain
use crate::game::launcher::rules::{is_allowed, RuleEnv};
use crate::game::launcher::version_parser::{Argument, VersionDescriptor};
use dunce::canonicalize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Caller-supplied inputs for placeholder substitution
#[derive(Debug, Clone, Default)]
pub struct ArgumentContext {
    /// Where natives get extracted for this launch
    pub natives_dir: PathBuf,
    /// Working directory of the game; the cache root when empty
    pub game_dir: Option<PathBuf>,
    /// Extra placeholders, e.g. identity values from a login collaborator
    pub extra: HashMap<String, String>,
}

/// Fully substituted JVM and game arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveArguments {
    pub jvm: Vec<String>,
    pub game: Vec<String>,
}

/// Concatenate argument fragments along a chain (child first), dropping
/// fragments whose rules exclude this platform. Placeholders are untouched.
pub fn collect_fragments(chain: &[&VersionDescriptor], env: &RuleEnv) -> EffectiveArguments {
    let mut out = EffectiveArguments::default();
    let mut has_jvm = false;

    for descriptor in chain {
        if let Some(ref arguments) = descriptor.arguments {
            has_jvm |= !arguments.jvm.is_empty();
            out.game.extend(apply_rules(&arguments.game, env));
            out.jvm.extend(apply_rules(&arguments.jvm, env));
        }
        if let Some(ref legacy) = descriptor.minecraft_arguments {
            out.game.extend(split_preserving_quotes(legacy));
        }
    }

    if !has_jvm {
        out.jvm.extend(default_jvm_args());
    }
    out
}

fn apply_rules(args: &[Argument], env: &RuleEnv) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Argument::Simple(s) => out.push(s.clone()),
            Argument::Conditional { rules, value } => {
                if is_allowed(Some(rules), env) {
                    out.extend(value.values().into_iter().map(str::to_string));
                }
            }
        }
    }
    out
}

/// Substitute `${name}` placeholders. Unknown placeholders are left as-is.
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = text.to_string();

    for (key, value) in variables {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

/// Apply substitution to every token
pub fn substitute_all(
    fragments: EffectiveArguments,
    variables: &HashMap<String, String>,
) -> EffectiveArguments {
    EffectiveArguments {
        jvm: fragments
            .jvm
            .iter()
            .map(|a| substitute_variables(a, variables))
            .collect(),
        game: fragments
            .game
            .iter()
            .map(|a| substitute_variables(a, variables))
            .collect(),
    }
}

/// Splits a string into whitespace-separated tokens while respecting
/// single and double quotes. Quotes are removed from returned tokens.
pub(crate) fn split_preserving_quotes(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_double = false;
    let mut in_single = false;

    for c in s.chars() {
        match c {
            '"' if !in_single => {
                in_double = !in_double;
            }
            '\'' if !in_double => {
                in_single = !in_single;
            }
            c if c.is_whitespace() && !in_double && !in_single => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
            }
            c => buf.push(c),
        }
    }

    if !buf.is_empty() {
        out.push(buf);
    }

    out
}

/// JVM arguments for descriptors that predate `arguments.jvm`
pub fn default_jvm_args() -> Vec<String> {
    vec![
        "-Djava.library.path=${natives_directory}".to_string(),
        "-cp".to_string(),
        "${classpath}".to_string(),
    ]
}

fn path_string(path: &Path) -> String {
    canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

/// Values the engine knows about a version, as placeholder inputs
pub struct VariableInputs<'a> {
    pub version_name: &'a str,
    pub version_type: &'a str,
    pub root_dir: &'a Path,
    pub assets_dir: &'a Path,
    pub libraries_dir: &'a Path,
    pub assets_index_name: &'a str,
    pub classpath: &'a str,
    pub launcher_name: &'a str,
    pub launcher_version: &'a str,
    pub resolution: Option<(u32, u32)>,
}

/// Build the placeholder map. Entries in `ctx.extra` override computed ones.
pub fn build_variables(inputs: &VariableInputs<'_>, ctx: &ArgumentContext) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    vars.insert("version_name".to_string(), inputs.version_name.to_string());
    vars.insert("version_type".to_string(), inputs.version_type.to_string());

    let game_dir = ctx.game_dir.as_deref().unwrap_or(inputs.root_dir);
    vars.insert("game_directory".to_string(), path_string(game_dir));

    let assets = path_string(inputs.assets_dir);
    vars.insert("assets_root".to_string(), assets.clone());
    // Legacy versions use ${game_assets}
    vars.insert("game_assets".to_string(), assets);
    vars.insert(
        "assets_index_name".to_string(),
        inputs.assets_index_name.to_string(),
    );

    vars.insert("classpath".to_string(), inputs.classpath.to_string());
    vars.insert(
        "classpath_separator".to_string(),
        crate::game::launcher::classpath::classpath_separator().to_string(),
    );
    vars.insert(
        "library_directory".to_string(),
        path_string(inputs.libraries_dir),
    );
    vars.insert("natives_directory".to_string(), path_string(&ctx.natives_dir));

    vars.insert("launcher_name".to_string(), inputs.launcher_name.to_string());
    vars.insert(
        "launcher_version".to_string(),
        inputs.launcher_version.to_string(),
    );

    if let Some(home) = dirs::home_dir() {
        vars.insert("user_home".to_string(), home.to_string_lossy().to_string());
    }

    if let Some((width, height)) = inputs.resolution {
        vars.insert("resolution_width".to_string(), width.to_string());
        vars.insert("resolution_height".to_string(), height.to_string());
    }

    for (k, v) in &ctx.extra {
        vars.insert(k.clone(), v.clone());
    }

    vars
}
