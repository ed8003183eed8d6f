//! Command Registry
//!
//! Collects every namespace's command table once at startup, builds the clap
//! command tree from it, and turns parsed matches back into a JSON params
//! object for the handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Args, Command};
use serde_json::{Map, Value};
use thiserror::Error;

use super::handlers;
use super::schema::{CommandSpec, Namespace, ParamKind, ParamSpec};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    #[error("command {command} declares parameter {param} twice")]
    DuplicateParam { command: String, param: String },
    #[error("command {command} is listed under namespace {namespace}")]
    WrongNamespace { command: String, namespace: String },
}

/// Options accepted before or after any subcommand
#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Config file (default: ~/.gw/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// OAuth access token to use for this invocation
    #[arg(long, global = true, env = "GW_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,
}

#[derive(Debug)]
pub struct CommandRegistry {
    namespaces: Vec<Namespace>,
    index: HashMap<String, &'static CommandSpec>,
}

impl CommandRegistry {
    /// Registry of every built-in namespace
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(handlers::NAMESPACES)
    }

    pub fn new(namespaces: &[Namespace]) -> Result<Self, RegistryError> {
        let mut index = HashMap::new();

        for namespace in namespaces {
            for spec in namespace.commands {
                if spec.namespace != namespace.name {
                    return Err(RegistryError::WrongNamespace {
                        command: spec.key(),
                        namespace: namespace.name.to_string(),
                    });
                }

                for (i, param) in spec.params.iter().enumerate() {
                    if spec.params[..i].iter().any(|p| p.name == param.name) {
                        return Err(RegistryError::DuplicateParam {
                            command: spec.key(),
                            param: param.name.to_string(),
                        });
                    }
                }

                if index.insert(spec.key(), spec).is_some() {
                    return Err(RegistryError::DuplicateCommand(spec.key()));
                }
            }
        }

        Ok(Self {
            namespaces: namespaces.to_vec(),
            index,
        })
    }

    pub fn get(&self, namespace: &str, action: &str) -> Option<&'static CommandSpec> {
        self.index.get(&format!("{}.{}", namespace, action)).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Build the full `gw` clap tree
    pub fn build_cli(&self) -> Command {
        let root = Command::new("gw")
            .about("Google Workspace from the command line; every command prints JSON")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true);
        let mut root = GlobalOpts::augment_args(root);

        for namespace in &self.namespaces {
            let mut group = Command::new(namespace.name)
                .about(namespace.about)
                .subcommand_required(true)
                .arg_required_else_help(true);
            for spec in namespace.commands {
                group = group.subcommand(command_for(spec));
            }
            root = root.subcommand(group);
        }

        root
    }
}

fn command_for(spec: &CommandSpec) -> Command {
    spec.params
        .iter()
        .fold(Command::new(spec.action).about(spec.about), |cmd, param| {
            cmd.arg(arg_for(param))
        })
}

fn arg_for(param: &ParamSpec) -> Arg {
    let mut arg = Arg::new(param.name).help(param.help);

    if !param.positional {
        arg = arg.long(param.name);
    }

    arg = match param.kind {
        ParamKind::Text => arg.action(ArgAction::Set),
        ParamKind::Number => arg
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(u64)),
        ParamKind::Flag => arg.action(ArgAction::SetTrue),
        ParamKind::List => arg.action(ArgAction::Append).value_delimiter(','),
    };

    if param.required {
        arg = arg.required(true);
    }
    if let Some(default) = param.default {
        arg = arg.default_value(default);
    }
    arg
}

/// Convert parsed matches into `{name: value}`; absent options are omitted
pub fn params_from_matches(spec: &CommandSpec, matches: &ArgMatches) -> Value {
    let mut params = Map::new();

    for param in spec.params {
        let value = match param.kind {
            ParamKind::Text => matches
                .get_one::<String>(param.name)
                .map(|s| Value::String(s.clone())),
            ParamKind::Number => matches.get_one::<u64>(param.name).map(|n| Value::from(*n)),
            ParamKind::Flag => Some(Value::Bool(matches.get_flag(param.name))),
            ParamKind::List => matches.get_many::<String>(param.name).map(|values| {
                values
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect()
            }),
        };

        if let Some(value) = value {
            params.insert(param.name.to_string(), value);
        }
    }

    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::FromArgMatches;
    use serde_json::json;

    const GET_PARAMS: &[ParamSpec] = &[ParamSpec::arg("id", "Message ID")];
    const DUPLICATES: &[CommandSpec] = &[
        CommandSpec { namespace: "gmail", action: "get", about: "", params: GET_PARAMS },
        CommandSpec { namespace: "gmail", action: "get", about: "", params: GET_PARAMS },
    ];

    fn parse(registry: &CommandRegistry, argv: &[&str]) -> (String, String, Value) {
        let matches = registry.build_cli().try_get_matches_from(argv).unwrap();
        let (namespace, ns_matches) = matches.subcommand().unwrap();
        let (action, action_matches) = ns_matches.subcommand().unwrap();
        let spec = registry.get(namespace, action).unwrap();
        (namespace.to_string(), action.to_string(), params_from_matches(spec, action_matches))
    }

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = CommandRegistry::builtin().unwrap();
        assert!(!registry.is_empty());
        registry.build_cli().debug_assert();
    }

    #[test]
    fn test_rejects_duplicate_commands() {
        let namespaces = [Namespace { name: "gmail", about: "", commands: DUPLICATES }];
        let err = CommandRegistry::new(&namespaces).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand(ref key) if key == "gmail.get"));
    }

    #[test]
    fn test_rejects_misfiled_command() {
        let namespaces = [Namespace { name: "drive", about: "", commands: &DUPLICATES[..1] }];
        assert!(matches!(
            CommandRegistry::new(&namespaces),
            Err(RegistryError::WrongNamespace { .. })
        ));
    }

    #[test]
    fn test_params_from_matches() {
        let registry = CommandRegistry::builtin().unwrap();
        let (namespace, action, params) = parse(
            &registry,
            &["gw", "gmail", "modify", "m1", "--add", "Work,Urgent", "--remove", "INBOX"],
        );
        assert_eq!((namespace.as_str(), action.as_str()), ("gmail", "modify"));
        assert_eq!(params["id"], "m1");
        assert_eq!(params["add"], json!(["Work", "Urgent"]));
        assert_eq!(params["remove"], json!(["INBOX"]));
    }

    #[test]
    fn test_defaults_and_flags() {
        let registry = CommandRegistry::builtin().unwrap();
        let (_, _, params) = parse(&registry, &["gw", "gmail", "search", "--query", "is:unread"]);
        assert_eq!(params["max-results"], 20);
        assert_eq!(params["query"], "is:unread");

        let (_, _, params) = parse(&registry, &["gw", "drive", "delete", "f1"]);
        assert_eq!(params["permanent"], false);
        let (_, _, params) = parse(&registry, &["gw", "drive", "delete", "f1", "--permanent"]);
        assert_eq!(params["permanent"], true);
    }

    #[test]
    fn test_missing_required_argument_is_rejected() {
        let registry = CommandRegistry::builtin().unwrap();
        assert!(registry
            .build_cli()
            .try_get_matches_from(["gw", "sheets", "merge", "sheet-id"])
            .is_err());
        assert!(registry
            .build_cli()
            .try_get_matches_from(["gw", "gmail", "search", "--max-results", "many"])
            .is_err());
    }

    #[test]
    fn test_global_options_anywhere() {
        let registry = CommandRegistry::builtin().unwrap();
        let matches = registry
            .build_cli()
            .try_get_matches_from(["gw", "gmail", "labels", "--compact", "-vv", "--access-token", "t"])
            .unwrap();
        let globals = GlobalOpts::from_arg_matches(&matches).unwrap();
        assert!(globals.compact);
        assert_eq!(globals.verbose, 2);
        assert_eq!(globals.access_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_lookup() {
        let registry = CommandRegistry::builtin().unwrap();
        assert!(registry.get("sheets", "merge").is_some());
        assert!(registry.get("sheets", "explode").is_none());
        assert!(registry.get("calendar", "events").is_some());
    }
}
