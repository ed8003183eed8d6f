//! Static command descriptions
//!
//! Each namespace module declares its commands as a `const` table of
//! `CommandSpec`s; the registry turns those tables into the clap tree.

/// How a parameter is read from the command line and stored in params
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Single string
    Text,
    /// Unsigned integer
    Number,
    /// Boolean switch, `false` unless given
    Flag,
    /// Comma-separated or repeated values, stored as an array of strings
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Clap ID, long flag, and key in the params object
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub positional: bool,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            positional: false,
            default: None,
            help,
        }
    }

    /// Required positional string
    pub const fn arg(name: &'static str, help: &'static str) -> Self {
        Self {
            required: true,
            positional: true,
            ..Self::new(name, ParamKind::Text, help)
        }
    }

    /// `--name <value>`
    pub const fn text(name: &'static str, help: &'static str) -> Self {
        Self::new(name, ParamKind::Text, help)
    }

    /// `--name <n>`
    pub const fn number(name: &'static str, help: &'static str) -> Self {
        Self::new(name, ParamKind::Number, help)
    }

    /// `--name`
    pub const fn flag(name: &'static str, help: &'static str) -> Self {
        Self::new(name, ParamKind::Flag, help)
    }

    /// `--name a,b,c`
    pub const fn list(name: &'static str, help: &'static str) -> Self {
        Self::new(name, ParamKind::List, help)
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    pub const fn default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

/// One `gw <namespace> <action>` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub namespace: &'static str,
    pub action: &'static str,
    pub about: &'static str,
    pub params: &'static [ParamSpec],
}

impl CommandSpec {
    /// `namespace.action`
    pub fn key(&self) -> String {
        format!("{}.{}", self.namespace, self.action)
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A group of commands under one subcommand
#[derive(Debug, Clone, Copy)]
pub struct Namespace {
    pub name: &'static str,
    pub about: &'static str,
    pub commands: &'static [CommandSpec],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_builders() {
        let p = ParamSpec::number("max-results", "Maximum results").default("20");
        assert_eq!(p.kind, ParamKind::Number);
        assert_eq!(p.default, Some("20"));
        assert!(!p.required && !p.positional);

        let p = ParamSpec::arg("id", "Message ID");
        assert!(p.required && p.positional);

        assert!(ParamSpec::list("to", "Recipients").required().required);
    }

    #[test]
    fn test_command_key() {
        const PARAMS: &[ParamSpec] = &[ParamSpec::arg("id", "Message ID")];
        let spec = CommandSpec {
            namespace: "gmail",
            action: "get",
            about: "Show a message",
            params: PARAMS,
        };
        assert_eq!(spec.key(), "gmail.get");
        assert!(spec.param("id").is_some());
        assert!(spec.param("query").is_none());
    }
}
