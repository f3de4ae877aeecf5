//! The subcommand tree: classes linked by named subcommand declarations,
//! compiled once into a [`Program`].
use std::{collections::HashMap, env, ffi::OsString, iter, path::Path};

use crate::{
    bind::{self, Instance, Loaded, Namespace},
    build,
    decl::Class,
    registry::Registry,
    Error, Result, Value,
};

/// Binding key of the subcommand choice at the root.
pub const ROOT_KEY: &str = "subcommand";

/// Binding key of the subcommand choice made inside `class`.
pub fn binding_key(class: &str, is_root: bool) -> String {
    if is_root {
        ROOT_KEY.to_string()
    } else {
        format!("{}_subcommand", class.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Accept unambiguous prefixes of long flags.
    pub allow_abbrev: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings { name: None, version: None, allow_abbrev: true }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) registry: Registry,
    pub(crate) parent: Option<usize>,
    pub(crate) binding_key: String,
    /// Subcommand name and node index, in declaration order.
    pub(crate) children: Vec<(String, usize)>,
}

impl Node {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn binding_key(&self) -> &str {
        &self.binding_key
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn child(&self, name: &str) -> Option<usize> {
        self.children.iter().find(|(it, _)| it == name).map(|&(_, idx)| idx)
    }
}

/// A compiled root class with its whole subcommand tree.
#[derive(Debug, Clone)]
pub struct Program {
    nodes: Vec<Node>,
    settings: Settings,
}

impl Program {
    pub fn new(root: Class) -> Result<Program> {
        let mut res = Program { nodes: Vec::new(), settings: Settings::default() };
        let mut attached = HashMap::new();
        attached.insert(root.name().to_string(), "<root>".to_string());
        res.add(&root, None, &mut attached)?;
        for node in &res.nodes {
            build::validate(&node.registry)?;
        }
        tracing::debug!(root = %root.name(), classes = res.nodes.len(), "compiled program");
        Ok(res)
    }

    pub fn with_settings(mut self, settings: Settings) -> Program {
        self.settings = settings;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Program {
        self.settings.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Program {
        self.settings.version = Some(version.into());
        self
    }

    pub fn allow_abbrev(mut self, yes: bool) -> Program {
        self.settings.allow_abbrev = yes;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, class: &str) -> Option<&Node> {
        self.nodes.iter().find(|it| it.registry.class() == class)
    }

    /// Parent class of `class` in this tree.
    pub fn parent(&self, class: &str) -> Option<&str> {
        let parent = self.node(class)?.parent?;
        Some(self.nodes[parent].registry.class())
    }

    /// The parser for this program, named after the settings or the root class.
    pub fn command(&self) -> clap::Command {
        let name = match &self.settings.name {
            Some(it) => it.clone(),
            None => self.root().registry.class().to_lowercase(),
        };
        build::command(self, name)
    }

    pub fn from_env_or_exit(&self) -> Loaded {
        self.from_env().unwrap_or_else(|err| err.exit())
    }

    pub fn from_env(&self) -> Result<Loaded> {
        let mut args = env::args_os();
        let argv0 = args.next();
        let name = match (&self.settings.name, &argv0) {
            (Some(it), _) => it.clone(),
            (None, Some(argv0)) => Path::new(argv0)
                .file_name()
                .map(|it| it.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.root().registry.class().to_lowercase()),
            (None, None) => self.root().registry.class().to_lowercase(),
        };
        let cmd = build::command(self, name.clone());
        let matches = cmd.try_get_matches_from(iter::once(OsString::from(name)).chain(args))?;
        Ok(self.load(&matches))
    }

    pub fn from_vec_or_exit(&self, args: Vec<OsString>) -> Loaded {
        self.from_vec(args).unwrap_or_else(|err| err.exit())
    }

    /// Parses `args` (without the program name).
    pub fn from_vec(&self, args: Vec<OsString>) -> Result<Loaded> {
        let cmd = self.command();
        let name = OsString::from(cmd.get_name());
        let matches = cmd.try_get_matches_from(iter::once(name).chain(args))?;
        Ok(self.load(&matches))
    }

    fn load(&self, matches: &clap::ArgMatches) -> Loaded {
        let ns = build::collect(self, matches);
        self.resolve(&ns)
    }

    /// Binds the root, then follows the chosen subcommand at each level.
    pub fn resolve(&self, ns: &Namespace) -> Loaded {
        let root = Instance::new(&self.nodes[0].registry, None, bind::bind(&self.nodes[0].registry, ns));
        let mut chain = Vec::new();
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            let Some(name) = ns.get(&node.binding_key).and_then(Value::as_str) else { break };
            let Some(child) = node.child(name) else { break };
            let registry = &self.nodes[child].registry;
            tracing::trace!(key = %node.binding_key, subcommand = %name, class = %registry.class(), "descending");
            chain.push(Instance::new(registry, Some(name), bind::bind(registry, ns)));
            current = child;
        }
        Loaded::new(root, chain)
    }

    fn add(
        &mut self,
        class: &Class,
        parent: Option<usize>,
        attached: &mut HashMap<String, String>,
    ) -> Result<usize> {
        let registry = Registry::compile(class);
        let idx = self.nodes.len();
        self.nodes.push(Node {
            binding_key: binding_key(registry.class(), parent.is_none()),
            registry,
            parent,
            children: Vec::new(),
        });

        let subcommands = self.nodes[idx].registry.subcommands().to_vec();
        for sub in subcommands {
            let target = sub.class.name().to_string();
            let here = format!("{}.{}", class.name(), sub.name);
            if let Some(first) = attached.get(&target) {
                return Err(Error::Reattached { class: target, first: first.clone(), second: here });
            }
            attached.insert(target, here);
            let child = self.add(&sub.class, Some(idx), attached)?;
            self.nodes[idx].children.push((sub.name.clone(), child));
        }
        Ok(idx)
    }
}
