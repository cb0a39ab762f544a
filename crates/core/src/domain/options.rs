// Invocation options and command-line composition

use crate::error::{ClassicError, Result};

const REDACTED: &str = "***";

/// The single action of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    UpdateOnly,
    Uninstall,
    Freeze {
        output: String,
        locales: Vec<String>,
    },
    List,
    Audit,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::UpdateOnly => write!(f, "update-only"),
            Verb::Uninstall => write!(f, "uninstall"),
            Verb::Freeze { .. } => write!(f, "freeze"),
            Verb::List => write!(f, "list"),
            Verb::Audit => write!(f, "audit"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Accumulated switches for one Classic invocation.
///
/// Every setter consumes the value and hands back the modified copy, so a
/// base configuration can be cloned and specialised per call. Nothing is
/// validated across options: incomplete proxy or credential pairs are simply
/// left off the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassicOptions {
    locale: String,
    proxy_server: String,
    proxy_port: u16,
    proxy_auth: Credentials,
    selected_apps: Vec<String>,
    excluded_apps: Vec<String>,
    remote: Vec<String>,
    remote_auth: Credentials,
    disable_shortcuts: bool,
    disable_auto_update: bool,
    all_users: bool,
    cache_path: String,
    no_cache: bool,
    clean_cache: bool,
    verb: Option<Verb>,
}

impl ClassicOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(mut self, code: impl Into<String>) -> Self {
        self.locale = code.into();
        self
    }

    /// Proxy server and port. A zero port keeps `/proxy` off the command line.
    pub fn proxy(mut self, server: impl Into<String>, port: u16) -> Self {
        self.proxy_server = server.into();
        self.proxy_port = port;
        self
    }

    pub fn proxy_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_auth = Credentials {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Restrict the run to these managed apps. Replaces any earlier selection.
    pub fn select<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    /// Remote machines to manage: addresses, or files listing them prefixed with `file:`.
    pub fn remote<I, S>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote = machines.into_iter().map(Into::into).collect();
        self
    }

    pub fn remote_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.remote_auth = Credentials {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn disable_shortcuts(mut self) -> Self {
        self.disable_shortcuts = true;
        self
    }

    pub fn disable_auto_update(mut self) -> Self {
        self.disable_auto_update = true;
        self
    }

    /// Force per-user apps to install for all users where the app supports it.
    pub fn all_users(mut self) -> Self {
        self.all_users = true;
        self
    }

    pub fn cache_path(mut self, path: impl Into<String>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Delete older unused files from the download cache.
    pub fn clean_cache(mut self) -> Self {
        self.clean_cache = true;
        self
    }

    /// Set the action of the invocation, replacing any previous one.
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = Some(verb);
        self
    }

    /// Refuse verbs that would leave the tool without a verb flag, or act on
    /// nothing in particular. Without a verb the tool runs a default install.
    pub fn check_verb(&self) -> Result<()> {
        match &self.verb {
            Some(Verb::Freeze { output, .. }) if output.is_empty() => Err(
                ClassicError::InvalidOptions("freeze needs an output file".to_string()),
            ),
            Some(Verb::Uninstall) if self.selected_apps.is_empty() => Err(
                ClassicError::InvalidOptions("uninstall needs at least one selected app".to_string()),
            ),
            None => Err(ClassicError::InvalidOptions("no verb set".to_string())),
            Some(_) => Ok(()),
        }
    }

    /// Arguments to pass to the executable, in the tool's expected order.
    pub fn compose_args(&self) -> Vec<String> {
        self.build_args(false)
    }

    /// Same as [`compose_args`](Self::compose_args) with passwords masked, for logging.
    pub fn redacted_args(&self) -> Vec<String> {
        self.build_args(true)
    }

    fn build_args(&self, redact: bool) -> Vec<String> {
        let mut args = vec!["/silent".to_string(), ".".to_string()];

        let secret = |password: &str| {
            if redact {
                REDACTED.to_string()
            } else {
                password.to_string()
            }
        };

        // attributes

        if !self.locale.is_empty() {
            args.push("/locale".to_string());
            args.push(self.locale.clone());
        }

        if !self.proxy_server.is_empty() && self.proxy_port != 0 {
            args.push("/proxy".to_string());
            args.push(self.proxy_server.clone());
            args.push(self.proxy_port.to_string());
        }

        if self.proxy_auth.is_complete() {
            args.push("/proxyauth".to_string());
            args.push(self.proxy_auth.username.clone());
            args.push(secret(&self.proxy_auth.password));
        }

        push_list(&mut args, "/select", &self.selected_apps);
        push_list(&mut args, "/exclude", &self.excluded_apps);
        push_list(&mut args, "/remote", &self.remote);

        if self.remote_auth.is_complete() {
            args.push("/remoteauth".to_string());
            args.push(self.remote_auth.username.clone());
            args.push(secret(&self.remote_auth.password));
        }

        if self.disable_shortcuts {
            args.push("/disableshortcuts".to_string());
        }

        if self.disable_auto_update {
            args.push("/disableautoupdate".to_string());
        }

        if self.all_users {
            args.push("/allusers".to_string());
        }

        if !self.cache_path.is_empty() {
            args.push("/cachepath".to_string());
            args.push(self.cache_path.clone());
        }

        if self.no_cache {
            args.push("/nocache".to_string());
        }

        if self.clean_cache {
            args.push("/cleancache".to_string());
        }

        // verbs

        match &self.verb {
            Some(Verb::UpdateOnly) => args.push("/updateonly".to_string()),
            Some(Verb::Uninstall) => args.push("/uninstall".to_string()),
            Some(Verb::Freeze { output, locales }) if !output.is_empty() => {
                args.push("/freeze".to_string());
                args.extend(locales.iter().cloned());
                args.push(output.clone());
            }
            Some(Verb::Freeze { .. }) => {}
            // The audit report comes from the versions listing
            Some(Verb::List) | Some(Verb::Audit) => {
                args.push("/list".to_string());
                args.push("versions".to_string());
            }
            None => {}
        }

        args
    }
}

fn push_list(args: &mut Vec<String>, flag: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    args.push(flag.to_string());
    args.extend(values.iter().cloned());
}
