// Classic service: one external process per operation, records streamed to the caller

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::info;

use super::stream::{drain, RunSummary};
use crate::domain::{
    AppAudit, AppVersion, AuditParser, ClassicOptions, FreezeParser, LineParser, Status,
    StatusParser, Verb, VersionParser,
};
use crate::error::Result;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{ProcessLauncher, TimeProvider};

/// Records of a spawned operation plus the operation's final result.
///
/// `records` closes once the tool's stdout is exhausted; `completion`
/// resolves after the exit status and stderr have been checked.
pub struct RecordStream<T> {
    pub records: UnboundedReceiver<T>,
    pub completion: JoinHandle<Result<()>>,
}

/// Drives the Classic interface of the deployment tool on the local machine.
///
/// Attribute setters return a modified copy; verbs launch the executable once
/// and stream parsed records into the supplied channel.
///
/// # Example
/// ```ignore
/// let classic = Classic::new("C:/Tools/NinitePro.exe", Arc::new(SubprocessLauncher::new()))
///     .select(["Firefox", "7-Zip"]);
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let run = tokio::spawn(async move { classic.update_only(tx).await });
/// while let Some(status) = rx.recv().await {
///     println!("{}: {}", status.app, status.status);
/// }
/// run.await??;
/// ```
#[derive(Clone)]
pub struct Classic {
    executable: PathBuf,
    options: ClassicOptions,
    launcher: Arc<dyn ProcessLauncher>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Classic {
    /// `executable` is used as given; resolve directories before calling this.
    pub fn new(executable: impl Into<PathBuf>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            executable: executable.into(),
            options: ClassicOptions::default(),
            launcher,
            time_provider: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    /// Replace all accumulated attributes at once
    pub fn with_options(mut self, options: ClassicOptions) -> Self {
        self.options = options;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn map_options(mut self, f: impl FnOnce(ClassicOptions) -> ClassicOptions) -> Self {
        self.options = f(self.options);
        self
    }

    // Attributes

    pub fn locale(self, code: impl Into<String>) -> Self {
        self.map_options(|o| o.locale(code))
    }

    pub fn proxy(self, server: impl Into<String>, port: u16) -> Self {
        self.map_options(|o| o.proxy(server, port))
    }

    pub fn proxy_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.map_options(|o| o.proxy_auth(username, password))
    }

    pub fn select<I, S>(self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_options(|o| o.select(apps))
    }

    pub fn exclude<I, S>(self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_options(|o| o.exclude(apps))
    }

    pub fn remote<I, S>(self, machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_options(|o| o.remote(machines))
    }

    pub fn remote_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.map_options(|o| o.remote_auth(username, password))
    }

    pub fn disable_shortcuts(self) -> Self {
        self.map_options(ClassicOptions::disable_shortcuts)
    }

    pub fn disable_auto_update(self) -> Self {
        self.map_options(ClassicOptions::disable_auto_update)
    }

    pub fn all_users(self) -> Self {
        self.map_options(ClassicOptions::all_users)
    }

    pub fn cache_path(self, path: impl Into<String>) -> Self {
        self.map_options(|o| o.cache_path(path))
    }

    pub fn no_cache(self) -> Self {
        self.map_options(ClassicOptions::no_cache)
    }

    pub fn clean_cache(self) -> Self {
        self.map_options(ClassicOptions::clean_cache)
    }

    // Verbs

    /// Update already-installed apps; never installs anything new.
    pub async fn update_only(&self, tx: UnboundedSender<Status>) -> Result<()> {
        self.run(Verb::UpdateOnly, &StatusParser, tx).await
    }

    /// Uninstall the selected apps. Fails without launching when nothing is selected.
    pub async fn uninstall(&self, tx: UnboundedSender<Status>) -> Result<()> {
        self.run(Verb::Uninstall, &StatusParser, tx).await
    }

    /// Build an offline installer at `output` for the selected apps.
    /// Each record carries the bundled version in `version`. An empty
    /// `output` fails without launching.
    pub async fn freeze<I, S>(
        &self,
        tx: UnboundedSender<Status>,
        output: impl Into<String>,
        locales: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(freeze_verb(output, locales), &FreezeParser, tx).await
    }

    /// List every (or every selected) managed app with its available versions.
    pub async fn list(&self, tx: UnboundedSender<AppVersion>) -> Result<()> {
        self.run(Verb::List, &VersionParser, tx).await
    }

    /// Report every (or every selected) managed app with its installed state.
    pub async fn audit(&self, tx: UnboundedSender<AppAudit>) -> Result<()> {
        self.run(Verb::Audit, &AuditParser, tx).await
    }

    // Spawned variants

    pub fn spawn_update_only(&self) -> RecordStream<Status> {
        self.spawn(Verb::UpdateOnly, StatusParser)
    }

    pub fn spawn_uninstall(&self) -> RecordStream<Status> {
        self.spawn(Verb::Uninstall, StatusParser)
    }

    pub fn spawn_freeze<I, S>(&self, output: impl Into<String>, locales: I) -> RecordStream<Status>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spawn(freeze_verb(output, locales), FreezeParser)
    }

    pub fn spawn_list(&self) -> RecordStream<AppVersion> {
        self.spawn(Verb::List, VersionParser)
    }

    pub fn spawn_audit(&self) -> RecordStream<AppAudit> {
        self.spawn(Verb::Audit, AuditParser)
    }

    /// Run `verb` on a tokio task. Must be called within a runtime.
    fn spawn<P>(&self, verb: Verb, parser: P) -> RecordStream<P::Record>
    where
        P: LineParser + 'static,
    {
        let (tx, records) = mpsc::unbounded_channel();
        let classic = self.clone();
        let completion = tokio::spawn(async move { classic.run(verb, &parser, tx).await });
        RecordStream {
            records,
            completion,
        }
    }

    async fn run<P: LineParser>(
        &self,
        verb: Verb,
        parser: &P,
        tx: UnboundedSender<P::Record>,
    ) -> Result<()> {
        let options = self.options.clone().verb(verb.clone());
        options.check_verb()?;
        let args = options.compose_args();
        let start_time = self.time_provider.now_millis();

        info!(
            verb = %verb,
            executable = %self.executable.display(),
            args = ?options.redacted_args(),
            "Launching Classic"
        );

        let process = self.launcher.launch(&self.executable, &args).await?;
        let RunSummary { records, skipped } = drain(process, parser, tx).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        info!(
            verb = %verb,
            records = records,
            skipped = skipped,
            duration_ms = duration_ms,
            "Classic run completed"
        );

        Ok(())
    }
}

fn freeze_verb<I, S>(output: impl Into<String>, locales: I) -> Verb
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Verb::Freeze {
        output: output.into(),
        locales: locales.into_iter().map(Into::into).collect(),
    }
}
