//! TestWorld pattern for declarative integration test setup.
//!
//! A world is a temp directory holding a fake home (with each tool's store at
//! its usual place under it) and a tokensync data directory.

use anyhow::Result;
use assert_cmd::Command;
use filetime::FileTime;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::gemini_project_hash;

/// Source ids with the store location a world lays out for them.
const SOURCE_IDS: &[&str] = &[
    "claude_code",
    "codex",
    "gemini",
    "opencode",
    "cline",
    "roo_code",
    "kilo_code",
];

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use tokensync_testing::TestWorld;
/// use tokensync_testing::fixtures::{ClaudeTurn, claude_assistant_line};
///
/// let world = TestWorld::new();
/// let turn = ClaudeTurn::new(1, "2025-03-01T10:00:00Z");
/// world
///     .write_claude_session("-work-project", "s1", &[claude_assistant_line("s1", &turn)])
///     .unwrap();
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    home: PathBuf,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        let data_dir = temp_dir.path().join(".tokensync");

        fs::create_dir_all(&home).expect("Failed to create home dir");
        fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            home,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// tokensync workspace (config and checkpoint)
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.data_dir.join("sync-checkpoint.json")
    }

    pub fn claude_root(&self) -> PathBuf {
        self.home.join(".claude").join("projects")
    }

    pub fn codex_root(&self) -> PathBuf {
        self.home.join(".codex").join("sessions")
    }

    pub fn gemini_root(&self) -> PathBuf {
        self.home.join(".gemini").join("tmp")
    }

    pub fn opencode_root(&self) -> PathBuf {
        self.home
            .join(".local")
            .join("share")
            .join("opencode")
            .join("storage")
    }

    /// `taskHistory.json` for a VS Code extension directory.
    pub fn task_history_path(&self, extension_dir: &str) -> PathBuf {
        self.home
            .join(".config")
            .join("Code")
            .join("User")
            .join("globalStorage")
            .join(extension_dir)
            .join("state")
            .join("taskHistory.json")
    }

    /// Store locations this world uses for a source id.
    pub fn source_roots(&self, source: &str) -> Vec<PathBuf> {
        match source {
            "claude_code" => vec![self.claude_root()],
            "codex" => vec![self.codex_root()],
            "gemini" => vec![self.gemini_root()],
            "opencode" => vec![self.opencode_root()],
            "cline" => vec![self.task_history_path("saoudrizwan.claude-dev")],
            "roo_code" => vec![self.task_history_path("rooveterinaryinc.roo-cline")],
            "kilo_code" => vec![self.task_history_path("kilocode.kilo-code")],
            _ => Vec::new(),
        }
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(path.to_path_buf())
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<PathBuf> {
        let mut contents = lines.join("\n");
        contents.push('\n');
        self.write_file(path, &contents)
    }

    /// Append JSONL lines to an existing transcript.
    pub fn append_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        use std::io::Write;
        let mut file = fs::OpenOptions::new().append(true).open(path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    /// `projects/<project_dir>/<session_id>.jsonl`
    pub fn write_claude_session(
        &self,
        project_dir: &str,
        session_id: &str,
        lines: &[String],
    ) -> Result<PathBuf> {
        let path = self
            .claude_root()
            .join(project_dir)
            .join(format!("{session_id}.jsonl"));
        self.write_lines(&path, lines)
    }

    /// `sessions/<date_dir>/rollout-<name>.jsonl`, with `date_dir` like `2025/06/01`
    pub fn write_codex_rollout(&self, date_dir: &str, name: &str, lines: &[String]) -> Result<PathBuf> {
        let path = self
            .codex_root()
            .join(date_dir)
            .join(format!("rollout-{name}.jsonl"));
        self.write_lines(&path, lines)
    }

    /// `tmp/<sha256(project_root)>/chats/<file_name>`
    pub fn write_gemini_raw(&self, project_root: &str, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self
            .gemini_root()
            .join(gemini_project_hash(project_root))
            .join("chats")
            .join(file_name);
        self.write_file(&path, contents)
    }

    pub fn write_gemini_chat(&self, project_root: &str, file_name: &str, doc: &Value) -> Result<PathBuf> {
        self.write_gemini_raw(project_root, file_name, &serde_json::to_string_pretty(doc)?)
    }

    pub fn write_task_history(&self, extension_dir: &str, entries: &[Value]) -> Result<PathBuf> {
        let path = self.task_history_path(extension_dir);
        self.write_file(&path, &serde_json::to_string(entries)?)
    }

    pub fn write_opencode_session(&self, project_id: &str, session: &Value) -> Result<PathBuf> {
        let id = session["id"].as_str().unwrap_or("session");
        let path = self
            .opencode_root()
            .join("session")
            .join(project_id)
            .join(format!("{id}.json"));
        self.write_file(&path, &session.to_string())
    }

    pub fn write_opencode_message(&self, message: &Value) -> Result<PathBuf> {
        let session = message["sessionID"].as_str().unwrap_or("session");
        let id = message["id"].as_str().unwrap_or("message");
        let path = self
            .opencode_root()
            .join("message")
            .join(session)
            .join(format!("{id}.json"));
        self.write_file(&path, &message.to_string())
    }

    /// Force a file's modification time (seconds since the epoch).
    pub fn set_mtime(&self, path: &Path, unix_seconds: i64) -> Result<()> {
        filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0))?;
        Ok(())
    }

    /// Write `config.toml` pinning every source to this world's home.
    pub fn write_config(&self, api_url: &str) -> Result<PathBuf> {
        let mut config = format!("api_url = {}\n", toml_string(api_url));
        for source in SOURCE_IDS {
            let roots: Vec<String> = self
                .source_roots(source)
                .iter()
                .map(|p| toml_string(&p.to_string_lossy()))
                .collect();
            config.push_str(&format!(
                "\n[sources.{source}]\nenabled = true\nroots = [{}]\n",
                roots.join(", ")
            ));
        }
        self.write_file(&self.data_dir.join("config.toml"), &config)
    }

    /// Configure a CLI command with this world's data dir, home and env vars.
    ///
    /// The caller provides the base command (e.g. from `cargo_bin_cmd!("tokensync")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());
        cmd.current_dir(self.temp_dir.path());
        cmd.env("HOME", &self.home);
        cmd.env_remove("TOKENSYNC_PATH");
        cmd.env_remove("TOKENSYNC_TOKEN");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }
}

/// JSON string escaping is a valid TOML basic string for the paths we write.
fn toml_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
