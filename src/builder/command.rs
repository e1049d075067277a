use std::path::PathBuf;

use super::{BuildOutcome, Builder, check_artifact};
use crate::config::FernConfig;
use crate::debug;
use crate::utils::exec::{Cmd, FilterRule};

/// npm/broccoli chatter that is not worth printing on every rebuild.
const BUILD_FILTER: FilterRule = FilterRule::new(&["npm WARN", "npm notice", "Slowest Nodes"]);

/// Runs `build.command` from the project root once per change batch.
pub struct CommandBuilder {
    command: Vec<String>,
    root: PathBuf,
    output_dir: PathBuf,
    artifact: PathBuf,
}

impl CommandBuilder {
    pub fn new(config: &FernConfig) -> Self {
        Self {
            command: config.build.command.clone(),
            root: config.get_root().to_path_buf(),
            output_dir: config.output_dir().to_path_buf(),
            artifact: config.artifact_path(),
        }
    }

    fn cmd(&self) -> Cmd {
        Cmd::from_slice(&self.command)
            .cwd(&self.root)
            .envs([
                ("FERN_ROOT", self.root.display().to_string()),
                ("FERN_OUTPUT_PATH", self.output_dir.display().to_string()),
            ])
            .filter(&BUILD_FILTER)
    }
}

impl Builder for CommandBuilder {
    async fn build(&mut self) -> BuildOutcome {
        let cmd = self.cmd();
        debug!("build"; "running `{}`", self.command.join(" "));

        match cmd.output().await {
            Ok(_) => check_artifact(&self.artifact),
            Err(e) => BuildOutcome::failure(&self.artifact, format!("{e:#}")),
        }
    }
}
