//! `fern react-dev`: run the react-native packager against the build output.

use anyhow::Result;
use std::ffi::OsString;

use crate::config::FernConfig;
use crate::utils::exec::Cmd;

/// Packager entry point, relative to the project root
const REACT_NATIVE_CLI: &str = "./node_modules/react-native/local-cli/cli.js";

/// Run the dev server in the foreground until it exits.
pub fn react_dev(config: &FernConfig) -> Result<()> {
    dev_server_cmd(config).run_inherited()?;
    Ok(())
}

fn dev_server_cmd(config: &FernConfig) -> Cmd {
    let mut roots = OsString::from(config.output_dir());
    roots.push(",");
    roots.push(config.root_join("node_modules"));

    Cmd::new("node")
        .args([REACT_NATIVE_CLI, "start", "--projectRoots"])
        .arg(roots)
        .cwd(config.get_root())
}
