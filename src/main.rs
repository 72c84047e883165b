/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use clap::Parser;
use log::{debug, error, warn};
use relm4::RelmApp;
use wg_config_editor::{
    app::{AppContext, AppModel},
    cli::Args,
    logger,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.log_level, args.log_output)?;
    debug!("{args:?}");

    if !nix::unistd::Uid::effective().is_root() {
        warn!("Not running as root, wg-quick and saving to system directories will likely fail");
    }

    let context = match AppContext::from_args(&args) {
        Ok(context) => context,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    // GTK must not see our own flags.
    let app = RelmApp::new("relm4.ghaf.wg-config-editor").with_args(vec![]);
    app.run::<AppModel>(context);

    Ok(())
}
