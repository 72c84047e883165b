/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::cli::Args;
use crate::controller::{InterfaceController, ReportPolicy, WgQuick};
use crate::discovery::{self, ConfigRecord};
use crate::error::{Error, Result};
use crate::notice::Severity;
use crate::store;
use crate::tab::{TabInit, TabModel};
use crate::toast::ToastManager;
use log::{error, info};
use relm4::{adw, adw::prelude::*, prelude::*};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Everything the window needs, built once at startup.
#[derive(Debug)]
pub struct AppContext {
    pub source: PathBuf,
    pub records: Vec<ConfigRecord>,
    pub controller: InterfaceController,
}

impl AppContext {
    pub fn from_args(args: &Args) -> Result<Self> {
        let (source, records) = match &args.config_file {
            Some(file) => (file.clone(), vec![single_record(file, args.interface.as_deref())?]),
            None => (args.configs_dir.clone(), discovery::scan(&args.configs_dir)?),
        };

        let runner = WgQuick::new(&args.wg_quick, Duration::from_secs(args.command_timeout));
        let policy = if args.optimistic {
            ReportPolicy::Optimistic
        } else {
            ReportPolicy::Strict
        };

        Ok(Self {
            source,
            records,
            controller: InterfaceController::new(Arc::new(runner), policy),
        })
    }

    /// Read every record. Unreadable ones are left out and returned as errors.
    pub fn load_tabs(&self) -> (Vec<TabInit>, Vec<Error>) {
        let mut tabs = vec![];
        let mut skipped = vec![];

        for record in &self.records {
            match store::read(record) {
                Ok(content) => tabs.push(TabInit {
                    record: record.clone(),
                    content,
                    controller: self.controller.clone(),
                }),
                Err(err) => {
                    error!("Skipping {}: {err}", record.name);
                    skipped.push(err);
                }
            }
        }

        (tabs, skipped)
    }
}

fn single_record(file: &Path, interface: Option<&str>) -> Result<ConfigRecord> {
    let record = ConfigRecord::from_path(file).ok_or_else(|| Error::Discovery {
        dir: file.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "not a .conf file"),
    })?;

    Ok(match interface {
        Some(name) => record.with_name(name),
        None => record,
    })
}

pub struct AppModel {
    subtitle: String,
    _tabs: Vec<Controller<TabModel>>,
    toasts: ToastManager,
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppContext;
    type Input = ();
    type Output = ();

    view! {
        adw::ApplicationWindow {
            set_title: Some("WireGuard"),
            set_default_size: (900, 400),

            #[wrap(Some)]
            set_content = &adw::ToolbarView {
                add_top_bar = &adw::HeaderBar {
                    #[wrap(Some)]
                    set_title_widget = &adw::WindowTitle {
                        set_title: "WireGuard",
                        set_subtitle: &model.subtitle,
                    },
                },

                set_content: Some(model.toasts.overlay_widget()),
            },
        }
    }

    fn init(
        context: Self::Init,
        root: Self::Root,
        _sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (inits, skipped) = context.load_tabs();
        info!(
            "Opening {} of {} configurations from {}",
            inits.len(),
            context.records.len(),
            context.source.display()
        );

        let notebook = gtk::Notebook::builder().scrollable(true).build();
        let mut tabs = Vec::with_capacity(inits.len());
        for init in inits {
            let label = gtk::Label::new(Some(&init.record.name));
            let tab = TabModel::builder().launch(init).detach();
            notebook.append_page(tab.widget(), Some(&label));
            tabs.push(tab);
        }

        let toasts = ToastManager::default();
        if tabs.is_empty() {
            let empty = adw::StatusPage::builder()
                .icon_name("network-vpn-symbolic")
                .title("No configurations")
                .description(format!("No readable .conf files in {}", context.source.display()))
                .build();
            toasts.overlay_widget().set_child(Some(&empty));
        } else {
            toasts.overlay_widget().set_child(Some(&notebook));
        }
        for err in &skipped {
            toasts.show(&err.to_string(), Severity::Error);
        }

        let model = AppModel {
            subtitle: context.source.display().to_string(),
            _tabs: tabs,
            toasts,
        };

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[test]
    fn context_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wg0.conf"), "[Interface]\n").unwrap();
        fs::write(dir.path().join("office.conf"), "[Interface]\n").unwrap();
        let args = Args::parse_from([
            "wg-config-editor",
            "--configs-dir",
            dir.path().to_str().unwrap(),
        ]);

        let context = AppContext::from_args(&args).unwrap();

        assert_eq!(context.source, dir.path());
        let names: Vec<_> = context.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["office", "wg0"]);
    }

    #[test]
    fn unreadable_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "wg-config-editor",
            "--configs-dir",
            dir.path().join("missing").to_str().unwrap(),
        ]);

        assert!(matches!(
            AppContext::from_args(&args),
            Err(Error::Discovery { .. })
        ));
    }

    #[test]
    fn single_file_mode_uses_interface_name() {
        let args = Args::parse_from([
            "wg-config-editor",
            "--config-file",
            "/etc/wireguard/site-a.conf",
            "--interface",
            "wg0",
        ]);

        let context = AppContext::from_args(&args).unwrap();

        assert_eq!(
            context.records,
            [ConfigRecord {
                name: "wg0".into(),
                file: "/etc/wireguard/site-a.conf".into(),
            }]
        );
    }

    #[test]
    fn single_file_mode_defaults_to_stem() {
        let args = Args::parse_from(["wg-config-editor", "--config-file", "/tmp/home.conf"]);

        let context = AppContext::from_args(&args).unwrap();

        assert_eq!(context.records[0].name, "home");
    }

    #[test]
    fn single_file_mode_needs_conf_suffix() {
        let args = Args::parse_from([
            "wg-config-editor",
            "--config-file",
            "/tmp/home.txt",
            "--interface",
            "wg0",
        ]);

        assert!(matches!(
            AppContext::from_args(&args),
            Err(Error::Discovery { dir, .. }) if dir.ends_with("home.txt")
        ));
    }

    #[test]
    fn unreadable_configs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wg0.conf"), "[Interface]\nListenPort = 51820\n").unwrap();
        let args = Args::parse_from([
            "wg-config-editor",
            "--configs-dir",
            dir.path().to_str().unwrap(),
        ]);
        let mut context = AppContext::from_args(&args).unwrap();
        context.records.push(ConfigRecord {
            name: "gone".into(),
            file: dir.path().join("gone.conf"),
        });

        let (tabs, skipped) = context.load_tabs();

        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].record.name, "wg0");
        assert_eq!(tabs[0].content, "[Interface]\nListenPort = 51820\n");
        assert_eq!(skipped.len(), 1);
        assert!(matches!(&skipped[0], Error::Read { file, .. } if file.ends_with("gone.conf")));
    }
}
