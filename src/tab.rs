/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::controller::{InterfaceController, LinkState, NoticeSink, Transition};
use crate::discovery::ConfigRecord;
use crate::notice::{FLASH_DURATION, FlashToken, Notice, Severity};
use crate::store;
use log::{debug, info, warn};
use relm4::{gtk::prelude::*, prelude::*};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Starting,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning(Direction),
    Flashing(Severity),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{name} is busy with {running:?}")]
pub struct Busy {
    pub name: String,
    pub running: Action,
}

/// State of one tab, independent of any widget.
#[derive(Debug)]
pub struct TabViewModel {
    record: ConfigRecord,
    content: String,
    notice: Notice,
    running: Option<Action>,
    direction: Option<Direction>,
    link: LinkState,
}

impl TabViewModel {
    pub fn new(record: ConfigRecord, content: String, link: LinkState) -> Self {
        Self {
            record,
            content,
            notice: Notice::default(),
            running: None,
            direction: None,
            link,
        }
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Text as last read from or written to disk.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn set_link(&mut self, link: LinkState) {
        self.link = link;
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn phase(&self) -> Phase {
        match (self.running, self.direction) {
            (Some(_), Some(direction)) => Phase::Transitioning(direction),
            _ if self.notice.is_visible() => Phase::Flashing(self.notice.severity()),
            _ => Phase::Idle,
        }
    }

    /// Claim the tab for `action`; rejected while another action runs.
    pub fn begin(&mut self, action: Action) -> Result<(), Busy> {
        self.check_idle()?;
        debug!("{}: {action:?}", self.record.name);
        self.running = Some(action);
        self.direction = None;
        Ok(())
    }

    /// Show a transition. Returns a token when the notice must be hidden later.
    pub fn apply(&mut self, transition: Transition) -> Option<FlashToken> {
        let name = &self.record.name;
        match transition {
            Transition::Starting => {
                self.direction = Some(Direction::Starting);
                self.notice.show(format!("Starting {name}..."), Severity::Info);
                None
            }
            Transition::Stopping => {
                self.direction = Some(Direction::Stopping);
                self.notice.show(format!("Stopping {name}..."), Severity::Info);
                None
            }
            Transition::Up => Some(self.notice.flash(format!("{name} is up"), Severity::Success)),
            Transition::Down => {
                Some(self.notice.flash(format!("{name} is down"), Severity::Success))
            }
            Transition::Failed { verb, reason } => {
                self.notice.show(
                    format!("Error: wg-quick {verb} {name}: {reason}"),
                    Severity::Error,
                );
                None
            }
        }
    }

    /// The running action is over, including every step of a restart.
    pub fn finish(&mut self) {
        self.running = None;
        self.direction = None;
    }

    /// Normalize and persist edited text. Failures stay on screen.
    pub fn submit(&mut self, text: &str) -> Result<Option<FlashToken>, Busy> {
        self.check_idle()?;

        match store::save(&self.record, text) {
            Ok(normalized) => {
                info!("Saved {}", self.record.file.display());
                self.content = normalized;
                Ok(Some(
                    self.notice
                        .flash("Configuration updated!", Severity::Success),
                ))
            }
            Err(err) => {
                warn!("{err}");
                self.notice.show(format!("Error: {err}"), Severity::Error);
                Ok(None)
            }
        }
    }

    pub fn expire(&mut self, token: FlashToken) -> bool {
        self.notice.expire(token)
    }

    fn check_idle(&self) -> Result<(), Busy> {
        match self.running {
            Some(running) => Err(Busy {
                name: self.record.name.clone(),
                running,
            }),
            None => Ok(()),
        }
    }
}

/// Resolves once a flash issued as `token` should be hidden.
pub async fn hide_after(token: FlashToken) -> FlashToken {
    tokio::time::sleep(FLASH_DURATION).await;
    token
}

pub struct TabInit {
    pub record: ConfigRecord,
    pub content: String,
    pub controller: InterfaceController,
}

pub struct TabModel {
    state: TabViewModel,
    controller: InterfaceController,
    buffer: gtk::TextBuffer,
}

impl TabModel {
    fn link_label(&self) -> &'static str {
        match self.state.link() {
            LinkState::Up => "Interface is active",
            LinkState::Down => "Interface is inactive",
            LinkState::Absent => "Interface is not present",
        }
    }

    fn notice_markup(&self) -> String {
        let notice = self.state.notice();
        format!(
            "<span foreground='{}'>{}</span>",
            notice.severity().color(),
            gtk::glib::markup_escape_text(notice.text())
        )
    }

    fn run(&mut self, action: Action, sender: &ComponentSender<Self>) {
        if let Err(busy) = self.state.begin(action) {
            warn!("Ignoring {action:?}: {busy}");
            return;
        }

        let controller = self.controller.clone();
        let name = self.state.record().name.clone();
        sender.spawn_command(move |out| {
            let mut sink = CommandSink(out.clone());
            match action {
                Action::Start => controller.bring_up(&name, &mut sink),
                Action::Stop => controller.bring_down(&name, &mut sink),
                Action::Restart => controller.restart(&name, &mut sink),
            };
            out.emit(TabCommand::Finished);
        });
    }

    fn schedule_hide(&self, sender: &ComponentSender<Self>, token: FlashToken) {
        sender.oneshot_command(async move { TabCommand::Expire(hide_after(token).await) });
    }
}

/// Forwards transitions from the worker thread to the main loop.
struct CommandSink(relm4::Sender<TabCommand>);

impl NoticeSink for CommandSink {
    fn notify(&mut self, transition: Transition) {
        self.0.emit(TabCommand::Transition(transition));
    }
}

#[derive(Debug)]
pub enum TabInput {
    Run(Action),
    Save,
}

#[derive(Debug)]
pub enum TabCommand {
    Transition(Transition),
    Finished,
    Expire(FlashToken),
}

#[relm4::component(pub)]
impl Component for TabModel {
    type Init = TabInit;
    type Input = TabInput;
    type Output = ();
    type CommandOutput = TabCommand;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 5,
            set_margin_all: 5,

            gtk::ScrolledWindow {
                set_vexpand: true,
                set_hexpand: true,

                gtk::TextView {
                    set_buffer: Some(&model.buffer),
                    set_monospace: true,
                    #[watch]
                    set_editable: !model.state.is_busy(),
                },
            },

            gtk::Label {
                set_halign: gtk::Align::Start,
                set_selectable: true,
                set_wrap: true,
                #[watch]
                set_visible: model.state.notice().is_visible(),
                #[watch]
                set_markup: &model.notice_markup(),
            },

            gtk::CenterBox {
                #[wrap(Some)]
                set_start_widget = &gtk::Label {
                    add_css_class: "dim-label",
                    #[watch]
                    set_label: model.link_label(),
                },

                #[wrap(Some)]
                set_end_widget = &gtk::Box {
                    set_spacing: 5,

                    gtk::Button {
                        set_label: "Start",
                        #[watch]
                        set_sensitive: !model.state.is_busy(),
                        connect_clicked => TabInput::Run(Action::Start),
                    },

                    gtk::Button {
                        set_label: "Stop",
                        #[watch]
                        set_sensitive: !model.state.is_busy(),
                        connect_clicked => TabInput::Run(Action::Stop),
                    },

                    gtk::Button {
                        set_label: "Restart",
                        #[watch]
                        set_sensitive: !model.state.is_busy(),
                        connect_clicked => TabInput::Run(Action::Restart),
                    },

                    gtk::Button {
                        set_label: "Save",
                        add_css_class: "suggested-action",
                        #[watch]
                        set_sensitive: !model.state.is_busy(),
                        connect_clicked => TabInput::Save,
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let TabInit {
            record,
            content,
            controller,
        } = init;

        let buffer = gtk::TextBuffer::builder().text(content.as_str()).build();
        let link = controller.link_state(&record.name);

        let model = TabModel {
            state: TabViewModel::new(record, content, link),
            controller,
            buffer,
        };

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            TabInput::Run(action) => self.run(action, &sender),
            TabInput::Save => {
                let text = self
                    .buffer
                    .text(&self.buffer.start_iter(), &self.buffer.end_iter(), false);
                match self.state.submit(text.as_str()) {
                    Ok(Some(token)) => {
                        self.buffer.set_text(self.state.content());
                        self.schedule_hide(&sender, token);
                    }
                    Ok(None) => (),
                    Err(busy) => warn!("Ignoring save: {busy}"),
                }
            }
        }
    }

    fn update_cmd(
        &mut self,
        msg: Self::CommandOutput,
        sender: ComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            TabCommand::Transition(transition) => {
                if let Some(token) = self.state.apply(transition) {
                    self.schedule_hide(&sender, token);
                }
            }
            TabCommand::Finished => {
                self.state.finish();
                let link = self.controller.link_state(&self.state.record().name);
                self.state.set_link(link);
            }
            TabCommand::Expire(token) => {
                self.state.expire(token);
            }
        }
    }
}
