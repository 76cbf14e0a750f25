//! Synology Chat notifications via trigger states
//!
//! Nothing is sent from here. Each channel is a folder of string states
//! below the configured root; writing one of them with `ack = false` is the
//! signal an external sender script reacts to.

use gt_core::{Access, StateCommon, StateIdError, ValueType};
use gt_state_store::{StateHost, StoreResult};
use serde_json::json;

use crate::tools::GlobalTools;

/// Ids of one chat channel's trigger states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatChannelIds {
    pub channel: String,
    pub send: String,
    pub title: String,
    pub send_file: String,
    /// Lower-case spelling read by older sender scripts
    pub send_file_legacy: String,
}

/// Which trigger states a notification needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Triggers {
    Text,
    TextWithTitle,
    File,
}

impl<H: StateHost> GlobalTools<H> {
    /// Channel name to use; `None` or empty picks the configured default
    pub fn resolve_channel<'a>(&'a self, channel: Option<&'a str>) -> &'a str {
        channel
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.config.default_channel)
    }

    /// Trigger state ids of a channel below the configured root
    pub fn chat_channel_ids(&self, channel: Option<&str>) -> Result<ChatChannelIds, StateIdError> {
        let channel = Self::child_id(&self.config.synochat_root, self.resolve_channel(channel))?;
        let child = |name: &str| format!("{}.{}", channel, name);
        Ok(ChatChannelIds {
            send: child("send"),
            title: child("title"),
            send_file: child("sendFile"),
            send_file_legacy: child("sendfile"),
            channel,
        })
    }

    /// Send a text message
    pub fn notify_syno_chat(&self, channel: Option<&str>, message: &str) {
        self.notify("notify_syno_chat", channel, Triggers::Text, |ids| {
            self.host.set_state(&ids.send, json!(message), false)
        });
    }

    /// Send a text message, writing the title first if one is given
    pub fn notify_syno_chat_ex(&self, channel: Option<&str>, message: &str, title: Option<&str>) {
        self.notify("notify_syno_chat_ex", channel, Triggers::TextWithTitle, |ids| {
            if let Some(title) = title {
                self.host.set_state(&ids.title, json!(title), false)?;
            }
            self.host.set_state(&ids.send, json!(message), false)
        });
    }

    /// Send a file (path, URL or whatever the sender expects)
    ///
    /// Title and message are written first when given; the file value goes
    /// to both `sendFile` and `sendfile`.
    pub fn notify_syno_chat_file(
        &self,
        channel: Option<&str>,
        file_value: &str,
        message: Option<&str>,
        title: Option<&str>,
    ) {
        self.notify("notify_syno_chat_file", channel, Triggers::File, |ids| {
            if let Some(title) = title {
                self.host.set_state(&ids.title, json!(title), false)?;
            }
            if let Some(message) = message {
                self.host.set_state(&ids.send, json!(message), false)?;
            }
            self.host.set_state(&ids.send_file, json!(file_value), false)?;
            self.host
                .set_state(&ids.send_file_legacy, json!(file_value), false)
        });
    }

    fn notify<F>(&self, function: &str, channel: Option<&str>, triggers: Triggers, write: F)
    where
        F: FnOnce(&ChatChannelIds) -> StoreResult<()>,
    {
        let name = self.resolve_channel(channel);
        let ids = match self.chat_channel_ids(Some(name)) {
            Ok(ids) => ids,
            Err(e) => {
                self.warn(function, name, &e);
                return;
            }
        };
        self.ensure_chat_states(name, &ids, triggers);
        if let Err(e) = write(&ids) {
            self.warn(function, name, &e);
        }
    }

    fn ensure_chat_states(&self, name: &str, ids: &ChatChannelIds, triggers: Triggers) {
        let text = |label: String| {
            Some(StateCommon::state(label, "text", ValueType::String, Access::ReadWrite))
        };

        self.ensure_channel(
            &ids.channel,
            Some(StateCommon::named(format!("SynoChat Channel {}", name))),
        );
        self.ensure_state_legacy(&ids.send, text(format!("SynoChat message ({})", name)), json!(""));
        if triggers == Triggers::Text {
            return;
        }
        self.ensure_state_legacy(&ids.title, text(format!("SynoChat title ({})", name)), json!(""));
        if triggers == Triggers::TextWithTitle {
            return;
        }
        self.ensure_state_legacy(
            &ids.send_file,
            text(format!("SynoChat file ({})", name)),
            json!(""),
        );
        self.ensure_state_legacy(
            &ids.send_file_legacy,
            text(format!("SynoChat file legacy ({})", name)),
            json!(""),
        );
    }
}
