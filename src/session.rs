//! Line-oriented front end mirroring the dashboard controls.

use std::path::PathBuf;

use tracing::debug;

use crate::dashboard::{Dashboard, WFS_LAYER};
use crate::map::MapViewport;
use crate::models::{LayerKey, Level, FOCUS_STATES};
use crate::render;

pub const HELP: &str = "\
Commands:
  state <name>      select a state (focus: Madhya Pradesh, Tripura, Odisha, Telangana)
  level <level>     select a level (state, district, subdistrict, village)
  toggle <layer>    toggle a layer (IFR, CR, CFR, assets)
  layer             show the layer name the loader will fetch
  load              load the WFS layer for the current selection
  scan <path>       upload a scanned document (image or PDF) for OCR/NER
  village <id>      set the village ID
  recommend         request DSS recommendations for the village ID
  show              render the dashboard
  help              show this message
  quit              leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    State(String),
    Level(Level),
    Toggle(LayerKey),
    Layer,
    Load,
    Scan(PathBuf),
    Village(String),
    Recommend,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "state" => Command::State(required(rest, "state <name>")?.to_string()),
            "level" => Command::Level(required(rest, "level <level>")?.parse()?),
            "toggle" => Command::Toggle(required(rest, "toggle <layer>")?.parse()?),
            "layer" => Command::Layer,
            "load" => Command::Load,
            "scan" => Command::Scan(PathBuf::from(required(rest, "scan <path>")?)),
            // An empty ID is allowed here; the DSS request rejects it
            "village" => Command::Village(rest.to_string()),
            "recommend" => Command::Recommend,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{}'; type 'help'", other)),
        };
        Ok(Some(command))
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(arg)
    }
}

/// What to print after a command, and whether to stop
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }
}

pub struct Session {
    dashboard: Dashboard,
    viewport: MapViewport,
}

impl Session {
    pub fn new(dashboard: Dashboard, viewport: MapViewport) -> Self {
        Self {
            dashboard,
            viewport,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Parse and run one line of input
    pub async fn handle_line(&self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Reply::default(),
            Err(message) => Reply::text(message),
        }
    }

    pub async fn execute(&self, command: Command) -> Reply {
        debug!("Session command: {:?}", command);
        match command {
            Command::State(name) => {
                self.dashboard.select_state(&name);
                if FOCUS_STATES.contains(&name.as_str()) {
                    Reply::text(format!("state: {}", name))
                } else {
                    Reply::text(format!("state: {} (not a focus state)", name))
                }
            }
            Command::Level(level) => {
                self.dashboard.select_level(level);
                Reply::text(format!("level: {}", level))
            }
            Command::Toggle(key) => {
                let active = self.dashboard.toggle_layer(key);
                Reply::text(format!("{}: {}", key, if active { "on" } else { "off" }))
            }
            Command::Layer => {
                let state = self.dashboard.snapshot();
                Reply::text(state.selection().layer_name(WFS_LAYER))
            }
            Command::Load => match self.dashboard.load_layer().await {
                Ok(()) => Reply::text(render::map_panel(&self.viewport, &self.dashboard.snapshot())),
                Err(_) => Reply::default(),
            },
            Command::Scan(path) => match self.dashboard.upload_document(Some(&path)).await {
                Ok(_) => Reply::text(render::documents_panel(&self.dashboard.snapshot())),
                Err(_) => Reply::default(),
            },
            Command::Village(id) => {
                self.dashboard.set_village(&id);
                Reply::text(format!("village: {}", id))
            }
            Command::Recommend => {
                let village = self.dashboard.snapshot().selected_village().map(str::to_string);
                match self.dashboard.request_recommendation(village.as_deref()).await {
                    Ok(()) => Reply::text(render::recommendation_panel(&self.dashboard.snapshot())),
                    Err(_) => Reply::default(),
                }
            }
            Command::Show => Reply::text(render::dashboard(&self.viewport, &self.dashboard.snapshot())),
            Command::Help => Reply::text(HELP),
            Command::Quit => Reply {
                output: String::new(),
                quit: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("state Madhya Pradesh").unwrap(),
            Some(Command::State("Madhya Pradesh".into()))
        );
        assert_eq!(
            Command::parse("  LEVEL sub-district ").unwrap(),
            Some(Command::Level(Level::Subdistrict))
        );
        assert_eq!(
            Command::parse("toggle cfr").unwrap(),
            Some(Command::Toggle(LayerKey::Cfr))
        );
        assert_eq!(
            Command::parse("scan /tmp/claim form.pdf").unwrap(),
            Some(Command::Scan(PathBuf::from("/tmp/claim form.pdf")))
        );
        assert_eq!(Command::parse("village").unwrap(), Some(Command::Village(String::new())));
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("state").unwrap_err(), "usage: state <name>");
        assert!(Command::parse("level county").unwrap_err().contains("unknown level"));
        assert!(Command::parse("toggle roads").unwrap_err().contains("unknown layer"));
        assert!(Command::parse("zoom 4").unwrap_err().contains("unknown command"));
    }
}
