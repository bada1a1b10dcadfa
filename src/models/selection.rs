//! Map selection types: focus state, administrative level and claim layers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Workspace prefix of every published FRA layer.
pub const LAYER_NAMESPACE: &str = "fra";

/// States the atlas focuses on, in selector order.
pub const FOCUS_STATES: [&str; 4] = ["Madhya Pradesh", "Tripura", "Odisha", "Telangana"];

/// Administrative level a layer is aggregated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    State,
    District,
    Subdistrict,
    Village,
}

impl Level {
    /// All levels, coarsest first
    pub fn all() -> &'static [Level] {
        &[
            Level::State,
            Level::District,
            Level::Subdistrict,
            Level::Village,
        ]
    }

    /// Identifier used in layer names
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::State => "state",
            Level::District => "district",
            Level::Subdistrict => "subdistrict",
            Level::Village => "village",
        }
    }

    /// Human-readable label for selectors
    pub fn label(&self) -> &'static str {
        match self {
            Level::State => "State",
            Level::District => "District",
            Level::Subdistrict => "Sub-district",
            Level::Village => "Village",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(Level::State),
            "district" => Ok(Level::District),
            "subdistrict" | "sub-district" => Ok(Level::Subdistrict),
            "village" => Ok(Level::Village),
            other => Err(format!(
                "unknown level '{}' (expected state, district, subdistrict or village)",
                other
            )),
        }
    }
}

/// Claim layer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKey {
    /// Individual forest rights
    #[serde(rename = "IFR")]
    Ifr,
    /// Community rights
    #[serde(rename = "CR")]
    Cr,
    /// Community forest resource rights
    #[serde(rename = "CFR")]
    Cfr,
    /// Mapped village assets
    #[serde(rename = "assets")]
    Assets,
}

impl LayerKey {
    pub fn all() -> &'static [LayerKey] {
        &[LayerKey::Ifr, LayerKey::Cr, LayerKey::Cfr, LayerKey::Assets]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKey::Ifr => "IFR",
            LayerKey::Cr => "CR",
            LayerKey::Cfr => "CFR",
            LayerKey::Assets => "assets",
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ifr" => Ok(LayerKey::Ifr),
            "cr" => Ok(LayerKey::Cr),
            "cfr" => Ok(LayerKey::Cfr),
            "assets" => Ok(LayerKey::Assets),
            other => Err(format!(
                "unknown layer '{}' (expected IFR, CR, CFR or assets)",
                other
            )),
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Build the published layer name for a state, claim layer and level.
///
/// `("Madhya Pradesh", IFR, district)` becomes `fra:madhya_pradesh_ifr_district`.
pub fn build_layer_name(state: &str, key: LayerKey, level: Level) -> String {
    let state = state.to_lowercase();
    let state = whitespace_runs().replace_all(&state, "_");
    format!(
        "{}:{}_{}_{}",
        LAYER_NAMESPACE,
        state,
        key.as_str().to_lowercase(),
        level.as_str()
    )
}

/// Current state/level selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub state: String,
    pub level: Level,
}

impl Selection {
    pub fn new(state: impl Into<String>, level: Level) -> Self {
        Self {
            state: state.into(),
            level,
        }
    }

    /// Layer name for `key` at this selection
    pub fn layer_name(&self, key: LayerKey) -> String {
        build_layer_name(&self.state, key, self.level)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(FOCUS_STATES[0], Level::District)
    }
}

/// Visibility flag per claim layer. All layers start visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerToggles {
    #[serde(rename = "IFR")]
    ifr: bool,
    #[serde(rename = "CR")]
    cr: bool,
    #[serde(rename = "CFR")]
    cfr: bool,
    assets: bool,
}

impl LayerToggles {
    pub fn is_active(&self, key: LayerKey) -> bool {
        match key {
            LayerKey::Ifr => self.ifr,
            LayerKey::Cr => self.cr,
            LayerKey::Cfr => self.cfr,
            LayerKey::Assets => self.assets,
        }
    }

    /// Flip one layer; returns its new visibility
    pub fn toggle(&mut self, key: LayerKey) -> bool {
        let flag = match key {
            LayerKey::Ifr => &mut self.ifr,
            LayerKey::Cr => &mut self.cr,
            LayerKey::Cfr => &mut self.cfr,
            LayerKey::Assets => &mut self.assets,
        };
        *flag = !*flag;
        *flag
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerKey, bool)> + '_ {
        LayerKey::all().iter().map(move |k| (*k, self.is_active(*k)))
    }
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            ifr: true,
            cr: true,
            cfr: true,
            assets: true,
        }
    }
}
