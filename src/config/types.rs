use serde::{Deserialize, Serialize};

use crate::status::FilamentStatus;

/// Pin level that means filament is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerState {
    #[default]
    High,
    Low,
}

impl TriggerState {
    /// Interpret a raw pin level (`true` = high) as a filament status.
    ///
    /// Library API for hosts that read the sensor pin themselves; the
    /// bundled binary only consumes the status endpoint.
    pub fn status_for_level(self, level_high: bool) -> FilamentStatus {
        let triggered = match self {
            TriggerState::High => level_high,
            TriggerState::Low => !level_high,
        };
        if triggered {
            FilamentStatus::Present
        } else {
            FilamentStatus::Absent
        }
    }
}

/// Resolved plugin settings, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_gpio_pin")]
    pub gpio_pin: u8,

    #[serde(default)]
    pub trigger_state: TriggerState,

    #[serde(default = "default_check_interval")]
    pub check_interval: f64,

    #[serde(default = "default_post_pause_gcode1")]
    pub post_pause_gcode1: String,

    #[serde(default)]
    pub post_pause_delay1: u64,

    #[serde(default = "default_post_pause_gcode2")]
    pub post_pause_gcode2: String,

    #[serde(default = "default_post_pause_delay2")]
    pub post_pause_delay2: u64,

    #[serde(default)]
    pub enable_debug_logs: bool,

    #[serde(default)]
    pub prevent_bounce: bool,

    #[serde(default = "default_load_unload_temperature")]
    pub load_unload_temperature: u16,

    #[serde(default = "default_true")]
    pub enable_resume_retract: bool,

    #[serde(default = "default_resume_retract_mm")]
    pub resume_retract_mm: f64,

    #[serde(default = "default_resume_retract_speed")]
    pub resume_retract_speed: u32,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            gpio_pin: default_gpio_pin(),
            trigger_state: TriggerState::default(),
            check_interval: default_check_interval(),
            post_pause_gcode1: default_post_pause_gcode1(),
            post_pause_delay1: 0,
            post_pause_gcode2: default_post_pause_gcode2(),
            post_pause_delay2: default_post_pause_delay2(),
            enable_debug_logs: false,
            prevent_bounce: false,
            load_unload_temperature: default_load_unload_temperature(),
            enable_resume_retract: true,
            resume_retract_mm: default_resume_retract_mm(),
            resume_retract_speed: default_resume_retract_speed(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_gpio_pin() -> u8 {
    4
}

fn default_check_interval() -> f64 {
    1.0
}

fn default_post_pause_gcode1() -> String {
    [
        "M83 ; relative extrusion",
        "G1 E-5 F300 ; retraction",
        "G4 P500 ; wait 0.5s",
        "G91 ; relative moves",
        "G1 Z30 F300 ; lift 30mm",
        "G90 ; absolute moves",
        "G1 X110 Y0 F6000 ; park",
    ]
    .join("\n")
}

fn default_post_pause_gcode2() -> String {
    ["M104 S0 ; hotend off", "M140 S0 ; bed off", "M84 ; motors off"].join("\n")
}

fn default_post_pause_delay2() -> u64 {
    3600
}

fn default_load_unload_temperature() -> u16 {
    240
}

fn default_true() -> bool {
    true
}

fn default_resume_retract_mm() -> f64 {
    2.5
}

fn default_resume_retract_speed() -> u32 {
    300
}
