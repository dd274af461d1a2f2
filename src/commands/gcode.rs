//! G-code sequences sent on behalf of the user.

/// Filament length moved by a single load/unload, in millimetres.
pub const EXTRUDE_DISTANCE_MM: u32 = 20;

/// Feed rate for load/unload moves, in mm/min.
pub const EXTRUDE_FEED_RATE: u32 = 300;

/// Heat the hotend and push filament forward in relative extrusion mode.
pub fn load_sequence(temperature: u16) -> Vec<String> {
    extrude_sequence(temperature, format!("E{EXTRUDE_DISTANCE_MM}"))
}

/// Mirror of [`load_sequence`] with a negative extrusion distance.
pub fn unload_sequence(temperature: u16) -> Vec<String> {
    extrude_sequence(temperature, format!("E-{EXTRUDE_DISTANCE_MM}"))
}

fn extrude_sequence(temperature: u16, extrusion: String) -> Vec<String> {
    vec![
        format!("M104 S{temperature}"),
        "M83".to_string(),
        format!("G1 {extrusion} F{EXTRUDE_FEED_RATE}"),
    ]
}

/// Short retraction issued right before a paused print resumes.
/// Empty when disabled or the distance is not positive.
pub fn resume_retract_sequence(enabled: bool, distance_mm: f64, speed: u32) -> Vec<String> {
    if !enabled || distance_mm.is_nan() || distance_mm <= 0.0 {
        return Vec::new();
    }
    vec![
        "G91".to_string(),
        format!("G1 E-{distance_mm} F{speed}"),
        "G90".to_string(),
    ]
}

/// Split a configured multi-line script into the commands to send.
pub fn script_lines(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
