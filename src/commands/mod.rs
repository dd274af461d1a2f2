mod dispatch;
mod gcode;

pub use dispatch::{CommandSink, FilamentCommands};
pub use gcode::{
    load_sequence, resume_retract_sequence, script_lines, unload_sequence, EXTRUDE_DISTANCE_MM,
    EXTRUDE_FEED_RATE,
};
