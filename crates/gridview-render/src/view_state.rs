//! Persisted camera state.
//!
//! A plain-text key/value file, one record per line, values as
//! whitespace-separated floats:
//!
//! ```text
//! camera_position 0 0 10
//! camera_orientation 0 0 -1
//! camera_updirection 0 1 0
//! zoom_ratio 1
//! ```
//!
//! Written when the camera is dropped, read when one is constructed with
//! persistence enabled. A missing file is not an error; defaults apply.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec3;

/// Default config file name, resolved in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".gridpro_view.config";

/// Environment variable overriding the config file path.
pub const CONFIG_FILE_ENV: &str = "GRIDPRO_VIEW_CONFIG";

/// The camera state that survives across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Camera position in world space.
    pub position: Vec3,
    /// Forward orientation.
    pub orientation: Vec3,
    /// Up direction.
    pub up: Vec3,
    /// Cumulative zoom ratio.
    pub zoom_ratio: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            orientation: Vec3::NEG_Z,
            up: Vec3::Y,
            zoom_ratio: 1.0,
        }
    }
}

/// Resolves the config file path, honoring the environment override.
#[must_use]
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_FILE_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Loads a view state from `path`. A missing file yields `Ok(None)`.
pub fn load(path: &Path) -> io::Result<Option<ViewState>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse(&text))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Saves `state` to `path`, replacing any previous contents.
pub fn save(path: &Path, state: &ViewState) -> io::Result<()> {
    fs::write(path, render(state))
}

fn parse_vec3(fields: &[&str]) -> Option<Vec3> {
    match fields {
        [x, y, z] => Some(Vec3::new(
            x.parse().ok()?,
            y.parse().ok()?,
            z.parse().ok()?,
        )),
        _ => None,
    }
}

/// Parses the key/value text format. Unknown keys and malformed records are
/// skipped; absent records keep their defaults.
#[must_use]
pub fn parse(text: &str) -> ViewState {
    let mut state = ViewState::default();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(key) = fields.next() else { continue };
        let rest: Vec<&str> = fields.collect();
        match key {
            "camera_position" => {
                if let Some(v) = parse_vec3(&rest) {
                    state.position = v;
                }
            }
            "camera_orientation" => {
                if let Some(v) = parse_vec3(&rest) {
                    state.orientation = v;
                }
            }
            "camera_updirection" => {
                if let Some(v) = parse_vec3(&rest) {
                    state.up = v;
                }
            }
            "zoom_ratio" => {
                if let [z] = rest.as_slice() {
                    if let Ok(z) = z.parse() {
                        state.zoom_ratio = z;
                    }
                }
            }
            _ => {}
        }
    }
    state
}

/// Renders a view state in the key/value text format.
#[must_use]
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    let p = state.position;
    let o = state.orientation;
    let u = state.up;
    let _ = writeln!(out, "camera_position {} {} {}", p.x, p.y, p.z);
    let _ = writeln!(out, "camera_orientation {} {} {}", o.x, o.y, o.z);
    let _ = writeln!(out, "camera_updirection {} {} {}", u.x, u.y, u.z);
    let _ = writeln!(out, "zoom_ratio {}", state.zoom_ratio);
    out
}
