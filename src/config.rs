use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Nominal horizontal footprint used for plane sizing.
    pub node_width: f32,
    pub level_height: f32,
    /// Floor for the gap between same-depth neighbors after overlap
    /// resolution.
    pub min_distance: f32,
    pub sibling_separation: f32,
    pub cousin_separation: f32,
    /// Combined label length (chars) above which pairs earn extra room.
    pub text_separation_threshold: f32,
    pub text_separation_divisor: f32,
    pub width_fill_ratio: f32,
    pub sibling_width_factor: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub thought_width: f32,
    pub thought_height: f32,
    pub framing_rx: f32,
    pub framing_ry: f32,
    pub follow_zoom: f32,
    pub initial_zoom: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            level_height: 140.0,
            min_distance: 180.0,
            sibling_separation: 2.5,
            cousin_separation: 3.5,
            text_separation_threshold: 30.0,
            text_separation_divisor: 100.0,
            width_fill_ratio: 0.9,
            sibling_width_factor: 1.2,
            viewport_width: 1200.0,
            viewport_height: 800.0,
            thought_width: 160.0,
            thought_height: 44.0,
            framing_rx: 90.0,
            framing_ry: 35.0,
            follow_zoom: 1.5,
            initial_zoom: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub default_speed: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { default_speed: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Margin around the plane so framing ellipses are not clipped.
    pub padding: f32,
    pub label_max_thought: usize,
    pub label_max_framing: usize,
    /// Truncation backtracks to a word boundary when the last space sits
    /// past this fraction of the limit.
    pub label_break_ratio: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 60.0,
            label_max_thought: 25,
            label_max_framing: 35,
            label_break_ratio: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub playback: PlaybackConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutOverrides>,
    playback: Option<PlaybackOverrides>,
    render: Option<RenderOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    node_width: Option<f32>,
    level_height: Option<f32>,
    min_distance: Option<f32>,
    sibling_separation: Option<f32>,
    cousin_separation: Option<f32>,
    viewport_width: Option<f32>,
    viewport_height: Option<f32>,
    follow_zoom: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackOverrides {
    default_speed: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOverrides {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

/// Loads a config file with partial overrides on top of the defaults.
/// Plain JSON is tried first, JSON5 as the tolerant fallback.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = theme_by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.level_height {
            config.layout.level_height = v;
        }
        if let Some(v) = layout.min_distance {
            config.layout.min_distance = v;
        }
        if let Some(v) = layout.sibling_separation {
            config.layout.sibling_separation = v;
        }
        if let Some(v) = layout.cousin_separation {
            config.layout.cousin_separation = v;
        }
        if let Some(v) = layout.viewport_width {
            config.layout.viewport_width = v;
        }
        if let Some(v) = layout.viewport_height {
            config.layout.viewport_height = v;
        }
        if let Some(v) = layout.follow_zoom {
            config.layout.follow_zoom = v;
        }
    }

    if let Some(playback) = parsed.playback
        && let Some(v) = playback.default_speed
    {
        config.playback.default_speed = v;
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
    }

    Ok(config)
}

pub fn theme_by_name(name: &str) -> Option<Theme> {
    match name {
        "light" | "default" => Some(Theme::light()),
        "dark" => Some(Theme::dark()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.min_distance, 180.0);
        assert_eq!(config.playback.default_speed, 5);
    }

    #[test]
    fn json5_overrides_merge_over_defaults() {
        let dir = std::env::temp_dir().join("rtr-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json5");
        std::fs::write(
            &path,
            "// comment\n{theme: 'dark', layout: {minDistance: 200}, playback: {defaultSpeed: 9}}",
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout.min_distance, 200.0);
        assert_eq!(config.layout.node_width, 220.0);
        assert_eq!(config.playback.default_speed, 9);
        assert_eq!(config.theme.background, Theme::dark().background);
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let dir = std::env::temp_dir().join("rtr-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad-theme.json");
        std::fs::write(&path, r#"{"theme": "sepia"}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
