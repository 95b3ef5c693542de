use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub link_color: String,
    pub text_color: String,
    pub framing_fill: String,
    pub framing_border: String,
    pub thought_fill: String,
    pub thought_border: String,
    pub productive_border: String,
    pub rejected_border: String,
    pub current_stroke: String,
    pub visited_fill: String,
    pub upward_stroke: String,
    pub deleted_stroke: String,
    pub dimmed_opacity: f32,
    pub faded_opacity: f32,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            link_color: "#7A8AA6".to_string(),
            text_color: "#1C2430".to_string(),
            framing_fill: "#E8F0FE".to_string(),
            framing_border: "#4A74C9".to_string(),
            thought_fill: "#F8FAFF".to_string(),
            thought_border: "#C7D2E5".to_string(),
            productive_border: "#3C9A5F".to_string(),
            rejected_border: "#C94A4A".to_string(),
            current_stroke: "#E8B931".to_string(),
            visited_fill: "#EDF7EF".to_string(),
            upward_stroke: "#F0E68C".to_string(),
            deleted_stroke: "#C94A4A".to_string(),
            dimmed_opacity: 0.35,
            faded_opacity: 0.4,
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#14181F".to_string(),
            link_color: "#5B6B85".to_string(),
            text_color: "#E4E9F1".to_string(),
            framing_fill: "#1D2B45".to_string(),
            framing_border: "#6E96E8".to_string(),
            thought_fill: "#1A2230".to_string(),
            thought_border: "#3A485F".to_string(),
            productive_border: "#4FBF7A".to_string(),
            rejected_border: "#E06666".to_string(),
            current_stroke: "#F2C94C".to_string(),
            visited_fill: "#1E3226".to_string(),
            upward_stroke: "#F0E68C".to_string(),
            deleted_stroke: "#E06666".to_string(),
            dimmed_opacity: 0.3,
            faded_opacity: 0.35,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
