use serde::{Deserialize, Serialize};

/// Paint tools available on the kiosk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Round,
    #[default]
    Fountain,
    Eraser,
    Bucket,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Round,
        ToolKind::Fountain,
        ToolKind::Eraser,
        ToolKind::Bucket,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Round => "Brush",
            Self::Fountain => "Pen",
            Self::Eraser => "Eraser",
            Self::Bucket => "Bucket",
        }
    }

    /// Glyph shown on the tool button
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Round => "🖌",
            Self::Fountain => "✒",
            Self::Eraser => "⌫",
            Self::Bucket => "🪣",
        }
    }

    /// Tools that open a stroke on pointer-down; the bucket fills instantly
    pub fn draws_strokes(&self) -> bool {
        !matches!(self, Self::Bucket)
    }
}

/// Three nib sizes scaled from a 1366x768 reference screen, kept strictly
/// increasing so the buttons never collapse onto the same size
pub fn scaled_size_values(screen_width: f32, screen_height: f32) -> [u32; 3] {
    const BASE: [f32; 3] = [3.0, 6.0, 12.0];
    let scale = (screen_width / 1366.0).min(screen_height / 768.0);
    let mut sizes = BASE.map(|size| ((size * scale).round() as u32).max(1));
    for idx in 1..sizes.len() {
        if sizes[idx] <= sizes[idx - 1] {
            sizes[idx] = sizes[idx - 1] + 1;
        }
    }
    sizes
}
