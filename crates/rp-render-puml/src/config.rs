//! PlantUML generator configuration.

/// Configuration for PlantUML text generation.
///
/// The default produces the plain sequence: no participant declarations and
/// uncolored arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumlRenderConfig {
    /// Fill the `entities` placeholder with one declaration per participant.
    pub declare_entities: bool,
    /// Draw colored calls with a colored arrow, `-[#rrggbb]>`.
    pub color_arrows: bool,
}

impl PumlRenderConfig {
    /// Everything switched on.
    #[must_use]
    pub fn rich() -> Self {
        Self {
            declare_entities: true,
            color_arrows: true,
        }
    }
}
