/// Events emitted during a frame.
/// The frame driver consumes these for logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed,
    LeftGround,
    LevelChanged { from: usize, to: usize },
    Died { level: usize },
    FpsRefreshed(u32),
    PaletteToggled,
    TickLabelToggled { tps: bool },
}
