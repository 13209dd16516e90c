// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// The two shipped flavours of the rain. They run the same algorithm and
/// differ only in the preset they load into `RainConfig`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Tight columns, tall rows, per-frame speed jitter, no message spacing.
    #[value(name = "classic")]
    Classic,
    /// Wide columns, fixed per-column speed, messages kept apart.
    #[value(name = "guarded")]
    Guarded,
}
