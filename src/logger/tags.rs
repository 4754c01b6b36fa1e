/// Log tags identify which part of the keeper emitted a message.
///
/// Each tag has a debug key used for `--debug-<key>` filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Oracle,
    Backend,
    Keeper,
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Oracle => "oracle",
            LogTag::Backend => "backend",
            LogTag::Keeper => "keeper",
        }
        .to_string()
    }

    /// Uppercase label used in console and file output
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }

    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::System,
            LogTag::Config,
            LogTag::Oracle,
            LogTag::Backend,
            LogTag::Keeper,
        ]
    }
}
