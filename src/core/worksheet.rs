use crate::domain::model::ChannelEntry;

/// Working list of channel entries accumulated before a forecast run.
///
/// Owned by the calling layer and handed to the engine as an immutable
/// batch; insertion order is retained and becomes the row ordering of the
/// churn-aware projection. The engine itself never holds one of these
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    entries: Vec<ChannelEntry>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ChannelEntry>) -> Self {
        Self { entries }
    }

    pub fn add(&mut self, entry: ChannelEntry) {
        tracing::debug!("Added {} under {} to the forecast", entry.medium, entry.channel);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
