/// Which frame indices get written out. Fixed before streaming starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriteria {
    ExportAll,
    ExportOne(u64),
    /// Half-open: `start <= frame < end`.
    ExportRange { start: u64, end: u64 },
}

/// Used when neither a target frame nor a range was given.
pub const DEFAULT_SELECTION: SelectionCriteria = SelectionCriteria::ExportAll;

impl Default for SelectionCriteria {
    fn default() -> Self {
        DEFAULT_SELECTION
    }
}

impl SelectionCriteria {
    /// A target frame wins over a range; with neither, everything is exported.
    pub fn from_options(target: Option<u64>, range: Option<(u64, u64)>) -> Self {
        match (target, range) {
            (Some(frame), _) => SelectionCriteria::ExportOne(frame),
            (None, Some((start, end))) => SelectionCriteria::ExportRange { start, end },
            (None, None) => DEFAULT_SELECTION,
        }
    }

    /// Frames that must be read to cover the selection, if the selection is finite.
    pub fn frames_needed(&self) -> Option<u64> {
        match *self {
            SelectionCriteria::ExportAll => None,
            SelectionCriteria::ExportOne(frame) => Some(frame.saturating_add(1)),
            SelectionCriteria::ExportRange { end, .. } => Some(end),
        }
    }
}

pub fn should_export(frame_index: u64, criteria: &SelectionCriteria) -> bool {
    match *criteria {
        SelectionCriteria::ExportAll => true,
        SelectionCriteria::ExportOne(target) => frame_index == target,
        SelectionCriteria::ExportRange { start, end } => start <= frame_index && frame_index < end,
    }
}
