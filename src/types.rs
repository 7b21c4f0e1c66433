use quietwave_core::analysis::{AudioStats, Snr};
use quietwave_core::transport::ResourceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
}

/// Figures shown in the statistics panel. Each entry remembers which resource it was computed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsPanel {
    pub original: Option<(ResourceId, AudioStats)>,
    pub denoised: Option<(ResourceId, AudioStats)>,
    pub snr: Option<Snr>,
    pub computing: bool,
}
