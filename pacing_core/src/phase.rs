/// Stages of one frame-loop iteration, in execution order.
///
/// `FixedUpdate` repeats once per simulation tick (possibly zero times).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FrameStage {
    BeginFrame,
    PollEvents,
    UpdateClocks,
    FixedUpdate,
    Render,
    LimitFrame,
    RecordStats,
    EndFrame,
}

impl FrameStage {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameStage::BeginFrame => "BeginFrame",
            FrameStage::PollEvents => "PollEvents",
            FrameStage::UpdateClocks => "UpdateClocks",
            FrameStage::FixedUpdate => "FixedUpdate",
            FrameStage::Render => "Render",
            FrameStage::LimitFrame => "LimitFrame",
            FrameStage::RecordStats => "RecordStats",
            FrameStage::EndFrame => "EndFrame",
        }
    }
}
