use padmouse_input::{DeviceId, RawEvent};
use smallvec::SmallVec;

/// What the host should do with the original event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Response {
    /// Forward unmodified, nothing else happened.
    #[default]
    Default,
    /// Forward; the filter has already acted on it.
    Process,
    /// Drop silently.
    Skip,
    /// Synthesized events were queued on the virtual mouse.
    Add,
}

impl Response {
    /// Combine the responses of two mappings that looked at the same event.
    ///
    /// Forwarding wins over suppression, and both win over not caring.
    pub(crate) fn merge(self, other: Response) -> Response {
        match (self, other) {
            (Response::Process, _) | (_, Response::Process) => Response::Process,
            (Response::Skip, _) | (_, Response::Skip) => Response::Skip,
            _ => Response::Default,
        }
    }
}

/// An event produced by the filter for the virtual mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesizedEvent {
    /// Virtual mouse device id, when one has been registered.
    pub device: Option<DeviceId>,
    /// Physical device whose input produced the event.
    pub source: DeviceId,
    pub event: RawEvent,
}

/// Outcome of filtering one raw event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    /// Fate of the original event on its own.
    pub original: Response,
    /// Events queued for the virtual mouse, in delivery order.
    pub synthesized: SmallVec<[SynthesizedEvent; 2]>,
}

impl Verdict {
    /// Overall response: `Add` whenever something was synthesized.
    pub fn response(&self) -> Response {
        if self.synthesized.is_empty() {
            self.original
        } else {
            Response::Add
        }
    }

    /// Whether the host still delivers the original event.
    pub fn forwards_original(&self) -> bool {
        matches!(self.original, Response::Default | Response::Process)
    }

    pub fn is_default(&self) -> bool {
        self.original == Response::Default && self.synthesized.is_empty()
    }
}
