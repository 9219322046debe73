//! Per-event decision logic.
//!
//! Everything here touches only the state of the device the event came
//! from. Collaborator calls and queueing happen in the caller once the
//! state borrow is over.

use padmouse_input::codes::{REL_X, REL_Y};
use padmouse_input::{Axis, Button, EventKind, RawEvent};
use padmouse_profile::{AxisMapping, ButtonMapping, Method, Profile, SynthKind};
use smallvec::SmallVec;

use crate::state::{AxisState, DeviceState, KeyHolds};
use crate::verdict::Response;
use crate::virtual_mouse::{Mode, Modes};

/// Normalized hat deflection that counts as a dpad press.
const HAT_THRESHOLD: f32 = 0.5;

/// Result of classifying one event, before events are tagged with ids.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Outcome {
    pub(crate) original: Response,
    pub(crate) events: SmallVec<[RawEvent; 2]>,
    /// A `hide_mouse` mapping fired.
    pub(crate) hide: bool,
}

impl Outcome {
    fn respond(&mut self, response: Response) {
        self.original = self.original.merge(response);
    }
}

/// Whether a mapping may synthesize under the current modes.
#[inline]
fn gate_open(volume_only: bool, modes: Modes) -> bool {
    modes.contains(Mode::VirtualMouse) && (!volume_only || modes.contains(Mode::Volume))
}

#[inline]
fn consumed(pass_thru: bool) -> Response {
    if pass_thru {
        Response::Process
    } else {
        Response::Skip
    }
}

pub(crate) fn classify(
    profile: &Profile,
    state: &mut DeviceState,
    event: RawEvent,
    modes: Modes,
) -> Outcome {
    let mut out = Outcome::default();
    if state.passthrough {
        return out;
    }
    match event.kind {
        EventKind::Key => {
            if let Some(button) = profile.button_for_code(event.code) {
                on_button(profile, state, button, event.value, modes, &mut out);
            }
        }
        EventKind::Abs => on_abs(profile, state, event.code, event.value, modes, &mut out),
        _ => {}
    }
    out
}

fn on_button(
    profile: &Profile,
    state: &mut DeviceState,
    button: Button,
    value: i32,
    modes: Modes,
    out: &mut Outcome,
) {
    let Some(mapping) = profile.button_mapping(button) else {
        return;
    };

    // A synthesized press is always balanced, even after the gate closed.
    if value == RawEvent::RELEASE && state.pressed.remove(button) {
        let mouse_on = modes.contains(Mode::VirtualMouse);
        if let Some(code) = mapping.mouse_code {
            if state.held_keys.release(code) && mouse_on {
                out.events.push(RawEvent::key(code, RawEvent::RELEASE));
            }
        }
        if mouse_on {
            out.respond(consumed(mapping.pass_thru));
        }
        return;
    }

    if !gate_open(mapping.volume_only, modes) {
        return;
    }
    out.respond(consumed(mapping.pass_thru));
    if value != RawEvent::PRESS {
        return;
    }
    out.hide |= mapping.hide_mouse;
    if let Some(code) = mapping.mouse_code {
        if !suppressed_by_native_input(mapping, state)
            && state.pressed.insert(button)
            && state.held_keys.acquire(code)
        {
            out.events.push(RawEvent::key(code, RawEvent::PRESS));
        }
    }
}

/// The focused window already reacts to this device, so a mapping that
/// forwards the original does not need a synthesized twin.
fn suppressed_by_native_input(mapping: &ButtonMapping, state: &DeviceState) -> bool {
    mapping.pass_thru && state.native_input
}

fn on_abs(
    profile: &Profile,
    state: &mut DeviceState,
    code: u16,
    raw: i32,
    modes: Modes,
    out: &mut Outcome,
) {
    let Some(source) = profile.axis_source(code) else {
        return;
    };
    let axis = source.axis;
    let value = source.normalize(raw);
    state.axis_mut(axis).value = value;

    if profile.routes_dpad(axis) {
        on_hat(profile, state, axis, value, modes, out);
        return;
    }

    let (ax, keys) = state.axis_and_keys(axis);
    for (slot, mapping) in profile.axis_slots(axis).iter().enumerate() {
        let Some(mapping) = mapping else {
            continue;
        };
        if gate_open(mapping.volume_only, modes) {
            on_axis_slot(mapping, ax, keys, slot, value, out);
        } else if ax.latched[slot] {
            release(mapping, keys, modes.contains(Mode::VirtualMouse), out);
            ax.unlatch(slot);
        }
    }
}

fn on_axis_slot(
    mapping: &AxisMapping,
    ax: &mut AxisState,
    keys: &mut KeyHolds,
    slot: usize,
    value: f32,
    out: &mut Outcome,
) {
    let active = mapping.is_active(value);
    if active {
        out.hide |= mapping.hide_mouse;
    }
    match mapping.method {
        Method::Ignore => {
            if !mapping.pass_thru {
                out.respond(Response::Skip);
            }
        }
        Method::Button => {
            out.respond(consumed(mapping.pass_thru));
            if active && !ax.latched[slot] {
                ax.latched[slot] = true;
                press(mapping, RawEvent::PRESS, keys, out);
            } else if !active && ax.latched[slot] {
                release(mapping, keys, true, out);
                ax.unlatch(slot);
            }
        }
        Method::Rocker => {
            out.respond(consumed(mapping.pass_thru));
            if active {
                if !ax.latched[slot] {
                    ax.latched[slot] = true;
                    ax.repeat_cancelled[slot] = false;
                    press(mapping, RawEvent::PRESS, keys, out);
                } else if !ax.repeat_cancelled[slot] {
                    press(mapping, RawEvent::REPEAT, keys, out);
                }
            } else if ax.latched[slot] {
                release(mapping, keys, true, out);
                ax.unlatch(slot);
            }
        }
        Method::RelAxisX | Method::RelAxisY => {
            out.respond(consumed(mapping.pass_thru));
            if active {
                let crossing = !ax.latched[slot];
                ax.latched[slot] = true;
                if let Some(event) = motion(mapping, value, &mut ax.remainder[slot], crossing) {
                    out.events.push(event);
                }
            } else if ax.latched[slot] {
                ax.unlatch(slot);
            }
        }
    }
}

/// Press, repeat or one relative tick for a `Button`/`Rocker` mapping.
/// A key another control already holds is not pressed again.
fn press(mapping: &AxisMapping, value: i32, keys: &mut KeyHolds, out: &mut Outcome) {
    let Some(synth) = mapping.synth else {
        return;
    };
    let event = match synth.kind {
        SynthKind::Key => {
            if value == RawEvent::PRESS && !keys.acquire(synth.code) {
                return;
            }
            RawEvent::key(synth.code, value)
        }
        SynthKind::Rel => RawEvent::rel(synth.code, tick(mapping.scale)),
    };
    out.events.push(event);
}

/// Release for key synths once no other control holds the key. Relative
/// ticks have nothing to release.
fn release(mapping: &AxisMapping, keys: &mut KeyHolds, emit: bool, out: &mut Outcome) {
    if !matches!(mapping.method, Method::Button | Method::Rocker) {
        return;
    }
    if let Some(synth) = mapping.synth {
        if synth.kind == SynthKind::Key && keys.release(synth.code) && emit {
            out.events.push(RawEvent::key(synth.code, RawEvent::RELEASE));
        }
    }
}

#[inline]
fn tick(scale: f32) -> i32 {
    let step = scale.round() as i32;
    if step == 0 {
        scale.signum() as i32
    } else {
        step
    }
}

/// Relative motion for one active sample, proportional to the excess past
/// the threshold times the gain.
///
/// Whole units are emitted and the rest is carried, so a light deflection
/// moves on some samples only. The crossing sample moves at least one unit;
/// the overshoot is carried as a debt.
fn motion(
    mapping: &AxisMapping,
    value: f32,
    remainder: &mut f32,
    crossing: bool,
) -> Option<RawEvent> {
    let code = if mapping.method == Method::RelAxisX {
        REL_X
    } else {
        REL_Y
    };
    let magnitude = *remainder + mapping.excess(value) * mapping.scale.abs();
    let mut step = magnitude.trunc().max(0.0);
    if crossing {
        step = step.max(1.0);
    }
    *remainder = magnitude - step;
    if step == 0.0 {
        return None;
    }
    let sign = mapping.direction() * mapping.scale.signum();
    Some(RawEvent::rel(code, (step * sign) as i32))
}

/// Hat samples delivered through the dpad button mappings.
fn on_hat(
    profile: &Profile,
    state: &mut DeviceState,
    axis: Axis,
    value: f32,
    modes: Modes,
    out: &mut Outcome,
) {
    let Some((neg, pos)) = axis.dpad_buttons() else {
        return;
    };
    let wanted = [(neg, value < -HAT_THRESHOLD), (pos, value > HAT_THRESHOLD)];
    let mut edges = false;
    for (button, held) in wanted {
        if !held && state.hat_held.remove(button) {
            on_button(profile, state, button, RawEvent::RELEASE, modes, out);
            edges = true;
        }
    }
    for (button, held) in wanted {
        if held && state.hat_held.insert(button) {
            on_button(profile, state, button, RawEvent::PRESS, modes, out);
            edges = true;
        }
    }
    if edges {
        return;
    }
    // Steady samples share the fate of the dpad mapping.
    let mapping = profile
        .button_mapping(neg)
        .or_else(|| profile.button_mapping(pos));
    if let Some(mapping) = mapping {
        if gate_open(mapping.volume_only, modes) {
            out.respond(consumed(mapping.pass_thru));
        }
    }
}
