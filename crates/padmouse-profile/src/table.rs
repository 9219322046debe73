use std::sync::Arc;

use padmouse_bit_mask::{Bitable, Bitmask};
use padmouse_input::codes::{KEY_MAX, REL_MAX};
use padmouse_input::{Axis, Button, DeviceClass, DeviceIdentity};

use crate::capabilities::Capabilities;
use crate::layout::Layout;
use crate::mapping::{AxisMapping, ButtonMapping, Method, SynthKind};
use crate::profile::Profile;
use crate::rules::{classify, ClassRule};
use crate::ProfileError;

/// Immutable per-class profiles plus the rules that pick a class.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: [Profile; DeviceClass::COUNT],
    rules: Vec<ClassRule>,
    capabilities: Capabilities,
}

impl ProfileTable {
    pub fn builder() -> ProfileTableBuilder {
        ProfileTableBuilder::default()
    }

    /// Built-in profiles and rules.
    pub fn builtin() -> Result<Self, ProfileError> {
        crate::builtin::builder(Vec::new()).build()
    }

    /// Built-in profiles with extra rules consulted before the built-in ones.
    pub fn with_rules(extra: Vec<ClassRule>) -> Result<Self, ProfileError> {
        crate::builtin::builder(extra).build()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn classify(&self, identity: &DeviceIdentity) -> DeviceClass {
        classify(&self.rules, identity)
    }

    #[inline]
    pub fn profile(&self, class: DeviceClass) -> &Profile {
        &self.profiles[class.index() as usize]
    }

    pub fn rules(&self) -> &[ClassRule] {
        &self.rules
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// Collects rules, layouts and mappings, then validates them as a whole.
#[derive(Debug, Default)]
pub struct ProfileTableBuilder {
    rules: Vec<ClassRule>,
    layouts: Vec<(DeviceClass, Layout)>,
    buttons: Vec<(Button, ButtonMapping)>,
    axes: Vec<(Axis, AxisMapping)>,
}

impl ProfileTableBuilder {
    pub fn rule(mut self, rule: ClassRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = ClassRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn layout(mut self, class: DeviceClass, layout: Layout) -> Self {
        self.layouts.push((class, layout));
        self
    }

    pub fn button(mut self, button: Button, mapping: ButtonMapping) -> Self {
        self.buttons.push((button, mapping));
        self
    }

    pub fn axis(mut self, axis: Axis, mapping: AxisMapping) -> Self {
        self.axes.push((axis, mapping));
        self
    }

    pub fn build(self) -> Result<ProfileTable, ProfileError> {
        let mut profiles: [Profile; DeviceClass::COUNT] =
            std::array::from_fn(|i| Profile::new(DeviceClass::ALL[i]));
        let mut with_layout = Bitmask::<DeviceClass>::empty();

        for (class, layout) in self.layouts {
            for source in layout.axes() {
                if !source.is_valid() {
                    return Err(ProfileError::InvalidRange {
                        class,
                        code: source.code,
                        min: source.min,
                        max: source.max,
                    });
                }
            }
            if !with_layout.insert(class) {
                return Err(ProfileError::DuplicateLayout(class));
            }
            profiles[class.index() as usize].set_layout(layout);
        }

        let mut capabilities = Capabilities::default();

        for (button, mapping) in self.buttons {
            validate_button(button, &mapping)?;
            for class in mapping.devices {
                let profile = &mut profiles[class.index() as usize];
                if profile.layout().code_for_button(button).is_none() {
                    return Err(ProfileError::MissingButtonSource { class, button });
                }
                let slot = profile.button_slot(button);
                if slot.is_some() {
                    return Err(ProfileError::DuplicateButton { class, button });
                }
                *slot = Some(mapping);
            }
            capabilities.add_button(&mapping);
        }

        for (axis, mapping) in self.axes {
            validate_axis(axis, &mapping)?;
            for class in mapping.devices {
                let profile = &mut profiles[class.index() as usize];
                if profile.layout().source_for_axis(axis).is_none() {
                    return Err(ProfileError::MissingAxisSource { class, axis });
                }
                let slots = profile.axis_slots_mut(axis);
                if slots.iter().flatten().any(|m| m.overlaps(&mapping)) {
                    return Err(ProfileError::OverlappingPolarity { class, axis });
                }
                let Some(free) = slots.iter_mut().find(|s| s.is_none()) else {
                    return Err(ProfileError::TooManyAxisMappings { class, axis });
                };
                *free = Some(mapping);
            }
            capabilities.add_axis(&mapping);
        }

        for profile in &mut profiles {
            profile.refresh_dpad_routing();
        }

        log::debug!(
            "profile table built: {} rules, {} keys, {} rel axes",
            self.rules.len(),
            capabilities.keys().len(),
            capabilities.rels().len()
        );

        Ok(ProfileTable {
            profiles,
            rules: self.rules,
            capabilities,
        })
    }
}

fn validate_button(button: Button, mapping: &ButtonMapping) -> Result<(), ProfileError> {
    if mapping.devices.is_empty() {
        return Err(ProfileError::NoDevices(format!("button {button:?}")));
    }
    if let Some(code) = mapping.mouse_code {
        if code > KEY_MAX {
            return Err(ProfileError::CodeOutOfRange {
                kind: "key",
                code,
            });
        }
    }
    Ok(())
}

fn validate_axis(axis: Axis, mapping: &AxisMapping) -> Result<(), ProfileError> {
    if mapping.devices.is_empty() {
        return Err(ProfileError::NoDevices(format!("axis {axis:?}")));
    }
    if !(-1.0..=1.0).contains(&mapping.trigger_level) {
        return Err(ProfileError::InvalidTriggerLevel {
            axis,
            level: mapping.trigger_level,
        });
    }
    if !mapping.scale.is_finite() || mapping.scale == 0.0 {
        return Err(ProfileError::InvalidScale { axis });
    }
    match (mapping.method, mapping.synth) {
        (Method::Button | Method::Rocker, None) => {
            return Err(ProfileError::MissingSynth { axis })
        }
        (_, Some(synth)) => {
            let (kind, max) = match synth.kind {
                SynthKind::Key => ("key", KEY_MAX),
                SynthKind::Rel => ("rel", REL_MAX),
            };
            if synth.code > max {
                return Err(ProfileError::CodeOutOfRange {
                    kind,
                    code: synth.code,
                });
            }
        }
        _ => {}
    }
    Ok(())
}
