pub mod codes;
mod types;

pub use types::{
    Axis, Button, DeviceClass, DeviceId, DeviceIdentity, EventKind, PointerCoords,
    RawEvent, UnknownClass,
};

#[cfg(test)]
mod tests {
    use padmouse_bit_mask::{Bitable, Bitmask};

    use super::*;

    #[test]
    fn event_kind_round_trips_known_types() {
        for ty in [codes::EV_SYN, codes::EV_KEY, codes::EV_REL, codes::EV_ABS] {
            assert_eq!(EventKind::from_type(ty).as_type(), ty);
        }
        assert_eq!(EventKind::from_type(codes::EV_MSC), EventKind::Other(4));
    }

    #[test]
    fn enum_counts_match_variants() {
        assert_eq!(Axis::ALL.len(), Axis::COUNT);
        assert_eq!(DeviceClass::ALL.len(), DeviceClass::COUNT);
        assert_eq!(DeviceClass::Controller.index(), 5);
    }

    #[test]
    fn buttons_fit_in_one_mask() {
        let all = Bitmask::<Button>::all();
        assert_eq!(all.count() as usize, Button::ALL.len());
        assert_eq!(Button::ALL.len(), Button::COUNT);
        assert!(all.contains(Button::RTrigger));
    }

    #[test]
    fn dpad_axes_pair_with_buttons() {
        assert_eq!(
            Axis::DPadY.dpad_buttons(),
            Some((Button::DPadUp, Button::DPadDown))
        );
        assert_eq!(Axis::LsX.dpad_buttons(), None);
    }

    #[test]
    fn class_names_parse_back() {
        for class in DeviceClass::ALL {
            assert_eq!(class.as_str().parse::<DeviceClass>(), Ok(*class));
        }
        assert_eq!(
            "NV-Controller".parse::<DeviceClass>(),
            Ok(DeviceClass::NvController)
        );
        let err = "joystick".parse::<DeviceClass>().unwrap_err();
        assert_eq!(err.to_string(), "unknown device class: joystick");
    }

    #[test]
    fn capability_arrays_cover_max_codes() {
        assert_eq!(codes::KEY_BITMASK_BYTES, 96);
        assert_eq!(codes::REL_BITMASK_BYTES, 2);
    }
}
