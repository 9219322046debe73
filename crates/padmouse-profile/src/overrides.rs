use padmouse_input::DeviceClass;
use serde::Deserialize;

use crate::rules::ClassRule;
use crate::ProfileError;

/// A vendor or product id, written as a number or a hex string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn parse(&self, field: &'static str) -> Result<u16, ProfileError> {
        let parsed = match self {
            RawId::Number(n) => u16::try_from(*n).ok(),
            RawId::Text(s) => {
                let s = s.trim();
                let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
                match hex {
                    Some(digits) => u16::from_str_radix(digits, 16).ok(),
                    None => u16::from_str_radix(s, 16).ok(),
                }
            }
        };
        parsed.ok_or_else(|| ProfileError::InvalidId(field, format!("{self:?}")))
    }
}

/// User-supplied classification for a vendor, or a vendor/product pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceOverride {
    pub vid: RawId,
    #[serde(default)]
    pub pid: Option<RawId>,
    pub class: String,
}

impl DeviceOverride {
    pub fn to_rule(&self) -> Result<ClassRule, ProfileError> {
        let vendor = self.vid.parse("vid")?;
        let class = self
            .class
            .parse::<DeviceClass>()
            .map_err(|e| ProfileError::UnknownClass(e.0.into()))?;
        match &self.pid {
            Some(pid) => Ok(ClassRule::product(vendor, pid.parse("pid")?, class)),
            None => Ok(ClassRule::vendor(vendor, class)),
        }
    }
}

/// Turn overrides and blacklisted name fragments into classification rules.
///
/// Overrides come first, so an explicit class beats a blacklist entry.
pub fn override_rules(
    devices: &[DeviceOverride],
    blacklist: &[String],
) -> Result<Vec<ClassRule>, ProfileError> {
    let mut rules = devices
        .iter()
        .map(DeviceOverride::to_rule)
        .collect::<Result<Vec<_>, _>>()?;
    rules.extend(
        blacklist
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| ClassRule::name_contains(s, DeviceClass::Unsupported)),
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Matcher;

    #[derive(Debug, Deserialize)]
    struct Doc {
        devices: Vec<DeviceOverride>,
        #[serde(default)]
        blacklist: Vec<String>,
    }

    fn parse(yaml: &str) -> Doc {
        serde_yaml::from_str(yaml).expect("yaml should parse")
    }

    #[test]
    fn ids_accept_numbers_and_hex_strings() {
        let doc = parse(
            "devices:\n  - { vid: 1118, pid: \"0x0b12\", class: controller }\n  - { vid: \"054c\", class: unsupported }\n",
        );
        let rules = override_rules(&doc.devices, &doc.blacklist).unwrap();
        assert_eq!(
            rules,
            vec![
                ClassRule::product(0x045e, 0x0b12, DeviceClass::Controller),
                ClassRule::vendor(0x054c, DeviceClass::Unsupported),
            ]
        );
    }

    #[test]
    fn blacklist_follows_overrides() {
        let doc = parse(
            "devices:\n  - { vid: 0x1, class: button_board }\nblacklist: [\"Touchpad\", \"  \"]\n",
        );
        let rules = override_rules(&doc.devices, &doc.blacklist).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].matcher, Matcher::NameContains("Touchpad".into()));
        assert_eq!(rules[1].class, DeviceClass::Unsupported);
    }

    #[test]
    fn unknown_class_is_rejected() {
        let doc = parse("devices:\n  - { vid: 1, class: trackball }\n");
        let err = override_rules(&doc.devices, &doc.blacklist).unwrap_err();
        assert!(matches!(err, ProfileError::UnknownClass(name) if name == "trackball"));
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let doc = parse("devices:\n  - { vid: 70000, class: controller }\n");
        let err = override_rules(&doc.devices, &doc.blacklist).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidId("vid", _)));
    }
}
