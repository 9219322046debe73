use padmouse_input::{DeviceClass, DeviceIdentity};

/// What a classification rule looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact device name.
    Name(Box<str>),
    /// Case-insensitive substring of the device name.
    NameContains(Box<str>),
    Vendor(u16),
    Product { vendor: u16, product: u16 },
}

impl Matcher {
    pub fn matches(&self, identity: &DeviceIdentity) -> bool {
        match self {
            Matcher::Name(name) => identity.name == *name,
            Matcher::NameContains(needle) => identity
                .name
                .to_lowercase()
                .contains(needle.to_lowercase().as_str()),
            Matcher::Vendor(vendor) => identity.vendor == *vendor,
            Matcher::Product { vendor, product } => {
                identity.vendor == *vendor && identity.product == *product
            }
        }
    }
}

/// Assigns `class` to every identity `matcher` accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRule {
    pub matcher: Matcher,
    pub class: DeviceClass,
}

impl ClassRule {
    pub fn name(name: &str, class: DeviceClass) -> Self {
        Self {
            matcher: Matcher::Name(name.into()),
            class,
        }
    }

    pub fn name_contains(needle: &str, class: DeviceClass) -> Self {
        Self {
            matcher: Matcher::NameContains(needle.into()),
            class,
        }
    }

    pub fn vendor(vendor: u16, class: DeviceClass) -> Self {
        Self {
            matcher: Matcher::Vendor(vendor),
            class,
        }
    }

    pub fn product(vendor: u16, product: u16, class: DeviceClass) -> Self {
        Self {
            matcher: Matcher::Product { vendor, product },
            class,
        }
    }
}

/// First matching rule wins; no match means `DeviceClass::Default`.
pub fn classify(rules: &[ClassRule], identity: &DeviceIdentity) -> DeviceClass {
    rules
        .iter()
        .find(|r| r.matcher.matches(identity))
        .map(|r| r.class)
        .unwrap_or_default()
}
