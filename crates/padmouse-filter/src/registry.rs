use std::sync::Arc;

use ahash::AHashMap;
use padmouse_input::{DeviceClass, DeviceId, DeviceIdentity};
use padmouse_profile::ProfileTable;

use crate::state::DeviceState;

/// One open device as announced by the host.
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub fd: i32,
    pub path: Box<str>,
    pub identity: DeviceIdentity,
    pub state: DeviceState,
}

/// Open devices keyed by host id.
#[derive(Debug)]
pub struct DeviceRegistry {
    table: Arc<ProfileTable>,
    devices: AHashMap<DeviceId, DeviceEntry>,
    virtual_id: Option<DeviceId>,
}

impl DeviceRegistry {
    pub fn new(table: Arc<ProfileTable>) -> Self {
        Self {
            table,
            devices: AHashMap::new(),
            virtual_id: None,
        }
    }

    pub fn table(&self) -> &Arc<ProfileTable> {
        &self.table
    }

    fn class_for(&self, id: DeviceId, identity: &DeviceIdentity) -> DeviceClass {
        if self.virtual_id == Some(id) {
            DeviceClass::VirtualMouse
        } else {
            self.table.classify(identity)
        }
    }

    /// Classify and record a device. A known id gets fresh state.
    pub fn add(
        &mut self,
        fd: i32,
        id: DeviceId,
        path: &str,
        identity: DeviceIdentity,
    ) -> DeviceClass {
        let class = self.class_for(id, &identity);
        log::info!("device {id} added as {class}: {identity}");
        let entry = DeviceEntry {
            fd,
            path: path.into(),
            identity,
            state: DeviceState::new(class),
        };
        if let Some(old) = self.devices.insert(id, entry) {
            log::debug!("device {id} re-added, dropping state of {}", old.identity.name);
        }
        class
    }

    /// Forget a device. Unknown ids are ignored.
    pub fn remove(&mut self, id: DeviceId) -> Option<DeviceEntry> {
        let entry = self.devices.remove(&id);
        if entry.is_some() {
            log::info!("device {id} removed");
        }
        entry
    }

    /// Class of a device, `Default` when unknown.
    pub fn classify(&self, id: DeviceId) -> DeviceClass {
        self.devices
            .get(&id)
            .map(|e| e.state.class())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceEntry> {
        self.devices.get(&id)
    }

    pub fn state(&self, id: DeviceId) -> Option<&DeviceState> {
        self.devices.get(&id).map(|e| &e.state)
    }

    #[inline]
    pub fn state_mut(&mut self, id: DeviceId) -> Option<&mut DeviceState> {
        self.devices.get_mut(&id).map(|e| &mut e.state)
    }

    /// Physical devices, the virtual one excluded.
    pub(crate) fn physical_states_mut(&mut self) -> impl Iterator<Item = &mut DeviceState> + '_ {
        let virtual_id = self.virtual_id;
        self.devices
            .iter_mut()
            .filter(move |(id, _)| Some(**id) != virtual_id)
            .map(|(_, e)| &mut e.state)
    }

    /// Mark `id` as the virtual mouse. An already open entry is reclassified.
    pub fn bind_virtual(&mut self, id: DeviceId) {
        if let Some(prev) = self.virtual_id.replace(id) {
            if prev != id {
                if let Some(entry) = self.devices.get_mut(&prev) {
                    entry.state = DeviceState::new(self.table.classify(&entry.identity));
                }
            }
        }
        if let Some(entry) = self.devices.get_mut(&id) {
            entry.state = DeviceState::new(DeviceClass::VirtualMouse);
        }
    }

    pub fn virtual_id(&self) -> Option<DeviceId> {
        self.virtual_id
    }

    #[inline]
    pub fn is_virtual(&self, id: DeviceId) -> bool {
        self.virtual_id == Some(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
