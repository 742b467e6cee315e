use crate::models::DeviceSignals;
use serde::{Deserialize, Serialize};

/// Capacity of each output surface for one device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotLimits {
    pub main_feed_count: usize,
    pub bottom_banner_max_count: usize,
    pub suggestions_count: usize,
}

impl SlotLimits {
    pub const DESKTOP: SlotLimits = SlotLimits {
        main_feed_count: 6,
        bottom_banner_max_count: 3,
        suggestions_count: 5,
    };

    pub const MOBILE: SlotLimits = SlotLimits {
        main_feed_count: 4,
        bottom_banner_max_count: 1,
        suggestions_count: 3,
    };
}

/// Device → slot limits lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocator {
    pub desktop: SlotLimits,
    pub mobile: SlotLimits,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self {
            desktop: SlotLimits::DESKTOP,
            mobile: SlotLimits::MOBILE,
        }
    }
}

impl SlotAllocator {
    pub fn new(desktop: SlotLimits, mobile: SlotLimits) -> Self {
        Self { desktop, mobile }
    }

    pub fn slots_for(&self, device: &DeviceSignals) -> SlotLimits {
        if device.is_mobile {
            self.mobile
        } else {
            self.desktop
        }
    }
}
