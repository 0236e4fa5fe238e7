//! Staff roles, responder types and the capability matrix.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// What an admin account is allowed to change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Capabilities: u32 {
        const MANAGE_REPORTS = 1 << 0;
        const MANAGE_EMERGENCIES = 1 << 1;
        const MANAGE_ANNOUNCEMENTS = 1 << 2;
        const MANAGE_RESIDENTS = 1 << 3;
        const MANAGE_ACCOUNTS = 1 << 4;
        const VIEW_AUDIT = 1 << 5;

        const ALL = Self::MANAGE_REPORTS.bits()
            | Self::MANAGE_EMERGENCIES.bits()
            | Self::MANAGE_ANNOUNCEMENTS.bits()
            | Self::MANAGE_RESIDENTS.bits()
            | Self::MANAGE_ACCOUNTS.bits()
            | Self::VIEW_AUDIT.bits();
    }
}

impl Capabilities {
    /// Lower-case names of the set flags, for API responses.
    #[must_use]
    pub fn names(self) -> Vec<String> {
        self.iter_names().map(|(name, _)| name.to_ascii_lowercase()).collect()
    }
}

impl Serialize for Capabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Capabilities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

string_enum! {
    /// Role of an administrative staff account.
    pub enum AdminRole {
        SystemAdministrator => "system_administrator",
        BarangayOfficial => "barangay_official",
        Staff => "staff",
    }
}

impl AdminRole {
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::SystemAdministrator => Capabilities::ALL,
            Self::BarangayOfficial => Capabilities::MANAGE_REPORTS
                .union(Capabilities::MANAGE_EMERGENCIES)
                .union(Capabilities::MANAGE_ANNOUNCEMENTS)
                .union(Capabilities::MANAGE_RESIDENTS)
                .union(Capabilities::VIEW_AUDIT),
            Self::Staff => Capabilities::MANAGE_REPORTS.union(Capabilities::MANAGE_EMERGENCIES),
        }
    }
}

string_enum! {
    /// Field-operations unit a responder belongs to.
    pub enum ResponderType {
        Police => "police",
        Fire => "fire",
        Medical => "medical",
        Disaster => "disaster",
    }
}

string_enum! {
    /// Kind of account a new login is provisioned as.
    pub enum UserType {
        Admin => "admin",
        Responder => "responder",
    }
}
