use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InventoryError, Result};

/// Inventory category. Each category owns exactly one extension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    CommunicationDevices,
    ComputerAndItEquipment,
    NetworkingEquipment,
    SurveillanceAndTracking,
    VehicleAndAccessories,
    ProtectiveGear,
    Firearm,
    ForensicEquipment,
    MedicalFirstAid,
    OfficeSupply,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::CommunicationDevices,
        Category::ComputerAndItEquipment,
        Category::NetworkingEquipment,
        Category::SurveillanceAndTracking,
        Category::VehicleAndAccessories,
        Category::ProtectiveGear,
        Category::Firearm,
        Category::ForensicEquipment,
        Category::MedicalFirstAid,
        Category::OfficeSupply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CommunicationDevices => "COMMUNICATION_DEVICES",
            Category::ComputerAndItEquipment => "COMPUTER_AND_IT_EQUIPMENT",
            Category::NetworkingEquipment => "NETWORKING_EQUIPMENT",
            Category::SurveillanceAndTracking => "SURVEILLANCE_AND_TRACKING",
            Category::VehicleAndAccessories => "VEHICLE_AND_ACCESSORIES",
            Category::ProtectiveGear => "PROTECTIVE_GEAR",
            Category::Firearm => "FIREARM",
            Category::ForensicEquipment => "FORENSIC_EQUIPMENT",
            Category::MedicalFirstAid => "MEDICAL_FIRST_AID",
            Category::OfficeSupply => "OFFICE_SUPPLY",
        }
    }

    /// Extension table holding this category's attributes.
    pub fn table(&self) -> &'static str {
        match self {
            Category::CommunicationDevices => "communication_devices",
            Category::ComputerAndItEquipment => "computer_and_it_equipment",
            Category::NetworkingEquipment => "networking_equipment",
            Category::SurveillanceAndTracking => "surveillance_and_tracking",
            Category::VehicleAndAccessories => "vehicle_and_accessories",
            Category::ProtectiveGear => "protective_gear",
            Category::Firearm => "firearms",
            Category::ForensicEquipment => "forensic_equipment",
            Category::MedicalFirstAid => "medical_first_aid",
            Category::OfficeSupply => "office_supplies",
        }
    }

    fn from_normalized(key: &str) -> Option<Self> {
        let category = match key {
            "communicationdevices" | "communicationdevice" => Category::CommunicationDevices,
            "computeranditequipment" => Category::ComputerAndItEquipment,
            "networkingequipment" => Category::NetworkingEquipment,
            "surveillanceandtracking" => Category::SurveillanceAndTracking,
            "vehicleandaccessories" => Category::VehicleAndAccessories,
            "protectivegear" => Category::ProtectiveGear,
            "firearm" | "firearms" => Category::Firearm,
            "forensicequipment" => Category::ForensicEquipment,
            "medicalfirstaid" => Category::MedicalFirstAid,
            "officesupply" | "officesupplies" => Category::OfficeSupply,
            _ => return None,
        };
        Some(category)
    }
}

/// Accepts the wire value (`COMPUTER_AND_IT_EQUIPMENT`), the form key
/// (`computerAndITEquipment`) and the display label (`Computer and IT Equipment`).
impl FromStr for Category {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Category::from_normalized(&key).ok_or_else(|| InventoryError::InvalidCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Category> for &'static str {
    fn from(category: Category) -> Self {
        category.as_str()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares an extension record: every attribute is optional free text and
/// maps 1:1 onto a column of the category's table.
macro_rules! extension_record {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident => $column:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct $name {
            $($(#[$fmeta])* pub $field: Option<String>,)+
        }

        impl $name {
            pub const COLUMNS: &'static [&'static str] = &[$($column),+];

            fn values(&self) -> Vec<Option<String>> {
                vec![$(self.$field.clone()),+]
            }

            fn from_columns<E>(
                mut get: impl FnMut(&'static str) -> std::result::Result<Option<String>, E>,
            ) -> std::result::Result<Self, E> {
                Ok(Self { $($field: get($column)?,)+ })
            }

            fn merge(&mut self, patch: &Self) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = Some(value.clone());
                    }
                )+
            }
        }
    };
}

extension_record!(CommunicationDevice {
    frequency_range => "frequency_range",
    battery_type => "battery_type",
    connectivity => "connectivity",
});

extension_record!(ComputerAndItEquipment {
    processor => "processor",
    #[serde(alias = "RAM")]
    ram => "ram",
    storage => "storage",
    #[serde(alias = "OS")]
    os => "os",
});

extension_record!(NetworkingEquipment {
    bandwidth => "bandwidth",
    ports => "ports",
    protocols => "protocols",
});

extension_record!(SurveillanceAndTracking {
    camera_resolution => "camera_resolution",
    night_vision => "night_vision",
    #[serde(alias = "GPSAccuracy")]
    gps_accuracy => "gps_accuracy",
});

extension_record!(VehicleAndAccessories {
    vehicle_type => "vehicle_type",
    make_and_model => "make_and_model",
    license_plate => "license_plate",
    engine_capacity => "engine_capacity",
    accessories => "accessories",
});

extension_record!(ProtectiveGear {
    gear_type => "gear_type",
    size => "size",
    material => "material",
});

extension_record!(Firearm {
    caliber => "caliber",
    ammo_type => "ammo_type",
    serial_number => "serial_number",
    license_details => "license_details",
});

extension_record!(ForensicEquipment {
    usage_type => "usage_type",
    sensitivity => "sensitivity",
    storage_requirements => "storage_requirements",
});

extension_record!(MedicalFirstAid {
    expiration_date => "expiration_date",
    dosage => "dosage",
    storage_conditions => "storage_conditions",
});

extension_record!(OfficeSupply {
    item_type => "item_type",
    dimensions => "dimensions",
    material => "material",
});

/// Category-specific attributes of an inventory item.
///
/// Serialized externally tagged by relation name, which is also the shape of
/// `childUpdates` on the update endpoint: `{"firearm": {"caliber": "9mm"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryDetails {
    #[serde(rename = "communicationDevice")]
    CommunicationDevices(CommunicationDevice),
    #[serde(rename = "computerAndITEquipment")]
    ComputerAndItEquipment(ComputerAndItEquipment),
    #[serde(rename = "networkingEquipment")]
    NetworkingEquipment(NetworkingEquipment),
    #[serde(rename = "surveillanceAndTracking")]
    SurveillanceAndTracking(SurveillanceAndTracking),
    #[serde(rename = "vehicleAndAccessories")]
    VehicleAndAccessories(VehicleAndAccessories),
    #[serde(rename = "protectiveGear")]
    ProtectiveGear(ProtectiveGear),
    #[serde(rename = "firearm")]
    Firearm(Firearm),
    #[serde(rename = "forensicEquipment")]
    ForensicEquipment(ForensicEquipment),
    #[serde(rename = "medicalFirstAid")]
    MedicalFirstAid(MedicalFirstAid),
    #[serde(rename = "officeSupply")]
    OfficeSupply(OfficeSupply),
}

macro_rules! each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            CategoryDetails::CommunicationDevices($inner) => $body,
            CategoryDetails::ComputerAndItEquipment($inner) => $body,
            CategoryDetails::NetworkingEquipment($inner) => $body,
            CategoryDetails::SurveillanceAndTracking($inner) => $body,
            CategoryDetails::VehicleAndAccessories($inner) => $body,
            CategoryDetails::ProtectiveGear($inner) => $body,
            CategoryDetails::Firearm($inner) => $body,
            CategoryDetails::ForensicEquipment($inner) => $body,
            CategoryDetails::MedicalFirstAid($inner) => $body,
            CategoryDetails::OfficeSupply($inner) => $body,
        }
    };
}

impl CategoryDetails {
    /// Resolve the free-form `categorySpecificData` object against a category.
    /// `null` is treated as an empty object.
    pub fn from_json(category: Category, fields: serde_json::Value) -> Result<Self> {
        let fields = match fields {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            obj @ serde_json::Value::Object(_) => obj,
            _ => {
                return Err(InventoryError::invalid_input(
                    "categorySpecificData must be an object",
                ))
            }
        };

        fn parse<T: serde::de::DeserializeOwned>(fields: serde_json::Value) -> Result<T> {
            serde_json::from_value(fields)
                .map_err(|e| InventoryError::invalid_input(format!("categorySpecificData: {e}")))
        }

        Ok(match category {
            Category::CommunicationDevices => CategoryDetails::CommunicationDevices(parse(fields)?),
            Category::ComputerAndItEquipment => CategoryDetails::ComputerAndItEquipment(parse(fields)?),
            Category::NetworkingEquipment => CategoryDetails::NetworkingEquipment(parse(fields)?),
            Category::SurveillanceAndTracking => CategoryDetails::SurveillanceAndTracking(parse(fields)?),
            Category::VehicleAndAccessories => CategoryDetails::VehicleAndAccessories(parse(fields)?),
            Category::ProtectiveGear => CategoryDetails::ProtectiveGear(parse(fields)?),
            Category::Firearm => CategoryDetails::Firearm(parse(fields)?),
            Category::ForensicEquipment => CategoryDetails::ForensicEquipment(parse(fields)?),
            Category::MedicalFirstAid => CategoryDetails::MedicalFirstAid(parse(fields)?),
            Category::OfficeSupply => CategoryDetails::OfficeSupply(parse(fields)?),
        })
    }

    /// Rebuild a record from stored columns, `get` returning the value of one column.
    pub fn from_columns<E>(
        category: Category,
        get: impl FnMut(&'static str) -> std::result::Result<Option<String>, E>,
    ) -> std::result::Result<Self, E> {
        Ok(match category {
            Category::CommunicationDevices => CategoryDetails::CommunicationDevices(CommunicationDevice::from_columns(get)?),
            Category::ComputerAndItEquipment => CategoryDetails::ComputerAndItEquipment(ComputerAndItEquipment::from_columns(get)?),
            Category::NetworkingEquipment => CategoryDetails::NetworkingEquipment(NetworkingEquipment::from_columns(get)?),
            Category::SurveillanceAndTracking => CategoryDetails::SurveillanceAndTracking(SurveillanceAndTracking::from_columns(get)?),
            Category::VehicleAndAccessories => CategoryDetails::VehicleAndAccessories(VehicleAndAccessories::from_columns(get)?),
            Category::ProtectiveGear => CategoryDetails::ProtectiveGear(ProtectiveGear::from_columns(get)?),
            Category::Firearm => CategoryDetails::Firearm(Firearm::from_columns(get)?),
            Category::ForensicEquipment => CategoryDetails::ForensicEquipment(ForensicEquipment::from_columns(get)?),
            Category::MedicalFirstAid => CategoryDetails::MedicalFirstAid(MedicalFirstAid::from_columns(get)?),
            Category::OfficeSupply => CategoryDetails::OfficeSupply(OfficeSupply::from_columns(get)?),
        })
    }

    pub fn category(&self) -> Category {
        match self {
            CategoryDetails::CommunicationDevices(_) => Category::CommunicationDevices,
            CategoryDetails::ComputerAndItEquipment(_) => Category::ComputerAndItEquipment,
            CategoryDetails::NetworkingEquipment(_) => Category::NetworkingEquipment,
            CategoryDetails::SurveillanceAndTracking(_) => Category::SurveillanceAndTracking,
            CategoryDetails::VehicleAndAccessories(_) => Category::VehicleAndAccessories,
            CategoryDetails::ProtectiveGear(_) => Category::ProtectiveGear,
            CategoryDetails::Firearm(_) => Category::Firearm,
            CategoryDetails::ForensicEquipment(_) => Category::ForensicEquipment,
            CategoryDetails::MedicalFirstAid(_) => Category::MedicalFirstAid,
            CategoryDetails::OfficeSupply(_) => Category::OfficeSupply,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        Self::columns_of(self.category())
    }

    pub fn columns_of(category: Category) -> &'static [&'static str] {
        match category {
            Category::CommunicationDevices => CommunicationDevice::COLUMNS,
            Category::ComputerAndItEquipment => ComputerAndItEquipment::COLUMNS,
            Category::NetworkingEquipment => NetworkingEquipment::COLUMNS,
            Category::SurveillanceAndTracking => SurveillanceAndTracking::COLUMNS,
            Category::VehicleAndAccessories => VehicleAndAccessories::COLUMNS,
            Category::ProtectiveGear => ProtectiveGear::COLUMNS,
            Category::Firearm => Firearm::COLUMNS,
            Category::ForensicEquipment => ForensicEquipment::COLUMNS,
            Category::MedicalFirstAid => MedicalFirstAid::COLUMNS,
            Category::OfficeSupply => OfficeSupply::COLUMNS,
        }
    }

    /// Column values in the order given by [`CategoryDetails::columns`].
    pub fn values(&self) -> Vec<Option<String>> {
        each_variant!(self, inner => inner.values())
    }

    /// Overlay the fields set in `patch`. Both sides must name the same relation.
    pub fn merge(&mut self, patch: &CategoryDetails) -> Result<()> {
        use CategoryDetails as D;
        match (self, patch) {
            (D::CommunicationDevices(a), D::CommunicationDevices(b)) => a.merge(b),
            (D::ComputerAndItEquipment(a), D::ComputerAndItEquipment(b)) => a.merge(b),
            (D::NetworkingEquipment(a), D::NetworkingEquipment(b)) => a.merge(b),
            (D::SurveillanceAndTracking(a), D::SurveillanceAndTracking(b)) => a.merge(b),
            (D::VehicleAndAccessories(a), D::VehicleAndAccessories(b)) => a.merge(b),
            (D::ProtectiveGear(a), D::ProtectiveGear(b)) => a.merge(b),
            (D::Firearm(a), D::Firearm(b)) => a.merge(b),
            (D::ForensicEquipment(a), D::ForensicEquipment(b)) => a.merge(b),
            (D::MedicalFirstAid(a), D::MedicalFirstAid(b)) => a.merge(b),
            (D::OfficeSupply(a), D::OfficeSupply(b)) => a.merge(b),
            (current, patch) => {
                return Err(InventoryError::invalid_input(format!(
                    "childUpdates targets {} but the item category is {}",
                    patch.category(),
                    current.category()
                )))
            }
        }
        Ok(())
    }
}
