use serde::{Deserialize, Serialize};

use crate::{
    fault::{self, Classification},
    loads::{LoadGroup, ServicingWord},
};

// The boiler reports bit words as plain signed integers. Only the low 32 bits carry flags.
fn word(value: i64) -> u32 {
    value as u32
}

/// Values of the `status` field of [`BoilerData`] and [`BoilerStatusData`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(i32)]
pub enum SystemStatus {
    Standby = 0,
    Purging = 1,
    Igniting = 2,
    Heating = 3,
    Circulating = 4,
    Error = 5,
    Initializing = 6,
}

impl SystemStatus {
    /// States a boiler goes through while running normally.
    pub fn is_normal(&self) -> bool {
        matches!(
            self,
            SystemStatus::Standby
                | SystemStatus::Igniting
                | SystemStatus::Heating
                | SystemStatus::Circulating
                | SystemStatus::Initializing
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(i32)]
pub enum LoadType {
    Off = 0,
    #[strum(serialize = "DHW")]
    Dhw = 1,
    #[strum(serialize = "Reset Heating")]
    ResetHeating = 2,
    #[strum(serialize = "Set Point")]
    SetPoint = 3,
    #[strum(serialize = "External Control")]
    ExternalControl = 4,
    #[strum(serialize = "Manual Control")]
    ManualControl = 5,
    #[strum(serialize = "Zone Of")]
    ZoneOf = 6,
}

/// Returns the display name of a raw load type, e.g. the value of `Load1Type`.
pub fn load_type_name(load_type: i32) -> &'static str {
    LoadType::from_repr(load_type).map_or(fault::UNKNOWN, |ty| ty.into())
}

// Temperatures reported by the boiler are in Celsius * 4

/// Converts a raw temperature to whole degrees Fahrenheit.
pub fn temp_as_f(temp: i32) -> i32 {
    (((temp * 9) / 5) + (4 * 32)) / 4
}

/// Converts a raw temperature to degrees Celsius.
pub fn temp_as_c(temp: i32) -> f32 {
    temp as f32 / 4.0
}

/// Response to [`Request::BoilerStatusData`](super::Request::BoilerStatusData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BoilerStatusData {
    pub status: i32,
    /// Thousands of BTUs per hour
    pub mbh: i32,
    #[serde(rename = "supplyT")]
    pub supply_temp: i32,
    #[serde(rename = "returnT")]
    pub return_temp: i32,
    #[serde(rename = "secondaryT")]
    pub secondary_temp: i32,
    #[serde(rename = "dhwT")]
    pub domestic_water_heater_temp: i32,
    pub psig: i32,
    pub warning: i32,
}

/// Response to [`Request::BoilerLogData`](super::Request::BoilerLogData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct BoilerLogData {
    pub power_on_hrs: i32,
    pub burner_on_hrs: i32,
    #[serde(rename = "Load1OnTime")]
    pub load1_on_time: i32,
    #[serde(rename = "Load2OnTime")]
    pub load2_on_time: i32,
    #[serde(rename = "Load3OnTime")]
    pub load3_on_time: i32,
    #[serde(rename = "Load4OnTime")]
    pub load4_on_time: i32,
    pub remote_on_time: i32,
    pub starts: i32,
    pub trials: i32,
    pub errors: i32,
    pub warnings: i32,
    pub log_entries: i32,
    pub cycles: i32,
    pub bias_count: i32,
}

/// A single entry of the error log, see [`Request::BoilerErrorLogData`](super::Request::BoilerErrorLogData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct BoilerErrorLogData {
    pub time: String,
    pub date: String,
    pub min_err: i64,
    pub maj_err: i64,
    pub sys_err: i64,
    pub heat_out: i32,
    #[serde(rename = "FanRPM")]
    pub fan_rpm: i32,
    pub inlet_temp: i32,
    pub outlet_temp: i32,
    pub board_temp: i32,
    pub diff_pressure: i32,
    #[serde(rename = "InletTRate")]
    pub inlet_t_rate: i32,
    #[serde(rename = "OutletTRate")]
    pub outlet_t_rate: i32,
    pub inlet_pressure: i32,
    pub outlet_pressure: i32,
    pub flame_sense: i32,
    #[serde(rename = "SIM_Flame")]
    pub sim_flame: i32,
    #[serde(rename = "SIM_Status")]
    pub sim_status: i32,
    pub fan_duty_cycle: i32,
    #[serde(rename = "BV_Gauge")]
    pub bv_gauge: i32,
}

impl BoilerErrorLogData {
    pub fn fault(&self) -> Classification {
        fault::classify_detailed(word(self.min_err), word(self.maj_err), word(self.sys_err))
    }
}

/// Response to [`Request::BoilerData`](super::Request::BoilerData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BoilerData {
    pub status: i32,
    pub master: i32,
    pub net_master: i32,
    pub warnings: i32,
    pub imperial: i32,
    #[serde(rename = "ontime")]
    pub on_time: i32,
    pub boiler_id: i32,
    pub dim_time: i32,
    pub configured: i32,
    pub model_num: i32,
    #[serde(rename = "designT")]
    pub design_temp: i32,
    pub model: String,
    #[serde(rename = "fwversion")]
    pub firmware_version: String,
    #[serde(rename = "fwdate")]
    pub firmware_date: String,
    pub sicc_module: bool,
}

impl BoilerData {
    pub fn system_status(&self) -> Option<SystemStatus> {
        SystemStatus::from_repr(self.status)
    }
}

/// Response to [`Request::BoilerStandardData`](super::Request::BoilerStandardData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BoilerStandardData {
    #[serde(rename = "Load1Type")]
    pub load1_type: i32,
    #[serde(rename = "Load2Type")]
    pub load2_type: i32,
    #[serde(rename = "Load3Type")]
    pub load3_type: i32,
    #[serde(rename = "Load4Type")]
    pub load4_type: i32,
    #[serde(rename = "Load1Emitter")]
    pub load1_emitter: i32,
    #[serde(rename = "Load2Emitter")]
    pub load2_emitter: i32,
    #[serde(rename = "Load3Emitter")]
    pub load3_emitter: i32,
    #[serde(rename = "Load4Emitter")]
    pub load4_emitter: i32,
    #[serde(rename = "SB1Enable")]
    pub sb1_enable: bool,
    #[serde(rename = "SB2Enable")]
    pub sb2_enable: bool,
    #[serde(rename = "SB3Enable")]
    pub sb3_enable: bool,
    #[serde(rename = "SB4Enable")]
    pub sb4_enable: bool,
    #[serde(rename = "Occupied")]
    pub occupied: i32,
    #[serde(rename = "Imperial")]
    pub imperial: i32,
}

impl BoilerStandardData {
    /// Load types indexed by load number, starting at load 1.
    pub fn load_types(&self) -> [(u8, i32); 4] {
        [
            (1, self.load1_type),
            (2, self.load2_type),
            (3, self.load3_type),
            (4, self.load4_type),
        ]
    }
}

/// Response to [`Request::BoilerExtDetailData`](super::Request::BoilerExtDetailData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct BoilerExtDetailData {
    #[serde(rename = "BoilerID")]
    pub boiler_id: i32,
    pub status: String,
    pub warnings: String,
    pub errors: String,
    #[serde(rename = "MBH")]
    pub mbh: i32,
    #[serde(rename = "SupplyT")]
    pub supply_temp: i32,
    #[serde(rename = "ReturnT")]
    pub return_temp: i32,
    #[serde(rename = "TargetT")]
    pub target_temp: i32,
    #[serde(rename = "StackT")]
    pub stack_temp: i32,
    #[serde(rename = "AirT")]
    pub air_temp: i32,
    #[serde(rename = "IndoorT")]
    pub indoor_temp: i32,
    #[serde(rename = "OutdoorT")]
    pub outdoor_temp: i32,
    #[serde(rename = "SecondaryT")]
    pub secondary_temp: i32,
    #[serde(rename = "TankT")]
    pub tank_temp: i32,
    pub inlet_pressure: f64,
    pub outlet_pressure: f64,
    pub delta_pressure: f64,
    pub servicing: i64,
    pub cycles: i32,
    pub major_error: i64,
    pub minor_error: i64,
    pub system_error: i64,
    pub warn_flags: i32,
    pub pumps: i32,
    pub op_status: i32,
}

impl BoilerExtDetailData {
    pub fn servicing_word(&self) -> ServicingWord {
        ServicingWord(word(self.servicing))
    }

    /// Load numbers the boiler is currently servicing.
    pub fn servicing_loads(&self) -> Vec<u8> {
        self.servicing_word().loads(LoadGroup::Servicing)
    }

    /// Load numbers the boiler is currently circulating.
    pub fn circulating_loads(&self) -> Vec<u8> {
        self.servicing_word().loads(LoadGroup::Circulating)
    }

    /// Load numbers calling for heat that aren't being serviced.
    pub fn calling_loads(&self) -> Vec<u8> {
        self.servicing_word().loads(LoadGroup::Calling)
    }

    pub fn fault(&self) -> Classification {
        fault::classify_detailed(
            word(self.minor_error),
            word(self.major_error),
            word(self.system_error),
        )
    }
}

/// Response to [`Request::BoilerFactoryData`](super::Request::BoilerFactoryData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BoilerFactoryData {
    #[serde(rename = "InletP")]
    pub inlet_p: i32,
    #[serde(rename = "OutletP")]
    pub outlet_p: i32,
    #[serde(rename = "DeltaP")]
    pub delta_p: i32,
    #[serde(rename = "FlowRate")]
    pub flow_rate: i32,
    #[serde(rename = "FanSpeed")]
    pub fan_speed: i32,
    #[serde(rename = "FanDuty")]
    pub fan_duty: i32,
    #[serde(rename = "FanTarget")]
    pub fan_target: i32,
    #[serde(rename = "RequiredP")]
    pub required_p: i32,
    #[serde(rename = "FanP")]
    pub fan_p: i32,
    #[serde(rename = "OffsetP")]
    pub offset_p: i32,
    #[serde(rename = "VentFactor")]
    pub vent_factor: i32,
    #[serde(rename = "VarDuty")]
    pub var_duty: i32,
    #[serde(rename = "Responding")]
    pub responding: i32,
    #[serde(rename = "Firing")]
    pub firing: i32,
    #[serde(rename = "Available")]
    pub available: i32,
    #[serde(rename = "F_Current")]
    pub f_current: i32,
    #[serde(rename = "HeatOut")]
    pub heat_out: i32,
    #[serde(rename = "FanHeatOut")]
    pub fan_heat_out: i32,
    #[serde(rename = "InletT")]
    pub inlet_temp: i32,
    #[serde(rename = "OutletT")]
    pub outlet_temp: i32,
    #[serde(rename = "StackT")]
    pub stack_temp: i32,
    #[serde(rename = "RPMLimit")]
    pub rpm_limit: i32,
    #[serde(rename = "SICC_Flame")]
    pub sicc_flame: i32,
}

/// Response to [`Request::LoadStatusData`](super::Request::LoadStatusData)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoadStatusData {
    /// Zero based load index
    pub load: i32,
    #[serde(rename = "Type")]
    pub load_type: i32,
    pub heat_out: i32,
    #[serde(rename = "SupplyT")]
    pub supply_temp: i32,
    #[serde(rename = "ReturnT")]
    pub return_temp: i32,
    pub boiler_max: i32,
    pub boiler_diff: i32,
    pub cycles: i32,
    pub priority: i32,
    pub temperature1: i32,
    pub temperature2: i32,
    pub temperature3: i32,
    pub temperature4: i32,
    pub temperature5: i32,
    pub temperature6: i32,
}

impl LoadStatusData {
    pub fn load_type_name(&self) -> &'static str {
        load_type_name(self.load_type)
    }

    /// One based load number, as shown on the boiler display.
    pub fn load_number(&self) -> i32 {
        self.load + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperatures() {
        // 20C
        assert_eq!(temp_as_f(80), 68);
        assert_eq!(temp_as_c(80), 20.0);
        // 60.25C
        assert_eq!(temp_as_f(241), 140);
        assert_eq!(temp_as_c(241), 60.25);
        assert_eq!(temp_as_f(0), 32);
    }

    #[test]
    fn test_load_type_name() {
        assert_eq!(load_type_name(0), "Off");
        assert_eq!(load_type_name(1), "DHW");
        assert_eq!(load_type_name(2), "Reset Heating");
        assert_eq!(load_type_name(6), "Zone Of");
        assert_eq!(load_type_name(7), "Unknown");
        assert_eq!(load_type_name(-1), "Unknown");
        assert_eq!(LoadType::ManualControl.to_string(), "Manual Control");
    }

    #[test]
    fn test_system_status() {
        assert_eq!(SystemStatus::from_repr(3), Some(SystemStatus::Heating));
        assert_eq!(SystemStatus::from_repr(9), None);
        assert!(SystemStatus::Standby.is_normal());
        assert!(SystemStatus::Initializing.is_normal());
        assert!(!SystemStatus::Purging.is_normal());
        assert!(!SystemStatus::Error.is_normal());
    }

    #[test]
    fn test_decode_ext_detail() {
        let json = r#"{
            "rbid": 0, "object_no": 19, "BoilerID": 1,
            "Status": "Heating", "Warnings": "", "Errors": "",
            "MBH": 42, "SupplyT": 241, "ReturnT": 200, "TargetT": 250,
            "StackT": 180, "AirT": 88, "IndoorT": 84, "OutdoorT": -20,
            "SecondaryT": 0, "TankT": 220,
            "InletPressure": 14.5, "OutletPressure": 15.25, "DeltaPressure": 0.75,
            "Servicing": 657, "Cycles": 12345,
            "MajorError": 0, "MinorError": 512, "SystemError": 0,
            "WarnFlags": 0, "Pumps": 3, "OpStatus": 2
        }"#;

        let data: BoilerExtDetailData = serde_json::from_str(json).unwrap();
        assert_eq!(data.status, "Heating");
        assert_eq!(data.outdoor_temp, -20);
        assert_eq!(data.outlet_pressure, 15.25);
        assert_eq!(data.cycles, 12345);

        // 657 = 0x291
        assert_eq!(data.servicing_loads(), vec![1]);
        assert_eq!(data.circulating_loads(), vec![1, 4]);
        assert_eq!(data.calling_loads(), vec![2]);
        assert_eq!(data.fault().label, "Fan Pressure");
    }

    #[test]
    fn test_decode_negative_words() {
        let json = r#"{"Status": "Error", "MinorError": -1, "Servicing": -1}"#;

        let data: BoilerExtDetailData = serde_json::from_str(json).unwrap();
        assert_eq!(data.minor_error, -1);
        // All minor bits set, including both that are promoted to hard errors
        assert_eq!(data.fault().label, "Water High Limit");
        assert_eq!(data.fault().category, fault::Category::Hard);
        assert_eq!(data.servicing_loads(), vec![1, 2, 3, 4]);
        assert_eq!(data.calling_loads(), vec![1, 2, 3, 4]);

        let json = r#"{"MinErr": 0, "MajErr": -1, "SysErr": 4294967298}"#;
        let entry: BoilerErrorLogData = serde_json::from_str(json).unwrap();
        // Bits above 32 are dropped, leaving system bit 0x02
        assert_eq!(entry.fault().label, "CGI Task");
    }

    #[test]
    fn test_decode_boiler_data() {
        let json = r#"{"status": 5, "warnings": 1, "ontime": 99, "designT": 72,
            "model": "G3 SL 28-160", "fwversion": "3.2.1", "fwdate": "2016-03-01",
            "sicc_module": true}"#;

        let data: BoilerData = serde_json::from_str(json).unwrap();
        assert_eq!(data.system_status(), Some(SystemStatus::Error));
        assert_eq!(data.on_time, 99);
        assert_eq!(data.design_temp, 72);
        assert_eq!(data.model, "G3 SL 28-160");
        assert_eq!(data.firmware_version, "3.2.1");
        assert!(data.sicc_module);
        // Missing fields default to zero
        assert_eq!(data.master, 0);
    }

    #[test]
    fn test_decode_error_log() {
        let json = r#"{"Time": "10:12", "Date": "2019-01-02", "MinErr": 0,
            "MajErr": 32, "SysErr": 0, "FanRPM": 3100, "SIM_Flame": 7, "BV_Gauge": 2}"#;

        let entry: BoilerErrorLogData = serde_json::from_str(json).unwrap();
        assert_eq!(entry.fan_rpm, 3100);
        assert_eq!(entry.sim_flame, 7);
        assert_eq!(entry.bv_gauge, 2);
        assert_eq!(entry.fault().label, "Vent High Pressure");
    }

    #[test]
    fn test_decode_load_status() {
        let json = r#"{"Load": 1, "Type": 1, "HeatOut": 60, "Cycles": 17, "Temperature1": 3}"#;
        let load: LoadStatusData = serde_json::from_str(json).unwrap();
        assert_eq!(load.load_number(), 2);
        assert_eq!(load.load_type_name(), "DHW");
        assert_eq!(load.cycles, 17);
        assert_eq!(load.temperature1, 3);
    }

    #[test]
    fn test_decode_standard_data() {
        let json = r#"{"Load1Type": 2, "Load3Type": 1, "SB2Enable": true}"#;
        let data: BoilerStandardData = serde_json::from_str(json).unwrap();
        assert_eq!(data.load_types(), [(1, 2), (2, 0), (3, 1), (4, 0)]);
        assert!(data.sb2_enable);
    }
}
