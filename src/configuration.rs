use std::cell::{
    Ref,
    RefCell,
    RefMut
};
use std::fs::File;
use std::io::BufReader;

use serde::Deserialize;
use tracing::debug;

use crate::manager::curvemanager::CurveManager;
use crate::manager::managererror::ManagerError;
use crate::manager::manager::{
    IManager,
    Manager
};
use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;


#[derive(Deserialize)]
struct ConfigurationJsonProp {
    #[serde(default)]
    settings: ComputationSettings,
    #[serde(default)]
    curves: Vec<serde_json::Value>
}

/// Settings plus a named curve catalog, loaded from
/// `{"settings": {...}, "curves": [...]}`.
pub struct Configuration {
    settings_cell: RefCell<ComputationSettings>,
    curve_manager_cell: RefCell<Manager<Curve>>
}


impl Configuration {
    pub fn new() -> Configuration {
        Configuration {
            settings_cell: RefCell::new(ComputationSettings::default()),
            curve_manager_cell: RefCell::new(CurveManager::new())
        }
    }

    pub fn settings(&self) -> Ref<'_, ComputationSettings> {
        self.settings_cell.borrow()
    }

    pub fn curve_manager(&self) -> RefMut<'_, Manager<Curve>> {
        self.curve_manager_cell.borrow_mut()
    }

    pub fn curve(&self, name: &str) -> Result<Curve, ManagerError> {
        self.curve_manager_cell.borrow().get(name)
    }

    fn apply(&self, json_prop: ConfigurationJsonProp) -> Result<(), ManagerError> {
        *self.settings_cell.borrow_mut() = json_prop.settings;
        let curve_manager = self.curve_manager_cell.borrow_mut();
        curve_manager.insert_obj_from_json_vec(&json_prop.curves)?;
        debug!(curves = curve_manager.len(), "configuration loaded");
        Ok(())
    }

    pub fn from_reader(&self, file_path: &str) -> Result<(), ManagerError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_prop: ConfigurationJsonProp = serde_json::from_reader(reader)?;
        self.apply(json_prop)
    }

    pub fn from_json_str(&self, text: &str) -> Result<(), ManagerError> {
        let json_prop: ConfigurationJsonProp = serde_json::from_str(text)?;
        self.apply(json_prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::rational::Rational;

    #[test]
    fn partial_settings_keep_the_defaults() {
        let configuration = Configuration::new();
        configuration.from_json_str(r#"{
            "settings": { "auto_optimize": false, "parallel_list_threshold": 3 },
            "curves": [
                { "name": "link", "type": "rateLatencyServiceCurve", "latency": 2, "rate": 3 }
            ]
        }"#).unwrap();
        assert!(!configuration.settings().auto_optimize);
        assert_eq!(configuration.settings().parallel_list_threshold, 3);
        assert!(configuration.settings().use_parallel_convolution);
        let link = configuration.curve("link").unwrap();
        assert_eq!(link.value_at(&Rational::from(4)).unwrap(), Rational::from(6));
        assert!(configuration.curve("missing").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let configuration = Configuration::new();
        let result = configuration.from_reader("/nonexistent/netcalc.json");
        assert!(matches!(result, Err(ManagerError::IOError(_))));
    }
}
